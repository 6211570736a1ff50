use fringe_synth::prelude::*;
use fringe_synth_examples::{init_tracing, progress_sink};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Smaller canvas, more blobs, light blur and no rotation; frames stay on disk.
    let config = SynthConfig::default()
        .with_resolution(1024, 512)
        .with_radius_range(20, 50)
        .with_counts(12, 10)
        .with_timing(15, 2)
        .with_post(PostProcessConfig {
            blur: Some(BlurConfig::new(2).with_sigma(1.5)),
            rotate: false,
        })
        .with_seed(7)
        .with_run_tag("frames-only")
        .with_output(
            OutputConfig::new("out/frames-only/frames", "out/frames-only")
                .with_frame_prefix("img"),
        );

    let mut rng = config.rng();
    let mut runner = SequenceRunner::try_new(config)?;
    let outcome = runner.run_to_disk(&mut rng, None, &mut progress_sink(10))?;

    println!(
        "{} frames in out/frames-only/frames, labels tagged '{}'",
        outcome.summary.frame_paths.len(),
        outcome.summary.tag
    );
    Ok(())
}
