use fringe_synth::prelude::*;
use fringe_synth_examples::{init_tracing, progress_sink};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Full-size run with the default scene: 20 circles, 5 blobs, blur and rotation.
    let config = SynthConfig::default()
        .with_seed(2025)
        .with_output(OutputConfig::new("out/basic/frames", "out/basic"));

    let mut rng = config.rng();
    let mut runner = SequenceRunner::try_new(config)?;

    let mut encoder = FfmpegEncoder::new();
    let mut sink = progress_sink(30);
    let outcome = runner.run_to_disk(&mut rng, Some(&mut encoder), &mut sink)?;

    println!(
        "tag {}: {} frames, {} circle respawns",
        outcome.summary.tag, outcome.summary.frames_written, outcome.summary.circle_respawns
    );
    println!("spawn events: {}", outcome.labels.spawn_events.display());
    println!("per-frame counts: {}", outcome.labels.per_frame.display());
    if let Some(video) = outcome.video {
        println!("video: {}", video.display());
    }
    Ok(())
}
