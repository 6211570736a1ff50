use fringe_synth::prelude::*;
use fringe_synth_examples::{init_tracing, load_config_ron, progress_sink};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "crates/fringe_synth_examples/configs/small.ron".into());
    let config = load_config_ron(&path)?;
    let encode = config.output.video.is_some();

    let mut rng = config.rng();
    let mut runner = SequenceRunner::try_new(config)?;
    let mut encoder = FfmpegEncoder::new();
    let encoder: Option<&mut dyn VideoEncoder> = if encode {
        Some(&mut encoder)
    } else {
        None
    };
    let outcome = runner.run_to_disk(&mut rng, encoder, &mut progress_sink(25))?;

    println!(
        "{}: {} of {} frames{}",
        outcome.summary.tag,
        outcome.summary.frames_written,
        outcome.summary.total_frames,
        if outcome.summary.stopped {
            " (stopped)"
        } else {
            ""
        }
    );
    Ok(())
}
