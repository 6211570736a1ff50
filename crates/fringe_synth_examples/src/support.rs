use std::path::Path;

use anyhow::Context;
use fringe_synth::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Reads a [`SynthConfig`] from a RON file. Missing fields take their defaults.
pub fn load_config_ron(path: impl AsRef<Path>) -> anyhow::Result<SynthConfig> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("reading config '{}'", path.display()))?;
    let config: SynthConfig = ron::de::from_bytes(&bytes)
        .with_context(|| format!("parsing config '{}'", path.display()))?;
    Ok(config)
}

/// Event sink that reports progress through `tracing`, logging every `every` frames.
pub fn progress_sink(every: usize) -> impl EventSink {
    let every = every.max(1);
    FnSink::new(move |event| match event {
        SequenceEvent::FrameWritten { index, .. } if (index + 1) % every == 0 => {
            info!("{} frames written", index + 1);
        }
        SequenceEvent::Respawned {
            frame,
            role,
            slot,
            fringe_count,
            ..
        } => {
            debug!(frame, slot, ?role, ?fringe_count, "respawn");
        }
        SequenceEvent::BackgroundFallback { path, reason } => {
            warn!("background '{}' unusable: {}", path.display(), reason);
        }
        SequenceEvent::Warning { context, message } => {
            warn!("{context}: {message}");
        }
        SequenceEvent::EncodingFinished { output } => {
            info!("video written to '{}'", output.display());
        }
        _ => {}
    })
}

/// Saves a single frame as PNG.
pub fn save_frame_png(frame: &Frame, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    frame
        .as_image()
        .save(path)
        .with_context(|| format!("writing '{}'", path.display()))?;
    info!("wrote '{}'", path.display());
    Ok(())
}
