//! High-level runner for producing frames, labels and the final video.
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::UVec2;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::background::{Background, BackgroundOrigin};
use crate::config::{PostProcessConfig, SynthConfig};
use crate::encoder::{EncodeRequest, VideoEncoder};
use crate::entity::{EntityRole, EntitySampler, MotionModel, Registry, RespawnCause};
use crate::error::Result;
use crate::labels::{LabelPaths, LabelStreams};
use crate::post::post_process;
use crate::raster::Frame;
use crate::render::render_entities;
use crate::sequence::events::{EventSink, SequenceEvent, SequenceEventKind};
use crate::store::{FrameNaming, FrameStore, PngDirectoryStore};

/// Cloneable request to stop a run between frames.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of the frame loop.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub tag: String,
    pub total_frames: usize,
    pub frames_written: usize,
    /// Circle respawns recorded in the spawn-events stream (header excluded).
    pub circle_respawns: usize,
    pub blob_respawns: usize,
    /// `true` when a stop request ended the run early.
    pub stopped: bool,
    /// Canvas entities move in, before rotation.
    pub canvas: UVec2,
    /// Paths of persisted frames, when the store writes to disk.
    pub frame_paths: Vec<PathBuf>,
}

/// Outcome of [`SequenceRunner::run_to_disk`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub labels: LabelPaths,
    /// Encoded video, when an encoder ran successfully.
    pub video: Option<PathBuf>,
}

/// A respawn observed during [`advance_registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Respawn {
    pub role: EntityRole,
    pub slot: usize,
    pub cause: RespawnCause,
    pub fringe_count: Option<u32>,
}

/// Moves every circle slot, then every blob slot, calling `on_respawn` for each
/// resampled slot in that order.
pub fn advance_registry(
    registry: &mut Registry,
    canvas: UVec2,
    motion: &MotionModel,
    sampler: &EntitySampler,
    rng: &mut dyn RngCore,
    mut on_respawn: impl FnMut(Respawn) -> Result<()>,
) -> Result<()> {
    for slot in 0..registry.circles.capacity() {
        let Some(circle) = registry.circles.get_mut(slot) else {
            continue;
        };
        if let Some(cause) = motion.advance(circle, canvas, sampler, rng) {
            let fringe_count = Some(circle.fringe_count);
            on_respawn(Respawn {
                role: EntityRole::Circle,
                slot,
                cause,
                fringe_count,
            })?;
        }
    }
    for slot in 0..registry.blobs.capacity() {
        let Some(blob) = registry.blobs.get_mut(slot) else {
            continue;
        };
        if let Some(cause) = motion.advance(blob, canvas, sampler, rng) {
            on_respawn(Respawn {
                role: EntityRole::Blob,
                slot,
                cause,
                fringe_count: None,
            })?;
        }
    }
    Ok(())
}

/// Background, entities and post-processing for the current registry state.
pub fn compose_frame(
    background: &Background,
    registry: &Registry,
    post: &PostProcessConfig,
    rng: &mut dyn RngCore,
) -> Frame {
    let mut frame = background.create_background();
    render_entities(&mut frame, registry, rng);
    post_process(frame, post)
}

pub struct SequenceRunner {
    config: SynthConfig,
    background: Background,
    sampler: EntitySampler,
    motion: MotionModel,
    stop: StopToken,
}

impl SequenceRunner {
    /// Validates `config` and loads the background.
    pub fn try_new(config: SynthConfig) -> Result<Self> {
        config.validate()?;
        let background = Background::load(&config.background, config.resolution);
        config.validate_canvas(background.size())?;
        Ok(Self {
            sampler: EntitySampler::from_config(&config),
            motion: MotionModel::from_config(&config),
            config,
            background,
            stop: StopToken::new(),
        })
    }

    /// Uses an externally owned stop token.
    pub fn with_stop_token(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Run tag from the configuration, or 8 hex digits drawn from `rng`.
    pub fn resolve_tag(&self, rng: &mut dyn RngCore) -> String {
        match &self.config.run_tag {
            Some(tag) => tag.clone(),
            None => format!("{:08x}", rng.next_u32()),
        }
    }

    /// Generates every frame into `store` and `labels`.
    ///
    /// Label streams are closed even when a stop request ends the loop early. Any
    /// store or label I/O error aborts the run.
    pub fn run<W: Write>(
        &mut self,
        rng: &mut dyn RngCore,
        tag: &str,
        store: &mut dyn FrameStore,
        labels: &mut LabelStreams<W>,
        sink: &mut dyn EventSink,
    ) -> Result<RunSummary> {
        let canvas = self.background.size();
        let total_frames = self.config.total_frames();

        if let BackgroundOrigin::Fallback { path, reason } = self.background.origin() {
            if sink.wants(SequenceEventKind::BackgroundFallback) {
                sink.send(SequenceEvent::BackgroundFallback {
                    path: path.clone(),
                    reason: reason.clone(),
                });
            }
        }

        let mut registry = Registry::new(self.config.circle_count, self.config.blob_count);
        registry.populate(&self.sampler, canvas, rng);
        labels.write_header(&registry.fringe_counts())?;

        info!(
            "Run '{}': {} frames of {}x{}, {} circles, {} blobs.",
            tag,
            total_frames,
            canvas.x,
            canvas.y,
            self.config.circle_count,
            self.config.blob_count
        );
        if sink.wants(SequenceEventKind::RunStarted) {
            sink.send(SequenceEvent::RunStarted {
                tag: tag.to_owned(),
                total_frames,
                canvas,
                circle_count: self.config.circle_count,
                blob_count: self.config.blob_count,
            });
        }

        let mut summary = RunSummary {
            tag: tag.to_owned(),
            total_frames,
            canvas,
            ..Default::default()
        };

        for index in 0..total_frames {
            if self.stop.is_stop_requested() {
                warn!("Run '{}' stopped before frame {}.", tag, index);
                if sink.wants(SequenceEventKind::StopRequested) {
                    sink.send(SequenceEvent::StopRequested { next_frame: index });
                }
                summary.stopped = true;
                break;
            }

            advance_registry(
                &mut registry,
                canvas,
                &self.motion,
                &self.sampler,
                rng,
                |respawn| {
                    match respawn.role {
                        EntityRole::Circle => {
                            if let Some(n) = respawn.fringe_count {
                                labels.record_spawn(n)?;
                            }
                            summary.circle_respawns += 1;
                        }
                        EntityRole::Blob => summary.blob_respawns += 1,
                    }
                    debug!(
                        "Frame {}: {:?} slot {} respawned ({:?}).",
                        index, respawn.role, respawn.slot, respawn.cause
                    );
                    if sink.wants(SequenceEventKind::Respawned) {
                        sink.send(SequenceEvent::Respawned {
                            frame: index,
                            role: respawn.role,
                            slot: respawn.slot,
                            cause: respawn.cause,
                            fringe_count: respawn.fringe_count,
                        });
                    }
                    Ok(())
                },
            )?;

            let frame = compose_frame(&self.background, &registry, &self.config.post, rng);
            let path = store.store(index, &frame)?;
            labels.record_frame(&registry.fringe_counts())?;
            summary.frames_written += 1;

            if sink.wants(SequenceEventKind::FrameWritten) {
                sink.send(SequenceEvent::FrameWritten {
                    index,
                    path: path.clone(),
                });
            }
            if let Some(path) = path {
                summary.frame_paths.push(path);
            }
        }

        labels.finish()?;
        info!(
            "Run '{}' finished: {} of {} frames, {} circle respawns.",
            tag, summary.frames_written, total_frames, summary.circle_respawns
        );
        if sink.wants(SequenceEventKind::RunFinished) {
            sink.send(SequenceEvent::RunFinished {
                summary: summary.clone(),
            });
        }
        Ok(summary)
    }

    /// Writes PNG frames and label files to the configured directories, then hands the
    /// frames to `encoder` when one is given and the run was not stopped.
    ///
    /// Frames are deleted only after a successful encode; an encoder failure is
    /// returned with the frames left in place.
    pub fn run_to_disk(
        &mut self,
        rng: &mut dyn RngCore,
        encoder: Option<&mut dyn VideoEncoder>,
        sink: &mut dyn EventSink,
    ) -> Result<RunOutcome> {
        let tag = self.resolve_tag(rng);
        let output = self.config.output.clone();
        let naming = FrameNaming::for_total(&output.frame_prefix, self.config.total_frames());
        let pattern = naming.pattern();

        let (mut labels, label_paths) = LabelStreams::create(&output.label_dir, &tag)?;
        let mut store = PngDirectoryStore::create(&output.frame_dir, naming)?;
        let summary = self.run(rng, &tag, &mut store, &mut labels, sink)?;

        let mut video = None;
        if let Some(encoder) = encoder {
            if summary.stopped {
                info!("Run '{}' was stopped; skipping encoding.", tag);
            } else {
                let request = EncodeRequest {
                    frame_dir: output.frame_dir.clone(),
                    pattern,
                    fps: self.config.fps,
                    output: output
                        .video
                        .clone()
                        .unwrap_or_else(|| output.label_dir.join(format!("video_{tag}.avi"))),
                };
                if let Err(e) = encoder.encode(&request) {
                    warn!(
                        "Encoding failed; keeping {} frames in '{}'.",
                        summary.frames_written,
                        output.frame_dir.display()
                    );
                    if sink.wants(SequenceEventKind::Warning) {
                        sink.send(SequenceEvent::Warning {
                            context: request.output.display().to_string(),
                            message: e.to_string(),
                        });
                    }
                    return Err(e);
                }
                if sink.wants(SequenceEventKind::EncodingFinished) {
                    sink.send(SequenceEvent::EncodingFinished {
                        output: request.output.clone(),
                    });
                }
                let count = store.remove_stored()?;
                if sink.wants(SequenceEventKind::FramesRemoved) {
                    sink.send(SequenceEvent::FramesRemoved { count });
                }
                video = Some(request.output);
            }
        }

        Ok(RunOutcome {
            summary,
            labels: label_paths,
            video,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::{BackgroundSource, OutputConfig};
    use crate::error::Error;
    use crate::sequence::events::VecSink;
    use crate::store::MemoryFrameStore;

    fn scenario() -> SynthConfig {
        SynthConfig::default()
            .with_resolution(256, 128)
            .with_radius_range(20, 25)
            .with_counts(1, 0)
            .with_timing(10, 1)
            .with_post(PostProcessConfig::none())
            .with_seed(2024)
            .with_run_tag("test")
    }

    struct Captured {
        summary: RunSummary,
        frames: Vec<Frame>,
        spawns: String,
        per_frame: String,
        events: VecSink,
    }

    fn run_in_memory(config: SynthConfig) -> Captured {
        let mut rng = config.rng();
        let mut runner = SequenceRunner::try_new(config).unwrap();
        let mut store = MemoryFrameStore::new();
        let mut labels = LabelStreams::new(Vec::new(), Vec::new());
        let mut events = VecSink::new();
        let summary = runner
            .run(&mut rng, "test", &mut store, &mut labels, &mut events)
            .unwrap();
        let (spawns, per_frame) = labels.into_inner();
        Captured {
            summary,
            frames: store.into_frames(),
            spawns: String::from_utf8(spawns).unwrap(),
            per_frame: String::from_utf8(per_frame).unwrap(),
            events,
        }
    }

    #[test]
    fn single_circle_scenario_produces_ten_labeled_frames() {
        let out = run_in_memory(scenario());
        assert_eq!(out.summary.frames_written, 10);
        assert_eq!(out.frames.len(), 10);
        assert!(!out.summary.stopped);

        let spawn_values: Vec<&str> = out.spawns.split_whitespace().collect();
        assert!(!spawn_values.is_empty());
        assert_eq!(spawn_values.len(), 1 + out.summary.circle_respawns);

        let lines: Vec<&str> = out.per_frame.lines().collect();
        assert_eq!(lines.len(), 10);
        for line in lines {
            assert_eq!(line.split(' ').count(), 1);
            line.parse::<u32>().unwrap();
        }
        assert_eq!(out.events.count(SequenceEventKind::FrameWritten), 10);
        assert_eq!(out.events.count(SequenceEventKind::RunFinished), 1);
    }

    #[test]
    fn per_frame_lines_have_one_value_per_circle_slot() {
        let out = run_in_memory(scenario().with_counts(5, 2));
        for line in out.per_frame.lines() {
            assert_eq!(line.split(' ').count(), 5);
        }
    }

    #[test]
    fn respawns_appear_exactly_once_in_spawn_stream() {
        let out = run_in_memory(
            scenario()
                .with_counts(4, 1)
                .with_disappearance_probability(0.3),
        );
        let values: Vec<u32> = out
            .spawns
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        let header = &values[..4];
        let respawned: Vec<u32> = out
            .events
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                SequenceEvent::Respawned {
                    role: EntityRole::Circle,
                    fringe_count,
                    ..
                } => *fringe_count,
                _ => None,
            })
            .collect();
        assert!(!respawned.is_empty());
        assert_eq!(&values[4..], respawned.as_slice());
        assert_eq!(header.len(), 4);
        assert_eq!(out.summary.circle_respawns, respawned.len());
        assert!(out.spawns.ends_with('\n'));
    }

    #[test]
    fn fringe_counts_only_change_on_respawn() {
        let out = run_in_memory(
            scenario()
                .with_counts(3, 0)
                .with_disappearance_probability(0.2),
        );
        let rows: Vec<Vec<u32>> = out
            .per_frame
            .lines()
            .map(|l| l.split(' ').map(|v| v.parse().unwrap()).collect())
            .collect();
        let mut respawned_slots = std::collections::HashSet::new();
        for e in out.events.as_slice() {
            if let SequenceEvent::Respawned {
                frame,
                role: EntityRole::Circle,
                slot,
                ..
            } = e
            {
                respawned_slots.insert((*frame, *slot));
            }
        }
        for f in 1..rows.len() {
            for slot in 0..3 {
                if rows[f][slot] != rows[f - 1][slot] {
                    assert!(respawned_slots.contains(&(f, slot)));
                }
            }
        }
    }

    #[test]
    fn same_seed_gives_identical_labels_and_frames() {
        let cfg = scenario()
            .with_counts(6, 3)
            .with_post(PostProcessConfig {
                blur: Some(crate::config::BlurConfig::new(1)),
                rotate: true,
            });
        let a = run_in_memory(cfg.clone());
        let b = run_in_memory(cfg);
        assert_eq!(a.per_frame, b.per_frame);
        assert_eq!(a.spawns, b.spawns);
        assert_eq!(a.frames, b.frames);
        assert_eq!((a.frames[0].width(), a.frames[0].height()), (128, 256));
    }

    #[test]
    fn different_seeds_diverge() {
        let a = run_in_memory(scenario().with_counts(8, 0).with_seed(1));
        let b = run_in_memory(scenario().with_counts(8, 0).with_seed(2));
        assert_ne!(a.spawns, b.spawns);
    }

    #[test]
    fn stop_request_closes_labels_cleanly() {
        let config = scenario().with_timing(10, 3);
        let mut rng = config.rng();
        let mut runner = SequenceRunner::try_new(config).unwrap();
        let stop = runner.stop_token();
        let mut store = MemoryFrameStore::new();
        let mut labels = LabelStreams::new(Vec::new(), Vec::new());
        let mut written = 0;
        let mut sink = crate::sequence::events::FnSink::new(|e| {
            if let SequenceEvent::FrameWritten { .. } = e {
                written += 1;
                if written == 4 {
                    stop.request_stop();
                }
            }
        });
        let summary = runner
            .run(&mut rng, "stop", &mut store, &mut labels, &mut sink)
            .unwrap();
        assert!(summary.stopped);
        assert_eq!(summary.frames_written, 4);
        assert_eq!(store.len(), 4);
        let (spawns, frames) = labels.into_inner();
        assert_eq!(String::from_utf8(frames).unwrap().lines().count(), 4);
        assert!(String::from_utf8(spawns).unwrap().ends_with('\n'));
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let err = SequenceRunner::try_new(scenario().with_radius_range(30, 30))
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_background_is_reported_not_fatal() {
        let cfg = scenario().with_background(BackgroundSource::Image(
            std::env::temp_dir().join("fringe_synth_missing_bg.png"),
        ));
        let out = run_in_memory(cfg);
        assert_eq!(out.summary.frames_written, 10);
        assert_eq!(out.events.count(SequenceEventKind::BackgroundFallback), 1);
    }

    #[test]
    fn advance_registry_reports_circles_before_blobs() {
        let cfg = scenario()
            .with_counts(3, 3)
            .with_disappearance_probability(1.0);
        let sampler = EntitySampler::from_config(&cfg);
        let motion = MotionModel::from_config(&cfg);
        let mut rng = StdRng::seed_from_u64(77);
        let mut registry = Registry::new(3, 3);
        registry.populate(&sampler, cfg.resolution, &mut rng);

        let mut seen = Vec::new();
        advance_registry(&mut registry, cfg.resolution, &motion, &sampler, &mut rng, |r| {
            seen.push((r.role, r.slot));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                (EntityRole::Circle, 0),
                (EntityRole::Circle, 1),
                (EntityRole::Circle, 2),
                (EntityRole::Blob, 0),
                (EntityRole::Blob, 1),
                (EntityRole::Blob, 2),
            ]
        );
    }

    struct FailingStore {
        inner: MemoryFrameStore,
        fail_at: usize,
    }

    impl FrameStore for FailingStore {
        fn store(&mut self, index: usize, frame: &Frame) -> Result<Option<PathBuf>> {
            if index == self.fail_at {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.store(index, frame)
        }

        fn remove_stored(&mut self) -> Result<usize> {
            self.inner.remove_stored()
        }
    }

    #[test]
    fn frame_write_failure_aborts_the_run() {
        let config = scenario();
        let mut rng = config.rng();
        let mut runner = SequenceRunner::try_new(config).unwrap();
        let mut store = FailingStore {
            inner: MemoryFrameStore::new(),
            fail_at: 3,
        };
        let mut labels = LabelStreams::new(Vec::new(), Vec::new());
        let mut events = VecSink::new();

        let err = runner
            .run(&mut rng, "io", &mut store, &mut labels, &mut events)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(store.inner.len(), 3);
        assert_eq!(labels.frame_lines(), 3);
        assert_eq!(events.count(SequenceEventKind::FrameWritten), 3);
        assert_eq!(events.count(SequenceEventKind::RunFinished), 0);
    }

    /// Accepts writes until `max_lines` newlines have gone through.
    struct LineLimitedWriter {
        written: Vec<u8>,
        max_lines: usize,
    }

    impl LineLimitedWriter {
        fn new(max_lines: usize) -> Self {
            Self {
                written: Vec::new(),
                max_lines,
            }
        }
    }

    impl Write for LineLimitedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let lines = self.written.iter().filter(|&&b| b == b'\n').count();
            if lines >= self.max_lines {
                return Err(std::io::Error::other("no space left on device"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn label_write_failure_aborts_the_run() {
        let config = scenario();
        let mut rng = config.rng();
        let mut runner = SequenceRunner::try_new(config).unwrap();
        let mut store = MemoryFrameStore::new();
        let mut labels =
            LabelStreams::new(LineLimitedWriter::new(usize::MAX), LineLimitedWriter::new(2));

        let err = runner
            .run(&mut rng, "io", &mut store, &mut labels, &mut ())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        // The third frame is persisted before its label line fails.
        assert_eq!(store.len(), 3);
        assert_eq!(labels.frame_lines(), 2);
        let (_, per_frame) = labels.into_inner();
        assert_eq!(String::from_utf8(per_frame.written).unwrap().lines().count(), 2);
    }

    struct RecordingEncoder {
        requests: Vec<EncodeRequest>,
        fail: bool,
    }

    impl VideoEncoder for RecordingEncoder {
        fn encode(&mut self, request: &EncodeRequest) -> Result<()> {
            self.requests.push(request.clone());
            if self.fail {
                Err(Error::Encoder {
                    status: Some(1),
                    message: "refused".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn disk_config(name: &str) -> (SynthConfig, PathBuf) {
        let root = std::env::temp_dir().join(format!(
            "fringe_synth_run_{}_{}",
            name,
            std::process::id()
        ));
        let cfg = scenario().with_output(
            OutputConfig::new(root.join("frames"), root.join("labels")).with_frame_prefix("img"),
        );
        (cfg, root)
    }

    #[test]
    fn disk_run_encodes_then_removes_frames() {
        let (cfg, root) = disk_config("ok");
        let mut rng = cfg.rng();
        let mut runner = SequenceRunner::try_new(cfg).unwrap();
        let mut encoder = RecordingEncoder {
            requests: Vec::new(),
            fail: false,
        };
        let outcome = runner
            .run_to_disk(&mut rng, Some(&mut encoder), &mut ())
            .unwrap();

        assert_eq!(outcome.summary.frame_paths.len(), 10);
        assert!(outcome.summary.frame_paths.iter().all(|p| !p.exists()));
        let req = &encoder.requests[0];
        assert_eq!(req.fps, 10);
        assert_eq!(req.pattern, "img%03d.png");
        assert_eq!(outcome.video.as_deref(), Some(req.output.as_path()));
        assert!(req.output.ends_with("video_test.avi"));

        let frames = std::fs::read_to_string(&outcome.labels.per_frame).unwrap();
        assert_eq!(frames.lines().count(), 10);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn encoder_failure_keeps_frames() {
        let (cfg, root) = disk_config("fail");
        let mut rng = cfg.rng();
        let mut runner = SequenceRunner::try_new(cfg).unwrap();
        let mut encoder = RecordingEncoder {
            requests: Vec::new(),
            fail: true,
        };
        let err = runner
            .run_to_disk(&mut rng, Some(&mut encoder), &mut ())
            .unwrap_err();
        assert!(matches!(err, Error::Encoder { .. }));
        assert!(root.join("frames").join("img000.png").exists());
        assert!(root.join("frames").join("img009.png").exists());
        std::fs::remove_dir_all(&root).ok();
    }
}
