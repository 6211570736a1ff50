//! Event types and sinks for observing sequence runs.
//!
//! This module defines [`SequenceEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while a [`crate::sequence::runner::SequenceRunner`]
//! generates frames. Sinks can opt out of event kinds through [`EventSink::wants`] so
//! the runner skips building events nobody listens to.
use std::path::PathBuf;

use glam::UVec2;

use crate::entity::{EntityRole, RespawnCause};
use crate::sequence::runner::RunSummary;

/// Describes events emitted during a sequence run.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SequenceEvent {
    /// Emitted once the registry is populated and the label header is written.
    RunStarted {
        tag: String,
        total_frames: usize,
        /// Canvas entities move in, before any rotation.
        canvas: UVec2,
        circle_count: usize,
        blob_count: usize,
    },

    /// The configured background image could not be used.
    BackgroundFallback { path: PathBuf, reason: String },

    /// A slot was resampled during the motion update of `frame`.
    Respawned {
        frame: usize,
        role: EntityRole,
        slot: usize,
        cause: RespawnCause,
        /// New fringe count for circles.
        fringe_count: Option<u32>,
    },

    /// Frame `index` was persisted and its label line written.
    FrameWritten {
        index: usize,
        path: Option<PathBuf>,
    },

    /// A stop request was honoured before frame `next_frame`.
    StopRequested { next_frame: usize },

    /// Label streams are closed; no more frames will be produced.
    RunFinished { summary: RunSummary },

    /// The external encoder produced `output`.
    EncodingFinished { output: PathBuf },

    /// Persisted frames were deleted after encoding.
    FramesRemoved { count: usize },

    /// Non-fatal warning generated during the run.
    Warning {
        /// Context string (e.g. slot, path).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`SequenceEvent`] used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceEventKind {
    RunStarted,
    BackgroundFallback,
    Respawned,
    FrameWritten,
    StopRequested,
    RunFinished,
    EncodingFinished,
    FramesRemoved,
    Warning,
}

impl SequenceEvent {
    pub fn kind(&self) -> SequenceEventKind {
        match self {
            SequenceEvent::RunStarted { .. } => SequenceEventKind::RunStarted,
            SequenceEvent::BackgroundFallback { .. } => SequenceEventKind::BackgroundFallback,
            SequenceEvent::Respawned { .. } => SequenceEventKind::Respawned,
            SequenceEvent::FrameWritten { .. } => SequenceEventKind::FrameWritten,
            SequenceEvent::StopRequested { .. } => SequenceEventKind::StopRequested,
            SequenceEvent::RunFinished { .. } => SequenceEventKind::RunFinished,
            SequenceEvent::EncodingFinished { .. } => SequenceEventKind::EncodingFinished,
            SequenceEvent::FramesRemoved { .. } => SequenceEventKind::FramesRemoved,
            SequenceEvent::Warning { .. } => SequenceEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`SequenceEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SequenceEvent);

    /// Whether events of `kind` should be built and sent at all.
    fn wants(&self, _kind: SequenceEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SequenceEvent) {}

    #[inline]
    fn wants(&self, _kind: SequenceEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(SequenceEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SequenceEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SequenceEvent),
{
    #[inline]
    fn send(&mut self, event: SequenceEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally limited to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SequenceEvent>,
    only: Option<Vec<SequenceEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the listed kinds.
    pub fn only(kinds: &[SequenceEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<SequenceEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SequenceEvent] {
        &self.events
    }

    pub fn count(&self, kind: SequenceEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SequenceEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: SequenceEventKind) -> bool {
        self.only.as_ref().is_none_or(|k| k.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to every contained sink that wants it.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: SequenceEvent) {
        let kind = event.kind();
        for sink in &mut self.sinks {
            if sink.wants(kind) {
                sink.send(event.clone());
            }
        }
    }

    fn wants(&self, kind: SequenceEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(msg: &str) -> SequenceEvent {
        SequenceEvent::Warning {
            context: "ctx".into(),
            message: msg.into(),
        }
    }

    #[test]
    fn unit_sink_wants_nothing() {
        let sink = ();
        assert!(!sink.wants(SequenceEventKind::FrameWritten));
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(SequenceEvent::FrameWritten {
            index: 0,
            path: None,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(SequenceEventKind::Warning), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn filtered_vec_sink_drops_other_kinds() {
        let mut sink = VecSink::only(&[SequenceEventKind::FrameWritten]);
        assert!(!sink.wants(SequenceEventKind::Warning));
        sink.send(warning("ignored"));
        sink.send(SequenceEvent::FrameWritten {
            index: 3,
            path: None,
        });
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            sink.as_slice()[0],
            SequenceEvent::FrameWritten { index: 3, .. }
        ));
    }

    #[test]
    fn multi_sink_fans_out_to_interested_sinks() {
        let mut multi = MultiSink::with_sinks(vec![
            VecSink::new(),
            VecSink::only(&[SequenceEventKind::StopRequested]),
        ]);
        assert!(multi.wants(SequenceEventKind::Warning));
        multi.send(warning("msg"));
        multi.send(SequenceEvent::StopRequested { next_frame: 2 });
        let sinks = multi.into_inner();
        assert_eq!(sinks[0].len(), 2);
        assert_eq!(sinks[1].len(), 1);
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("msg"));
        assert_eq!(count, 1);
    }
}
