//! Frame-sequential generation of a labeled synthetic sequence.
//!
//! Each tick the runner moves every slot (respawning where needed), composites circles
//! then blobs onto a fresh background, post-processes the frame, persists it, and
//! appends the fringe-count vector to the label streams. Frame `n + 1` never starts
//! before frame `n` is persisted.
pub mod events;
pub mod runner;
