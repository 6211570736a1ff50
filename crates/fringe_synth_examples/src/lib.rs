#![forbid(unsafe_code)]

mod support;

pub use support::{init_tracing, load_config_ron, progress_sink, save_frame_png};
