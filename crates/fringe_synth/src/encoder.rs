//! Hand-off of a finished frame directory to an external video encoder.
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Everything the encoder needs to assemble one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub frame_dir: PathBuf,
    /// printf-style frame filename pattern, e.g. `frame%03d.png`.
    pub pattern: String,
    pub fps: u32,
    pub output: PathBuf,
}

/// External encoder collaborator. Success or failure is all the caller observes.
pub trait VideoEncoder {
    fn encode(&mut self, request: &EncodeRequest) -> Result<()>;
}

/// Encodes through an `ffmpeg` executable using H.264 in a yuv420p stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegEncoder {
    pub program: OsString,
    pub codec: String,
    pub pixel_format: String,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: "ffmpeg".into(),
            codec: "libx264".into(),
            pixel_format: "yuv420p".into(),
        }
    }
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Command-line arguments for `request`.
    pub fn args(&self, request: &EncodeRequest) -> Vec<OsString> {
        let input = request.frame_dir.join(&request.pattern);
        vec![
            "-framerate".into(),
            request.fps.to_string().into(),
            "-i".into(),
            input.into_os_string(),
            "-c:v".into(),
            self.codec.clone().into(),
            "-pix_fmt".into(),
            self.pixel_format.clone().into(),
            request.output.clone().into_os_string(),
            "-y".into(),
        ]
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(&mut self, request: &EncodeRequest) -> Result<()> {
        let args = self.args(request);
        info!(
            "Encoding '{}' at {} fps into '{}'.",
            request.frame_dir.join(&request.pattern).display(),
            request.fps,
            request.output.display()
        );
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Encoder {
                status: None,
                message: format!("failed to start {:?}: {e}", self.program),
            })?;

        if output.status.success() {
            debug!("Encoder finished: {}", output.status);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        Err(Error::Encoder {
            status: output.status.code(),
            message: tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
        })
    }
}
