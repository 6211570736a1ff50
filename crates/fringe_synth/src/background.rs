//! Base frame for every tick: a blank canvas or a fixed background image.
//!
//! The image is decoded once when the provider is built; each call to
//! [`Background::create_background`] hands out a fresh copy. An unreadable image is a
//! recoverable defect: the provider falls back to a blank canvas of the configured
//! resolution and records why.
use std::path::PathBuf;

use glam::UVec2;
use tracing::{debug, warn};

use crate::config::BackgroundSource;
use crate::raster::Frame;

/// Where the background template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundOrigin {
    Blank,
    Image(PathBuf),
    /// The image could not be read; a blank canvas is used instead.
    Fallback { path: PathBuf, reason: String },
}

#[derive(Debug, Clone)]
pub struct Background {
    template: Frame,
    origin: BackgroundOrigin,
}

impl Background {
    /// All-zero background of `resolution`.
    pub fn blank(resolution: UVec2) -> Self {
        Self {
            template: Frame::blank(resolution.x, resolution.y),
            origin: BackgroundOrigin::Blank,
        }
    }

    /// Builds the provider for `source`, falling back to [`Background::blank`] on any
    /// read or decode failure.
    pub fn load(source: &BackgroundSource, resolution: UVec2) -> Self {
        let path = match source {
            BackgroundSource::Blank => return Self::blank(resolution),
            BackgroundSource::Image(path) => path,
        };

        match image::open(path) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                debug!(
                    "Loaded background '{}' ({}x{}).",
                    path.display(),
                    rgb.width(),
                    rgb.height()
                );
                Self {
                    template: Frame::from_image(rgb),
                    origin: BackgroundOrigin::Image(path.clone()),
                }
            }
            Err(e) => {
                warn!(
                    "Background '{}' unreadable ({}); using a blank {}x{} canvas.",
                    path.display(),
                    e,
                    resolution.x,
                    resolution.y
                );
                Self {
                    template: Frame::blank(resolution.x, resolution.y),
                    origin: BackgroundOrigin::Fallback {
                        path: path.clone(),
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Fresh base frame for the next tick.
    pub fn create_background(&self) -> Frame {
        self.template.clone()
    }

    /// Canvas size entities move in.
    pub fn size(&self) -> UVec2 {
        self.template.size()
    }

    pub fn origin(&self) -> &BackgroundOrigin {
        &self.origin
    }
}
