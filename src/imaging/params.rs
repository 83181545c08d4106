//! Parameter types for image operations.
//!
//! These describe *what* to do, not *how*. They sit between the resize
//! pipeline (which decides the geometry and file placement) and the
//! [`backend`](super::backend) (which does the pixel work), so a mock codec
//! can stand in for the real one without touching pipeline logic.
//!
//! ## Types
//!
//! - [`Quality`]: Encoder quality (0–100, default 80). Clamped on construction.
//! - [`FitMode`]: How a source aspect ratio is reconciled with a target box.
//! - [`RenderParams`]: Everything the codec needs for one rotate → scale → encode pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for encoding (0-100). Meaning is defined by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

/// Policy for fitting the source into the requested box.
///
/// - `Stretch` hits the target exactly and may distort.
/// - `Contain` fits inside the box, preserving aspect ratio.
/// - `Cover` fills the box, preserving aspect ratio; one axis may overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FitMode {
    Stretch,
    #[default]
    Contain,
    Cover,
}

impl FitMode {
    /// Parse a mode string. Anything other than exactly `stretch` or `cover`
    /// is `Contain`.
    pub fn parse(mode: &str) -> Self {
        match mode {
            "stretch" => FitMode::Stretch,
            "cover" => FitMode::Cover,
            _ => FitMode::Contain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Stretch => "stretch",
            FitMode::Contain => "contain",
            FitMode::Cover => "cover",
        }
    }
}

impl From<&str> for FitMode {
    fn from(mode: &str) -> Self {
        Self::parse(mode)
    }
}

impl From<String> for FitMode {
    fn from(mode: String) -> Self {
        Self::parse(&mode)
    }
}

impl From<FitMode> for String {
    fn from(mode: FitMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one rotate → scale → encode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub rotation: i32,
    pub x_scale: f64,
    pub y_scale: f64,
    /// Passed through to the codec untouched; the codec decides what it supports.
    pub format: String,
    pub quality: Quality,
}
