//! Pure calculation functions for output geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::FitMode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("source image has degenerate dimensions {width}x{height}")]
    DegenerateSource { width: u32, height: u32 },
    #[error("output size {width}x{height} does not fit in 32-bit dimensions")]
    OutputTooLarge { width: u64, height: u64 },
}

/// Final output size plus the per-axis factors handed to the codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGeometry {
    pub final_width: u32,
    pub final_height: u32,
    pub x_scale: f64,
    pub y_scale: f64,
}

impl ResolvedGeometry {
    /// The same geometry after a clockwise rotation by `degrees`.
    ///
    /// Quarter turns swap the axes, so the factors apply to the rotated image
    /// and the final size is the rotated one. Other angles change nothing.
    pub fn rotated(self, degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 | 270 => Self {
                final_width: self.final_height,
                final_height: self.final_width,
                x_scale: self.y_scale,
                y_scale: self.x_scale,
            },
            _ => self,
        }
    }
}

/// Decimal places kept on scale factors before they reach the codec.
const SCALE_PRECISION: f64 = 100_000.0;

fn round_scale(value: f64) -> f64 {
    (value * SCALE_PRECISION).round() / SCALE_PRECISION
}

/// Calculate the output size for a source image and a requested box.
///
/// # Arguments
/// * `source` - Intrinsic size of the decoded source
/// * `target` - Requested `(width, height)`; a zero on either axis means "keep the source size"
/// * `mode` - Fit policy
/// * `only_scale_down` - Never produce an output larger than the source
///
/// # Examples
/// ```
/// # use image_resizer::imaging::{Dimensions, FitMode, resolve_geometry};
/// let source = Dimensions { width: 1000, height: 500 };
/// let g = resolve_geometry(source, (400, 400), FitMode::Cover, false).unwrap();
/// assert_eq!((g.final_width, g.final_height), (800, 400));
/// assert_eq!(g.x_scale, 0.8);
/// ```
pub fn resolve_geometry(
    source: Dimensions,
    target: (u32, u32),
    mode: FitMode,
    only_scale_down: bool,
) -> Result<ResolvedGeometry, GeometryError> {
    let Dimensions {
        width: src_w,
        height: src_h,
    } = source;
    if src_w == 0 || src_h == 0 {
        return Err(GeometryError::DegenerateSource {
            width: src_w,
            height: src_h,
        });
    }

    let (final_w, final_h) =
        calculate_final_dimensions((src_w, src_h), target, mode, only_scale_down)?;

    Ok(ResolvedGeometry {
        final_width: final_w,
        final_height: final_h,
        x_scale: round_scale(final_w as f64 / src_w as f64),
        y_scale: round_scale(final_h as f64 / src_h as f64),
    })
}

/// Dimension math behind [`resolve_geometry`]. Source axes must be non-zero.
fn calculate_final_dimensions(
    source: (u32, u32),
    target: (u32, u32),
    mode: FitMode,
    only_scale_down: bool,
) -> Result<(u32, u32), GeometryError> {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    // No box requested: keep the source size
    if tgt_w == 0 || tgt_h == 0 {
        return Ok((src_w, src_h));
    }

    match mode {
        FitMode::Stretch => {
            if only_scale_down {
                Ok((tgt_w.min(src_w), tgt_h.min(src_h)))
            } else {
                Ok((tgt_w, tgt_h))
            }
        }
        FitMode::Contain | FitMode::Cover => {
            let width_ratio = tgt_w as f64 / src_w as f64;
            let height_ratio = tgt_h as f64 / src_h as f64;
            let mut ratio = if mode == FitMode::Cover {
                width_ratio.max(height_ratio)
            } else {
                width_ratio.min(height_ratio)
            };
            if only_scale_down {
                ratio = ratio.min(1.0);
            }
            let width = (src_w as f64 * ratio).round();
            let height = (src_h as f64 * ratio).round();
            if width > u32::MAX as f64 || height > u32::MAX as f64 {
                return Err(GeometryError::OutputTooLarge {
                    width: width as u64,
                    height: height as u64,
                });
            }
            Ok((width as u32, height as u32))
        }
    }
}
