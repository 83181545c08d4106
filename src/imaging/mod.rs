//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` (format sniffed from content) |
//! | **Rotate** | `rotate90` / `rotate180` / `rotate270` (quarter turns only) |
//! | **Scale** | `resize_exact` with Lanczos3 |
//! | **Encode** | per-format encoders: JPEG and AVIF take quality, PNG/WebP are lossless |
//! | **EXIF carry-over** | `img_parts` (JPEG APP1, PNG `eXIf`, WebP `EXIF`) |
//!
//! The module is split into:
//! - **Calculations**: Pure geometry (unit testable, no I/O)
//! - **Parameters**: Quality, fit mode, render parameters
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: High-level functions combining calculations + codec

pub mod backend;
mod calculations;
pub mod exif;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, Dimensions, ImageCodec, ImageProperties};
pub use calculations::{GeometryError, ResolvedGeometry, resolve_geometry};
pub use operations::{StageError, carry_properties, get_dimensions, plan_render, render};
pub use params::{FitMode, Quality, RenderParams};
pub use rust_backend::{RustCodec, supported_output_formats};
