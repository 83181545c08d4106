//! # Image Resizer
//!
//! Resize one raster image into a private cache directory and describe the
//! result. The caller hands over a source (`file://` URI or plain path) plus
//! target size, fit mode, format, quality, rotation and an optional output
//! directory, and gets back a record:
//!
//! ```text
//! { path, uri, size, name, width, height, base64 }
//! ```
//!
//! # Architecture
//!
//! ```text
//! source ──► cache::prepare_working_copy ──► codec decode
//!                                               │
//!            imaging::resolve_geometry ◄────────┘
//!                       │
//!            rotate ──► scale ──► encode ──► cache::write_output
//!                                               │
//!            metadata carry-over (optional) ◄───┘
//!                       │
//!            cache::finalize (optional relocation) ──► ResultRecord
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resize`] | The pipeline: `ResizeRequest`, `Resizer`, the best-effort failure policy |
//! | [`cache`] | Temp-file naming, working copies, output placement and relocation |
//! | [`imaging`] | Geometry, the `ImageCodec` trait, the `image`-crate codec, EXIF carry-over |
//! | [`config`] | `image-resizer.toml` loading, merging and validation |
//! | [`types`] | Result record and stage failures, serialized by the CLI |
//!
//! # Design Decisions
//!
//! ## Best-Effort After Decode
//!
//! Once the source has been decoded and its geometry resolved, a failing
//! rotate, scale, encode, write or metadata step does not abort the call. The
//! record is still produced and the failure is listed alongside it, so a
//! caller that only looks at the record keeps working while one that checks
//! [`types::ResizeOutcome::is_degraded`] can tell.
//!
//! ## Injected Cache Root
//!
//! [`cache::CacheManager`] is constructed with its root directory. Nothing in
//! the library reads a global location, which keeps tests hermetic and lets
//! several resizers share or separate their caches freely.
//!
//! ## Files Are Never Cleaned Up
//!
//! Working copies and outputs accumulate in the cache directory, and a
//! relocated result leaves its cache copy behind. Lifecycle belongs to the
//! caller.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod resize;
pub mod types;
