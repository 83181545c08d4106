//! The resize pipeline.
//!
//! One call takes one source image through:
//!
//! ```text
//! prepare working copy -> decode -> resolve geometry
//!     -> rotate -> scale -> encode -> write
//!     -> carry metadata (optional) -> finalize (optional relocation)
//! ```
//!
//! ## Failure policy
//!
//! Failing to obtain or decode the source, and degenerate source dimensions,
//! abort the call with a [`ResizeError`]. So do filesystem failures while
//! finalizing the output.
//!
//! Everything between geometry and finalize is best-effort: a failing stage is
//! logged at `error`, recorded in [`ResizeOutcome::failures`], and the call
//! still returns a record. Such a record may describe an empty or stale file,
//! which is why callers should check [`ResizeOutcome::is_degraded`].

use crate::cache::CacheManager;
use crate::imaging::{
    CodecError, FitMode, GeometryError, ImageCodec, Quality, carry_properties, get_dimensions,
    plan_render, render, resolve_geometry,
};
use crate::types::{ResizeOutcome, ResultRecord, Stage, StageFailure};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info};

/// Output format used when a request names none.
pub const DEFAULT_FORMAT: &str = "jpeg";

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode source: {0}")]
    Decode(#[source] CodecError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Parameters for a single resize call.
///
/// A zero target on either axis means "keep the source size".
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    /// `file://` URI or plain path.
    pub source_ref: String,
    pub target_width: u32,
    pub target_height: u32,
    pub format: String,
    pub quality: Quality,
    pub fit_mode: FitMode,
    pub only_scale_down: bool,
    /// Clockwise, applied before scaling. Quarter turns swap the reported
    /// width and height.
    pub rotation_degrees: i32,
    /// Copy the result here and report that copy.
    pub output_dir: Option<PathBuf>,
    pub preserve_metadata: bool,
}

impl ResizeRequest {
    pub fn new(source_ref: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            target_width: 0,
            target_height: 0,
            format: DEFAULT_FORMAT.to_string(),
            quality: Quality::default(),
            fit_mode: FitMode::default(),
            only_scale_down: false,
            rotation_degrees: 0,
            output_dir: None,
            preserve_metadata: false,
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Quality::new(quality);
        self
    }

    pub fn fit_mode(mut self, mode: impl Into<FitMode>) -> Self {
        self.fit_mode = mode.into();
        self
    }

    pub fn only_scale_down(mut self, only_scale_down: bool) -> Self {
        self.only_scale_down = only_scale_down;
        self
    }

    pub fn rotation(mut self, degrees: i32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn preserve_metadata(mut self, preserve: bool) -> Self {
        self.preserve_metadata = preserve;
        self
    }
}

/// Runs resize requests against one codec and one cache root.
pub struct Resizer<C: ImageCodec> {
    codec: C,
    cache: CacheManager,
}

impl<C: ImageCodec> Resizer<C> {
    pub fn new(codec: C, cache: CacheManager) -> Self {
        Self { codec, cache }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn resize(&self, request: &ResizeRequest) -> Result<ResizeOutcome, ResizeError> {
        let working = self.cache.prepare_working_copy(&request.source_ref)?;
        let source_bytes = working.read()?;

        let image = self
            .codec
            .decode(&source_bytes)
            .map_err(ResizeError::Decode)?;
        let source = get_dimensions(&self.codec, &image);
        let geometry = resolve_geometry(
            source,
            (request.target_width, request.target_height),
            request.fit_mode,
            request.only_scale_down,
        )?;
        debug!(
            source_width = source.width,
            source_height = source.height,
            final_width = geometry.final_width,
            final_height = geometry.final_height,
            mode = %request.fit_mode,
            "resolved geometry"
        );

        let output_path = self
            .cache
            .allocate_output_path(&request.source_ref, &request.format);
        let mut failures = Vec::new();

        let params = plan_render(
            &geometry,
            request.rotation_degrees,
            &request.format,
            request.quality,
        );
        let encoded = match render(&self.codec, image, &params) {
            Ok(bytes) => {
                if let Err(e) = self.cache.write_output(&output_path, &bytes) {
                    note_failure(&mut failures, Stage::Write, e);
                }
                bytes
            }
            Err(e) => {
                note_failure(&mut failures, e.stage, e.source);
                Vec::new()
            }
        };
        let base64 = STANDARD.encode(&encoded);

        if request.preserve_metadata {
            if let Err(e) = carry_properties(&self.codec, &source_bytes, &output_path) {
                note_failure(&mut failures, e.stage, e.source);
            }
        }

        let oriented = geometry.rotated(request.rotation_degrees);
        let finalized =
            self.cache
                .finalize(&output_path, &request.format, request.output_dir.as_deref())?;

        let record = ResultRecord {
            path: finalized.location.path().display().to_string(),
            uri: finalized.uri,
            size: finalized.size,
            name: finalized.name,
            width: oriented.final_width,
            height: oriented.final_height,
            base64,
        };
        info!(
            path = %record.path,
            width = record.width,
            height = record.height,
            size = record.size,
            degraded = !failures.is_empty(),
            "resize complete"
        );

        Ok(ResizeOutcome { record, failures })
    }
}

fn note_failure(failures: &mut Vec<StageFailure>, stage: Stage, err: impl fmt::Display) {
    let message = err.to_string();
    error!(%stage, error = %message, "resize stage failed");
    failures.push(StageFailure { stage, message });
}
