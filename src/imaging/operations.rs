//! High-level image operations.
//!
//! These functions combine calculations with codec execution. They take a
//! decoded image and resolved geometry, compute parameters, and call the codec.

use super::backend::{CodecError, Dimensions, ImageCodec};
use super::calculations::ResolvedGeometry;
use super::params::{Quality, RenderParams};
use crate::types::Stage;
use std::path::Path;
use thiserror::Error;

/// A codec failure tagged with the render stage it came from.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: CodecError,
}

impl StageError {
    fn at(stage: Stage) -> impl FnOnce(CodecError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Get the intrinsic size of a decoded image.
pub fn get_dimensions<C: ImageCodec>(codec: &C, image: &C::Image) -> Dimensions {
    codec.dimensions(image)
}

/// Plan a render pass without executing it.
///
/// The geometry was computed against the unrotated source. Scaling runs on
/// the rotated image, so quarter turns swap the factors.
pub fn plan_render(
    geometry: &ResolvedGeometry,
    rotation: i32,
    format: &str,
    quality: Quality,
) -> RenderParams {
    let oriented = geometry.rotated(rotation);
    RenderParams {
        rotation,
        x_scale: oriented.x_scale,
        y_scale: oriented.y_scale,
        format: format.to_string(),
        quality,
    }
}

/// Rotate, then scale, then encode.
///
/// Stops at the first failing stage. The decoded image is consumed and
/// released whichever way this returns.
pub fn render<C: ImageCodec>(
    codec: &C,
    image: C::Image,
    params: &RenderParams,
) -> Result<Vec<u8>, StageError> {
    let rotated = codec
        .rotate(image, params.rotation)
        .map_err(StageError::at(Stage::Rotate))?;
    let scaled = codec
        .scale(rotated, params.x_scale, params.y_scale)
        .map_err(StageError::at(Stage::Scale))?;
    codec
        .encode(&scaled, &params.format, params.quality)
        .map_err(StageError::at(Stage::Encode))
}

/// Copy embedded properties from the source bytes onto the file at `output`.
///
/// A source without properties leaves the output untouched.
pub fn carry_properties<C: ImageCodec>(
    codec: &C,
    source_bytes: &[u8],
    output: &Path,
) -> Result<(), StageError> {
    let properties = codec
        .read_properties(source_bytes)
        .map_err(StageError::at(Stage::Metadata))?;
    if properties.is_empty() {
        return Ok(());
    }
    codec
        .write_properties(output, &properties)
        .map_err(StageError::at(Stage::Metadata))
}
