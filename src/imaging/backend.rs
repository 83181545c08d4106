//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the opaque pixel layer: decode, rotate,
//! scale, encode, and the property read/write pair used for metadata
//! carry-over. The resize pipeline only ever talks to this trait.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.

use super::params::Quality;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Intrinsic pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Embeddable metadata read from one encoded image and written onto another.
///
/// `exif` is the raw TIFF-structured EXIF payload (starting at the `II`/`MM`
/// byte-order mark), without any container framing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageProperties {
    pub exif: Option<Vec<u8>>,
}

impl ImageProperties {
    pub fn is_empty(&self) -> bool {
        self.exif.is_none()
    }
}

/// Trait for image codecs.
///
/// `Image` is the codec's decoded pixel buffer. It is owned by the caller
/// between stages and released when dropped.
pub trait ImageCodec {
    type Image;

    /// Decode encoded bytes (format sniffed from content).
    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, CodecError>;

    /// Pixel size of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Rotate clockwise by `degrees`.
    fn rotate(&self, image: Self::Image, degrees: i32) -> Result<Self::Image, CodecError>;

    /// Scale each axis by its factor.
    fn scale(&self, image: Self::Image, x_scale: f64, y_scale: f64)
    -> Result<Self::Image, CodecError>;

    /// Encode to `format` (e.g. `"png"`, `"jpeg"`, `"webp"`).
    fn encode(
        &self,
        image: &Self::Image,
        format: &str,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;

    /// Read every known embedded property from encoded bytes.
    fn read_properties(&self, bytes: &[u8]) -> Result<ImageProperties, CodecError>;

    /// Overwrite the properties of the encoded file at `path`.
    fn write_properties(&self, path: &Path, properties: &ImageProperties)
    -> Result<(), CodecError>;
}
