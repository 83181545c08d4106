//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, TIFF, BMP, GIF) | `image::load_from_memory` (format sniffed) |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Scale | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |
//! | Encode → WebP | `WebPEncoder::new_lossless` (quality ignored) |
//! | Encode → PNG, BMP, TIFF, GIF | `DynamicImage::write_to` (quality ignored) |
//! | Properties | EXIF via `img_parts`, see [`exif`](super::exif) |
//!
//! Rotation is limited to quarter turns; any other angle is reported as
//! [`CodecError::Unsupported`].

use super::backend::{CodecError, Dimensions, ImageCodec, ImageProperties};
use super::exif;
use super::params::Quality;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Output formats accepted by [`RustCodec::encode`], keyed by request string.
const OUTPUT_FORMATS: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpeg", ImageFormat::Jpeg),
    ("jpg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("avif", ImageFormat::Avif),
    ("bmp", ImageFormat::Bmp),
    ("tiff", ImageFormat::Tiff),
    ("tif", ImageFormat::Tiff),
    ("gif", ImageFormat::Gif),
];

/// Returns the format strings this codec can encode.
pub fn supported_output_formats() -> impl Iterator<Item = &'static str> {
    OUTPUT_FORMATS.iter().map(|(name, _)| *name)
}

fn output_format(format: &str) -> Result<ImageFormat, CodecError> {
    let wanted = format.trim().to_lowercase();
    OUTPUT_FORMATS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| CodecError::Unsupported(format!("output format \"{format}\"")))
}

/// Resampling filter for [`ImageCodec::scale`].
const SCALE_FILTER: FilterType = FilterType::Lanczos3;

/// Codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Encoder quality as the `u8` the `image` encoders expect (1-100).
fn encoder_quality(quality: Quality) -> u8 {
    quality.value().clamp(1, 100) as u8
}

impl ImageCodec for RustCodec {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn rotate(&self, image: DynamicImage, degrees: i32) -> Result<DynamicImage, CodecError> {
        match degrees.rem_euclid(360) {
            0 => Ok(image),
            90 => Ok(image.rotate90()),
            180 => Ok(image.rotate180()),
            270 => Ok(image.rotate270()),
            _ => Err(CodecError::Unsupported(format!(
                "rotation by {degrees} degrees (quarter turns only)"
            ))),
        }
    }

    fn scale(
        &self,
        image: DynamicImage,
        x_scale: f64,
        y_scale: f64,
    ) -> Result<DynamicImage, CodecError> {
        let width = (image.width() as f64 * x_scale).round();
        let height = (image.height() as f64 * y_scale).round();

        if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
            return Err(CodecError::ProcessingFailed(format!(
                "scaling {}x{} by {x_scale}x{y_scale} leaves no pixels",
                image.width(),
                image.height()
            )));
        }

        let (width, height) = (width as u32, height as u32);
        if width == image.width() && height == image.height() {
            return Ok(image);
        }
        Ok(image.resize_exact(width, height, SCALE_FILTER))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: &str,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let fmt = output_format(format)?;
        let mut buf = Vec::new();

        let result = match fmt {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let encoder = JpegEncoder::new_with_quality(&mut buf, encoder_quality(quality));
                DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
            }
            ImageFormat::Avif => {
                let encoder =
                    AvifEncoder::new_with_speed_quality(&mut buf, 6, encoder_quality(quality));
                image.write_with_encoder(encoder)
            }
            ImageFormat::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut buf);
                DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)
            }
            other => image.write_to(&mut Cursor::new(&mut buf), other),
        };

        result.map_err(|e| CodecError::Encode(format!("{format}: {e}")))?;
        Ok(buf)
    }

    fn read_properties(&self, bytes: &[u8]) -> Result<ImageProperties, CodecError> {
        Ok(ImageProperties {
            exif: exif::read_exif(bytes)?,
        })
    }

    fn write_properties(
        &self,
        path: &Path,
        properties: &ImageProperties,
    ) -> Result<(), CodecError> {
        // Nothing carried over: leave the file as encoded
        let Some(payload) = properties.exif.as_deref() else {
            return Ok(());
        };
        let encoded = std::fs::read(path)?;
        let updated = exif::embed_exif(&encoded, payload)?;
        std::fs::write(path, updated)?;
        Ok(())
    }
}
