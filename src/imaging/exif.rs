//! EXIF carry-over between encoded containers, via `img_parts`.
//!
//! | Container | Location | Read | Write |
//! |---|---|---|---|
//! | JPEG | APP1 segment with `Exif\0\0` header | yes | yes |
//! | PNG | `eXIf` chunk | yes | yes |
//! | WebP | `EXIF` RIFF chunk | yes | yes |
//!
//! Pixel data is never touched; only the container's metadata slot is
//! replaced. Any other container (BMP, TIFF, GIF, AVIF) carries nothing out
//! and refuses a write.

use super::backend::CodecError;
use img_parts::{DynImage, ImageEXIF};

fn parse(data: &[u8]) -> Result<Option<DynImage>, CodecError> {
    DynImage::from_bytes(data.to_vec().into())
        .map_err(|e| CodecError::ProcessingFailed(format!("reading container: {e}")))
}

/// Extract the EXIF payload from an encoded image.
///
/// Containers without an EXIF slot yield `Ok(None)`.
pub fn read_exif(data: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
    Ok(parse(data)?.and_then(|image| image.exif()).map(|exif| exif.to_vec()))
}

/// Return a copy of `data` with `exif` embedded, replacing any existing EXIF.
pub fn embed_exif(data: &[u8], exif: &[u8]) -> Result<Vec<u8>, CodecError> {
    let Some(mut image) = parse(data)? else {
        return Err(CodecError::Unsupported(
            "EXIF in this container format".to_string(),
        ));
    };
    image.set_exif(Some(exif.to_vec().into()));

    let mut out = Vec::with_capacity(data.len() + exif.len() + 16);
    image.encoder().write_to(&mut out)?;
    Ok(out)
}
