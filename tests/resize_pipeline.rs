//! End-to-end resize calls through the real `image`-crate codec.
//!
//! Sources are synthesized in-test and written to a temp directory; every
//! output is decoded again to check what actually landed on disk.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use image_resizer::cache::{CacheManager, TEMP_PREFIX};
use image_resizer::imaging::{RustCodec, exif};
use image_resizer::resize::{ResizeError, ResizeRequest, Resizer};
use image_resizer::types::Stage;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Big-endian TIFF header followed by an empty IFD.
const EXIF_PAYLOAD: &[u8] = b"MM\x00\x2a\x00\x00\x00\x08\x00\x00\x00\x00\x00\x00";

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    fn cache_root(&self) -> PathBuf {
        self.tmp.path().join("cache")
    }

    fn resizer(&self) -> Resizer<RustCodec> {
        Resizer::new(RustCodec::new(), CacheManager::new(self.cache_root()))
    }

    fn write_source(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let dir = self.tmp.path().join("source");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    }))
}

fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn jpeg_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, 90);
    image.write_with_encoder(encoder).unwrap();
    buf
}

fn decoded_size(path: &Path) -> (u32, u32) {
    image::load_from_memory(&fs::read(path).unwrap())
        .unwrap()
        .dimensions()
}

fn source_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

// =============================================================================
// Geometry round trips
// =============================================================================

#[test]
fn contain_output_decodes_to_reported_size() {
    let ws = Workspace::new();
    let source = ws.write_source("land.png", &png_bytes(&gradient(400, 300)));

    let request = ResizeRequest::new(source_uri(&source))
        .size(200, 200)
        .format("png");
    let outcome = ws.resizer().resize(&request).unwrap();
    let record = &outcome.record;

    assert!(!outcome.is_degraded());
    assert_eq!((record.width, record.height), (200, 150));
    let path = Path::new(&record.path);
    assert_eq!(decoded_size(path), (200, 150));
    assert_eq!(record.size, fs::metadata(path).unwrap().len());
    assert_eq!(STANDARD.decode(&record.base64).unwrap(), fs::read(path).unwrap());
    assert!(record.name.as_deref().unwrap().starts_with(TEMP_PREFIX));
}

#[test]
fn cover_jpeg_output_decodes_to_reported_size() {
    let ws = Workspace::new();
    let source = ws.write_source("wide.jpg", &jpeg_bytes(&gradient(1000, 500)));

    let request = ResizeRequest::new(source.to_str().unwrap())
        .size(400, 400)
        .fit_mode("cover")
        .format("jpeg")
        .quality(70);
    let outcome = ws.resizer().resize(&request).unwrap();

    assert_eq!((outcome.record.width, outcome.record.height), (800, 400));
    assert_eq!(decoded_size(Path::new(&outcome.record.path)), (800, 400));
}

#[test]
fn only_scale_down_keeps_small_source() {
    let ws = Workspace::new();
    let source = ws.write_source("small.png", &png_bytes(&gradient(80, 60)));

    let request = ResizeRequest::new(source.to_str().unwrap())
        .size(400, 300)
        .only_scale_down(true)
        .format("webp");
    let outcome = ws.resizer().resize(&request).unwrap();

    assert_eq!((outcome.record.width, outcome.record.height), (80, 60));
    assert_eq!(decoded_size(Path::new(&outcome.record.path)), (80, 60));
}

#[test]
fn half_turn_rotation_moves_pixels() {
    let ws = Workspace::new();
    let mut img = RgbImage::from_pixel(6, 4, Rgb([0, 0, 255]));
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    let source = ws.write_source("marker.png", &png_bytes(&DynamicImage::ImageRgb8(img)));

    let request = ResizeRequest::new(source.to_str().unwrap())
        .rotation(180)
        .format("png");
    let outcome = ws.resizer().resize(&request).unwrap();

    let out = image::open(&outcome.record.path).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (6, 4));
    assert_eq!(*out.get_pixel(5, 3), Rgb([255, 0, 0]));
    assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 255]));
}

#[test]
fn quarter_turn_output_decodes_to_reported_size() {
    let ws = Workspace::new();
    let source = ws.write_source("wide.png", &png_bytes(&gradient(400, 200)));

    for (mode, expected) in [("contain", (150, 300)), ("stretch", (300, 300))] {
        let request = ResizeRequest::new(source.to_str().unwrap())
            .size(300, 300)
            .fit_mode(mode)
            .rotation(90)
            .format("png");
        let outcome = ws.resizer().resize(&request).unwrap();

        assert!(!outcome.is_degraded(), "{mode}");
        assert_eq!((outcome.record.width, outcome.record.height), expected, "{mode}");
        assert_eq!(decoded_size(Path::new(&outcome.record.path)), expected, "{mode}");
    }
}

#[test]
fn quarter_turn_moves_the_corner_clockwise() {
    let ws = Workspace::new();
    let mut img = RgbImage::from_pixel(6, 4, Rgb([0, 0, 255]));
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    let source = ws.write_source("marker.png", &png_bytes(&DynamicImage::ImageRgb8(img)));

    let request = ResizeRequest::new(source.to_str().unwrap())
        .rotation(90)
        .format("png");
    let outcome = ws.resizer().resize(&request).unwrap();

    let out = image::open(&outcome.record.path).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (4, 6));
    assert_eq!((outcome.record.width, outcome.record.height), (4, 6));
    // Top-left ends up top-right
    assert_eq!(*out.get_pixel(3, 0), Rgb([255, 0, 0]));
}

// =============================================================================
// File placement
// =============================================================================

#[test]
fn relocated_output_is_reported_and_cache_copy_kept() {
    let ws = Workspace::new();
    let source = ws.write_source("pic.png", &png_bytes(&gradient(50, 50)));
    let out_dir = ws.tmp.path().join("exports");

    let request = ResizeRequest::new(source.to_str().unwrap())
        .size(25, 25)
        .format("png")
        .output_dir(&out_dir);
    let outcome = ws.resizer().resize(&request).unwrap();

    let path = Path::new(&outcome.record.path);
    assert_eq!(path.parent().unwrap(), out_dir);
    assert_eq!(decoded_size(path), (25, 25));
    // Working copy plus the cached output
    assert_eq!(fs::read_dir(ws.cache_root()).unwrap().count(), 2);
}

#[test]
fn resizing_a_cached_output_makes_no_copy() {
    let ws = Workspace::new();
    let source = ws.write_source("pic.png", &png_bytes(&gradient(120, 80)));
    let resizer = ws.resizer();

    let first = resizer
        .resize(&ResizeRequest::new(source.to_str().unwrap()).format("png"))
        .unwrap();
    assert_eq!(fs::read_dir(ws.cache_root()).unwrap().count(), 2);

    let second = resizer
        .resize(
            &ResizeRequest::new(first.record.uri.clone())
                .size(60, 40)
                .format("png"),
        )
        .unwrap();
    assert_eq!(
        Path::new(&second.record.path).parent().unwrap(),
        ws.cache_root()
    );
    // Only the new output was added
    assert_eq!(fs::read_dir(ws.cache_root()).unwrap().count(), 3);
    assert_eq!(decoded_size(Path::new(&second.record.path)), (60, 40));
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn exif_survives_jpeg_to_jpeg() {
    let ws = Workspace::new();
    let tagged = exif::embed_exif(&jpeg_bytes(&gradient(64, 48)), EXIF_PAYLOAD).unwrap();
    let source = ws.write_source("tagged.jpg", &tagged);

    let request = ResizeRequest::new(source.to_str().unwrap())
        .size(32, 24)
        .preserve_metadata(true);
    let outcome = ws.resizer().resize(&request).unwrap();

    assert!(!outcome.is_degraded());
    let written = fs::read(&outcome.record.path).unwrap();
    assert_eq!(exif::read_exif(&written).unwrap().as_deref(), Some(EXIF_PAYLOAD));
    assert_eq!(outcome.record.size, written.len() as u64);
    assert_eq!(decoded_size(Path::new(&outcome.record.path)), (32, 24));
}

#[test]
fn exif_survives_jpeg_to_png() {
    let ws = Workspace::new();
    let tagged = exif::embed_exif(&jpeg_bytes(&gradient(64, 48)), EXIF_PAYLOAD).unwrap();
    let source = ws.write_source("tagged.jpg", &tagged);

    let request = ResizeRequest::new(source.to_str().unwrap())
        .format("png")
        .preserve_metadata(true);
    let outcome = ws.resizer().resize(&request).unwrap();

    let written = fs::read(&outcome.record.path).unwrap();
    assert_eq!(exif::read_exif(&written).unwrap().as_deref(), Some(EXIF_PAYLOAD));
    // base64 reflects the encoder output, before the splice
    assert!(STANDARD.decode(&outcome.record.base64).unwrap().len() < written.len());
}

#[test]
fn exif_survives_jpeg_to_webp() {
    let ws = Workspace::new();
    let tagged = exif::embed_exif(&jpeg_bytes(&gradient(16, 16)), EXIF_PAYLOAD).unwrap();
    let source = ws.write_source("tagged.jpg", &tagged);

    let request = ResizeRequest::new(source.to_str().unwrap())
        .format("webp")
        .preserve_metadata(true);
    let outcome = ws.resizer().resize(&request).unwrap();

    assert!(!outcome.is_degraded());
    let written = fs::read(&outcome.record.path).unwrap();
    assert_eq!(exif::read_exif(&written).unwrap().as_deref(), Some(EXIF_PAYLOAD));
    assert_eq!(outcome.record.size, written.len() as u64);
    assert_eq!(decoded_size(Path::new(&outcome.record.path)), (16, 16));
}

#[test]
fn exif_into_bmp_is_a_recorded_metadata_failure() {
    let ws = Workspace::new();
    let tagged = exif::embed_exif(&jpeg_bytes(&gradient(16, 16)), EXIF_PAYLOAD).unwrap();
    let source = ws.write_source("tagged.jpg", &tagged);

    let request = ResizeRequest::new(source.to_str().unwrap())
        .format("bmp")
        .preserve_metadata(true);
    let outcome = ws.resizer().resize(&request).unwrap();

    assert_eq!(outcome.failed_stages(), vec![Stage::Metadata]);
    // The image itself is intact
    assert_eq!(decoded_size(Path::new(&outcome.record.path)), (16, 16));
}

#[test]
fn untagged_source_with_keep_meta_is_clean() {
    let ws = Workspace::new();
    let source = ws.write_source("plain.png", &png_bytes(&gradient(20, 20)));

    let request = ResizeRequest::new(source.to_str().unwrap())
        .format("webp")
        .preserve_metadata(true);
    let outcome = ws.resizer().resize(&request).unwrap();
    assert!(!outcome.is_degraded());
}

// =============================================================================
// Degraded and failed calls
// =============================================================================

#[test]
fn unsupported_format_yields_empty_degraded_record() {
    let ws = Workspace::new();
    let source = ws.write_source("pic.png", &png_bytes(&gradient(30, 30)));

    let request = ResizeRequest::new(source.to_str().unwrap()).format("heic");
    let outcome = ws.resizer().resize(&request).unwrap();

    assert_eq!(outcome.failed_stages(), vec![Stage::Encode]);
    assert_eq!(outcome.record.size, 0);
    assert!(outcome.record.name.as_deref().unwrap().ends_with(".heic"));
    assert!(Path::new(&outcome.record.path).exists());
}

#[test]
fn odd_angle_rotation_is_a_recorded_failure() {
    let ws = Workspace::new();
    let source = ws.write_source("pic.png", &png_bytes(&gradient(30, 30)));

    let request = ResizeRequest::new(source.to_str().unwrap())
        .rotation(45)
        .format("png");
    let outcome = ws.resizer().resize(&request).unwrap();

    assert_eq!(outcome.failed_stages(), vec![Stage::Rotate]);
    assert_eq!(outcome.record.size, 0);
}

#[test]
fn undecodable_source_is_an_error() {
    let ws = Workspace::new();
    let source = ws.write_source("notes.png", b"definitely not an image");

    let err = ws
        .resizer()
        .resize(&ResizeRequest::new(source.to_str().unwrap()))
        .unwrap_err();
    assert!(matches!(err, ResizeError::Decode(_)));
}
