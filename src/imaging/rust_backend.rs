//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary; no ImageMagick, no sharp.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Contain | resize + `imageops::overlay` onto a transparent `RgbaImage` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (best compression) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//!
//! The `image` crate only ships a lossless WebP encoder, so WebP output
//! ignores the quality setting.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_contain_placement;
use super::params::{ContainParams, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode by output extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encode_err =
        |e: image::ImageError| BackendError::ProcessingFailed(format!("{ext} encode failed: {e}"));

    match ext.as_str() {
        "png" => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder).map_err(encode_err)
        }
        "webp" => {
            let writer = BufWriter::new(File::create(path)?);
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(writer))
                .map_err(encode_err)
        }
        "jpg" | "jpeg" => {
            let writer = BufWriter::new(File::create(path)?);
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
            rgb.write_with_encoder(encoder).map_err(encode_err)
        }
        other => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            other
        ))),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(&resized, &params.output, params.quality.value())
    }

    fn contain(&self, params: &ContainParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let placement = calculate_contain_placement(
            (img.width(), img.height()),
            (params.canvas_width, params.canvas_height),
        );
        let scaled = img
            .resize_exact(placement.width, placement.height, FilterType::Lanczos3)
            .to_rgba8();

        let mut canvas =
            RgbaImage::from_pixel(params.canvas_width, params.canvas_height, Rgba([0, 0, 0, 0]));
        image::imageops::overlay(&mut canvas, &scaled, placement.x as i64, placement.y as i64);

        save_image(
            &DynamicImage::ImageRgba8(canvas),
            &params.output,
            params.quality.value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{GenericImageView, ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create an opaque PNG with the given dimensions.
    fn create_test_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn resize_jpeg_to_webp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("hero-bg.jpg");
        let output = tmp.path().join("hero-bg.webp");
        create_test_jpeg(&source, 400, 200);

        let backend = RustBackend::new();
        backend
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 200,
                height: 100,
                quality: Quality::new(78),
            })
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (200, 100));
    }

    #[test]
    fn resize_png_to_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("logo.png");
        let output = tmp.path().join("logo-small.png");
        create_test_png(&source, 512, 256);

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 128,
                height: 64,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (128, 64));
    }

    #[test]
    fn resize_unsupported_format_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        create_test_jpeg(&source, 10, 10);

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("a.bmp"),
            width: 5,
            height: 5,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.png");
        std::fs::write(&source, b"not an image").unwrap();

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("out.png"),
            width: 5,
            height: 5,
            quality: Quality::default(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn contain_pads_with_transparency() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("logo.png");
        let output = tmp.path().join("favicon-32.png");
        create_test_png(&source, 200, 100);

        RustBackend::new()
            .contain(&ContainParams {
                source,
                output: output.clone(),
                canvas_width: 32,
                canvas_height: 32,
                quality: Quality::default(),
            })
            .unwrap();

        let img = image::open(&output).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
        // Top rows are padding, the middle row is the logo.
        assert_eq!(img.get_pixel(16, 0)[3], 0);
        assert_eq!(img.get_pixel(16, 16)[3], 255);
    }
}
