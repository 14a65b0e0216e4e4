//! Image variant generation.
//!
//! Stage 1 of the build. Runs every `[[images.jobs]]` entry from `site.toml`
//! against the image directory and records what was produced in an
//! [`ImageManifest`], which the page rewriter later uses for `<img>`
//! upgrades and favicon links.
//!
//! ## Stock jobs
//!
//! ```text
//! img/logo1.png     → logo1-optimized.png   fit, 256px tall        (replace)
//!                   → logo1-optimized.webp  fit, 256px tall        (alternate)
//!                   → favicon-32.png        contain 32×32          (favicon)
//!                   → apple-touch-icon-180.png contain 180×180     (apple-touch-icon)
//! img/hero-bg.jpg   → hero-bg.webp          fit, 1600px wide       (alternate)
//! img/about-bg.jpg, flat-roof-bg.jpg, contact-bg.jpg → same as hero-bg
//! ```
//!
//! Variants are written next to their sources so the `img/` copy in the
//! assembled site carries them. A job whose source is missing is skipped;
//! a source that fails to decode aborts the stage.

use crate::config::{FitMode, ImageJob, ImagesConfig};
use crate::imaging::{
    BackendError, FitConfig, ImageBackend, Quality, RustBackend, create_contain_variant,
    create_fit_variant,
};
use crate::types::{ImageManifest, ImageVariant};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name of the image manifest inside the temp directory.
pub const MANIFEST_FILENAME: &str = "images.json";

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed for {output}: {source}")]
    Imaging {
        output: String,
        #[source]
        source: BackendError,
    },
}

/// A job that produced nothing because its source does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedJob {
    pub source: String,
    pub output: String,
}

/// Outcome of the image stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub manifest: ImageManifest,
    pub skipped: Vec<SkippedJob>,
}

/// Run all image jobs with the production backend.
pub fn prepare_images(root: &Path, config: &ImagesConfig) -> Result<PrepareReport, PrepareError> {
    prepare_with_backend(&RustBackend::new(), root, config)
}

/// Run all image jobs using a specific backend (allows testing with mock).
pub fn prepare_with_backend(
    backend: &impl ImageBackend,
    root: &Path,
    config: &ImagesConfig,
) -> Result<PrepareReport, PrepareError> {
    let image_dir = root.join(&config.dir);
    let mut report = PrepareReport::default();

    for job in &config.jobs {
        let source = image_dir.join(&job.source);
        let output = image_dir.join(&job.output);
        let relative = |name: &str| join_url(&config.dir, name);

        if !source.is_file() {
            debug!(source = %source.display(), "image source missing, job skipped");
            report.skipped.push(SkippedJob {
                source: relative(&job.source),
                output: relative(&job.output),
            });
            continue;
        }

        let (width, height) =
            run_job(backend, job, &source, &output).map_err(|source| PrepareError::Imaging {
                output: relative(&job.output),
                source,
            })?;

        report.manifest.variants.push(ImageVariant {
            source: relative(&job.source),
            output: relative(&job.output),
            width,
            height,
            format: extension_of(&output),
            role: job.role,
        });
    }

    Ok(report)
}

fn run_job(
    backend: &impl ImageBackend,
    job: &ImageJob,
    source: &Path,
    output: &Path,
) -> Result<(u32, u32), BackendError> {
    let quality = Quality::new(job.quality);
    match job.mode {
        FitMode::Fit => create_fit_variant(
            backend,
            source,
            output,
            &FitConfig {
                max_width: job.width,
                max_height: job.height,
                quality,
            },
        ),
        FitMode::Contain => {
            // Validation guarantees both sides for contain jobs.
            let width = job.width.or(job.height).unwrap_or(1);
            let height = job.height.or(job.width).unwrap_or(1);
            create_contain_variant(backend, source, output, width, height, quality)
        }
    }
}

fn join_url(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Path of the manifest inside `temp_dir`.
pub fn manifest_path(temp_dir: &Path) -> PathBuf {
    temp_dir.join(MANIFEST_FILENAME)
}

/// Write the manifest as pretty JSON, creating the temp directory.
pub fn save_manifest(manifest: &ImageManifest, temp_dir: &Path) -> Result<(), PrepareError> {
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(manifest_path(temp_dir), json)?;
    Ok(())
}

/// Read a manifest saved by [`save_manifest`]. A missing file yields an
/// empty manifest so the assembler can run without the image stage.
pub fn load_manifest(temp_dir: &Path) -> Result<ImageManifest, PrepareError> {
    let path = manifest_path(temp_dir);
    if !path.exists() {
        return Ok(ImageManifest::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
