//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a job description, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{ContainParams, Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Bounding box for a fit operation. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitConfig {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Quality,
}

/// Plan a fit operation without executing it.
pub fn plan_fit(
    source: &Path,
    output: &Path,
    original_dims: (u32, u32),
    config: &FitConfig,
) -> ResizeParams {
    let (width, height) =
        calculate_fit_dimensions(original_dims, config.max_width, config.max_height);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Scale `source` down into the bounding box and write `output`.
///
/// Returns the written dimensions.
pub fn create_fit_variant(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &FitConfig,
) -> Result<(u32, u32)> {
    let original = get_dimensions(backend, source)?;
    let params = plan_fit(source, output, original, config);
    backend.resize(&params)?;
    Ok((params.width, params.height))
}

/// Center `source` on a transparent `width` × `height` canvas and write
/// `output`. Returns the canvas dimensions.
pub fn create_contain_variant(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<(u32, u32)> {
    backend.contain(&ContainParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        canvas_width: width,
        canvas_height: height,
        quality,
    })?;
    Ok((width, height))
}
