//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Dimensions after scaling `source` down to fit a bounding box.
///
/// Either bound may be absent, in which case only the other constrains the
/// result. The image is never enlarged, and neither side rounds to zero.
///
/// # Examples
/// ```
/// # use sitekit::imaging::calculate_fit_dimensions;
/// // 1024x512 logo limited to 256px tall → 512x256
/// assert_eq!(calculate_fit_dimensions((1024, 512), None, Some(256)), (512, 256));
///
/// // Already small enough: unchanged
/// assert_eq!(calculate_fit_dimensions((800, 600), Some(1600), None), (800, 600));
/// ```
pub fn calculate_fit_dimensions(
    source: (u32, u32),
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let scale_w = max_width.map_or(1.0, |w| w as f64 / src_w as f64);
    let scale_h = max_height.map_or(1.0, |h| h as f64 / src_h as f64);
    let scale = scale_w.min(scale_h).min(1.0);
    if scale >= 1.0 {
        return source;
    }

    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Placement of a source image scaled into an exact canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainPlacement {
    /// Scaled image width.
    pub width: u32,
    /// Scaled image height.
    pub height: u32,
    /// Horizontal offset of the scaled image inside the canvas.
    pub x: u32,
    /// Vertical offset of the scaled image inside the canvas.
    pub y: u32,
}

/// Scale `source` to fit `canvas` (enlarging if needed) and center it.
///
/// The leftover area is padding; the longer side fills the canvas exactly.
pub fn calculate_contain_placement(source: (u32, u32), canvas: (u32, u32)) -> ContainPlacement {
    let (src_w, src_h) = source;
    let (can_w, can_h) = canvas;
    if src_w == 0 || src_h == 0 {
        return ContainPlacement {
            width: can_w,
            height: can_h,
            x: 0,
            y: 0,
        };
    }

    let scale = (can_w as f64 / src_w as f64).min(can_h as f64 / src_h as f64);
    let width = ((src_w as f64 * scale).round() as u32).clamp(1, can_w);
    let height = ((src_h as f64 * scale).round() as u32).clamp(1, can_h);

    ContainPlacement {
        width,
        height,
        x: (can_w - width) / 2,
        y: (can_h - height) / 2,
    }
}
