//! Image processing — pure Rust, no external tools.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Fit** | Lanczos3 resize within a bounding box, never enlarging |
//! | **Contain** | Lanczos3 resize centered on a transparent canvas |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{ContainPlacement, calculate_contain_placement, calculate_fit_dimensions};
pub use operations::{FitConfig, create_contain_variant, create_fit_variant, get_dimensions};
pub use params::Quality;
pub use rust_backend::RustBackend;
