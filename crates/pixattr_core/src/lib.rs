//! # pixattr_core
//!
//! Core types and traits for pixattr image attribution.
//!
//! This crate provides:
//! - [`ImageShape`] for image tensor shape metadata
//! - [`ImageClassificationModel`] trait for pluggable scoring models
//! - Error types and common utilities
//!
//! ## Shape Convention
//!
//! Image data follows the convention `(B, C, H, W)`:
//! - `B`: Batch size (number of samples)
//! - `C`: Channels
//! - `H`: Height (pixels)
//! - `W`: Width (pixels)
//!
//! ## Example
//!
//! ```rust
//! use pixattr_core::ImageShape;
//!
//! let shape = ImageShape::new(32, 3, 28, 28); // batch=32, channels=3, 28x28
//! assert_eq!(shape.numel(), 32 * 3 * 28 * 28);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod model;
mod shape;

pub use error::{CoreError, Result};
pub use model::ImageClassificationModel;
pub use shape::ImageShape;

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;

    #[cfg(feature = "backend-wgpu")]
    pub use burn_wgpu::Wgpu;
}
