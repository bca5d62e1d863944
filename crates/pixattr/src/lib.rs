//! # pixattr
//!
//! Pixel attribution maps for image classifiers in Rust.
//!
//! pixattr explains a trained classifier's predictions by attributing its
//! per-class scores back to input pixels:
//!
//! - **Integrated Gradients**: path-integral attribution with uniform or
//!   Gauss-Legendre quadrature and a per-instance completeness diagnostic
//! - **Input × Gradient**: single-pass saliency
//! - **Gradient oracles**: autodiff-backed or finite-difference, behind one
//!   trait, so the model stays an externally owned dependency
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixattr::prelude::*;
//!
//! // The trained model is injected through the oracle; pixattr never owns it.
//! let oracle = AutodiffOracle::new(model);
//!
//! let config = IntegratedGradientsConfig::new()
//!     .with_steps(100)
//!     .with_rule(QuadratureRule::GaussLegendre);
//! let explanation = integrated_gradients(&images, None, predicted_class, &oracle, &config)?;
//!
//! // Per-pixel heatmap for overlays, plus the completeness diagnostic.
//! let heatmap = explanation.attributions.pixel_map();
//! println!("max |delta| = {}", explanation.max_abs_delta());
//! ```
//!
//! ## Feature Flags
//!
//! - `backend-ndarray` (default): CPU backend using ndarray
//! - `backend-wgpu`: GPU backend using WGPU

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export member crates
pub use pixattr_core as core;
pub use pixattr_explain as explain;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use pixattr::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use pixattr_core::{ImageClassificationModel, ImageShape};

    // Attribution
    pub use pixattr_explain::{
        input_gradient, integrated_gradients, random_baseline, zero_baseline, ArgumentError,
        AttributionMap, AttributionMethod, AutodiffOracle, Explanation, ExplainError,
        FiniteDifferenceOracle, GradientOracle, IntegratedGradientsConfig, QuadratureRule, Result,
    };
}
