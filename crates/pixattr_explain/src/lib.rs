//! # pixattr_explain
//!
//! Attribution engine for image classifiers: quadrature rules, gradient
//! oracles, and the integrated-gradients path integral.
//!
//! This crate provides:
//! - [`integrated_gradients`]: path-integral attribution with a
//!   per-instance convergence diagnostic
//! - [`GradientOracle`] with autodiff-backed and finite-difference
//!   implementations
//! - [`QuadratureRule`]: uniform or Gauss-Legendre integration points
//! - [`AttributionMap`]: attribution values with normalization and
//!   reduction utilities
//!
//! ## Example
//!
//! ```rust,ignore
//! use pixattr_explain::{integrated_gradients, AutodiffOracle, IntegratedGradientsConfig};
//!
//! let oracle = AutodiffOracle::new(model);
//! let config = IntegratedGradientsConfig::default();
//! let explanation = integrated_gradients(&input, None, target, &oracle, &config)?;
//! println!("max |delta| = {}", explanation.max_abs_delta());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod attribution;
mod error;
mod integrated;
mod oracle;
mod quadrature;

pub use attribution::{
    input_gradient, random_baseline, zero_baseline, AttributionMap, AttributionMethod,
};
pub use error::{ArgumentError, ExplainError, Result};
pub use integrated::{integrated_gradients, Explanation, IntegratedGradientsConfig};
pub use oracle::{AutodiffOracle, FiniteDifferenceOracle, GradientOracle};
pub use quadrature::QuadratureRule;
