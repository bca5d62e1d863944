//! Integrated Gradients attribution.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use pixattr_core::ImageShape;

use crate::attribution::{AttributionMap, AttributionMethod};
use crate::error::{ArgumentError, Result};
use crate::oracle::GradientOracle;
use crate::quadrature::QuadratureRule;

/// Configuration for Integrated Gradients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegratedGradientsConfig {
    /// Number of integration points along the path.
    pub steps: usize,
    /// Quadrature rule placing the integration points.
    pub rule: QuadratureRule,
}

impl Default for IntegratedGradientsConfig {
    fn default() -> Self {
        Self {
            steps: 50,
            rule: QuadratureRule::GaussLegendre,
        }
    }
}

impl IntegratedGradientsConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of integration steps.
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the quadrature rule.
    #[must_use]
    pub fn with_rule(mut self, rule: QuadratureRule) -> Self {
        self.rule = rule;
        self
    }
}

/// Result of an integrated-gradients explanation.
///
/// Echoes the explained input, baseline, and settings alongside the
/// attribution map so a result remains traceable on its own.
#[derive(Debug, Clone)]
pub struct Explanation<B: Backend> {
    /// Signed attribution values, same shape as the input.
    pub attributions: AttributionMap<B>,
    /// Per-instance completeness diagnostic, shape (batch,):
    /// `score(input) - score(baseline) - sum(attributions)`.
    ///
    /// A large magnitude signals a poor approximation (too few steps, or a
    /// non-smooth scoring function). Diagnostic only, never an error.
    pub convergence_delta: Tensor<B, 1>,
    /// The explained input.
    pub input: Tensor<B, 4>,
    /// The baseline the path started from.
    pub baseline: Tensor<B, 4>,
    /// The attributed class index.
    pub target: usize,
    /// Number of integration points used.
    pub steps: usize,
    /// Quadrature rule used.
    pub rule: QuadratureRule,
}

impl<B: Backend> Explanation<B> {
    /// Largest convergence-delta magnitude across the batch.
    pub fn max_abs_delta(&self) -> f32 {
        self.convergence_delta
            .clone()
            .abs()
            .max()
            .into_scalar()
            .elem()
    }
}

/// Compute Integrated Gradients attribution.
///
/// Integrated Gradients is a path-based attribution method that computes
/// the integral of gradients along a straight line path from a baseline
/// to the input. This satisfies important axioms like sensitivity and
/// implementation invariance; the completeness axiom is surfaced as the
/// per-instance convergence delta.
///
/// Reference: Sundararajan et al., "Axiomatic Attribution for Deep Networks", ICML 2017.
///
/// # Arguments
///
/// * `input` - Model input (batch, channels, height, width)
/// * `baseline` - Reference input of the same shape; `None` uses zeros
/// * `target` - Class index whose score is attributed
/// * `oracle` - Score and input-gradient queries against the model
/// * `config` - Step count and quadrature rule
///
/// # Errors
///
/// Rejects mismatched or empty shapes, `steps == 0`, and a target index
/// beyond the scorer's output width with
/// [`ExplainError::InvalidArgument`](crate::ExplainError::InvalidArgument).
/// Oracle failures propagate unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use pixattr_explain::{integrated_gradients, IntegratedGradientsConfig, QuadratureRule};
///
/// let config = IntegratedGradientsConfig::new().with_steps(100);
/// let explanation = integrated_gradients(&input, None, target, &oracle, &config)?;
/// let heatmap = explanation.attributions.pixel_map();
/// ```
pub fn integrated_gradients<B, O>(
    input: &Tensor<B, 4>,
    baseline: Option<&Tensor<B, 4>>,
    target: usize,
    oracle: &O,
    config: &IntegratedGradientsConfig,
) -> Result<Explanation<B>>
where
    B: Backend,
    O: GradientOracle<B>,
{
    let device = input.device();
    let input_shape = ImageShape::from(input.dims());
    if input_shape.is_empty() {
        return Err(ArgumentError::EmptyShape(input_shape).into());
    }

    let baseline = match baseline {
        Some(b) => {
            let baseline_shape = ImageShape::from(b.dims());
            if baseline_shape != input_shape {
                return Err(ArgumentError::ShapeMismatch {
                    input: input_shape,
                    baseline: baseline_shape,
                }
                .into());
            }
            b.clone()
        }
        None => Tensor::zeros(input.dims(), &device),
    };

    let (nodes, weights) = config.rule.nodes_and_weights(config.steps)?;

    let input_scores = oracle.scores(input)?;
    let [batch, n_classes] = input_scores.dims();
    if target >= n_classes {
        return Err(ArgumentError::TargetOutOfRange { target, n_classes }.into());
    }

    let diff = input.clone() - baseline.clone();

    // Weighted sum of gradients along the path approximates the mean
    // gradient between baseline and input.
    let mut integral = Tensor::<B, 4>::zeros(input.dims(), &device);
    for (&alpha, &weight) in nodes.iter().zip(weights.iter()) {
        let interpolated = baseline.clone() + diff.clone() * (alpha as f32);
        let grads = oracle.gradient(&interpolated, target)?;
        integral = integral + grads * (weight as f32);
    }

    let attributions = diff * integral;

    // Completeness check: attributions should sum to the score difference.
    let baseline_scores = oracle.scores(&baseline)?;
    let score_diff = (input_scores - baseline_scores)
        .slice([0..batch, target..target + 1])
        .reshape([batch]);
    let attribution_sums = attributions
        .clone()
        .sum_dim(3)
        .sum_dim(2)
        .sum_dim(1)
        .reshape([batch]);
    let convergence_delta = score_diff - attribution_sums;

    Ok(Explanation {
        attributions: AttributionMap::new(attributions, AttributionMethod::IntegratedGradients)
            .with_target_class(target),
        convergence_delta,
        input: input.clone(),
        baseline,
        target,
        steps: config.steps,
        rule: config.rule,
    })
}
