//! Quadrature rules for the attribution path integral.
//!
//! Both rules produce interpolation coefficients in `[0, 1]` together with
//! weights summing to 1, so a weighted sum of gradients approximates the
//! mean gradient along the straight-line path.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, Result};

/// Iteration cap for the Legendre root solver. Convergence from the
/// Chebyshev initial guess takes a handful of iterations in practice.
const MAX_NEWTON_ITERS: usize = 100;
const NEWTON_TOL: f64 = 1e-14;

/// Rule for placing integration points along the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuadratureRule {
    /// Evenly spaced midpoint coefficients with equal weights.
    Uniform,
    /// Gauss-Legendre nodes and weights rescaled to `[0, 1]`.
    GaussLegendre,
}

impl QuadratureRule {
    /// Compute `steps` interpolation coefficients in `[0, 1]` and their
    /// quadrature weights.
    ///
    /// Weights sum to 1 for both rules.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NonPositiveSteps`] when `steps == 0`.
    pub fn nodes_and_weights(self, steps: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        if steps == 0 {
            return Err(ArgumentError::NonPositiveSteps(0).into());
        }

        match self {
            Self::Uniform => {
                let n = steps as f64;
                let nodes = (0..steps).map(|i| (i as f64 + 0.5) / n).collect();
                let weights = vec![1.0 / n; steps];
                Ok((nodes, weights))
            }
            Self::GaussLegendre => {
                let (nodes, weights) = gauss_legendre(steps);
                // Affine map [-1, 1] -> [0, 1] halves the interval length.
                let nodes = nodes.into_iter().map(|x| 0.5 * (x + 1.0)).collect();
                let weights = weights.into_iter().map(|w| 0.5 * w).collect();
                Ok((nodes, weights))
            }
        }
    }
}

impl std::fmt::Display for QuadratureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::GaussLegendre => write!(f, "gauss-legendre"),
        }
    }
}

impl FromStr for QuadratureRule {
    type Err = ArgumentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "uniform" => Ok(Self::Uniform),
            "gausslegendre" => Ok(Self::GaussLegendre),
            _ => Err(ArgumentError::UnknownRule(s.to_string())),
        }
    }
}

/// Gauss-Legendre nodes and weights on `[-1, 1]`.
///
/// Roots of the degree-`n` Legendre polynomial found by Newton iteration on
/// the three-term recurrence; symmetric pairs are filled from one half.
fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let half = n.div_ceil(2);

    for i in 0..half {
        // Chebyshev approximation of the i-th largest root.
        let mut x = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut deriv = 0.0;

        for _ in 0..MAX_NEWTON_ITERS {
            let mut p_curr = 1.0;
            let mut p_prev = 0.0;
            for j in 0..n {
                let p_prev2 = p_prev;
                p_prev = p_curr;
                p_curr =
                    ((2 * j + 1) as f64 * x * p_prev - j as f64 * p_prev2) / (j + 1) as f64;
            }
            // Derivative from P_n and P_{n-1}; roots are interior, so the
            // denominator never vanishes.
            deriv = n as f64 * (x * p_curr - p_prev) / (x * x - 1.0);
            let dx = p_curr / deriv;
            x -= dx;
            if dx.abs() <= NEWTON_TOL {
                break;
            }
        }

        let w = 2.0 / ((1.0 - x * x) * deriv * deriv);
        nodes[i] = -x;
        nodes[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }

    (nodes, weights)
}
