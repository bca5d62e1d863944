//! Gradient oracles.
//!
//! The attribution engine never differentiates a model itself; it queries a
//! [`GradientOracle`] for scores and input gradients at arbitrary points.
//! Any differentiation strategy fits behind this seam: reverse-mode autodiff
//! ([`AutodiffOracle`]) or numerical differentiation
//! ([`FiniteDifferenceOracle`]).

use std::marker::PhantomData;

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::TensorData;
use rayon::prelude::*;

use pixattr_core::{ImageClassificationModel, ImageShape};

use crate::error::{ArgumentError, ExplainError, Result};

/// Scoring and input-gradient queries against an externally owned model.
pub trait GradientOracle<B: Backend> {
    /// Per-class scores at `x`, shape (batch, n_classes).
    fn scores(&self, x: &Tensor<B, 4>) -> Result<Tensor<B, 2>>;

    /// Gradient of the target-class score with respect to `x`, same shape
    /// as `x`.
    ///
    /// # Errors
    ///
    /// Implementations report failures through [`ExplainError`]; the engine
    /// propagates them to the caller without retrying.
    fn gradient(&self, x: &Tensor<B, 4>, target: usize) -> Result<Tensor<B, 4>>;
}

/// Gradient oracle backed by reverse-mode automatic differentiation.
///
/// Wraps an [`ImageClassificationModel`] running on an autodiff backend and
/// exposes scores and gradients on the inner (non-tracking) backend, so the
/// engine's tensors never carry autodiff state.
///
/// # Example
///
/// ```rust,ignore
/// use burn_autodiff::Autodiff;
/// use burn_ndarray::NdArray;
/// use pixattr_explain::AutodiffOracle;
///
/// let oracle = AutodiffOracle::<Autodiff<NdArray>, _>::new(model);
/// let grads = oracle.gradient(&input, target)?;
/// ```
pub struct AutodiffOracle<AB, M> {
    model: M,
    _backend: PhantomData<AB>,
}

impl<AB, M> AutodiffOracle<AB, M>
where
    AB: AutodiffBackend,
    M: ImageClassificationModel<AB>,
{
    /// Create an oracle around a model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            _backend: PhantomData,
        }
    }

    /// Get a reference to the wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consume self and return the wrapped model.
    pub fn into_model(self) -> M {
        self.model
    }
}

impl<AB, M> GradientOracle<AB::InnerBackend> for AutodiffOracle<AB, M>
where
    AB: AutodiffBackend,
    M: ImageClassificationModel<AB>,
{
    fn scores(&self, x: &Tensor<AB::InnerBackend, 4>) -> Result<Tensor<AB::InnerBackend, 2>> {
        let x = Tensor::<AB, 4>::from_inner(x.clone());
        Ok(self.model.forward(x).inner())
    }

    fn gradient(
        &self,
        x: &Tensor<AB::InnerBackend, 4>,
        target: usize,
    ) -> Result<Tensor<AB::InnerBackend, 4>> {
        let x = Tensor::<AB, 4>::from_inner(x.clone()).require_grad();
        let scores = self.model.forward(x.clone());
        let [batch, n_classes] = scores.dims();
        if target >= n_classes {
            return Err(ArgumentError::TargetOutOfRange { target, n_classes }.into());
        }

        // Samples are scored independently, so summing the target column
        // over the batch yields each sample's own gradient.
        let selected = scores.slice([0..batch, target..target + 1]).sum();
        let grads = selected.backward();
        x.grad(&grads)
            .ok_or_else(|| ExplainError::Oracle("input gradient was not produced".to_string()))
    }
}

/// Gradient oracle using central finite differences.
///
/// Perturbs every input element by `epsilon` in both directions and
/// re-scores. Costly (two forward passes per element) but requires nothing
/// from the model beyond a scoring closure; the per-element loop runs as a
/// rayon parallel map.
pub struct FiniteDifferenceOracle<B: Backend, F> {
    score_fn: F,
    epsilon: f64,
    _backend: PhantomData<B>,
}

impl<B, F> FiniteDifferenceOracle<B, F>
where
    B: Backend,
    F: Fn(&Tensor<B, 4>) -> Tensor<B, 2> + Sync,
{
    /// Create an oracle around a scoring closure with the default epsilon.
    pub fn new(score_fn: F) -> Self {
        Self {
            score_fn,
            epsilon: 1e-3,
            _backend: PhantomData,
        }
    }

    /// Set the perturbation half-width.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    fn score_at(
        &self,
        values: Vec<f32>,
        dims: [usize; 4],
        device: &B::Device,
        sample: usize,
        target: usize,
    ) -> f32 {
        let x = Tensor::<B, 4>::from_data(TensorData::new(values, dims), device);
        let scores = (self.score_fn)(&x);
        scores
            .slice([sample..sample + 1, target..target + 1])
            .into_scalar()
            .elem()
    }
}

impl<B, F> GradientOracle<B> for FiniteDifferenceOracle<B, F>
where
    B: Backend,
    F: Fn(&Tensor<B, 4>) -> Tensor<B, 2> + Sync,
{
    fn scores(&self, x: &Tensor<B, 4>) -> Result<Tensor<B, 2>> {
        Ok((self.score_fn)(x))
    }

    fn gradient(&self, x: &Tensor<B, 4>, target: usize) -> Result<Tensor<B, 4>> {
        let dims = x.dims();
        let device = x.device();
        let instance_numel = ImageShape::from(dims).instance_numel();
        let flat = tensor_to_vec(x)?;

        let [_, n_classes] = (self.score_fn)(x).dims();
        if target >= n_classes {
            return Err(ArgumentError::TargetOutOfRange { target, n_classes }.into());
        }

        let eps = self.epsilon;
        let grad: Vec<f32> = (0..flat.len())
            .into_par_iter()
            .map(|i| {
                // Perturbing one element only moves its own sample's score.
                let sample = i / instance_numel;

                let mut plus = flat.clone();
                plus[i] += eps as f32;
                let f_plus = self.score_at(plus, dims, &device, sample, target);

                let mut minus = flat.clone();
                minus[i] -= eps as f32;
                let f_minus = self.score_at(minus, dims, &device, sample, target);

                ((f64::from(f_plus) - f64::from(f_minus)) / (2.0 * eps)) as f32
            })
            .collect();

        Ok(Tensor::from_data(TensorData::new(grad, dims), &device))
    }
}

fn tensor_to_vec<B: Backend, const D: usize>(t: &Tensor<B, D>) -> Result<Vec<f32>> {
    t.to_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| ExplainError::Oracle(format!("tensor readback failed: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_autodiff::Autodiff;
    use pixattr_core::backend::NdArray;

    type AD = Autodiff<NdArray>;

    /// score_0 = sum(w ⊙ x); the input gradient is w.
    struct WeightedSum {
        w: Tensor<AD, 4>,
    }

    impl ImageClassificationModel<AD> for WeightedSum {
        fn forward(&self, x: Tensor<AD, 4>) -> Tensor<AD, 2> {
            let [batch, _, _, _] = x.dims();
            (x * self.w.clone())
                .sum_dim(3)
                .sum_dim(2)
                .sum_dim(1)
                .reshape([batch, 1])
        }
    }

    fn to_vec(t: &Tensor<NdArray, 4>) -> Vec<f32> {
        t.to_data().to_vec().unwrap()
    }

    #[test]
    fn test_autodiff_oracle_gradient_of_linear_score() {
        let device = Default::default();
        let w_values = [0.5f32, -1.0, 2.0, 0.25];
        let w = Tensor::<AD, 1>::from_floats(w_values, &device).reshape([1, 1, 2, 2]);
        let oracle = AutodiffOracle::new(WeightedSum { w });

        let x = Tensor::<NdArray, 4>::ones([1, 1, 2, 2], &device);
        let grad = oracle.gradient(&x, 0).unwrap();

        assert_eq!(grad.dims(), [1, 1, 2, 2]);
        for (got, expected) in to_vec(&grad).iter().zip(w_values.iter()) {
            assert!((got - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_autodiff_oracle_scores() {
        let device = Default::default();
        let w = Tensor::<AD, 4>::ones([1, 1, 2, 2], &device);
        let oracle = AutodiffOracle::new(WeightedSum { w });

        let x = Tensor::<NdArray, 4>::ones([1, 1, 2, 2], &device) * 2.0;
        let scores = oracle.scores(&x).unwrap();

        assert_eq!(scores.dims(), [1, 1]);
        let value: f32 = scores.into_scalar().elem();
        assert!((value - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_autodiff_oracle_target_out_of_range() {
        let device = Default::default();
        let w = Tensor::<AD, 4>::ones([1, 1, 2, 2], &device);
        let oracle = AutodiffOracle::new(WeightedSum { w });

        let x = Tensor::<NdArray, 4>::ones([1, 1, 2, 2], &device);
        let err = oracle.gradient(&x, 5).unwrap_err();
        assert!(matches!(
            err,
            ExplainError::InvalidArgument(ArgumentError::TargetOutOfRange {
                target: 5,
                n_classes: 1
            })
        ));
    }

    #[test]
    fn test_finite_difference_matches_quadratic_gradient() {
        let device: <NdArray as Backend>::Device = Default::default();

        // score_0 = sum(x^2), gradient 2x.
        let oracle = FiniteDifferenceOracle::new(|x: &Tensor<NdArray, 4>| {
            let [batch, _, _, _] = x.dims();
            (x.clone() * x.clone())
                .sum_dim(3)
                .sum_dim(2)
                .sum_dim(1)
                .reshape([batch, 1])
        });

        let x_values = [1.0f32, -2.0, 0.5, 3.0];
        let x = Tensor::<NdArray, 1>::from_floats(x_values, &device).reshape([1, 1, 2, 2]);
        let grad = oracle.gradient(&x, 0).unwrap();

        for (got, x_i) in to_vec(&grad).iter().zip(x_values.iter()) {
            assert!(
                (got - 2.0 * x_i).abs() < 1e-2,
                "got {got}, expected {}",
                2.0 * x_i
            );
        }
    }

    #[test]
    fn test_finite_difference_batched_gradient() {
        let device: <NdArray as Backend>::Device = Default::default();

        let oracle = FiniteDifferenceOracle::new(|x: &Tensor<NdArray, 4>| {
            let [batch, _, _, _] = x.dims();
            (x.clone() * x.clone())
                .sum_dim(3)
                .sum_dim(2)
                .sum_dim(1)
                .reshape([batch, 1])
        })
        .with_epsilon(1e-2);

        // Two samples with distinct values; gradients must not leak across.
        let x_values = [1.0f32, 2.0, 3.0, 4.0, -1.0, -2.0, -3.0, -4.0];
        let x = Tensor::<NdArray, 1>::from_floats(x_values, &device).reshape([2, 1, 2, 2]);
        let grad = oracle.gradient(&x, 0).unwrap();

        assert_eq!(grad.dims(), [2, 1, 2, 2]);
        for (got, x_i) in to_vec(&grad).iter().zip(x_values.iter()) {
            assert!((got - 2.0 * x_i).abs() < 1e-2);
        }
    }

    #[test]
    fn test_finite_difference_scores_passthrough() {
        let device: <NdArray as Backend>::Device = Default::default();

        let oracle = FiniteDifferenceOracle::new(|x: &Tensor<NdArray, 4>| {
            let [batch, _, _, _] = x.dims();
            x.clone().sum_dim(3).sum_dim(2).sum_dim(1).reshape([batch, 1])
        });

        let x = Tensor::<NdArray, 4>::ones([1, 1, 2, 2], &device);
        let scores = oracle.scores(&x).unwrap();
        let value: f32 = scores.into_scalar().elem();
        assert!((value - 4.0).abs() < 1e-6);
    }
}
