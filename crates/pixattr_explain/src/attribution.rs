//! Attribution map types and simple gradient-based methods.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use pixattr_core::ImageShape;

/// Method used to compute an attribution map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributionMethod {
    /// Input × Gradient.
    InputGradient,
    /// Integrated Gradients.
    IntegratedGradients,
}

/// Attribution map over an image batch.
///
/// Values share the input's `(batch, channels, height, width)` shape; each
/// element estimates that pixel's contribution to the attributed score.
#[derive(Debug, Clone)]
pub struct AttributionMap<B: Backend> {
    /// The attribution values.
    pub values: Tensor<B, 4>,
    /// The method used.
    pub method: AttributionMethod,
    /// Target class (for classification).
    pub target_class: Option<usize>,
}

impl<B: Backend> AttributionMap<B> {
    /// Create a new attribution map.
    pub fn new(values: Tensor<B, 4>, method: AttributionMethod) -> Self {
        Self {
            values,
            method,
            target_class: None,
        }
    }

    /// Set the target class.
    #[must_use]
    pub fn with_target_class(mut self, class: usize) -> Self {
        self.target_class = Some(class);
        self
    }

    /// Get the shape of the attribution map.
    pub fn shape(&self) -> ImageShape {
        ImageShape::from(self.values.dims())
    }

    /// Replace attributions by their magnitudes.
    pub fn abs(&self) -> Self {
        Self {
            values: self.values.clone().abs(),
            method: self.method,
            target_class: self.target_class,
        }
    }

    /// Normalize the attribution values to [0, 1].
    pub fn normalize(&self) -> Self {
        let min_val: f32 = self.values.clone().min().into_scalar().elem();
        let max_val: f32 = self.values.clone().max().into_scalar().elem();
        let range = max_val - min_val;

        // Avoid division by zero
        let normalized = if range > 1e-8 {
            (self.values.clone() - min_val) / range
        } else {
            self.values.clone()
        };

        Self {
            values: normalized,
            method: self.method,
            target_class: self.target_class,
        }
    }

    /// Get the mean attribution per channel.
    /// Returns tensor of shape (batch, channels, 1, 1) - mean over pixels.
    pub fn mean_per_channel(&self) -> Tensor<B, 4> {
        self.values.clone().mean_dim(3).mean_dim(2)
    }

    /// Collapse channels into a single per-pixel map.
    /// Returns tensor of shape (batch, 1, height, width), the usual input
    /// to heatmap overlays.
    pub fn pixel_map(&self) -> Tensor<B, 4> {
        self.values.clone().mean_dim(1)
    }
}

/// Compute Input × Gradient attribution.
///
/// # Arguments
///
/// * `input` - Model input (batch, channels, height, width)
/// * `gradients` - Gradients w.r.t. input, same shape
///
/// # Returns
///
/// Magnitude attribution map of the input's shape.
pub fn input_gradient<B: Backend>(
    input: Tensor<B, 4>,
    gradients: Tensor<B, 4>,
) -> AttributionMap<B> {
    let attribution = input * gradients;
    AttributionMap::new(attribution.abs(), AttributionMethod::InputGradient)
}

/// Create a zero baseline.
///
/// The all-zero tensor is the conventional "absence of signal" reference
/// for normalized image data.
pub fn zero_baseline<B: Backend>(shape: [usize; 4], device: &B::Device) -> Tensor<B, 4> {
    Tensor::zeros(shape, device)
}

/// Create a random baseline sampled from a standard normal.
///
/// Matches typical data normalization; averaging explanations over several
/// random baselines reduces baseline sensitivity.
pub fn random_baseline<B: Backend>(shape: [usize; 4], device: &B::Device) -> Tensor<B, 4> {
    Tensor::random(shape, burn::tensor::Distribution::Normal(0.0, 1.0), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixattr_core::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_attribution_map_shape() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 4>::zeros([2, 3, 8, 8], &device);
        let map = AttributionMap::new(values, AttributionMethod::InputGradient);

        assert_eq!(map.shape(), ImageShape::new(2, 3, 8, 8));
        assert_eq!(map.method, AttributionMethod::InputGradient);
        assert!(map.target_class.is_none());
    }

    #[test]
    fn test_attribution_map_with_target_class() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 4>::zeros([2, 3, 8, 8], &device);
        let map =
            AttributionMap::new(values, AttributionMethod::IntegratedGradients).with_target_class(5);

        assert_eq!(map.target_class, Some(5));
    }

    #[test]
    fn test_attribution_map_abs() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 1>::from_floats([-1.0f32, 2.0, -3.0, 4.0], &device)
            .reshape([1, 1, 2, 2]);
        let map = AttributionMap::new(values, AttributionMethod::IntegratedGradients);

        let abs_values: Vec<f32> = map.abs().values.into_data().to_vec().unwrap();
        assert_eq!(abs_values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_attribution_map_normalize() {
        let device = Default::default();
        // Known range [0, 10)
        let data: Vec<f32> = (0..60).map(|i| i as f32 / 6.0).collect();
        let values =
            Tensor::<TestBackend, 1>::from_floats(data.as_slice(), &device).reshape([2, 3, 2, 5]);
        let map = AttributionMap::new(values, AttributionMethod::InputGradient);

        let normalized = map.normalize();
        let norm_vals = normalized.values;

        let min: f32 = norm_vals.clone().min().into_scalar().elem();
        let max: f32 = norm_vals.max().into_scalar().elem();

        assert!(min >= 0.0 - 1e-6);
        assert!(max <= 1.0 + 1e-6);
    }

    #[test]
    fn test_input_gradient() {
        let device = Default::default();
        let input = Tensor::<TestBackend, 4>::ones([2, 3, 4, 4], &device);
        let gradients = Tensor::<TestBackend, 4>::ones([2, 3, 4, 4], &device) * -2.0;

        let attr = input_gradient(input, gradients);

        assert_eq!(attr.shape(), ImageShape::new(2, 3, 4, 4));
        assert_eq!(attr.method, AttributionMethod::InputGradient);

        // |input * gradient| = |1 * -2| = 2 everywhere
        let sum: f32 = attr.values.sum().into_scalar().elem();
        assert!((sum - 2.0 * 96.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_baseline() {
        let device = Default::default();
        let baseline = zero_baseline::<TestBackend>([2, 3, 8, 8], &device);

        assert_eq!(baseline.dims(), [2, 3, 8, 8]);

        let sum: f32 = baseline.sum().into_scalar().elem();
        assert!(sum.abs() < 1e-6);
    }

    #[test]
    fn test_random_baseline_shape() {
        let device = Default::default();
        let baseline = random_baseline::<TestBackend>([2, 3, 8, 8], &device);

        assert_eq!(baseline.dims(), [2, 3, 8, 8]);
    }

    #[test]
    fn test_mean_per_channel() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 4>::ones([2, 3, 4, 4], &device);
        let map = AttributionMap::new(values, AttributionMethod::InputGradient);

        assert_eq!(map.mean_per_channel().dims(), [2, 3, 1, 1]);
    }

    #[test]
    fn test_pixel_map() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 4>::ones([2, 3, 4, 4], &device);
        let map = AttributionMap::new(values, AttributionMethod::InputGradient);

        assert_eq!(map.pixel_map().dims(), [2, 1, 4, 4]);
    }

    #[test]
    fn test_attribution_method_serde() {
        let method = AttributionMethod::IntegratedGradients;
        let json = serde_json::to_string(&method).unwrap();
        let decoded: AttributionMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, method);
    }
}
