//! Model trait for attribution.
//!
//! Defines the scoring interface a classifier must expose so attribution
//! methods can query per-class scores for arbitrary inputs.

use burn::prelude::*;

/// Trait for image classification models.
///
/// Attribution methods treat the model as an externally owned scoring
/// function: they only read its per-class outputs (and, through a gradient
/// oracle, the derivative of those outputs with respect to the input).
pub trait ImageClassificationModel<B: Backend> {
    /// Forward pass returning per-class scores.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape (batch, channels, height, width)
    ///
    /// # Returns
    ///
    /// Scores tensor of shape (batch, n_classes). Logits and probabilities
    /// are both acceptable; attribution is computed against whichever the
    /// model returns here.
    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2>;

    /// Forward pass returning probabilities.
    fn forward_probs(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let scores = self.forward(x);
        burn::tensor::activation::softmax(scores, 1)
    }
}
