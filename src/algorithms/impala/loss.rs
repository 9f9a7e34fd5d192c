//! Loss output for the IMPALA learner.

use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;

/// Detached per-component loss values, for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LossBreakdown {
    /// Σ -ρ_t log π(a_t|s_t) A_t
    pub policy: f32,
    /// Σ (v_t - V(s_t))²
    pub value: f32,
    /// Σ H(π(·|s_t)), bootstrap step excluded
    pub entropy: f32,
}

impl LossBreakdown {
    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.policy.is_finite() && self.value.is_finite() && self.entropy.is_finite()
    }
}

/// Output from IMPALA loss computation.
///
/// Contains the total loss tensor for backpropagation plus plain scalar
/// values of the individual components. The scalars are copies, so nothing
/// computed from them can reach the gradient graph.
#[derive(Debug, Clone)]
pub struct ImpalaLoss<B: AutodiffBackend> {
    /// policy + value_coef * value - entropy_coef * entropy, single element.
    pub total_loss: Tensor<B, 1>,
    /// Component values.
    pub breakdown: LossBreakdown,
    /// Mean truncated importance weight over the segment (None when T = 0).
    pub mean_rho: Option<f32>,
}

impl<B: AutodiffBackend> ImpalaLoss<B> {
    pub fn new(total_loss: Tensor<B, 1>, breakdown: LossBreakdown, mean_rho: Option<f32>) -> Self {
        Self {
            total_loss,
            breakdown,
            mean_rho,
        }
    }
}
