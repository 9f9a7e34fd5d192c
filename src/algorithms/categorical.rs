//! Categorical distribution over discrete actions.
//!
//! Helpers for models with a discrete action head. Log probabilities are taken
//! from `log_softmax` so that the importance ratios built from them are exact
//! in log space.

use burn::tensor::activation::{log_softmax, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

/// Categorical policy over logits `[batch, n_actions]`.
#[derive(Debug, Clone)]
pub struct Categorical<B: Backend> {
    /// Unnormalized log probabilities: [batch, n_actions]
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> Categorical<B> {
    /// Create from logits tensor.
    pub fn new(logits: Tensor<B, 2>) -> Self {
        Self { logits }
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.logits.dims()[1]
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        self.logits.dims()[0]
    }

    /// Get probabilities (softmax of logits).
    pub fn probs(&self) -> Tensor<B, 2> {
        softmax(self.logits.clone(), 1)
    }

    /// Log probabilities of every action: [batch, n_actions]
    pub fn log_probs(&self) -> Tensor<B, 2> {
        log_softmax(self.logits.clone(), 1)
    }

    /// Log probability of the given actions (with gradient flow).
    ///
    /// `actions` is a `[batch]` int tensor of action indices.
    pub fn log_prob(&self, actions: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let batch_size = actions.dims()[0];
        let index: Tensor<B, 2, Int> = actions.reshape([batch_size, 1]);
        self.log_probs().gather(1, index).flatten(0, 1)
    }

    /// Entropy H = -Σ p log p, one value per batch entry.
    pub fn entropy(&self) -> Tensor<B, 1> {
        let log_probs = self.log_probs();
        let neg_entropy: Tensor<B, 2> = (log_probs.clone().exp() * log_probs).sum_dim(1);
        -neg_entropy.flatten(0, 1)
    }

    /// Sample one action per batch entry.
    ///
    /// Returns `(actions, log_probs)`.
    pub fn sample(&self) -> (Tensor<B, 1, Int>, Tensor<B, 1>) {
        let device = self.logits.device();
        let n_actions = self.n_actions();
        let probs: Vec<f32> = self.probs().into_data().iter::<f32>().collect();

        let actions: Vec<i32> = probs
            .chunks(n_actions)
            .map(|row| {
                // Categorical sampling via cumulative sum; the last action
                // absorbs rounding when the row sums to slightly under 1.
                let u = fastrand::f32();
                let mut cumsum = 0.0;
                for (a, p) in row.iter().enumerate() {
                    cumsum += p;
                    if u < cumsum {
                        return a as i32;
                    }
                }
                (n_actions - 1) as i32
            })
            .collect();

        let actions = Tensor::<B, 1, Int>::from_ints(actions.as_slice(), &device);
        let log_probs = self.log_prob(actions.clone());
        (actions, log_probs)
    }

    /// Most probable action per batch entry, with its log probability.
    pub fn greedy(&self) -> (Tensor<B, 1, Int>, Tensor<B, 1>) {
        let actions: Tensor<B, 1, Int> = self.logits.clone().argmax(1).flatten(0, 1);
        let log_probs = self.log_prob(actions.clone());
        (actions, log_probs)
    }
}
