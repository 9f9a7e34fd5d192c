//! Actor-critic model interface used by the IMPALA learner.
//!
//! The network itself is supplied by the caller. The learner only needs:
//!
//! - [`ImpalaModel::forward`]: evaluate a whole `[T+1, B, ...]` segment,
//!   returning log π of the recorded actions, policy entropy and V(s).
//! - [`ImpalaModel::act`]: single-step sampling for data collection.
//! - [`ImpalaModel::greedy_act`]: single-step most-probable action.
//!
//! Parameter get/load comes from Burn's [`Module`](burn::module::Module)
//! records, so any `#[derive(Module)]` network qualifies once these three
//! methods are implemented.
//!
//! # Usage Pattern
//!
//! ```ignore
//! // Learner (training with gradients)
//! let output = model.forward(obs, hidden, reset_mask, actions)?;  // builds the graph
//! let loss = impala.loss_from_outputs(output, rewards, behaviour_log_probs)?;
//! let grads = loss.total_loss.backward();
//!
//! // Actor (collection)
//! let ActOutput { action, log_prob, hidden } = model.act(obs_t, hidden)?;
//! ```

use burn::module::AutodiffModule;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;

use crate::core::recurrent::HiddenState;
use crate::core::trajectory::TimeMajor;
use crate::error::ModelError;

// ============================================================================
// Outputs
// ============================================================================

/// Output of a segment forward pass.
///
/// Each tensor is `[T+1, B]`, time-major, and keeps its autodiff graph.
#[derive(Debug, Clone)]
pub struct ModelOutput<B: Backend> {
    /// log π(a_t|s_t) of the behaviour actions under the current policy.
    pub log_probs: Tensor<B, 2>,
    /// Policy entropy at each step.
    pub entropy: Tensor<B, 2>,
    /// Value estimates V(s_t).
    pub values: Tensor<B, 2>,
}

impl<B: Backend> ModelOutput<B> {
    pub fn new(log_probs: Tensor<B, 2>, entropy: Tensor<B, 2>, values: Tensor<B, 2>) -> Self {
        Self {
            log_probs,
            entropy,
            values,
        }
    }
}

/// Output of single-step action selection.
#[derive(Debug, Clone)]
pub struct ActOutput<B: Backend, A> {
    /// Selected actions, one per batch entry.
    pub action: A,
    /// Log probability of each selected action, `[B]`.
    pub log_prob: Tensor<B, 1>,
    /// Recurrent state after this step.
    pub hidden: HiddenState<B>,
}

// ============================================================================
// ImpalaModel Trait
// ============================================================================

/// Actor-critic network trained by [`Impala`](crate::algorithms::impala::Impala).
///
/// # Type Parameters
///
/// - `B`: Autodiff backend (e.g., `Autodiff<NdArray>`, `Autodiff<Wgpu>`)
///
/// # Associated Types
///
/// - `Observation`: observation batch. Segments are `[T+1, B, ...]`; single
///   steps passed to `act` use whatever layout the model expects.
/// - `Action`: action batch, same conventions as `Observation`.
///
/// Errors are opaque to the learner and propagated unchanged.
pub trait ImpalaModel<B: AutodiffBackend>: AutodiffModule<B> + Clone + Send + 'static {
    type Observation: TimeMajor + Clone;
    type Action: TimeMajor + Clone;

    /// Evaluate a whole segment.
    ///
    /// `reset_mask` is `[T+1, B]`; the model should reset the recurrent state
    /// of an entry before processing a step where its flag is 1.0.
    fn forward(
        &self,
        observations: Self::Observation,
        lstm_state: HiddenState<B>,
        reset_mask: Tensor<B, 2>,
        behaviour_actions: Self::Action,
    ) -> Result<ModelOutput<B>, ModelError>;

    /// Sample an action for each entry of a single-step observation batch.
    fn act(
        &self,
        observation: Self::Observation,
        lstm_state: HiddenState<B>,
    ) -> Result<ActOutput<B, Self::Action>, ModelError>;

    /// Pick the most probable action for each entry of a single-step batch.
    fn greedy_act(
        &self,
        observation: Self::Observation,
        lstm_state: HiddenState<B>,
    ) -> Result<ActOutput<B, Self::Action>, ModelError>;
}
