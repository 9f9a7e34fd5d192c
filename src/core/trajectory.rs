//! Trajectory segments consumed by the learner.
//!
//! A segment is a fixed window of `T+1` consecutive steps across `B` parallel
//! environments, stored time-major. The extra final step only supplies the
//! bootstrap value; it is never a policy-gradient target.

use burn::tensor::backend::Backend;
use burn::tensor::{BasicOps, Tensor};

use super::recurrent::HiddenState;
use crate::error::ImpalaError;

/// Anything whose two leading axes are time and batch.
///
/// Observations and actions are opaque to the learner apart from these two
/// axes, so models can use whatever tensor rank and kind suits them.
pub trait TimeMajor {
    /// Full shape.
    fn shape_dims(&self) -> Vec<usize>;

    /// Length of the leading (time) axis.
    fn time_len(&self) -> usize {
        self.shape_dims().first().copied().unwrap_or(0)
    }

    /// Length of the second (batch) axis.
    fn batch_len(&self) -> usize {
        self.shape_dims().get(1).copied().unwrap_or(0)
    }
}

impl<B, const D: usize, K> TimeMajor for Tensor<B, D, K>
where
    B: Backend,
    K: BasicOps<B>,
{
    fn shape_dims(&self) -> Vec<usize> {
        self.dims().to_vec()
    }
}

/// One training segment.
///
/// # Shapes
///
/// - `observations`: `[T+1, B, ...]`
/// - `behaviour_actions`: `[T+1, B, ...]`
/// - `reset_mask`: `[T+1, B]`, 1.0 where a new episode starts
/// - `lstm_state`: recurrent state at the first step, `[B, hidden]`
/// - `rewards`: `[T, B]` (a `[T+1, B]` tensor is accepted; its last row is dropped)
/// - `behaviour_log_probs`: `[T+1, B]` (a `[T, B]` tensor is accepted as-is)
#[derive(Debug, Clone)]
pub struct Trajectory<B: Backend, O, A> {
    pub observations: O,
    pub behaviour_actions: A,
    pub reset_mask: Tensor<B, 2>,
    pub lstm_state: HiddenState<B>,
    pub rewards: Tensor<B, 2>,
    pub behaviour_log_probs: Tensor<B, 2>,
}

impl<B, O, A> Trajectory<B, O, A>
where
    B: Backend,
    O: TimeMajor,
    A: TimeMajor,
{
    /// Number of transitions T (one less than the number of observations).
    pub fn len(&self) -> usize {
        self.observations.time_len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of parallel environments B.
    pub fn batch_size(&self) -> usize {
        self.observations.batch_len()
    }

    /// Check every field against `sequence_length` and the observation batch size.
    pub fn validate(&self, sequence_length: usize) -> Result<(), ImpalaError> {
        let steps = sequence_length + 1;
        let batch = self.batch_size();

        let observed = self.observations.time_len();
        if observed != steps {
            return Err(ImpalaError::shape("observations", &[steps], &[observed]));
        }

        check_leading("behaviour_actions", &self.behaviour_actions.shape_dims(), &[steps], batch)?;
        check_leading("reset_mask", &self.reset_mask.shape_dims(), &[steps], batch)?;
        check_leading("rewards", &self.rewards.shape_dims(), &[sequence_length, steps], batch)?;
        check_leading(
            "behaviour_log_probs",
            &self.behaviour_log_probs.shape_dims(),
            &[sequence_length, steps],
            batch,
        )?;

        let state_batch = self.lstm_state.batch_size();
        if state_batch != batch {
            return Err(ImpalaError::shape("lstm_state", &[batch], &[state_batch]));
        }

        Ok(())
    }
}

fn check_leading(
    field: &'static str,
    dims: &[usize],
    allowed_steps: &[usize],
    batch: usize,
) -> Result<(), ImpalaError> {
    let time = dims.first().copied().unwrap_or(0);
    let b = dims.get(1).copied().unwrap_or(0);
    if !allowed_steps.contains(&time) || b != batch {
        return Err(ImpalaError::shape(field, &[allowed_steps[allowed_steps.len() - 1], batch], &[time, b]));
    }
    Ok(())
}

/// Trim a per-step tensor to its first `steps` rows.
///
/// Used to drop the bootstrap row from `[T+1, B]` rewards or log-probs.
pub(crate) fn leading_rows<B: Backend>(
    field: &'static str,
    tensor: Tensor<B, 2>,
    steps: usize,
) -> Result<Tensor<B, 2>, ImpalaError> {
    let [time, batch] = tensor.dims();
    if time == steps {
        Ok(tensor)
    } else if time == steps + 1 {
        Ok(tensor.slice([0..steps]))
    } else {
        Err(ImpalaError::shape(field, &[steps, batch], &[time, batch]))
    }
}
