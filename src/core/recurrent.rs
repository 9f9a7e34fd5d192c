//! Recurrent state carried across segments.
//!
//! The learner core never looks inside the state; it hands it to the model at
//! the start of a segment and returns whatever the model produced from `act`.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Hidden state for recurrent models.
///
/// Generic representation that can store LSTM (h, c) or GRU (h) states,
/// batched as `[batch, hidden_size]`.
#[derive(Debug, Clone)]
pub struct HiddenState<B: Backend> {
    /// h, `[batch, hidden]`
    pub hidden: Tensor<B, 2>,
    /// c, present only for LSTM models
    pub cell: Option<Tensor<B, 2>>,
}

impl<B: Backend> HiddenState<B> {
    /// LSTM state `(h, c)`.
    pub fn lstm(hidden: Tensor<B, 2>, cell: Tensor<B, 2>) -> Self {
        Self {
            hidden,
            cell: Some(cell),
        }
    }

    /// GRU or vanilla RNN state `h`.
    pub fn gru(hidden: Tensor<B, 2>) -> Self {
        Self { hidden, cell: None }
    }

    /// Zeroed state for `batch_size` environments.
    pub fn zeros(batch_size: usize, hidden_size: usize, has_cell: bool, device: &B::Device) -> Self {
        let hidden = Tensor::zeros([batch_size, hidden_size], device);
        if has_cell {
            Self::lstm(hidden, Tensor::zeros([batch_size, hidden_size], device))
        } else {
            Self::gru(hidden)
        }
    }

    /// Hidden tensor h.
    pub fn h(&self) -> &Tensor<B, 2> {
        &self.hidden
    }

    /// Cell tensor c, if any.
    pub fn c(&self) -> Option<&Tensor<B, 2>> {
        self.cell.as_ref()
    }

    pub fn batch_size(&self) -> usize {
        self.hidden.dims()[0]
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.dims()[1]
    }

    /// Zero the state of every batch entry whose reset flag is set.
    ///
    /// `reset` is one row of a segment's reset mask, `[batch]`, with 1.0 where
    /// a new episode starts at this step and 0.0 elsewhere.
    pub fn apply_reset(self, reset: Tensor<B, 1>) -> Self {
        let keep: Tensor<B, 2> = reset.neg().add_scalar(1.0).unsqueeze_dim(1);
        Self {
            hidden: self.hidden * keep.clone(),
            cell: self.cell.map(|c| c * keep),
        }
    }

    /// Drop any autodiff history so the state can seed the next segment.
    pub fn detach(self) -> Self {
        Self {
            hidden: self.hidden.detach(),
            cell: self.cell.map(|c| c.detach()),
        }
    }
}
