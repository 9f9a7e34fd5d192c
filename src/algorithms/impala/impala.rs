//! IMPALA learner: V-trace corrected actor-critic loss.
//!
//! One call to [`Impala::compute_loss`] is one training step's worth of work:
//! 1. Forward the model over the `[T+1, B]` segment
//! 2. Move values, log-probs and rewards off the autodiff graph to the
//!    estimator device and run V-trace
//! 3. Assemble policy gradient, value regression and entropy bonus
//!
//! The optimizer step stays with the caller.

use burn::module::Module;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

use super::config::ImpalaConfig;
use super::loss::{ImpalaLoss, LossBreakdown};
use crate::algorithms::actor_critic::{ActOutput, ImpalaModel, ModelOutput};
use crate::algorithms::vtrace::VTrace;
use crate::core::recurrent::HiddenState;
use crate::core::trajectory::{leading_rows, Trajectory};
use crate::error::{ConfigError, ImpalaError};

/// Segment type accepted by a given model.
pub type ModelTrajectory<B, M> =
    Trajectory<B, <M as ImpalaModel<B>>::Observation, <M as ImpalaModel<B>>::Action>;

/// IMPALA loss aggregator.
///
/// Owns the model and its V-trace estimator for its whole lifetime. The
/// configuration is fixed at construction.
#[derive(Debug, Clone)]
pub struct Impala<B: AutodiffBackend, M: ImpalaModel<B>> {
    model: M,
    vtrace: VTrace,
    config: ImpalaConfig,
    estimator_device: <B::InnerBackend as Backend>::Device,
}

impl<B: AutodiffBackend, M: ImpalaModel<B>> Impala<B, M> {
    /// Create the learner, running V-trace on `estimator_device`.
    pub fn new(
        config: ImpalaConfig,
        model: M,
        estimator_device: <B::InnerBackend as Backend>::Device,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let vtrace = VTrace::from_config(&config)?;

        log::debug!(
            "IMPALA learner: T={} gamma={} rho_bar={} cis_bar={} value_coef={} entropy_coef={} estimator_device={:?}",
            config.sequence_length,
            config.discount_factor,
            config.rho_bar,
            config.cis_bar,
            config.value_coef,
            config.entropy_coef,
            estimator_device
        );

        Ok(Self {
            model,
            vtrace,
            config,
            estimator_device,
        })
    }

    /// Create the learner with V-trace on the inner backend's default device.
    pub fn with_default_device(config: ImpalaConfig, model: M) -> Result<Self, ConfigError> {
        Self::new(config, model, Default::default())
    }

    pub fn config(&self) -> &ImpalaConfig {
        &self.config
    }

    pub fn vtrace(&self) -> &VTrace {
        &self.vtrace
    }

    pub fn estimator_device(&self) -> &<B::InnerBackend as Backend>::Device {
        &self.estimator_device
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Replace the owned model, e.g. with the result of an optimizer step.
    pub fn set_model(&mut self, model: M) {
        self.model = model;
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Copy `source`'s parameters into the owned model.
    pub fn update_network(&mut self, source: &M) {
        self.model = self.model.clone().load_record(source.clone().into_record());
        log::trace!("IMPALA learner: parameters synchronized ({} params)", self.model.num_params());
    }

    /// Current parameters of the owned model.
    pub fn get_state(&self) -> <M as Module<B>>::Record {
        self.model.clone().into_record()
    }

    /// Sample actions for a single-step observation batch.
    pub fn act(
        &self,
        observation: M::Observation,
        lstm_state: HiddenState<B>,
    ) -> Result<ActOutput<B, M::Action>, ImpalaError> {
        Ok(self.model.act(observation, lstm_state)?)
    }

    /// Most probable actions for a single-step observation batch.
    pub fn greedy_act(
        &self,
        observation: M::Observation,
        lstm_state: HiddenState<B>,
    ) -> Result<ActOutput<B, M::Action>, ImpalaError> {
        Ok(self.model.greedy_act(observation, lstm_state)?)
    }

    /// Compute the IMPALA loss for one segment.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if the segment does not hold `sequence_length + 1`
    ///   steps or its fields disagree on time/batch dimensions
    /// - `Model` if the forward pass fails
    pub fn compute_loss(&self, trajectory: ModelTrajectory<B, M>) -> Result<ImpalaLoss<B>, ImpalaError> {
        trajectory.validate(self.config.sequence_length)?;

        let Trajectory {
            observations,
            behaviour_actions,
            reset_mask,
            lstm_state,
            rewards,
            behaviour_log_probs,
        } = trajectory;

        let output = self
            .model
            .forward(observations, lstm_state, reset_mask, behaviour_actions)?;

        let steps = self.config.sequence_length + 1;
        let dims = output.values.dims();
        if dims[0] != steps {
            return Err(ImpalaError::shape("values", &[steps, dims[1]], &dims));
        }

        self.loss_from_outputs(output, rewards, behaviour_log_probs)
    }

    /// Assemble the loss from an already computed forward pass.
    ///
    /// `output` tensors are `[T+1, B]`; `rewards` and `behaviour_log_probs`
    /// are `[T, B]` or `[T+1, B]` (the bootstrap row is dropped).
    pub fn loss_from_outputs(
        &self,
        output: ModelOutput<B>,
        rewards: Tensor<B, 2>,
        behaviour_log_probs: Tensor<B, 2>,
    ) -> Result<ImpalaLoss<B>, ImpalaError> {
        let ModelOutput {
            log_probs,
            entropy,
            values,
        } = output;

        let [steps, batch] = values.dims();
        if steps == 0 {
            return Err(ImpalaError::shape("values", &[1, batch], &[0, batch]));
        }
        for (field, dims) in [("log_probs", log_probs.dims()), ("entropy", entropy.dims())] {
            if dims != [steps, batch] {
                return Err(ImpalaError::shape(field, &[steps, batch], &dims));
            }
        }
        let t = steps - 1;
        let rewards = leading_rows("rewards", rewards, t)?;
        let behaviour_log_probs = leading_rows("behaviour_log_probs", behaviour_log_probs, t)?;

        if t == 0 {
            // Pure bootstrap: v_T = V(s_T), so every term vanishes.
            let value_loss = (values.clone().detach() - values).powf_scalar(2.0).sum();
            log::debug!("IMPALA loss: empty segment, returning zero loss");
            return Ok(ImpalaLoss::new(
                value_loss.mul_scalar(self.config.value_coef),
                LossBreakdown::default(),
                None,
            ));
        }

        // V-trace runs on the inner backend: no autodiff graph reaches it, and
        // nothing it returns carries one.
        let to_estimator =
            |tensor: Tensor<B, 2>| tensor.inner().to_device(&self.estimator_device);
        let vtrace = self.vtrace.compute(
            to_estimator(values.clone()),
            to_estimator(rewards.clone()),
            to_estimator(log_probs.clone().slice([0..t])),
            to_estimator(behaviour_log_probs),
        )?;

        let mean_rho = vtrace.rhos.clone().mean().into_scalar().elem::<f32>();
        let model_device = values.clone().inner().device();
        let from_estimator =
            |tensor: Tensor<B::InnerBackend, 2>| Tensor::<B, 2>::from_inner(tensor.to_device(&model_device));
        let v_targets = from_estimator(vtrace.v_targets);
        let rhos = from_estimator(vtrace.rhos);

        // Row T contributes exactly zero since v_T = V(s_T).
        let value_loss = (v_targets.clone() - values.clone()).powf_scalar(2.0).sum();

        // A_t = r_t + γ v_{t+1} - V(s_t), held constant for the policy gradient.
        let advantage = (rewards + v_targets.slice([1..steps]).mul_scalar(self.config.discount_factor)
            - values.slice([0..t]))
        .detach();
        let policy_loss = -(rhos * log_probs.slice([0..t]) * advantage).sum();

        let entropy = entropy.slice([0..t]).sum();

        let total_loss = policy_loss.clone()
            + value_loss.clone().mul_scalar(self.config.value_coef)
            - entropy.clone().mul_scalar(self.config.entropy_coef);

        let breakdown = LossBreakdown {
            policy: scalar(policy_loss),
            value: scalar(value_loss),
            entropy: scalar(entropy),
        };

        if !breakdown.is_finite() || !mean_rho.is_finite() {
            log::warn!(
                "IMPALA loss is not finite: policy={} value={} entropy={} mean_rho={}",
                breakdown.policy,
                breakdown.value,
                breakdown.entropy,
                mean_rho
            );
        } else {
            log::debug!(
                "IMPALA loss: policy={:.4} value={:.4} entropy={:.4} mean_rho={:.3} (T={}, B={})",
                breakdown.policy,
                breakdown.value,
                breakdown.entropy,
                mean_rho,
                t,
                batch
            );
        }

        Ok(ImpalaLoss::new(total_loss, breakdown, Some(mean_rho)))
    }
}

/// Helper to extract a detached scalar from a single-element tensor.
fn scalar<B: AutodiffBackend>(tensor: Tensor<B, 1>) -> f32 {
    tensor.detach().into_scalar().elem::<f32>()
}
