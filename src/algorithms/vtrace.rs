//! V-trace off-policy correction for IMPALA.
//!
//! V-trace handles policy lag in actor-learner training by using truncated
//! importance sampling to correct for the difference between the behaviour
//! policy μ (at collection time) and the target policy π (at training time).
//!
//! ## Key Equations
//!
//! Importance weights:
//! - ρ_t = min(ρ̄, π(a_t|s_t) / μ(a_t|s_t))  - truncated importance weight
//! - c_t = min(c̄, π(a_t|s_t) / μ(a_t|s_t))  - trace cutting coefficient
//!
//! V-trace target, computed backward from the bootstrap value:
//! v_s = V(s) + δ_s + γ c_s (v_{s+1} - V(s+1))
//! where δ_s = ρ_s (r_s + γ V(s+1) - V(s))
//!
//! With π = μ and ρ̄, c̄ ≥ 1 the target reduces to the n-step bootstrapped return.
//!
//! ## Layout
//!
//! All inputs are time-major `[T, B]` tensors (`[T+1, B]` for values, whose
//! last row is the bootstrap). The recursion runs sequentially over time and
//! is vectorized over the batch axis.
//!
//! ## References
//!
//! - Espeholt et al., "IMPALA: Scalable Distributed Deep-RL with
//!   Importance Weighted Actor-Learner Architectures" (2018)

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::algorithms::impala::ImpalaConfig;
use crate::error::{ConfigError, ImpalaError};

/// V-trace computation result.
#[derive(Debug, Clone)]
pub struct VTraceOutput<B: Backend> {
    /// V-trace targets v_s, `[T+1, B]`. Row `T` equals the bootstrap value.
    pub v_targets: Tensor<B, 2>,
    /// Truncated importance weights ρ_s, `[T, B]`.
    pub rhos: Tensor<B, 2>,
}

/// V-trace estimator with fixed discount and truncation levels.
///
/// The estimator is a target generator, not a differentiable module: feed it
/// tensors that carry no autodiff graph (an inner backend) and treat its
/// outputs as constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VTrace {
    discount_factor: f32,
    rho_bar: f32,
    cis_bar: f32,
}

impl VTrace {
    /// Create an estimator.
    ///
    /// Fails if `discount_factor` is outside (0, 1], if either truncation level
    /// is not a positive finite number, or if `rho_bar < cis_bar`.
    pub fn new(discount_factor: f32, rho_bar: f32, cis_bar: f32) -> Result<Self, ConfigError> {
        if !(discount_factor > 0.0 && discount_factor <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "discount_factor",
                value: discount_factor,
                min: 0.0,
                max: 1.0,
            });
        }
        for (field, value) in [("rho_bar", rho_bar), ("cis_bar", cis_bar)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: f32::MAX,
                });
            }
        }
        if rho_bar < cis_bar {
            return Err(ConfigError::Truncation { rho_bar, cis_bar });
        }

        Ok(Self {
            discount_factor,
            rho_bar,
            cis_bar,
        })
    }

    /// Create an estimator from the learner configuration.
    pub fn from_config(config: &ImpalaConfig) -> Result<Self, ConfigError> {
        Self::new(config.discount_factor, config.rho_bar, config.cis_bar)
    }

    pub fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    pub fn rho_bar(&self) -> f32 {
        self.rho_bar
    }

    pub fn cis_bar(&self) -> f32 {
        self.cis_bar
    }

    /// Truncated importance weights `(ρ, c)` for log-probabilities of the same shape.
    ///
    /// The ratio is formed in log space and then truncated. Nothing is clamped
    /// beyond the truncation: an overflowing ratio becomes +inf and truncates
    /// to the bound.
    pub fn importance_weights<B: Backend, const D: usize>(
        &self,
        target_log_policy: Tensor<B, D>,
        behaviour_log_policy: Tensor<B, D>,
    ) -> (Tensor<B, D>, Tensor<B, D>) {
        let ratios = (target_log_policy - behaviour_log_policy).exp();
        let rhos = ratios.clone().clamp_max(self.rho_bar);
        let cs = ratios.clamp_max(self.cis_bar);
        (rhos, cs)
    }

    /// Compute V-trace targets and truncated importance weights.
    ///
    /// # Arguments
    ///
    /// * `target_value` - V(s) under the current policy, `[T+1, B]` (last row is the bootstrap)
    /// * `rewards` - rewards per transition, `[T, B]`
    /// * `target_log_policy` - log π(a|s) of the recorded actions, `[T, B]`
    /// * `behaviour_log_policy` - log μ(a|s) of the recorded actions, `[T, B]`
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the time or batch dimensions disagree.
    pub fn compute<B: Backend>(
        &self,
        target_value: Tensor<B, 2>,
        rewards: Tensor<B, 2>,
        target_log_policy: Tensor<B, 2>,
        behaviour_log_policy: Tensor<B, 2>,
    ) -> Result<VTraceOutput<B>, ImpalaError> {
        let [t_plus_one, batch] = target_value.dims();
        if t_plus_one == 0 {
            return Err(ImpalaError::shape("target_value", &[1, batch], &[0, batch]));
        }
        let t = t_plus_one - 1;
        let expected = [t, batch];
        for (field, dims) in [
            ("rewards", rewards.dims()),
            ("target_log_policy", target_log_policy.dims()),
            ("behaviour_log_policy", behaviour_log_policy.dims()),
        ] {
            if dims != expected {
                return Err(ImpalaError::shape(field, &expected, &dims));
            }
        }

        let device = target_value.device();
        if t == 0 {
            // Pure bootstrap: nothing to correct.
            return Ok(VTraceOutput {
                v_targets: target_value,
                rhos: Tensor::zeros([0, batch], &device),
            });
        }

        let (rhos, cs) = self.importance_weights(target_log_policy, behaviour_log_policy);
        let discounted_cs = cs.mul_scalar(self.discount_factor);

        let values = target_value.clone().slice([0..t]);
        let next_values = target_value.clone().slice([1..t_plus_one]);
        let bootstrap = target_value.slice([t..t_plus_one]);

        // δ_s for every step at once; only the trace accumulation is sequential.
        let deltas = rhos.clone() * (rewards + next_values.mul_scalar(self.discount_factor) - values.clone());

        // corrections[s] = v_s - V(s); zero at the bootstrap.
        let mut correction = Tensor::<B, 2>::zeros([1, batch], &device);
        let mut corrections = vec![correction.clone(); t];
        for s in (0..t).rev() {
            correction = deltas.clone().slice([s..s + 1])
                + discounted_cs.clone().slice([s..s + 1]) * correction;
            corrections[s] = correction.clone();
        }

        let v_targets = Tensor::cat(vec![values + Tensor::cat(corrections, 0), bootstrap], 0);

        Ok(VTraceOutput {
            v_targets: v_targets.detach(),
            rhos: rhos.detach(),
        })
    }
}
