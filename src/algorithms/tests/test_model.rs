//! Small recurrent actor-critic used by the learner tests.
//!
//! h_t = tanh(W [x_t, h_{t-1}]), with h_{t-1} zeroed where the reset mask is set.
//! Categorical policy head and scalar value head on h_t.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::tanh;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{Int, Tensor};

use crate::algorithms::actor_critic::{ActOutput, ImpalaModel, ModelOutput};
use crate::algorithms::categorical::Categorical;
use crate::core::recurrent::HiddenState;
use crate::error::ModelError;

#[derive(Module, Debug)]
pub struct TinyRecurrentModel<B: Backend> {
    encoder: Linear<B>,
    policy_head: Linear<B>,
    value_head: Linear<B>,
    obs_size: usize,
    hidden_size: usize,
    fail_forward: bool,
}

impl<B: Backend> TinyRecurrentModel<B> {
    pub fn new(obs_size: usize, hidden_size: usize, n_actions: usize, device: &B::Device) -> Self {
        Self {
            encoder: LinearConfig::new(obs_size + hidden_size, hidden_size).init(device),
            policy_head: LinearConfig::new(hidden_size, n_actions).init(device),
            value_head: LinearConfig::new(hidden_size, 1).init(device),
            obs_size,
            hidden_size,
            fail_forward: false,
        }
    }

    /// Same network, but every forward call fails.
    pub fn failing(mut self) -> Self {
        self.fail_forward = true;
        self
    }

    pub fn initial_state(&self, batch_size: usize, device: &B::Device) -> HiddenState<B> {
        HiddenState::zeros(batch_size, self.hidden_size, false, device)
    }

    fn step(&self, obs: Tensor<B, 2>, hidden: Tensor<B, 2>) -> (Categorical<B>, Tensor<B, 1>, Tensor<B, 2>) {
        let h = tanh(self.encoder.forward(Tensor::cat(vec![obs, hidden], 1)));
        let dist = Categorical::new(self.policy_head.forward(h.clone()));
        let value = self.value_head.forward(h.clone()).flatten(0, 1);
        (dist, value, h)
    }

    fn row(segment: Tensor<B, 3>, t: usize) -> Tensor<B, 2> {
        let [_, batch, features] = segment.dims();
        segment.slice([t..t + 1]).reshape([batch, features])
    }

    fn single_step(
        &self,
        observation: Tensor<B, 3>,
        lstm_state: HiddenState<B>,
        greedy: bool,
    ) -> Result<ActOutput<B, Tensor<B, 2, Int>>, ModelError> {
        if self.fail_forward {
            return Err("tiny model: act disabled".into());
        }
        let [steps, batch, _] = observation.dims();
        if steps != 1 {
            return Err(format!("tiny model: act expects one step, got {}", steps).into());
        }
        let obs = Self::row(observation, 0);
        let (dist, _, h) = self.step(obs, lstm_state.hidden);
        let (actions, log_prob) = if greedy { dist.greedy() } else { dist.sample() };
        Ok(ActOutput {
            action: actions.reshape([1, batch]),
            log_prob,
            hidden: HiddenState::gru(h),
        })
    }
}

impl<B: AutodiffBackend> ImpalaModel<B> for TinyRecurrentModel<B> {
    type Observation = Tensor<B, 3>;
    type Action = Tensor<B, 2, Int>;

    fn forward(
        &self,
        observations: Tensor<B, 3>,
        lstm_state: HiddenState<B>,
        reset_mask: Tensor<B, 2>,
        behaviour_actions: Tensor<B, 2, Int>,
    ) -> Result<ModelOutput<B>, ModelError> {
        if self.fail_forward {
            return Err("tiny model: forward disabled".into());
        }
        let [steps, batch, obs_size] = observations.dims();
        if obs_size != self.obs_size {
            return Err(format!("tiny model: expected {} features, got {}", self.obs_size, obs_size).into());
        }

        let mut state = lstm_state;
        let mut log_probs = Vec::with_capacity(steps);
        let mut entropies = Vec::with_capacity(steps);
        let mut values = Vec::with_capacity(steps);

        for t in 0..steps {
            let reset = reset_mask.clone().slice([t..t + 1]).reshape([batch]);
            state = state.apply_reset(reset);

            let obs = Self::row(observations.clone(), t);
            let actions: Tensor<B, 1, Int> = behaviour_actions.clone().slice([t..t + 1]).reshape([batch]);
            let (dist, value, h) = self.step(obs, state.hidden);

            log_probs.push(dist.log_prob(actions).reshape([1, batch]));
            entropies.push(dist.entropy().reshape([1, batch]));
            values.push(value.reshape([1, batch]));
            state = HiddenState::gru(h);
        }

        Ok(ModelOutput::new(
            Tensor::cat(log_probs, 0),
            Tensor::cat(entropies, 0),
            Tensor::cat(values, 0),
        ))
    }

    fn act(
        &self,
        observation: Tensor<B, 3>,
        lstm_state: HiddenState<B>,
    ) -> Result<ActOutput<B, Tensor<B, 2, Int>>, ModelError> {
        self.single_step(observation, lstm_state, false)
    }

    fn greedy_act(
        &self,
        observation: Tensor<B, 3>,
        lstm_state: HiddenState<B>,
    ) -> Result<ActOutput<B, Tensor<B, 2, Int>>, ModelError> {
        self.single_step(observation, lstm_state, true)
    }
}
