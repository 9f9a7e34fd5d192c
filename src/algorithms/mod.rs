//! Algorithm components.
//!
//! - `vtrace`: V-trace off-policy correction
//! - `impala`: IMPALA learner (loss aggregation over a model and V-trace)
//! - `actor_critic`: model interface the learner trains
//! - `categorical`: discrete action distribution helpers

pub mod actor_critic;
pub mod categorical;
pub mod impala;
pub mod vtrace;

#[cfg(test)]
mod tests;

pub use actor_critic::{ActOutput, ImpalaModel, ModelOutput};
pub use categorical::Categorical;
pub use impala::{Impala, ImpalaConfig, ImpalaLoss, LossBreakdown, ModelTrajectory};
pub use vtrace::{VTrace, VTraceOutput};
