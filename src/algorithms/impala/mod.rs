//! IMPALA algorithm components.
//!
//! - `ImpalaConfig`: loss coefficients, discount and truncation levels
//! - `Impala`: the learner, combining the model forward pass, V-trace and the loss
//! - `ImpalaLoss`: total loss tensor plus a detached breakdown for logging

mod config;
mod impala;
mod loss;

pub use config::ImpalaConfig;
pub use impala::{Impala, ModelTrajectory};
pub use loss::{ImpalaLoss, LossBreakdown};
