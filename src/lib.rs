//! # IMPALA learner core
//!
//! V-trace off-policy correction and the IMPALA actor-critic loss, on Burn.
//!
//! ## Data flow
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────────┐   ┌────────────┐
//! │ Trajectory │──►│ model.forward│──►│ V-trace (inner   │──►│ loss       │
//! │ [T+1, B]   │   │ log π, H, V  │   │ backend, no grad)│   │ assembly   │
//! └────────────┘   └──────────────┘   └──────────────────┘   └────────────┘
//! ```
//!
//! The model and its optimizer belong to the caller's training loop. The
//! learner computes the loss; `backward()` and the optimizer step happen
//! outside.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use impala_vtrace::{Impala, ImpalaConfig};
//!
//! let config = ImpalaConfig::new()
//!     .with_sequence_length(20)
//!     .with_discount_factor(0.99)
//!     .with_rho_bar(1.0)
//!     .with_cis_bar(1.0);
//!
//! let mut learner = Impala::new(config, model, cpu_device)?;
//! let loss = learner.compute_loss(trajectory)?;
//! let grads = GradientsParams::from_grads(loss.total_loss.backward(), learner.model());
//! let model = optimizer.step(lr, learner.model().clone(), grads);
//! learner.set_model(model);
//! ```

pub mod algorithms;
pub mod core;
pub mod error;

pub use algorithms::{
    ActOutput, Categorical, Impala, ImpalaConfig, ImpalaLoss, ImpalaModel, LossBreakdown,
    ModelOutput, ModelTrajectory, VTrace, VTraceOutput,
};
pub use core::{HiddenState, TimeMajor, Trajectory};
pub use error::{ConfigError, ImpalaError, ModelError};
