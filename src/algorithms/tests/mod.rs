//! Behavioural tests for the algorithms module.
//!
//! # Test Organization
//!
//! - `vtrace_tests`: V-trace targets, truncation and shape handling
//! - `impala_tests`: IMPALA loss assembly, gradient boundaries and model plumbing
//! - `test_model`: small recurrent actor-critic used by `impala_tests`

pub mod test_model;
