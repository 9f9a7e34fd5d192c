//! Core data types: trajectory segments and recurrent state.

pub mod recurrent;
pub mod trajectory;

pub use recurrent::HiddenState;
pub use trajectory::{TimeMajor, Trajectory};
