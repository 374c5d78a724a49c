//! Loss functions used to fit the value network toward its Bellman targets.

pub mod functions;

pub use functions::{Loss, MSE};
