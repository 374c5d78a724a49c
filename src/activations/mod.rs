//! # Activation Functions Module
//!
//! The value network only needs two activations: rectified linear units for the
//! hidden layers and the identity for the output layer, which produces
//! unbounded Q-value estimates.

pub mod functions;

pub use functions::Activation;
