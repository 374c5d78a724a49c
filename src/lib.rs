//! # cartpole-dqn - Deep Q-Network agent for CartPole
//!
//! A DQN agent that learns to balance a pole on a cart from its own recorded
//! experience. The crate covers the learning side only: the environment and
//! the loop that steps it belong to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cartpole_dqn::agent::{CartpoleAgent, DqnAgent};
//! use cartpole_dqn::config::DqnConfig;
//! use cartpole_dqn::storage::FileStore;
//!
//! // 4 observations, 2 actions; the network is restored from ./models/cartpole.bin if present
//! let agent: CartpoleAgent = DqnAgent::new(4, 2, "cartpole", DqnConfig::default(), FileStore::default())?;
//! assert_eq!(agent.exploration_rate(), 1.0);
//! # Ok::<(), cartpole_dqn::error::DqnError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU and linear activations
//! - [`agent`] - The DQN agent: epsilon-greedy policy and replay trainer
//! - [`approximator`] - Contract between the agent and its Q-value estimator
//! - [`config`] - Hyperparameters and their JSON form
//! - [`error`] - Error types and result handling
//! - [`exploration`] - Exploration-rate schedule
//! - [`layers`] - Dense layers of the value network
//! - [`loss`] - Loss functions for training
//! - [`network`] - The value network
//! - [`optimizer`] - Adam and SGD update rules
//! - [`replay_buffer`] - Transitions and the bounded replay memory
//! - [`storage`] - Keyed checkpoint storage

pub mod activations;
pub mod agent;
pub mod approximator;
pub mod config;
pub mod error;
pub mod exploration;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod storage;

#[cfg(test)]
mod tests;
