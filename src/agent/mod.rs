//! # DQN Agent Module
//!
//! The agent owns everything that learns: the replay memory, the
//! epsilon-greedy policy with its exploration schedule, and the value
//! approximator it trains by experience replay.
//!
//! ## Control Flow
//!
//! An external driver steps the environment. At each step it asks
//! [`DqnAgent::select_action`] for an action, applies it, and reports the
//! resulting [`Transition`](crate::replay_buffer::Transition) through
//! [`DqnAgent::remember`]. Whenever it wants the agent to learn it calls
//! [`DqnAgent::experience_replay`], which samples a mini-batch and fits the
//! approximator toward one-step Bellman targets.
//!
//! The same network both selects actions and bootstraps targets; there is no
//! frozen target network.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cartpole_dqn::agent::{CartpoleAgent, DqnAgent, ReplayOutcome};
//! use cartpole_dqn::config::DqnConfig;
//! use cartpole_dqn::replay_buffer::Transition;
//! use cartpole_dqn::storage::FileStore;
//! use ndarray::array;
//!
//! let mut agent: CartpoleAgent = DqnAgent::new(4, 2, "cartpole", DqnConfig::default(), FileStore::default())?;
//!
//! let state = array![0.01, -0.02, 0.03, 0.0];
//! let action = agent.select_action(state.view())?;
//! let next_state = array![0.01, 0.17, 0.03, -0.28];
//! agent.remember(Transition::new(state, action, 1.0, next_state, false))?;
//!
//! if let ReplayOutcome::Trained { mean_loss, .. } = agent.experience_replay(true)? {
//!     println!("loss {}", mean_loss);
//! }
//! # Ok::<(), cartpole_dqn::error::DqnError>(())
//! ```

mod dqn;
pub use dqn::{CartpoleAgent, DqnAgent, ReplayOutcome};
