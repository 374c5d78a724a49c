//! The contract between the agent and whatever estimates its Q-values.
//!
//! The agent never looks inside the approximator. It asks for per-action
//! values, pushes a single state toward a target vector, and stores or
//! restores the whole thing as opaque bytes.

use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;

use crate::config::NetworkConfig;
use crate::error::Result;

/// Maps an observation vector to one estimated return per action.
pub trait ValueApproximator: Sized {
    /// Build an untrained approximator for the given spaces.
    fn fresh(
        observation_space: usize,
        action_space: usize,
        config: &NetworkConfig,
        rng: &mut StdRng,
    ) -> Result<Self>;

    /// Restore an approximator from bytes produced by [`ValueApproximator::to_bytes`].
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Serialize architecture and parameters.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Length of the state vectors accepted by `predict` and `fit`.
    fn input_size(&self) -> usize;

    /// Number of actions, i.e. the length of the value vectors.
    fn output_size(&self) -> usize;

    /// Per-action values for `state`. Must not change the approximator.
    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>>;

    /// One gradient step moving `predict(state)` toward `target`.
    /// Returns the training loss measured before the step.
    fn fit(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32>;
}

/// Index of the largest value. Ties go to the lowest index.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        let is_better = match best {
            None => true,
            Some((_, best_value)) => value > best_value,
        };
        if is_better {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Largest value, `None` for an empty vector.
pub fn max_value(values: ArrayView1<f32>) -> Option<f32> {
    argmax(values).map(|idx| values[idx])
}
