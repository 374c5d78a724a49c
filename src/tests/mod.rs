// Test modules for all components
pub mod test_activations;
pub mod test_replay_buffer;

use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::approximator::ValueApproximator;
use crate::config::NetworkConfig;
use crate::error::{DqnError, Result};
use crate::replay_buffer::Transition;

/// Approximator that looks values up by the rounded first state component
/// and records every fit. With `learning` set, a fit also stores the target
/// as the new values of that state.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TableApproximator {
    pub input_size: usize,
    pub output_size: usize,
    pub table: BTreeMap<i64, Vec<f32>>,
    pub loss: f32,
    pub learning: bool,
    #[serde(skip)]
    pub fits: Vec<(Array1<f32>, Array1<f32>)>,
}

impl TableApproximator {
    pub fn new(input_size: usize, output_size: usize) -> Self {
        TableApproximator {
            input_size,
            output_size,
            loss: 0.5,
            ..Default::default()
        }
    }

    pub fn learning(mut self) -> Self {
        self.learning = true;
        self
    }

    pub fn with_entry(mut self, key: i64, values: &[f32]) -> Self {
        self.table.insert(key, values.to_vec());
        self
    }
}

impl ValueApproximator for TableApproximator {
    fn fresh(
        observation_space: usize,
        action_space: usize,
        _config: &NetworkConfig,
        _rng: &mut StdRng,
    ) -> Result<Self> {
        Ok(TableApproximator::new(observation_space, action_space))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let key = state
            .first()
            .map(|v| v.round() as i64)
            .ok_or_else(|| DqnError::dimension_mismatch("non-empty state", "empty state"))?;
        Ok(match self.table.get(&key) {
            Some(values) => Array1::from_vec(values.clone()),
            None => Array1::zeros(self.output_size),
        })
    }

    fn fit(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32> {
        if self.learning {
            if let Some(v) = state.first() {
                self.table.insert(v.round() as i64, target.to_vec());
            }
        }
        self.fits.push((state.to_owned(), target.to_owned()));
        Ok(self.loss)
    }
}

/// Transition whose states are filled with `state_key` and `next_key`.
pub fn transition(dim: usize, state_key: f32, action: usize, reward: f32, next_key: f32, done: bool) -> Transition {
    Transition::new(
        Array1::from_elem(dim, state_key),
        action,
        reward,
        Array1::from_elem(dim, next_key),
        done,
    )
}
