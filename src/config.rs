//! Configuration of [`DqnAgent`](crate::agent::DqnAgent).
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::{DqnError, Result};
use crate::exploration::DecayRule;

pub const GAMMA: f32 = 0.95;
pub const LEARNING_RATE: f32 = 0.001;
pub const MEMORY_SIZE: usize = 1_000_000;
pub const BATCH_SIZE: usize = 20;
pub const EXPLORATION_MAX: f32 = 1.0;
pub const EXPLORATION_MIN: f32 = 0.01;
pub const EXPLORATION_DECAY: f32 = 0.7;

/// What a restored agent takes over from its previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResumePolicy {
    /// Only the value network is restored; exploration rate and replay memory start fresh.
    #[default]
    ModelOnly,

    /// Exploration rate and replay memory are checkpointed and restored with the network.
    Full,
}

/// Optimizer used to fit the value network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

/// Architecture and update rule of a freshly created value network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Widths of the ReLU hidden layers.
    pub hidden_layers: Vec<usize>,
    pub optimizer: OptimizerKind,
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![24, 24],
            optimizer: OptimizerKind::Adam,
            learning_rate: LEARNING_RATE,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

impl NetworkConfig {
    pub fn hidden_layers(mut self, widths: &[usize]) -> Self {
        self.hidden_layers = widths.to_vec();
        self
    }

    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer = kind;
        self
    }

    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers.is_empty() || self.hidden_layers.iter().any(|&w| w == 0) {
            return Err(DqnError::invalid_parameter(
                "hidden_layers",
                "need at least one hidden layer, each with a positive width",
            ));
        }
        if !(self.learning_rate > 0.0) {
            return Err(DqnError::invalid_parameter("learning_rate", "must be positive"));
        }
        if !(self.epsilon > 0.0) {
            return Err(DqnError::invalid_parameter("epsilon", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.beta1) || !(0.0..1.0).contains(&self.beta2) {
            return Err(DqnError::invalid_parameter("beta1/beta2", "must lie in [0, 1)"));
        }
        Ok(())
    }
}

/// Hyperparameters of the agent. Defaults reproduce the classic CartPole setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    /// Discount factor of the Bellman backup.
    pub gamma: f32,

    /// Capacity of the replay memory.
    pub memory_size: usize,

    /// Transitions per replay update.
    pub batch_size: usize,

    pub exploration_max: f32,
    pub exploration_min: f32,
    pub exploration_decay: f32,
    pub decay_rule: DecayRule,
    pub resume_policy: ResumePolicy,

    /// Seed of the agent's random number generator. Entropy when unset.
    pub seed: Option<u64>,

    pub network: NetworkConfig,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            gamma: GAMMA,
            memory_size: MEMORY_SIZE,
            batch_size: BATCH_SIZE,
            exploration_max: EXPLORATION_MAX,
            exploration_min: EXPLORATION_MIN,
            exploration_decay: EXPLORATION_DECAY,
            decay_rule: DecayRule::EveryUpdate,
            resume_policy: ResumePolicy::ModelOnly,
            seed: None,
            network: NetworkConfig::default(),
        }
    }
}

impl DqnConfig {
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    pub fn memory_size(mut self, v: usize) -> Self {
        self.memory_size = v;
        self
    }

    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the bounds of the exploration rate. The rate starts at `max`.
    pub fn exploration(mut self, max: f32, min: f32, decay: f32) -> Self {
        self.exploration_max = max;
        self.exploration_min = min;
        self.exploration_decay = decay;
        self
    }

    pub fn decay_rule(mut self, rule: DecayRule) -> Self {
        self.decay_rule = rule;
        self
    }

    pub fn resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.resume_policy = policy;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DqnError::invalid_parameter("gamma", "must lie in [0, 1]"));
        }
        if self.batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if self.memory_size < self.batch_size {
            return Err(DqnError::invalid_parameter(
                "memory_size",
                "must be at least batch_size",
            ));
        }
        if !(0.0 <= self.exploration_min
            && self.exploration_min <= self.exploration_max
            && self.exploration_max <= 1.0)
        {
            return Err(DqnError::invalid_parameter(
                "exploration",
                "need 0 <= exploration_min <= exploration_max <= 1",
            ));
        }
        if !(self.exploration_decay > 0.0 && self.exploration_decay <= 1.0) {
            return Err(DqnError::invalid_parameter(
                "exploration_decay",
                "must lie in (0, 1]",
            ));
        }
        self.network.validate()
    }

    /// Reads a JSON configuration. Missing fields take their default value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        log::info!("Load config of DQN agent from {:?}", path.as_ref());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Save config of DQN agent into {:?}", path.as_ref());
        Ok(())
    }
}
