//! Exploration-rate schedule of the epsilon-greedy policy.
use serde::{Deserialize, Serialize};

/// When the exploration rate is decayed after a replay update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DecayRule {
    /// Decay after every update that actually trained.
    #[default]
    EveryUpdate,

    /// Decay only when the batch mean reward beats the best mean reward seen so far.
    OnRewardImprovement,
}

/// Clamped multiplicative decay of the exploration rate.
///
/// The rate starts at `max` and never leaves `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    rate: f32,
    min: f32,
    max: f32,
    decay: f32,
    rule: DecayRule,
    best_mean_reward: f32,
}

impl ExplorationSchedule {
    pub fn new(max: f32, min: f32, decay: f32, rule: DecayRule) -> Self {
        Self {
            rate: max,
            min,
            max,
            decay,
            rule,
            best_mean_reward: 0.0,
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn rule(&self) -> DecayRule {
        self.rule
    }

    pub fn best_mean_reward(&self) -> f32 {
        self.best_mean_reward
    }

    /// Overrides the current rate, clamped into `[min, max]`.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(self.min).min(self.max);
    }

    pub(crate) fn set_best_mean_reward(&mut self, reward: f32) {
        self.best_mean_reward = reward;
    }

    /// Applies the decay rule after one successful update with the given batch
    /// mean reward. Returns true when the rate was decayed.
    pub fn step(&mut self, mean_reward: f32) -> bool {
        match self.rule {
            DecayRule::EveryUpdate => {
                self.decay();
                true
            }
            DecayRule::OnRewardImprovement => {
                if mean_reward > self.best_mean_reward {
                    self.best_mean_reward = mean_reward;
                    self.decay();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn decay(&mut self) {
        self.rate = (self.rate * self.decay).max(self.min);
    }
}
