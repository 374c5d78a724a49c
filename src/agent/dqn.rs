use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::approximator::{argmax, max_value, ValueApproximator};
use crate::config::{DqnConfig, ResumePolicy};
use crate::error::{DqnError, Result};
use crate::exploration::ExplorationSchedule;
use crate::network::NeuralNetwork;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::storage::{FileStore, ModelStore};

/// The agent used for CartPole: a dense value network checkpointed to `./models`.
pub type CartpoleAgent = DqnAgent<NeuralNetwork, FileStore>;

/// Result of one replay update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayOutcome {
    /// Fewer stored transitions than the batch size; nothing was trained.
    NotReady,

    /// One batch was trained.
    Trained { mean_loss: f32, mean_reward: f32 },
}

impl ReplayOutcome {
    /// Pair reported for [`ReplayOutcome::NotReady`].
    pub const NOT_READY_PAIR: (f32, f32) = (-1.0, -1.0);

    /// `(mean_loss, mean_reward)`, or `(-1, -1)` when not ready.
    pub fn as_pair(&self) -> (f32, f32) {
        match *self {
            ReplayOutcome::NotReady => Self::NOT_READY_PAIR,
            ReplayOutcome::Trained { mean_loss, mean_reward } => (mean_loss, mean_reward),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, ReplayOutcome::Trained { .. })
    }
}

/// Exploration and memory checkpoint written under [`ResumePolicy::Full`].
#[derive(Serialize)]
struct AgentStateRef<'a> {
    exploration_rate: f32,
    best_mean_reward: f32,
    transitions: Vec<&'a Transition>,
}

#[derive(Deserialize)]
struct AgentState {
    exploration_rate: f32,
    best_mean_reward: f32,
    transitions: Vec<Transition>,
}

/// Deep Q-Network agent with experience replay and epsilon-greedy exploration.
///
/// The value approximator is restored from `store` when an entry named
/// `model_name` exists, otherwise a fresh one is built from
/// [`DqnConfig::network`].
pub struct DqnAgent<A: ValueApproximator = NeuralNetwork, S: ModelStore = FileStore> {
    model_name: String,
    observation_space: usize,
    action_space: usize,
    config: DqnConfig,
    approximator: A,
    memory: ReplayBuffer,
    exploration: ExplorationSchedule,
    store: S,
    rng: StdRng,
}

impl<A: ValueApproximator, S: ModelStore> DqnAgent<A, S> {
    pub fn new(
        observation_space: usize,
        action_space: usize,
        model_name: impl Into<String>,
        config: DqnConfig,
        store: S,
    ) -> Result<Self> {
        config.validate()?;
        if observation_space == 0 {
            return Err(DqnError::invalid_parameter("observation_space", "must be positive"));
        }
        if action_space == 0 {
            return Err(DqnError::invalid_parameter("action_space", "must be positive"));
        }
        let model_name = model_name.into();

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (approximator, restored) = match store.get(&model_name)? {
            Some(bytes) => {
                log::info!("Loading model {}...", model_name);
                let approximator = A::from_bytes(&bytes)?;
                if approximator.input_size() != observation_space
                    || approximator.output_size() != action_space
                {
                    return Err(DqnError::dimension_mismatch(
                        format!("{} observations and {} actions", observation_space, action_space),
                        format!(
                            "{} observations and {} actions",
                            approximator.input_size(),
                            approximator.output_size()
                        ),
                    ));
                }
                (approximator, true)
            }
            None => {
                log::info!(
                    "Create value network for model {} with hidden layers {:?}",
                    model_name,
                    config.network.hidden_layers
                );
                (A::fresh(observation_space, action_space, &config.network, &mut rng)?, false)
            }
        };

        let exploration = ExplorationSchedule::new(
            config.exploration_max,
            config.exploration_min,
            config.exploration_decay,
            config.decay_rule,
        );

        let mut agent = DqnAgent {
            model_name,
            observation_space,
            action_space,
            memory: ReplayBuffer::new(config.memory_size),
            config,
            approximator,
            exploration,
            store,
            rng,
        };

        if restored && agent.config.resume_policy == ResumePolicy::Full {
            agent.restore_state()?;
        }

        Ok(agent)
    }

    /// Stores a transition for later replay.
    pub fn remember(&mut self, transition: Transition) -> Result<()> {
        if transition.action >= self.action_space {
            return Err(DqnError::InvalidAction {
                action: transition.action,
                max_actions: self.action_space,
            });
        }
        self.check_state(transition.state.len())?;
        self.check_state(transition.next_state.len())?;
        self.memory.push(transition);
        Ok(())
    }

    /// Epsilon-greedy action for `state`.
    pub fn select_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        self.check_state(state.len())?;
        if self.rng.gen::<f32>() < self.exploration.rate() {
            return Ok(self.rng.gen_range(0..self.action_space));
        }
        let q_values = self.approximator.predict(state)?;
        argmax(q_values.view())
            .ok_or_else(|| DqnError::Training("approximator returned no action values".to_string()))
    }

    /// Alias of [`DqnAgent::select_action`].
    pub fn act(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        self.select_action(state)
    }

    /// Per-action values the approximator currently assigns to `state`.
    pub fn q_values(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_state(state.len())?;
        self.approximator.predict(state)
    }

    /// One-step Bellman target for the action taken in `transition`,
    /// bootstrapped from the current parameters.
    pub fn bellman_target(&self, transition: &Transition) -> Result<f32> {
        if transition.done {
            return Ok(transition.reward);
        }
        let next_q_values = self.approximator.predict(transition.next_state.view())?;
        let max_next_q = max_value(next_q_values.view())
            .ok_or_else(|| DqnError::Training("approximator returned no action values".to_string()))?;
        Ok(transition.reward + self.config.gamma * max_next_q)
    }

    /// Replay update with the configured batch size.
    pub fn experience_replay(&mut self, persist: bool) -> Result<ReplayOutcome> {
        self.train_step(self.config.batch_size, persist)
    }

    /// Samples `batch_size` transitions and fits the approximator on each one.
    ///
    /// Only the component of the taken action is moved toward its Bellman
    /// target; the other components are fitted to their own prediction. When
    /// `persist` is set the approximator is written to the store after every
    /// fit. The exploration rate is decayed once per call that trained.
    pub fn train_step(&mut self, batch_size: usize, persist: bool) -> Result<ReplayOutcome> {
        if batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if self.memory.len() < batch_size {
            log::debug!(
                "Skip replay: {} transitions stored, batch needs {}",
                self.memory.len(),
                batch_size
            );
            return Ok(ReplayOutcome::NotReady);
        }

        let batch: Vec<Transition> = self
            .memory
            .sample(batch_size, &mut self.rng)?
            .into_iter()
            .cloned()
            .collect();

        let mut losses = Vec::with_capacity(batch_size);
        let mut rewards = Vec::with_capacity(batch_size);

        for transition in &batch {
            let target = self.bellman_target(transition)?;

            let mut q_values = self.approximator.predict(transition.state.view())?;
            let max_actions = q_values.len();
            let slot = q_values.get_mut(transition.action).ok_or(DqnError::InvalidAction {
                action: transition.action,
                max_actions,
            })?;
            *slot = target;
            log::trace!("Target {} for action {}", target, transition.action);

            let loss = self.approximator.fit(transition.state.view(), q_values.view())?;
            if persist {
                self.checkpoint_model()?;
            }

            losses.push(loss);
            rewards.push(transition.reward);
        }

        let mean_loss = mean(&losses);
        let mean_reward = mean(&rewards);

        self.exploration.step(mean_reward);
        log::info!(
            "Exploration rate is currently {} (mean loss {}, mean reward {})",
            self.exploration.rate(),
            mean_loss,
            mean_reward
        );

        if persist && self.config.resume_policy == ResumePolicy::Full {
            self.checkpoint_state()?;
        }

        Ok(ReplayOutcome::Trained { mean_loss, mean_reward })
    }

    /// Writes the approximator, and the agent state under [`ResumePolicy::Full`].
    pub fn save(&mut self) -> Result<()> {
        self.checkpoint_model()?;
        if self.config.resume_policy == ResumePolicy::Full {
            self.checkpoint_state()?;
        }
        Ok(())
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn observation_space(&self) -> usize {
        self.observation_space
    }

    pub fn action_space(&self) -> usize {
        self.action_space
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn approximator(&self) -> &A {
        &self.approximator
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn exploration(&self) -> &ExplorationSchedule {
        &self.exploration
    }

    pub fn exploration_rate(&self) -> f32 {
        self.exploration.rate()
    }

    /// Overrides the exploration rate, clamped into the configured bounds.
    pub fn set_exploration_rate(&mut self, rate: f32) {
        self.exploration.set_rate(rate);
    }

    /// Key of the agent-state checkpoint written next to the model.
    pub fn state_key(&self) -> String {
        format!("{}.agent", self.model_name)
    }

    fn check_state(&self, len: usize) -> Result<()> {
        if len != self.observation_space {
            return Err(DqnError::dimension_mismatch(
                format!("state of length {}", self.observation_space),
                format!("state of length {}", len),
            ));
        }
        Ok(())
    }

    fn checkpoint_model(&mut self) -> Result<()> {
        let bytes = self.approximator.to_bytes()?;
        self.store.put(&self.model_name, &bytes)?;
        log::debug!("Checkpoint model {}", self.model_name);
        Ok(())
    }

    fn checkpoint_state(&mut self) -> Result<()> {
        let state = AgentStateRef {
            exploration_rate: self.exploration.rate(),
            best_mean_reward: self.exploration.best_mean_reward(),
            transitions: self.memory.iter().collect(),
        };
        let bytes = bincode::serialize(&state)?;
        let key = self.state_key();
        self.store.put(&key, &bytes)?;
        log::debug!("Checkpoint agent state {} with {} transitions", key, state.transitions.len());
        Ok(())
    }

    fn restore_state(&mut self) -> Result<()> {
        let key = self.state_key();
        let bytes = match self.store.get(&key)? {
            Some(bytes) => bytes,
            None => {
                log::info!("No agent state under {}, starting exploration from scratch", key);
                return Ok(());
            }
        };
        let state: AgentState = bincode::deserialize(&bytes)?;
        for transition in &state.transitions {
            self.check_state(transition.state.len())?;
            self.check_state(transition.next_state.len())?;
            if transition.action >= self.action_space {
                return Err(DqnError::InvalidAction {
                    action: transition.action,
                    max_actions: self.action_space,
                });
            }
        }
        self.exploration.set_rate(state.exploration_rate);
        self.exploration.set_best_mean_reward(state.best_mean_reward);
        let restored = state.transitions.len();
        self.memory.extend(state.transitions);
        log::info!(
            "Restore agent state {}: exploration rate {}, {} transitions",
            key,
            self.exploration.rate(),
            restored
        );
        Ok(())
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}
