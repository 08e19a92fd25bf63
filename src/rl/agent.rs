//! DQN agent: epsilon-greedy control plus online Q-learning
//!
//! The agent owns the policy network it trains, a frozen target network used
//! only to compute bootstrap targets, the replay memory, and the exploration
//! schedule. One call to [`DqnAgent::train_step`] performs one minibatch
//! update; the environment loop interleaves these with play, so training is
//! fully online.

use super::config::AgentConfig;
use super::encoder::STATE_SIZE;
use super::memory::{ReplayMemory, Transition};
use super::network::{QNetwork, QNetworkConfig};
use super::persistence::{load_policy, optimizer_path, save_policy, CheckpointMetadata};
use crate::game::Direction;
use anyhow::{Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::{backend::AutodiffBackend, ElementConversion, Int, Tensor, TensorData},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;
use tracing::warn;

/// Deep Q-learning agent for the Snake environment
///
/// Holds two networks with independent parameter storage: the policy network,
/// updated by gradient descent, and the target network, updated only by
/// [`sync_target`](Self::sync_target). The target is synchronized once at
/// construction and after checkpoint restore, never on an automatic schedule;
/// callers that want periodic resynchronization invoke `sync_target`
/// themselves.
///
/// All stochastic choices (exploration coin, random action, replay sampling)
/// draw from one seeded generator, so a fixed seed reproduces the agent's
/// behavior exactly.
///
/// # Example
///
/// ```rust,ignore
/// use snake_rl::rl::{AgentConfig, DqnAgent, TrainingBackend, default_device};
///
/// let device = default_device();
/// let mut agent = DqnAgent::<TrainingBackend>::new(AgentConfig::default(), 42, device);
///
/// let state = [0.0; 12];
/// let action = agent.select_action(&state, true);
/// ```
pub struct DqnAgent<B: AutodiffBackend> {
    /// Policy network, trained by gradient descent
    policy: QNetwork<B>,

    /// Target network for bootstrap targets; only changed by explicit sync
    target: QNetwork<B::InnerBackend>,

    /// Adam optimizer for the policy network
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    /// DQN hyperparameters
    config: AgentConfig,

    /// Replay memory of past transitions
    memory: ReplayMemory,

    /// Current exploration rate; stays within [epsilon_min, 1.0]
    epsilon: f32,

    /// Training steps applied
    train_steps: usize,

    /// Episodes completed
    episodes_trained: usize,

    /// Generator behind all of the agent's stochastic decisions
    rng: StdRng,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create a new agent with freshly initialized networks
    ///
    /// The target network starts as an exact copy of the policy network.
    pub fn new(config: AgentConfig, seed: u64, device: B::Device) -> Self {
        config.validate().expect("Invalid agent configuration");

        let network_config =
            QNetworkConfig::new(STATE_SIZE, Direction::COUNT).with_hidden_dim(config.hidden_dim);
        let policy = network_config.init::<B>(&device);
        let target = policy.clone().valid();

        let optim = AdamConfig::new().init();
        let memory = ReplayMemory::new(config.memory_capacity);
        let epsilon = config.epsilon_start;

        Self {
            policy,
            target,
            optim,
            config,
            memory,
            epsilon,
            train_steps: 0,
            episodes_trained: 0,
            rng: StdRng::seed_from_u64(seed),
            device,
        }
    }

    /// Select an action for the given state
    ///
    /// With `explore` set, a uniform draw at or below epsilon picks a random
    /// action; otherwise (and always when `explore` is false) the action with
    /// the highest policy-network Q-value is returned. The exploration coin is
    /// not drawn at all when `explore` is false.
    pub fn select_action(&mut self, state: &[f32; STATE_SIZE], explore: bool) -> usize {
        if explore && self.rng.gen::<f32>() <= self.epsilon {
            return self.rng.gen_range(0..Direction::COUNT);
        }

        let input = Tensor::<B::InnerBackend, 2>::from_data(
            TensorData::new(state.to_vec(), [1, STATE_SIZE]),
            &self.device,
        );
        let q_values = self.policy.clone().valid().forward(input);

        q_values.argmax(1).into_scalar().elem::<i64>() as usize
    }

    /// Record one transition in replay memory
    ///
    /// Has no training side effect; call [`train_step`](Self::train_step) to
    /// learn from the accumulated memory.
    pub fn observe(
        &mut self,
        state: [f32; STATE_SIZE],
        action: usize,
        reward: f32,
        next_state: [f32; STATE_SIZE],
        done: bool,
    ) {
        self.memory.push(Transition {
            state,
            action,
            reward,
            next_state,
            done,
        });
    }

    /// Perform one minibatch training step on the policy network
    ///
    /// Samples a batch from replay memory and regresses the policy network's
    /// Q-value for each taken action toward
    /// `reward + (1 - done) * gamma * max_a target(next_state)[a]`.
    /// Terminal transitions contribute their reward alone; the bootstrap term
    /// is hard-zeroed. One Adam step updates the policy network only, then
    /// epsilon decays once: `epsilon = max(epsilon_min, epsilon * decay)`.
    ///
    /// Returns 0.0 without touching any state while the memory holds fewer
    /// than `batch_size` transitions. A non-finite loss is reported but the
    /// optimizer step and epsilon decay are skipped, leaving the policy
    /// network intact.
    pub fn train_step(&mut self) -> f32 {
        if self.memory.len() < self.config.batch_size {
            return 0.0;
        }

        let batch = self.memory.sample(self.config.batch_size, &mut self.rng);
        let n = batch.len();

        let mut states = Vec::with_capacity(n * STATE_SIZE);
        let mut next_states = Vec::with_capacity(n * STATE_SIZE);
        let mut actions = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        let mut not_done = Vec::with_capacity(n);

        for transition in &batch {
            states.extend_from_slice(&transition.state);
            next_states.extend_from_slice(&transition.next_state);
            actions.push(transition.action as i32);
            rewards.push(transition.reward);
            not_done.push(if transition.done { 0.0 } else { 1.0 });
        }

        // Bootstrap targets come from the frozen target network; no gradient
        // flows through them.
        let next_input = Tensor::<B::InnerBackend, 2>::from_data(
            TensorData::new(next_states, [n, STATE_SIZE]),
            &self.device,
        );
        let max_next: Tensor<B::InnerBackend, 1> =
            self.target.forward(next_input).max_dim(1).squeeze(1);

        let rewards_t = Tensor::<B::InnerBackend, 1>::from_floats(rewards.as_slice(), &self.device);
        let not_done_t =
            Tensor::<B::InnerBackend, 1>::from_floats(not_done.as_slice(), &self.device);
        let target_q = rewards_t + not_done_t * max_next.mul_scalar(self.config.gamma);
        let target_q = Tensor::<B, 1>::from_data(target_q.into_data(), &self.device);

        // Q-values of the actions actually taken, on the autodiff backend
        let states_t = Tensor::<B, 2>::from_data(
            TensorData::new(states, [n, STATE_SIZE]),
            &self.device,
        );
        let actions_t = Tensor::<B, 1, Int>::from_ints(actions.as_slice(), &self.device);
        let current_q = self
            .policy
            .forward(states_t)
            .gather(1, actions_t.unsqueeze_dim(1))
            .squeeze(1);

        let diff = current_q - target_q;
        let loss = (diff.clone() * diff).mean();
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        if !loss_value.is_finite() {
            warn!(loss = loss_value, "skipping update for non-finite loss");
            return loss_value;
        }

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.policy);
        self.policy = self
            .optim
            .step(self.config.learning_rate, self.policy.clone(), grads);

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.train_steps += 1;

        loss_value
    }

    /// Copy the policy network's parameters into the target network
    ///
    /// Called once at construction and after checkpoint restore. Not invoked
    /// on any automatic schedule: resynchronizing changes training dynamics,
    /// so the cadence is left to the caller.
    pub fn sync_target(&mut self) {
        self.target = self.policy.clone().valid();
    }

    /// Save the agent to a checkpoint
    ///
    /// Writes policy weights, optimizer state, and metadata (epsilon,
    /// counters) next to each other under the given base path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let metadata = CheckpointMetadata::new(
            STATE_SIZE,
            Direction::COUNT,
            self.config.hidden_dim,
            self.epsilon,
            self.train_steps,
            self.episodes_trained,
        );
        save_policy(&self.policy, &metadata, path)?;

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.optim.to_record(), optimizer_path(path))
            .context("Failed to save optimizer state")?;

        Ok(())
    }

    /// Restore the agent from a checkpoint
    ///
    /// Loads policy weights, optimizer state, and epsilon, then synchronizes
    /// the target network so it matches the restored policy. A missing or
    /// unreadable optimizer record degrades to a fresh optimizer with a
    /// warning instead of failing the restore.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let (policy, metadata) = load_policy::<B>(path, &self.device)?;
        self.policy = policy;

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        match recorder.load(optimizer_path(path), &self.device) {
            Ok(record) => {
                let optim: OptimizerAdaptor<Adam, QNetwork<B>, B> = AdamConfig::new().init();
                self.optim = optim.load_record(record);
            }
            Err(err) => {
                warn!(error = %err, "optimizer state unavailable, starting Adam fresh");
            }
        }

        // Keep the invariant epsilon_min <= epsilon <= 1 even if the metadata
        // was edited or truncated.
        self.epsilon = metadata.epsilon.clamp(self.config.epsilon_min, 1.0);
        self.train_steps = metadata.train_steps;
        self.episodes_trained = metadata.episodes_trained;

        self.sync_target();

        Ok(())
    }

    /// Policy-network Q-values for a state
    pub fn q_values(&self, state: &[f32; STATE_SIZE]) -> Vec<f32> {
        let input = Tensor::<B::InnerBackend, 2>::from_data(
            TensorData::new(state.to_vec(), [1, STATE_SIZE]),
            &self.device,
        );
        self.policy
            .clone()
            .valid()
            .forward(input)
            .into_data()
            .to_vec()
            .expect("Q-values convert to a f32 vec")
    }

    /// Target-network Q-values for a state
    pub fn target_q_values(&self, state: &[f32; STATE_SIZE]) -> Vec<f32> {
        let input = Tensor::<B::InnerBackend, 2>::from_data(
            TensorData::new(state.to_vec(), [1, STATE_SIZE]),
            &self.device,
        );
        self.target
            .forward(input)
            .into_data()
            .to_vec()
            .expect("Q-values convert to a f32 vec")
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Number of training steps applied
    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    /// Number of transitions currently in replay memory
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Number of episodes completed
    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    /// Increment the episode counter
    pub fn increment_episode(&mut self) {
        self.episodes_trained += 1;
    }

    /// Get a reference to the agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}
