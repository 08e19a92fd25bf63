//! Training mode: the online episode loop
//!
//! Drives one decision/training cycle per tick against a live game. Each tick
//! encodes the state, asks the agent for an action, advances the game,
//! records the transition, and performs one training step. Episode
//! termination checkpoints the agent, persists statistics, and auto-resets
//! the environment so the loop keeps running.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_rl::modes::{TrainConfig, TrainMode};
//! use snake_rl::rl::{default_device, TrainingBackend};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(
//!     1000,
//!     PathBuf::from("models/snake_dqn"),
//!     PathBuf::from("models/training_data.json"),
//! );
//!
//! let device = default_device();
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);
//! train_mode.run()?;
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::game::{Direction, GameConfig, GameEngine, GameState};
use crate::metrics::{TrainingRecord, TrainingStats};
use crate::rl::{encode_state, AgentConfig, DqnAgent};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to run
    pub num_episodes: usize,

    /// Checkpoint base path (written on every episode termination)
    pub model_path: PathBuf,

    /// Training statistics path
    pub stats_path: PathBuf,

    /// Log a progress summary every N episodes
    pub log_frequency: usize,

    /// Seed for all stochastic decisions (networks, exploration, food)
    pub seed: u64,

    /// Whether the agent learns; disabled, the loop just plays greedily
    pub training: bool,

    /// Game configuration (grid size, rewards)
    pub game_config: GameConfig,

    /// DQN hyperparameters
    pub agent_config: AgentConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    pub fn new(num_episodes: usize, model_path: PathBuf, stats_path: PathBuf) -> Self {
        Self {
            num_episodes,
            model_path,
            stats_path,
            log_frequency: 10,
            seed: 42,
            training: true,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }
}

/// State of the episode loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Ticks advance the game and the agent
    Running,
    /// Ticks are no-ops until resumed
    Paused,
}

/// What one tick of the loop did
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Action index the agent selected
    pub action: usize,
    /// Reward assigned for the step
    pub reward: f32,
    /// Training loss (0.0 while replay memory is still warming up)
    pub loss: f32,
    /// Whether this tick ended the episode (the environment has already
    /// been reset to a fresh episode when set)
    pub episode_ended: bool,
}

/// The online training loop
///
/// Owns the agent and the game engine for the lifetime of the process. A
/// checkpoint and the training record are restored at construction when
/// present, written back at every episode termination, and written one final
/// time when [`run`](Self::run) finishes.
pub struct TrainMode<B: AutodiffBackend> {
    /// DQN agent being trained
    agent: DqnAgent<B>,

    /// Game engine for episode generation
    engine: GameEngine,

    /// Live game state of the current episode
    game: GameState,

    /// Persisted lifetime statistics (best score lives here)
    record: TrainingRecord,

    /// Rolling-window progress tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Current loop state
    loop_state: LoopState,

    /// Cumulative reward of the current episode
    episode_reward: f32,

    /// Steps taken in the current episode
    episode_steps: usize,

    /// Start time of the current episode
    episode_start: Instant,

    /// Episodes completed this session
    episodes_completed: usize,
}

impl<B: AutodiffBackend> TrainMode<B> {
    /// Create a new training mode
    ///
    /// Seeds the backend and all generators from `config.seed`, then restores
    /// the checkpoint and training record if present. Missing or unreadable
    /// artifacts fall back to fresh defaults; they never abort startup.
    pub fn new(config: TrainConfig, device: B::Device) -> Self {
        B::seed(config.seed);

        let mut agent = DqnAgent::new(config.agent_config.clone(), config.seed, device);
        if config.model_path.exists() {
            match agent.load(&config.model_path) {
                Ok(()) => info!(
                    epsilon = agent.epsilon(),
                    episodes = agent.episodes_trained(),
                    "restored agent checkpoint"
                ),
                Err(err) => warn!(error = %err, "unreadable checkpoint, starting fresh"),
            }
        }

        let record = TrainingRecord::load(&config.stats_path);

        let mut engine = GameEngine::new(config.game_config.clone(), config.seed.wrapping_add(1));
        let game = engine.reset();

        // 100-episode rolling window for progress logging
        let stats = TrainingStats::new(100);

        Self {
            agent,
            engine,
            game,
            record,
            stats,
            config,
            loop_state: LoopState::Running,
            episode_reward: 0.0,
            episode_steps: 0,
            episode_start: Instant::now(),
            episodes_completed: 0,
        }
    }

    /// Advance the loop by one tick
    ///
    /// Returns `None` while paused. On termination the environment is reset
    /// within the same tick, so the next call always observes a live episode.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.loop_state == LoopState::Paused {
            return None;
        }

        let state = encode_state(&self.game);
        let action = self.agent.select_action(&state, self.config.training);
        let result = self.engine.step(&mut self.game, Direction::from_index(action));
        let next_state = encode_state(&self.game);

        let mut loss = 0.0;
        if self.config.training {
            self.agent
                .observe(state, action, result.reward, next_state, result.terminated);
            loss = self.agent.train_step();
            if loss != 0.0 {
                self.stats.record_update(loss);
            }
        }

        self.episode_reward += result.reward;
        self.episode_steps += 1;

        if result.terminated {
            self.finish_episode();
        }

        Some(TickOutcome {
            action,
            reward: result.reward,
            loss,
            episode_ended: result.terminated,
        })
    }

    /// Run the loop until the configured number of episodes completes
    ///
    /// Writes a final checkpoint and record before returning.
    pub fn run(&mut self) -> Result<()> {
        self.log_header();

        while self.episodes_completed < self.config.num_episodes {
            let _ = self.tick();
        }

        if self.config.training {
            self.agent
                .save(&self.config.model_path)
                .context("Failed to write final checkpoint")?;
            self.record
                .save(&self.config.stats_path)
                .context("Failed to write final training record")?;
        }

        info!(
            best_score = self.record.best_score,
            epsilon = self.agent.epsilon(),
            "training complete: {}",
            self.stats.format_summary()
        );

        Ok(())
    }

    /// Pause the loop; honored at the next tick boundary
    pub fn pause(&mut self) {
        self.loop_state = LoopState::Paused;
    }

    /// Resume a paused loop
    pub fn resume(&mut self) {
        self.loop_state = LoopState::Running;
    }

    /// Current loop state
    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Live game state (for embedding and tests)
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// The agent being trained
    pub fn agent(&self) -> &DqnAgent<B> {
        &self.agent
    }

    /// Persisted lifetime statistics
    pub fn record(&self) -> &TrainingRecord {
        &self.record
    }

    /// Episodes completed this session
    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Close out the finished episode and reset the environment
    ///
    /// Best-effort persistence: a failed write is reported and the loop keeps
    /// running.
    fn finish_episode(&mut self) {
        let score = self.game.score;
        let elapsed_secs = self.episode_start.elapsed().as_secs();

        self.record.record_episode(score, elapsed_secs);
        self.stats
            .record_episode(self.episode_reward, self.episode_steps, score);
        self.agent.increment_episode();
        self.episodes_completed += 1;

        if self.config.training {
            if let Err(err) = self.agent.save(&self.config.model_path) {
                warn!(error = %err, "failed to write checkpoint");
            }
            if let Err(err) = self.record.save(&self.config.stats_path) {
                warn!(error = %err, "failed to write training record");
            }
        }

        if self.episodes_completed % self.config.log_frequency == 0 {
            info!(
                episode = self.episodes_completed,
                epsilon = self.agent.epsilon(),
                best_score = self.record.best_score,
                "{}",
                self.stats.format_summary()
            );
        }

        // Fresh episode: snake re-centered, new food, score 0
        self.game = self.engine.reset();
        self.episode_reward = 0.0;
        self.episode_steps = 0;
        self.episode_start = Instant::now();
    }

    fn log_header(&self) {
        info!(
            episodes = self.config.num_episodes,
            grid_width = self.config.game_config.grid_width,
            grid_height = self.config.game_config.grid_height,
            gamma = self.agent.config().gamma,
            learning_rate = self.agent.config().learning_rate,
            batch_size = self.agent.config().batch_size,
            memory_capacity = self.agent.config().memory_capacity,
            training = self.config.training,
            seed = self.config.seed,
            "starting DQN training"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{default_device, TrainingBackend};
    use tempfile::TempDir;

    fn test_train_config(dir: &TempDir, seed: u64) -> TrainConfig {
        let mut config = TrainConfig::new(
            3,
            dir.path().join("model"),
            dir.path().join("training_data.json"),
        );
        config.game_config = GameConfig::small();
        config.agent_config.batch_size = 8;
        config.agent_config.memory_capacity = 256;
        config.seed = seed;
        config.log_frequency = 100;
        config
    }

    fn test_mode(dir: &TempDir, seed: u64) -> TrainMode<TrainingBackend> {
        TrainMode::new(test_train_config(dir, seed), default_device())
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(
            1000,
            PathBuf::from("model"),
            PathBuf::from("training_data.json"),
        );
        assert_eq!(config.num_episodes, 1000);
        assert!(config.training);
        assert_eq!(config.model_path, PathBuf::from("model"));
    }

    #[test]
    fn test_train_mode_creation() {
        let temp_dir = TempDir::new().unwrap();
        let mode = test_mode(&temp_dir, 42);

        assert_eq!(mode.loop_state(), LoopState::Running);
        assert_eq!(mode.episodes_completed(), 0);
        assert!(mode.game().is_alive);
    }

    #[test]
    fn test_tick_advances_the_game() {
        let temp_dir = TempDir::new().unwrap();
        let mut mode = test_mode(&temp_dir, 42);

        let outcome = mode.tick().unwrap();

        assert!(outcome.action < Direction::COUNT);
        assert!(outcome.reward.is_finite());
    }

    #[test]
    fn test_pause_stops_ticks_at_boundaries() {
        let temp_dir = TempDir::new().unwrap();
        let mut mode = test_mode(&temp_dir, 42);

        mode.tick().unwrap();
        let steps_before = mode.game().steps;

        mode.pause();
        assert!(mode.tick().is_none());
        assert_eq!(mode.game().steps, steps_before);

        mode.resume();
        assert!(mode.tick().is_some());
    }

    #[test]
    fn test_termination_resets_to_fresh_episode() {
        let temp_dir = TempDir::new().unwrap();
        let mut mode = test_mode(&temp_dir, 42);

        // With epsilon at 1.0 every action is random; on a 10x10 board the
        // snake dies well within this many ticks
        let mut ended = false;
        for _ in 0..5000 {
            let outcome = mode.tick().unwrap();
            if outcome.episode_ended {
                assert_eq!(outcome.reward, -10.0);
                ended = true;
                break;
            }
        }
        assert!(ended, "no episode terminated within 5000 ticks");

        // The tick that ended the episode already reset the environment
        let game = mode.game();
        assert!(game.is_alive);
        assert_eq!(game.score, 0);
        assert_eq!(game.steps, 0);
        assert_eq!(mode.episodes_completed(), 1);
        assert_eq!(mode.record().total_episodes, 1);
    }

    #[test]
    fn test_episode_end_persists_checkpoint_and_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut mode = test_mode(&temp_dir, 42);

        while mode.episodes_completed() < 1 {
            let _ = mode.tick();
        }

        assert!(temp_dir.path().join("model.mpk").exists());
        assert!(temp_dir.path().join("model.meta.json").exists());
        assert!(temp_dir.path().join("training_data.json").exists());
    }

    #[test]
    fn test_restart_restores_best_score() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut mode = test_mode(&temp_dir, 42);
            while mode.episodes_completed() < 2 {
                let _ = mode.tick();
            }
        }

        // A new session against the same paths picks up the record
        let mode = test_mode(&temp_dir, 43);
        assert_eq!(mode.record().total_episodes, 2);
    }

    #[test]
    fn test_fixed_seed_reproduces_run() {
        let run = |seed: u64| -> (Vec<(usize, u32)>, f32) {
            let temp_dir = TempDir::new().unwrap();
            let mut mode = test_mode(&temp_dir, seed);

            let mut trace = Vec::new();
            for _ in 0..80 {
                let outcome = mode.tick().unwrap();
                trace.push((outcome.action, outcome.reward.to_bits()));
            }
            (trace, mode.agent().epsilon())
        };

        let (trace_a, epsilon_a) = run(7);
        let (trace_b, epsilon_b) = run(7);

        assert_eq!(trace_a, trace_b);
        assert_eq!(epsilon_a, epsilon_b);
    }

    #[test]
    fn test_run_completes_requested_episodes() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_train_config(&temp_dir, 42);
        config.num_episodes = 2;

        let mut mode = TrainMode::<TrainingBackend>::new(config, default_device());
        mode.run().unwrap();

        assert_eq!(mode.episodes_completed(), 2);
        assert_eq!(mode.record().total_episodes, 2);
    }
}
