//! Evaluation mode for watching a trained policy play
//!
//! Loads a checkpointed policy network onto the inference backend and runs
//! greedy episodes with no exploration, no training, no replay memory. Scores
//! are reported per episode and summarized at the end.

use anyhow::Result;
use burn::tensor::{backend::Backend, ElementConversion, Tensor, TensorData};
use std::path::PathBuf;
use tracing::info;

use crate::game::{Direction, GameConfig, GameEngine};
use crate::rl::{encode_state, load_policy, QNetwork, STATE_SIZE};

/// Configuration for evaluation mode
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Number of episodes to play
    pub num_episodes: usize,

    /// Checkpoint base path to load the policy from
    pub model_path: PathBuf,

    /// Hard cap per episode; a looping policy otherwise never terminates
    pub max_steps_per_episode: u32,

    /// Seed for food placement
    pub seed: u64,

    /// Game configuration (grid size, rewards)
    pub game_config: GameConfig,
}

impl EvalConfig {
    /// Create a new evaluation configuration with defaults
    pub fn new(num_episodes: usize, model_path: PathBuf) -> Self {
        Self {
            num_episodes,
            model_path,
            max_steps_per_episode: 1000,
            seed: 42,
            game_config: GameConfig::default(),
        }
    }
}

/// Greedy playback of a trained policy
pub struct EvalMode<B: Backend> {
    /// Loaded policy network
    network: QNetwork<B>,

    /// Game engine for episode generation
    engine: GameEngine,

    /// Evaluation configuration
    config: EvalConfig,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: Backend> EvalMode<B> {
    /// Load the checkpoint and set up the environment
    ///
    /// Unlike training, evaluation has nothing sensible to do without a
    /// checkpoint, so a missing model is an error here.
    pub fn new(config: EvalConfig, device: B::Device) -> Result<Self> {
        let (network, metadata) = load_policy::<B>(&config.model_path, &device)?;
        info!(
            train_steps = metadata.train_steps,
            episodes_trained = metadata.episodes_trained,
            epsilon = metadata.epsilon,
            "loaded checkpoint"
        );

        let engine = GameEngine::new(config.game_config.clone(), config.seed);

        Ok(Self {
            network,
            engine,
            config,
            device,
        })
    }

    /// Play the configured number of episodes
    pub fn run(&mut self) -> Result<()> {
        let mut total_score = 0u32;
        let mut best_score = 0u32;

        for episode in 1..=self.config.num_episodes {
            let (score, steps, reward) = self.run_episode();
            total_score += score;
            best_score = best_score.max(score);

            info!(episode, score, steps, reward, "episode finished");
        }

        info!(
            episodes = self.config.num_episodes,
            mean_score = total_score as f32 / self.config.num_episodes as f32,
            best_score,
            "evaluation complete"
        );

        Ok(())
    }

    /// Play one greedy episode; returns (score, steps, total reward)
    fn run_episode(&mut self) -> (u32, u32, f32) {
        let mut game = self.engine.reset();
        let mut total_reward = 0.0;

        while game.is_alive && game.steps < self.config.max_steps_per_episode {
            let features = encode_state(&game);
            let action = self.greedy_action(&features);
            let result = self.engine.step(&mut game, Direction::from_index(action));

            total_reward += result.reward;
            if result.terminated {
                break;
            }
        }

        (game.score, game.steps, total_reward)
    }

    /// Index of the highest-valued action for the encoded state
    fn greedy_action(&self, features: &[f32; STATE_SIZE]) -> usize {
        let input = Tensor::<B, 2>::from_data(
            TensorData::new(features.to_vec(), [1, STATE_SIZE]),
            &self.device,
        );

        self.network
            .forward(input)
            .argmax(1)
            .into_scalar()
            .elem::<i64>() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{default_device, AgentConfig, DqnAgent, InferenceBackend, TrainingBackend};
    use tempfile::TempDir;

    fn saved_checkpoint(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("model");
        let agent = DqnAgent::<TrainingBackend>::new(AgentConfig::default(), 42, default_device());
        agent.save(&path).unwrap();
        path
    }

    #[test]
    fn test_eval_requires_checkpoint() {
        let temp_dir = TempDir::new().unwrap();
        let config = EvalConfig::new(1, temp_dir.path().join("missing"));

        assert!(EvalMode::<InferenceBackend>::new(config, default_device()).is_err());
    }

    #[test]
    fn test_eval_plays_episodes() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = saved_checkpoint(&temp_dir);

        let mut config = EvalConfig::new(2, model_path);
        config.game_config = GameConfig::small();
        config.max_steps_per_episode = 50;

        let mut mode = EvalMode::<InferenceBackend>::new(config, default_device()).unwrap();

        let (score, steps, reward) = mode.run_episode();
        assert!(steps > 0);
        assert!(steps <= 50);
        assert!(score <= steps); // at most one food per step
        assert!(reward.is_finite());

        mode.run().unwrap();
    }
}
