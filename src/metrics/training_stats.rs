//! Training statistics: the persisted record and a rolling progress tracker
//!
//! [`TrainingRecord`] is the artifact written next to the model checkpoint and
//! reloaded across process restarts; it is what makes the best score
//! monotonic over the lifetime of a model. [`TrainingStats`] is in-memory
//! only and smooths recent episodes for progress logging.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use tracing::warn;

/// Persisted training statistics
///
/// Serialized as JSON and updated at every episode termination. Absent or
/// corrupt files load as all-zero defaults so a missing artifact never aborts
/// startup.
///
/// # Example
///
/// ```rust
/// use snake_rl::metrics::TrainingRecord;
///
/// let mut record = TrainingRecord::default();
/// record.record_episode(3, 12);
/// record.record_episode(1, 8);
///
/// assert_eq!(record.total_episodes, 2);
/// assert_eq!(record.best_score, 3);
/// assert_eq!(record.training_time, 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Episodes completed over the lifetime of the model
    pub total_episodes: u64,

    /// Highest score ever reached; never decreases
    pub best_score: u32,

    /// Final score of each episode, in order
    pub average_scores: Vec<u32>,

    /// Total training time in seconds
    pub training_time: u64,
}

impl TrainingRecord {
    /// Load a record from disk, falling back to defaults
    ///
    /// A missing file is normal on first run; a corrupt file is reported and
    /// replaced by defaults rather than aborting.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "corrupt training record, starting fresh");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Write the record as pretty-printed JSON
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {parent:?}"))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize record")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write training record to {path:?}"))?;

        Ok(())
    }

    /// Fold one finished episode into the record
    pub fn record_episode(&mut self, score: u32, elapsed_secs: u64) {
        self.total_episodes += 1;
        self.average_scores.push(score);
        self.training_time += elapsed_secs;
        if score > self.best_score {
            self.best_score = score;
        }
    }

    /// Mean of all recorded episode scores
    pub fn mean_score(&self) -> f32 {
        if self.average_scores.is_empty() {
            0.0
        } else {
            self.average_scores.iter().sum::<u32>() as f32 / self.average_scores.len() as f32
        }
    }
}

/// Rolling-window training progress tracker
///
/// Tracks episode-level metrics (rewards, lengths, scores) and per-step
/// training losses over a recent window for smoothed progress logging.
///
/// # Example
///
/// ```rust
/// use snake_rl::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_episode(15.5, 150, 5);
/// stats.record_update(0.02);
///
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Episode scores (food eaten) (rolling window)
    episode_scores: VecDeque<u32>,

    /// Training losses (rolling window)
    losses: VecDeque<f32>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of environment steps taken
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the most recent `window_size` values
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            losses: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record the loss of one training step
    pub fn record_update(&mut self, loss: f32) {
        Self::push_deque(&mut self.losses, loss, self.window_size);
    }

    /// Mean episode reward over the rolling window
    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean(&self.episode_rewards)
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f32 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f32 / self.episode_lengths.len() as f32
        }
    }

    /// Mean episode score over the rolling window
    pub fn mean_episode_score(&self) -> f32 {
        if self.episode_scores.is_empty() {
            0.0
        } else {
            self.episode_scores.iter().sum::<u32>() as f32 / self.episode_scores.len() as f32
        }
    }

    /// Mean training loss over the rolling window
    pub fn mean_loss(&self) -> f32 {
        Self::mean(&self.losses)
    }

    /// Total number of episodes completed
    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Total number of environment steps taken
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Window size for rolling averages
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a one-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} | Len: {:.1} | Loss: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.mean_episode_length(),
            self.mean_loss(),
        )
    }

    fn mean(deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f32>() / deque.len() as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_defaults() {
        let record = TrainingRecord::default();
        assert_eq!(record.total_episodes, 0);
        assert_eq!(record.best_score, 0);
        assert!(record.average_scores.is_empty());
        assert_eq!(record.training_time, 0);
    }

    #[test]
    fn test_record_episode_accumulates() {
        let mut record = TrainingRecord::default();

        record.record_episode(2, 10);
        record.record_episode(5, 7);
        record.record_episode(1, 3);

        assert_eq!(record.total_episodes, 3);
        assert_eq!(record.best_score, 5);
        assert_eq!(record.average_scores, vec![2, 5, 1]);
        assert_eq!(record.training_time, 20);
    }

    #[test]
    fn test_best_score_is_monotonic() {
        let mut record = TrainingRecord {
            best_score: 10,
            ..Default::default()
        };

        record.record_episode(3, 5);

        assert_eq!(record.best_score, 10);
    }

    #[test]
    fn test_record_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("training_data.json");

        let mut record = TrainingRecord::default();
        record.record_episode(4, 30);
        record.save(&path).unwrap();

        let loaded = TrainingRecord::load(&path);
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_record_load_missing_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = TrainingRecord::load(&temp_dir.path().join("nope.json"));
        assert_eq!(loaded, TrainingRecord::default());
    }

    #[test]
    fn test_record_load_corrupt_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("training_data.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded = TrainingRecord::load(&path);
        assert_eq!(loaded, TrainingRecord::default());
    }

    #[test]
    fn test_record_mean_score() {
        let mut record = TrainingRecord::default();
        assert_eq!(record.mean_score(), 0.0);

        record.record_episode(2, 1);
        record.record_episode(4, 1);
        assert_eq!(record.mean_score(), 3.0);
    }

    #[test]
    fn test_stats_record_episode() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(10.0, 50, 3);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert!((stats.mean_episode_reward() - 10.0).abs() < 1e-5);
        assert!((stats.mean_episode_length() - 50.0).abs() < 1e-5);
        assert!((stats.mean_episode_score() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_stats_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_episode(1.0, 10, 1);
        stats.record_episode(2.0, 20, 2);
        stats.record_episode(3.0, 30, 3);

        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-5);

        // A 4th episode evicts the first from the window
        stats.record_episode(4.0, 40, 4);

        assert_eq!(stats.total_episodes(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_stats_loss_window() {
        let mut stats = TrainingStats::new(2);

        stats.record_update(0.1);
        stats.record_update(0.2);
        assert!((stats.mean_loss() - 0.15).abs() < 1e-5);

        stats.record_update(0.3);
        assert!((stats.mean_loss() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_stats_empty() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.mean_episode_score(), 0.0);
        assert_eq!(stats.mean_loss(), 0.0);
    }

    #[test]
    fn test_stats_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(15.5, 150, 5);
        stats.record_update(0.02);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 150"));
        assert!(summary.contains("Reward: 15.50"));
        assert!(summary.contains("Score: 5.00"));
        assert!(summary.contains("Loss: 0.0200"));
    }
}
