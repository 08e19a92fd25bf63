//! DQN hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the DQN agent
///
/// Default values are tuned for online training against the Snake
/// environment.
///
/// # Example
///
/// ```rust
/// use snake_rl::rl::AgentConfig;
///
/// // Use default hyperparameters
/// let config = AgentConfig::default();
///
/// // Or customize specific parameters
/// let config = AgentConfig {
///     batch_size: 32,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Discount factor for future rewards (gamma)
    ///
    /// Values closer to 1.0 make the agent more far-sighted.
    ///
    /// Default: 0.95
    pub gamma: f32,

    /// Initial exploration rate
    ///
    /// Probability of taking a uniformly random action instead of the
    /// greedy one at the start of training.
    ///
    /// Default: 1.0
    pub epsilon_start: f32,

    /// Exploration rate floor
    ///
    /// Epsilon never decays below this value.
    ///
    /// Default: 0.01
    pub epsilon_min: f32,

    /// Multiplicative epsilon decay applied once per training step
    ///
    /// Default: 0.995
    pub epsilon_decay: f32,

    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Minibatch size sampled from replay memory per training step
    ///
    /// Default: 64
    pub batch_size: usize,

    /// Maximum number of transitions held in replay memory
    ///
    /// Default: 10_000
    pub memory_capacity: usize,

    /// Hidden layer width of the Q-network
    ///
    /// Default: 256
    pub hidden_dim: usize,
}

impl AgentConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error
    /// message otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_rl::rl::AgentConfig;
    ///
    /// let mut config = AgentConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.learning_rate = -0.1;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.epsilon_min <= 0.0 {
            return Err(format!(
                "epsilon_min must be positive, got {}",
                self.epsilon_min
            ));
        }

        if self.epsilon_start < self.epsilon_min || self.epsilon_start > 1.0 {
            return Err(format!(
                "epsilon_start must be in [epsilon_min, 1], got {}",
                self.epsilon_start
            ));
        }

        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.memory_capacity < self.batch_size {
            return Err(format!(
                "memory_capacity ({}) cannot be smaller than batch_size ({})",
                self.memory_capacity, self.batch_size
            ));
        }

        if self.hidden_dim == 0 {
            return Err("hidden_dim must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 1e-3,
            batch_size: 64,
            memory_capacity: 10_000,
            hidden_dim: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.gamma, 0.95);
        assert_eq!(config.epsilon_start, 1.0);
        assert_eq!(config.epsilon_min, 0.01);
        assert_eq!(config.epsilon_decay, 0.995);
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.memory_capacity, 10_000);
        assert_eq!(config.hidden_dim, 256);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = AgentConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_ordering() {
        let mut config = AgentConfig::default();
        config.epsilon_start = 0.005; // below epsilon_min
        assert!(config.validate().is_err());

        config.epsilon_start = 1.5;
        assert!(config.validate().is_err());

        config.epsilon_start = 1.0;
        config.epsilon_min = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_decay_range() {
        let mut config = AgentConfig::default();
        config.epsilon_decay = 0.0;
        assert!(config.validate().is_err());

        config.epsilon_decay = 1.5;
        assert!(config.validate().is_err());

        config.epsilon_decay = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let mut config = AgentConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_batch_size() {
        let mut config = AgentConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_capacity_below_batch_size() {
        let mut config = AgentConfig::default();
        config.memory_capacity = 32;
        config.batch_size = 64;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_config() {
        let config = AgentConfig {
            gamma: 0.99,
            batch_size: 32,
            ..Default::default()
        };
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.epsilon_decay, 0.995); // From default
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = AgentConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.gamma, config.gamma);
        assert_eq!(restored.batch_size, config.batch_size);
    }
}
