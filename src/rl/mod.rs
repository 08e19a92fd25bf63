//! Deep Q-learning core for the Snake game
//!
//! Provides:
//! - 12-feature state encoding of the game geometry
//! - Fixed-capacity replay memory with uniform sampling
//! - Q-network (policy and target instances)
//! - DQN agent: epsilon-greedy selection, online training, checkpointing
//! - Backend-agnostic tensor operations

pub mod agent;
pub mod backend;
pub mod config;
pub mod encoder;
pub mod memory;
pub mod network;
pub mod persistence;

pub use agent::DqnAgent;
pub use backend::{default_device, InferenceBackend, TrainingBackend};
pub use config::AgentConfig;
pub use encoder::{encode_state, STATE_SIZE};
pub use memory::{ReplayMemory, Transition};
pub use network::{QNetwork, QNetworkConfig};
pub use persistence::{load_policy, save_policy, CheckpointMetadata};
