//! Checkpoint persistence for the DQN agent
//!
//! A checkpoint is three files derived from one base path:
//! - `<path>.mpk` - policy network weights (Burn record format)
//! - `<path>_optim.mpk` - Adam optimizer state
//! - `<path>.meta.json` - metadata (dimensions, epsilon, counters) as JSON
//!
//! The weight and metadata halves are handled here; the agent adds the
//! optimizer record on top since its type is tied to the agent's backend.

use super::network::{QNetwork, QNetworkConfig};
use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Metadata saved with a checkpoint
///
/// Contains the network dimensions needed to rebuild the module before
/// loading weights into it, plus the scalar training state that lives
/// outside the network: epsilon and the step/episode counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Number of input features the network was built for
    pub state_size: usize,

    /// Number of actions the network scores
    pub action_size: usize,

    /// Hidden layer width
    pub hidden_dim: usize,

    /// Exploration rate at save time
    pub epsilon: f32,

    /// Training steps completed
    pub train_steps: usize,

    /// Episodes completed
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl CheckpointMetadata {
    /// Create new metadata stamped with the crate version
    pub fn new(
        state_size: usize,
        action_size: usize,
        hidden_dim: usize,
        epsilon: f32,
        train_steps: usize,
        episodes_trained: usize,
    ) -> Self {
        Self {
            state_size,
            action_size,
            hidden_dim,
            epsilon,
            train_steps,
            episodes_trained,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata sidecar for a checkpoint base path
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Path of the optimizer record for a checkpoint base path
///
/// Uses a distinct file stem so the recorder's own extension handling cannot
/// collide with the weight file.
pub fn optimizer_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("checkpoint");
    path.with_file_name(format!("{stem}_optim"))
}

/// Save a policy network and its metadata
///
/// Creates parent directories if they don't exist.
pub fn save_policy<B: Backend>(
    network: &QNetwork<B>,
    metadata: &CheckpointMetadata,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {parent:?}"))?;
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(network.clone().into_record(), path.to_path_buf())
        .context("Failed to save network weights")?;

    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {meta_path:?}"))?;

    Ok(())
}

/// Load a policy network and its metadata from a checkpoint
///
/// Rebuilds the network from the recorded dimensions, then loads the weights
/// into it. Works on any backend, so the same checkpoint serves training
/// restore and inference-only playback.
pub fn load_policy<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, CheckpointMetadata)> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {meta_path:?}"))?;
    let metadata: CheckpointMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let network_config = QNetworkConfig::new(metadata.state_size, metadata.action_size)
        .with_hidden_dim(metadata.hidden_dim);
    let mut network = network_config.init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {path:?}"))?;

    network = network.load_record(record);

    Ok((network, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{InferenceBackend, STATE_SIZE};
    use burn::backend::ndarray::NdArrayDevice;
    use burn::tensor::{Tensor, TensorData};
    use tempfile::TempDir;

    #[test]
    fn test_metadata_creation() {
        let metadata = CheckpointMetadata::new(12, 4, 256, 0.5, 1000, 100);

        assert_eq!(metadata.state_size, 12);
        assert_eq!(metadata.action_size, 4);
        assert_eq!(metadata.epsilon, 0.5);
        assert_eq!(metadata.train_steps, 1000);
        assert_eq!(metadata.episodes_trained, 100);
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = CheckpointMetadata::new(12, 4, 256, 0.25, 1000, 100);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: CheckpointMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.state_size, 12);
        assert_eq!(deserialized.epsilon, 0.25);
        assert_eq!(deserialized.train_steps, 1000);
    }

    #[test]
    fn test_optimizer_path_is_distinct() {
        let path = Path::new("models/snake_dqn");
        let optim = optimizer_path(path);

        assert_eq!(optim, PathBuf::from("models/snake_dqn_optim"));
        assert_ne!(optim, path);
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model");

        let device = NdArrayDevice::default();
        let config = QNetworkConfig::new(STATE_SIZE, 4);
        let network = config.init::<InferenceBackend>(&device);
        let metadata = CheckpointMetadata::new(STATE_SIZE, 4, 256, 0.42, 7, 3);

        save_policy(&network, &metadata, &path).unwrap();

        let (restored, restored_meta) =
            load_policy::<InferenceBackend>(&path, &device).unwrap();

        assert_eq!(restored_meta.epsilon, 0.42);
        assert_eq!(restored_meta.train_steps, 7);

        // The restored network must produce identical outputs
        let input = Tensor::ones([1, STATE_SIZE], &device);
        let original: TensorData = network.forward(input.clone()).into_data();
        let loaded: TensorData = restored.forward(input).into_data();

        assert_eq!(
            original.as_slice::<f32>().unwrap(),
            loaded.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_load_missing_checkpoint_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("does_not_exist");

        let device = NdArrayDevice::default();
        assert!(load_policy::<InferenceBackend>(&path, &device).is_err());
    }
}
