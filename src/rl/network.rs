//! Q-network for the Snake DQN agent
//!
//! A small fully-connected network mapping the 12-feature state encoding to
//! one value estimate per action.
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 12]
//!   ↓ Linear(12 → 256) + ReLU
//!   ↓ Linear(256 → 256) + ReLU
//!   ↓ Linear(256 → 4)
//! Output: [batch, 4] raw Q-values
//! ```
//!
//! The output layer is linear: Q-values are unbounded. The agent holds two
//! instances of this network: the policy network it trains and a target
//! network it only ever overwrites by explicit synchronization.
//!
//! # Example
//!
//! ```rust
//! use snake_rl::rl::{QNetworkConfig, STATE_SIZE};
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let config = QNetworkConfig::new(STATE_SIZE, 4);
//! let network = config.init::<Backend>(&device);
//!
//! let state = Tensor::zeros([1, STATE_SIZE], &device);
//! let q_values = network.forward(state);
//!
//! assert_eq!(q_values.dims(), [1, 4]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::relu, backend::Backend, Tensor},
};

/// Configuration for the Q-network
#[derive(Debug, Clone)]
pub struct QNetworkConfig {
    /// Number of input features
    pub state_size: usize,

    /// Number of actions the network scores
    pub action_size: usize,

    /// Width of the two hidden layers (default: 256)
    pub hidden_dim: usize,
}

impl QNetworkConfig {
    /// Create a new configuration with the default hidden width
    pub fn new(state_size: usize, action_size: usize) -> Self {
        Self {
            state_size,
            action_size,
            hidden_dim: 256,
        }
    }

    /// Override the hidden layer width
    pub fn with_hidden_dim(mut self, hidden_dim: usize) -> Self {
        self.hidden_dim = hidden_dim;
        self
    }

    /// Initialize a Q-network from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc1: LinearConfig::new(self.state_size, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            out: LinearConfig::new(self.hidden_dim, self.action_size).init(device),
        }
    }
}

/// Fully-connected action-value network
///
/// Generic over the Burn backend so the same module serves training
/// (`Autodiff<NdArray<f32>>`) and inference (`NdArray<f32>`).
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    /// First hidden layer
    fc1: Linear<B>,
    /// Second hidden layer
    fc2: Linear<B>,
    /// Linear output head: one Q-value per action
    out: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass through the network
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor with shape `[batch, state_size]`
    ///
    /// # Returns
    ///
    /// Tensor with shape `[batch, action_size]` of raw, unbounded Q-values.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(input));
        let x = relu(self.fc2.forward(x));
        self.out.forward(x)
    }
}
