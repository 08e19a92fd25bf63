//! Experience replay memory for DQN training
//!
//! Stores transitions observed during play in a fixed-capacity FIFO buffer
//! and serves uniformly sampled minibatches. Sampling old transitions
//! decorrelates consecutive training updates, which online Q-learning needs
//! for stability.

use super::encoder::STATE_SIZE;
use rand::{seq::index, Rng};
use std::collections::VecDeque;

/// One recorded interaction with the environment
///
/// Immutable once stored; transitions leave the memory only through FIFO
/// eviction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Encoded state the action was selected in
    pub state: [f32; STATE_SIZE],
    /// Action index taken
    pub action: usize,
    /// Reward received for the step
    pub reward: f32,
    /// Encoded state after the step
    pub next_state: [f32; STATE_SIZE],
    /// Whether the episode terminated on this step
    pub done: bool,
}

/// Fixed-capacity FIFO buffer of transitions with uniform random sampling
///
/// # Example
///
/// ```rust
/// use snake_rl::rl::{ReplayMemory, Transition, STATE_SIZE};
/// use rand::SeedableRng;
///
/// let mut memory = ReplayMemory::new(100);
/// let transition = Transition {
///     state: [0.0; STATE_SIZE],
///     action: 0,
///     reward: 0.1,
///     next_state: [0.0; STATE_SIZE],
///     done: false,
/// };
///
/// for _ in 0..10 {
///     memory.push(transition);
/// }
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let batch = memory.sample(4, &mut rng);
/// assert_eq!(batch.len(), 4);
/// ```
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Create a new replay memory with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one at capacity
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` transitions uniformly at random without replacement
    ///
    /// # Panics
    ///
    /// Panics if fewer than `batch_size` transitions are stored; callers
    /// guard on [`len`](Self::len) first.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<Transition> {
        assert!(self.buffer.len() >= batch_size);

        index::sample(rng, self.buffer.len(), batch_size)
            .iter()
            .map(|i| self.buffer[i])
            .collect()
    }

    /// Number of stored transitions
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the memory holds no transitions
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of transitions the memory can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over stored transitions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}
