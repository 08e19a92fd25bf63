pub mod eval;
pub mod train;

pub use eval::{EvalConfig, EvalMode};
pub use train::{LoopState, TickOutcome, TrainConfig, TrainMode};
