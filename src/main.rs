use anyhow::Result;
use clap::{Parser, ValueEnum};
use snake_rl::game::GameConfig;
use snake_rl::modes::{EvalConfig, EvalMode, TrainConfig, TrainMode};
use snake_rl::rl::{default_device, InferenceBackend, TrainingBackend};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snake_rl")]
#[command(version, about = "Snake game with an online deep Q-learning agent")]
struct Cli {
    /// Execution mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Grid width
    #[arg(long, default_value = "20")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "20")]
    height: usize,

    /// Number of episodes to run
    #[arg(long, default_value = "1000")]
    episodes: usize,

    /// Checkpoint base path
    #[arg(long, default_value = "models/snake_dqn")]
    model: PathBuf,

    /// Training statistics path
    #[arg(long, default_value = "models/training_data.json")]
    stats: PathBuf,

    /// Seed for all stochastic decisions
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log a progress summary every N episodes
    #[arg(long, default_value = "10")]
    log_frequency: usize,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the agent online against a live game
    Train,
    /// Play greedy episodes from a saved checkpoint
    Eval,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();
    let game_config = GameConfig::new(cli.width, cli.height);
    let device = default_device();

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.episodes, cli.model, cli.stats);
            config.game_config = game_config;
            config.seed = cli.seed;
            config.log_frequency = cli.log_frequency;

            let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);
            train_mode.run()
        }
        Mode::Eval => {
            let mut config = EvalConfig::new(cli.episodes, cli.model);
            config.game_config = game_config;
            config.seed = cli.seed;

            let mut eval_mode = EvalMode::<InferenceBackend>::new(config, device)?;
            eval_mode.run()
        }
    }
}
