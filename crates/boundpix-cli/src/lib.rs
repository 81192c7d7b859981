pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

pub use cli::{BoundArgs, Cli, Commands, ConfigCommands};
pub use config::Config;
pub use output::OutputFormatter;
pub use progress::ProgressReporter;
