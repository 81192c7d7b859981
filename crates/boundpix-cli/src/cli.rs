// crates/boundpix-cli/src/cli.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Boundpix - decode images straight to a bounded size
#[derive(Parser)]
#[command(name = "boundpix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Number of parallel jobs (0 = auto-detect)
    #[arg(short, long, global = true, default_value = "0")]
    pub jobs: usize,

    #[command(subcommand)]
    pub command: Commands,
}

/// Size caps shared by the decoding commands. Unset values fall back to config.
#[derive(Args, Debug, Clone, Default)]
pub struct BoundArgs {
    /// Maximum short edge in pixels
    #[arg(short, long)]
    pub short_edge: Option<f64>,

    /// Maximum long edge in pixels
    #[arg(short, long)]
    pub long_edge: Option<f64>,

    /// Maximum total pixel count
    #[arg(short, long)]
    pub pixel_limit: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the bounded size for given dimensions without decoding
    Size {
        /// Original width in pixels
        width: u32,

        /// Original height in pixels
        height: u32,

        #[command(flatten)]
        bounds: BoundArgs,
    },

    /// Decode an image to a bounded size and save the preview
    Decode {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        bounds: BoundArgs,

        /// Decode pixels immediately instead of on first access
        #[arg(long)]
        eager: bool,

        /// Preview format (png, jpg, webp, ...). Defaults to the input format
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Output directory (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show container properties of an image
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Decode multiple files to a bounded size
    Batch {
        /// File pattern (e.g., *.png, ./photos/*.jpg)
        pattern: String,

        #[command(flatten)]
        bounds: BoundArgs,

        /// Preview format
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Reset to defaults
    Reset,

    /// Show config file path
    Path,
}
