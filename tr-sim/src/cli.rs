//! Root CLI structure for tr-sim

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tr-sim")]
#[command(about = "Run deterministic item simulation scenarios", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the contents of a scenario
    Info {
        /// Path to the scenario file (.yaml, .yml or .json)
        file: PathBuf,
    },

    /// Step a scenario and report the final item states
    Run {
        /// Path to the scenario file (.yaml, .yml or .json)
        file: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value_t = 30)]
        ticks: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Record item states every N ticks (0 records only the final state)
        #[arg(short, long, value_name = "N", default_value_t = 1)]
        every: u32,

        /// Write the save snapshot after the last tick (.json or .yaml)
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,

        /// Restore a save snapshot before the first tick
        #[arg(long, value_name = "PATH")]
        restore: Option<PathBuf>,
    },

    /// Classify an actor standing at a point against the scenario's room
    Probe {
        /// Path to the scenario file (.yaml, .yml or .json)
        file: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        x: i32,

        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        y: i32,

        #[arg(long, allow_hyphen_values = true)]
        z: i32,

        /// Heading as a binary angle (0x10000 per turn)
        #[arg(long, default_value_t = 0)]
        angle: u16,

        /// Room the probe starts in
        #[arg(long, default_value_t = 0)]
        room: u16,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
