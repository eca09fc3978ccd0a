//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "plateau", version, about = "Find temperature plateaus in logger files")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect plateaus and write a summary table per file
    Analyze {
        /// Log files or directories (directories are searched for input.extension)
        #[arg(value_name = "PATH", default_value = ".")]
        inputs: Vec<PathBuf>,
        /// Output directory (overrides output.dir)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Max (max - min) per channel inside a window
        #[arg(long, value_name = "DEGC")]
        tolerance: Option<f64>,
        /// Window length in rows
        #[arg(long, value_name = "ROWS")]
        num_points: Option<usize>,
        /// Stride between windows in rows
        #[arg(long, value_name = "ROWS")]
        step_size: Option<usize>,
        /// Minimum change of the first channel between plateaus
        #[arg(long, value_name = "DEGC")]
        plateau_threshold: Option<f64>,
        /// Use the [explicit] ranges from the config instead of detection
        #[arg(long, action = ArgAction::SetTrue)]
        explicit: bool,
        /// Also write <stem>_overlay.csv marking plateau rows for plotting
        #[arg(long, action = ArgAction::SetTrue)]
        plot: bool,
        /// Skip time-axis synchronization
        #[arg(long, action = ArgAction::SetTrue)]
        no_sync: bool,
    },
    /// Show which columns of a file would be analyzed
    Channels {
        /// Log file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
