pub mod cli;
pub mod server;
pub mod settings;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "defensive-kit")]
#[command(about = "Defensive programming toolkit: validation, fail-safe defaults, sanitization and limits")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage of long-running commands")]
    pub monitor: bool,

    #[arg(long, global = true, conflicts_with = "log_file", help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, global = true, help = "Also write DEBUG logs to this file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a user profile JSON file
    Validate { profile: PathBuf },

    /// Load runtime settings, falling back to defaults
    Settings { path: PathBuf },

    /// Call a JSON API with a fail-safe response
    Fetch {
        url: String,
        #[arg(long, default_value = "5")]
        timeout: u64,
    },

    /// Fetch page titles concurrently
    Scrape {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value = "5")]
        workers: usize,
        #[arg(long, default_value = "5")]
        timeout: u64,
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },

    /// Run a command (no shell) with a timeout
    Run {
        command_line: String,
        #[arg(long, default_value = "5")]
        timeout: u64,
    },

    /// Sanitize untrusted input
    Sanitize {
        #[command(subcommand)]
        target: SanitizeTarget,
    },

    /// Generate a random hex API key
    Keygen {
        #[arg(long, default_value = "20")]
        bytes: usize,
    },

    /// Walk through every technique with built-in sample data
    Tour,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum SanitizeTarget {
    /// Escape text for HTML output
    Html { text: String },
    /// Resolve a user path inside a base directory
    Path { base: PathBuf, user_path: String },
}
