//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hubwatch",
    version,
    about = "Event log monitor and analyzer for cable broadband gateways",
    long_about = "Hubwatch polls a cable broadband gateway for its event log, deduplicates and \
                  persists newly observed events, and derives operational insight (outage periods, \
                  channel health, severity trends) from the accumulated history."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/hubwatch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the gateway and record newly observed events
    Watch {
        /// Gateway IP address or hostname (overrides config)
        #[arg(short, long)]
        device: Option<String>,

        /// Path to the event log file (overrides config)
        #[arg(short, long)]
        log_file: Option<PathBuf>,

        /// Polling interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Analyze a recorded event log and print a summary
    Analyze {
        /// Path to the event log (defaults to the configured log file)
        log_file: Option<PathBuf>,

        /// Also export the full summary as JSON
        #[arg(long)]
        json: bool,

        /// Export path (defaults to <log stem>_analysis.json beside the log)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
