//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ChaosGuard CLI
#[derive(Debug, Parser)]
#[command(name = "chaosguard-cli")]
#[command(author, version, about = "Drive orders through a chaotic dependency", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, env = "CHAOSGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Time limit of protected orders in milliseconds, overriding the config
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Place orders against the external service
    Order {
        /// Route through circuit breaker, time limit and fallback
        #[arg(short, long)]
        protected: bool,

        /// Number of orders to place
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Place all orders at once instead of one after another
        #[arg(long)]
        parallel: bool,
    },

    /// Apply a demo scenario and place orders under it
    ///
    /// 1 Normal, 2 Chaos Latency, 3 Chaos + Failures, 4 Managed Chaos.
    /// Scenario 4 uses the protected path; the others the unprotected one.
    Scenario {
        /// Scenario number (1-4)
        number: u8,

        /// Number of orders to place
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,

        /// Force the protected path regardless of scenario
        #[arg(short, long)]
        protected: bool,
    },

    /// Walk through all four scenarios in order
    Demo {
        /// Orders placed per scenario
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,
    },

    /// Print breaker, injection and chaos statistics
    Status,

    /// Print the state of the breaker guarding the external service
    Breaker {
        /// Force the breaker closed first
        #[arg(long)]
        reset: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
