//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Garuda using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Garuda - SIMRS to SatuSehat publishing worker
#[derive(Parser, Debug)]
#[command(name = "garuda")]
#[command(version, about, long_about = None)]
#[command(author = "Garuda Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "garuda.toml", env = "GARUDA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GARUDA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the worker and run the periodic jobs until interrupted
    Start(commands::start::StartArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show per-status visit record counts
    Status(commands::status::StatusArgs),

    /// Write an example configuration file
    Init(commands::init::InitArgs),
}
