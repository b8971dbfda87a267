//! CLI arguments and subcommands for snmp-poller.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "snmp-poller",
    about = "SNMP polling engine that walks device tables and emits typed, tagged metric samples",
    long_about = "SNMP polling engine that walks device tables and emits typed, tagged metric samples.\n\n\
                  Polls configured devices with get-next table walks, resolves OIDs into named \
                  metrics through a built-in MIB symbol registry, classifies values as counters \
                  or gauges, and attaches tags derived from table indexes and sibling columns.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Print effective config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one poll cycle per instance and print the collected samples
    Check {
        /// Only poll the instance with this IP address
        #[arg(short = 'i', long)]
        instance: Option<String>,

        /// Show every submitted sample, not just the summary
        #[arg(long)]
        verbose: bool,
    },

    /// Poll all instances continuously at the collection interval
    Run {
        /// Override the collection interval (seconds)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Generate a sample configuration file
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
