//! CLI command implementations for snmp-poller.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: One poll cycle per instance with a printed summary
//! - `run`: Continuous polling at the collection interval
//! - `config`: Sample configuration file generation

pub mod check;
pub mod config;
pub mod run;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use run::command_run;
