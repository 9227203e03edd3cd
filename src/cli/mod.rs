//! CLI module for quotactl.
//!
//! This module provides the command-line interface for planning and
//! applying Rancher quotas.

mod commands;
mod output;

pub use commands::{Cli, Commands, LogFormat, OutputFormat};
pub use output::OutputFormatter;
