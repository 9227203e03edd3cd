//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::DEFAULT_TITLE;

/// quotactl - Declarative Rancher project and namespace quota manager.
#[derive(Parser, Debug)]
#[command(name = "quotactl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "QUOTACTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the API token from this environment variable.
    #[arg(long, global = true)]
    pub token_env_var: Option<String>,

    /// Log level filter (e.g. info, debug, `quotactl=trace`).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log line format.
    #[arg(long, global = true, default_value = "json")]
    pub log_format: LogFormat,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan and apply quotas from the configuration.
    Apply {
        /// Only process this cluster ID (repeatable).
        #[arg(long = "cluster", value_name = "ID")]
        clusters: Vec<String>,

        /// Only process this project name (repeatable).
        #[arg(long = "project", value_name = "NAME")]
        projects: Vec<String>,

        /// Process every configured project.
        #[arg(long)]
        all_projects: bool,

        /// Show the plan without applying it.
        #[arg(long)]
        dry_run: bool,

        /// Apply the plan.
        #[arg(long)]
        apply: bool,

        /// Exit with code 2 instead of 1 when some items fail.
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Write an HTML report of current quotas.
    Report {
        /// Output file.
        #[arg(short, long)]
        output: PathBuf,

        /// Only include this cluster ID (repeatable).
        #[arg(long = "cluster", value_name = "ID")]
        clusters: Vec<String>,

        /// Report title.
        #[arg(long, default_value = DEFAULT_TITLE)]
        title: String,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Log line format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Text,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
