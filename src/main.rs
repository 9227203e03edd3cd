//! quotactl CLI entrypoint.
//!
//! This is the main entrypoint for the quotactl command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use quotactl::cli::{Cli, Commands, LogFormat, OutputFormatter};
use quotactl::config::{ConfigParser, ConfigValidator, InstanceConfig, find_config_file};
use quotactl::error::Result;
use quotactl::planner::{ExecutionSummary, Executor, PlanSelection, Planner};
use quotactl::rancher::RancherClient;
use quotactl::report::generate_report;

use tracing::{Instrument, debug, error, info_span};
use tracing_subscriber::EnvFilter;

/// Exit code for a run where some items failed under `--continue-on-error`.
const EXIT_PARTIAL_FAILURE: u8 = 2;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(&cli.log_level, cli.log_format);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            error!(kind = ?e.kind(), "{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.format);

    match cli.command {
        Commands::Apply {
            clusters,
            projects,
            all_projects,
            dry_run,
            apply,
            continue_on_error,
        } => {
            if dry_run == apply {
                eprintln!("Error: exactly one of --dry-run or --apply must be specified");
                return Ok(ExitCode::FAILURE);
            }

            let config = load_config(cli.config.as_ref(), cli.token_env_var)?;
            let selection = PlanSelection {
                cluster_ids: clusters,
                project_names: projects,
                all_projects,
            };
            let span = info_span!("run", instance = %config.url);
            cmd_apply(&config, &selection, dry_run, continue_on_error, &formatter)
                .instrument(span)
                .await
        }
        Commands::Report {
            output,
            clusters,
            title,
        } => {
            let config = load_config(cli.config.as_ref(), cli.token_env_var)?;
            let span = info_span!("run", instance = %config.url);
            cmd_report(&config, &output, &clusters, &title, &formatter)
                .instrument(span)
                .await
        }
    }
}

/// Plan and optionally apply quotas.
async fn cmd_apply(
    config: &InstanceConfig,
    selection: &PlanSelection,
    dry_run: bool,
    continue_on_error: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let client = RancherClient::new(&config.url, &config.token, config.client_options())?;

    let items = Planner::new(&client, config).create_plan(selection).await?;

    eprintln!("{}", formatter.format_plan(&items));
    if items.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let results = Executor::new(&client).execute(&items, dry_run).await;
    let summary = ExecutionSummary::summarize(&results);
    eprintln!("{}", formatter.format_summary(&summary, dry_run));

    if summary.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else if continue_on_error {
        Ok(ExitCode::from(EXIT_PARTIAL_FAILURE))
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Write the HTML quota report.
async fn cmd_report(
    config: &InstanceConfig,
    output: &Path,
    clusters: &[String],
    title: &str,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let client = RancherClient::new(&config.url, &config.token, config.client_options())?;

    generate_report(&client, client.base_url(), output, clusters, title).await?;

    eprintln!("{}", formatter.format_report_written(output));
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads, validates and resolves the configuration.
fn load_config(
    config_path: Option<&PathBuf>,
    token_env_var: Option<String>,
) -> Result<InstanceConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new()
        .with_base_path(config_file.parent().unwrap_or_else(|| Path::new(".")))
        .with_token_env_var(token_env_var);
    parser.load_dotenv()?;

    let config = parser.load_file(&config_file)?;
    ConfigValidator::new().validate(&config)?;

    parser.resolve(config)
}
