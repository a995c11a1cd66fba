//! escargo - GitOps write-back for helm values
//!
//! Like argocd-image-updater, but slimier. Run from the root of a
//! repository checkout: writes one value to one value path, then merges the
//! change through a GitLab merge request.

use anstream::eprintln;
use clap::{ArgAction, Parser};
use escargo::config::{Config, ConfigArgs};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::style::Stylize;

#[derive(Parser)]
#[command(name = "escargo")]
#[command(about = "escargo - modify helm value paths for argocd write-back")]
#[command(version)]
struct Cli {
    /// Dry run - show what would be done without making changes
    #[arg(
        short = 'd',
        long = "dryRun",
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    dry_run: bool,

    /// Path to helm values file
    #[arg(short = 'f', long = "filePath")]
    file_path: Option<String>,

    /// GitLab access token
    #[arg(short = 'g', long = "gitlabToken")]
    gitlab_token: Option<String>,

    /// Value to write at the valuePath within the given filePath
    #[arg(short = 'n', long = "newValue")]
    new_value: Option<String>,

    /// Helm values path key to write to within the given filePath
    #[arg(short = 'p', long = "valuePath")]
    value_path: Option<String>,

    /// GitLab project id or path [env: ESCARGO_PROJECT_ID]
    #[arg(long = "projectId")]
    project_id: Option<String>,

    /// Branch to merge into [default: main]
    #[arg(long = "targetBranch")]
    target_branch: Option<String>,

    /// GitLab host or base URL [env: GITLAB_HOST, default: gitlab.com]
    #[arg(long = "gitlabHost")]
    gitlab_host: Option<String>,

    /// Prefix for the working branch [default: escargo/]
    #[arg(long = "branchPrefix")]
    branch_prefix: Option<String>,

    /// Maximum merge status checks before giving up [default: 60]
    #[arg(long = "maxPollAttempts")]
    max_poll_attempts: Option<u32>,

    /// Seconds between merge status checks [default: 1]
    #[arg(long = "pollInterval")]
    poll_interval: Option<u64>,

    /// Multiply the delay by this after each check [default: 1.0]
    #[arg(long = "pollBackoff")]
    poll_backoff: Option<f64>,

    /// Value editor program [default: yq]
    #[arg(long = "yqPath")]
    yq_path: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for ConfigArgs {
    fn from(cli: Cli) -> Self {
        Self {
            dry_run: cli.dry_run,
            file_path: cli.file_path,
            gitlab_token: cli.gitlab_token,
            new_value: cli.new_value,
            value_path: cli.value_path,
            project_id: cli.project_id,
            target_branch: cli.target_branch,
            gitlab_host: cli.gitlab_host,
            branch_prefix: cli.branch_prefix,
            max_poll_attempts: cli.max_poll_attempts,
            poll_interval_secs: cli.poll_interval,
            poll_backoff: cli.poll_backoff,
            yq_path: cli.yq_path,
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "escargo=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: failed to initialise logging: {e}");
    }

    let result = match Config::from_args(cli.into()) {
        Ok(config) => cli::run_writeback(&config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".failure());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
