//! Run configuration
//!
//! Built once from command-line arguments (with a few environment
//! fallbacks) and passed by reference into the patcher and submitter.

use crate::error::{Error, Result};
use crate::patch::{DEFAULT_YQ, ValueEdit};
use crate::submit::PollPolicy;
use crate::types::{ChangeRequest, DEFAULT_BRANCH_PREFIX, PlatformConfig};
use std::env;
use std::time::Duration;

/// Default GitLab host
pub const DEFAULT_HOST: &str = "gitlab.com";

/// Project used when neither `--projectId` nor `ESCARGO_PROJECT_ID` is set
pub const DEFAULT_PROJECT_ID: &str = "00000000";

/// Default target branch
pub const DEFAULT_TARGET_BRANCH: &str = "main";

/// Raw, unvalidated arguments
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Suppress mutating actions
    pub dry_run: bool,
    /// Values file to edit
    pub file_path: Option<String>,
    /// GitLab API token
    pub gitlab_token: Option<String>,
    /// Value to write
    pub new_value: Option<String>,
    /// Key path to write to
    pub value_path: Option<String>,
    /// GitLab project id or path
    pub project_id: Option<String>,
    /// Branch to merge into
    pub target_branch: Option<String>,
    /// GitLab host or base URL
    pub gitlab_host: Option<String>,
    /// Working branch prefix
    pub branch_prefix: Option<String>,
    /// Readiness poll bound
    pub max_poll_attempts: Option<u32>,
    /// Initial readiness poll delay in seconds
    pub poll_interval_secs: Option<u64>,
    /// Readiness poll delay multiplier
    pub poll_backoff: Option<f64>,
    /// Editor program
    pub yq_path: Option<String>,
}

/// Validated, immutable run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Suppress mutating actions
    pub dry_run: bool,
    /// GitLab API token
    pub gitlab_token: String,
    /// The value edit to perform
    pub edit: ValueEdit,
    /// GitLab project and instance
    pub platform: PlatformConfig,
    /// Branch to merge into
    pub target_branch: String,
    /// Working branch prefix
    pub branch_prefix: String,
    /// Readiness polling bounds
    pub poll: PollPolicy,
    /// Editor program
    pub yq_path: String,
}

impl Config {
    /// Validate arguments, falling back to the process environment
    pub fn from_args(args: ConfigArgs) -> Result<Self> {
        Self::from_args_with_env(args, |key| env::var(key).ok())
    }

    /// Validate arguments with an explicit environment lookup
    ///
    /// Environment fallbacks: `GITLAB_HOST` for the host and
    /// `ESCARGO_PROJECT_ID` for the project.
    pub fn from_args_with_env(
        args: ConfigArgs,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut missing = Vec::new();
        let file_path = required(args.file_path, "--filePath", &mut missing);
        let gitlab_token = required(args.gitlab_token, "--gitlabToken", &mut missing);
        let new_value = required(args.new_value, "--newValue", &mut missing);
        let value_path = required(args.value_path, "--valuePath", &mut missing);
        if !missing.is_empty() {
            return Err(Error::MissingFlags(missing));
        }

        let project_id = non_empty(args.project_id)
            .or_else(|| non_empty(env_var("ESCARGO_PROJECT_ID")))
            .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());
        let host = non_empty(args.gitlab_host)
            .or_else(|| non_empty(env_var("GITLAB_HOST")))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let mut poll = PollPolicy::default();
        if let Some(attempts) = args.max_poll_attempts {
            if attempts == 0 {
                return Err(Error::Config(
                    "--maxPollAttempts must be at least 1".to_string(),
                ));
            }
            poll.max_attempts = attempts;
        }
        if let Some(secs) = args.poll_interval_secs {
            poll.interval = Duration::from_secs(secs);
            poll.max_interval = poll.max_interval.max(poll.interval);
        }
        if let Some(backoff) = args.poll_backoff {
            if !backoff.is_finite() || backoff < 1.0 {
                return Err(Error::Config(format!(
                    "--pollBackoff must be a number >= 1.0, got {backoff}"
                )));
            }
            poll.backoff = backoff;
        }

        Ok(Self {
            dry_run: args.dry_run,
            gitlab_token,
            edit: ValueEdit {
                file_path,
                value_path,
                new_value,
            },
            platform: PlatformConfig {
                project_id,
                base_url: normalize_base_url(&host)?,
            },
            target_branch: non_empty(args.target_branch)
                .unwrap_or_else(|| DEFAULT_TARGET_BRANCH.to_string()),
            branch_prefix: args
                .branch_prefix
                .unwrap_or_else(|| DEFAULT_BRANCH_PREFIX.to_string()),
            poll,
            yq_path: non_empty(args.yq_path).unwrap_or_else(|| DEFAULT_YQ.to_string()),
        })
    }

    /// The change the submitter carries upstream
    pub fn change_request(&self) -> ChangeRequest {
        ChangeRequest {
            file_path: self.edit.file_path.clone(),
            value_path: self.edit.value_path.clone(),
            new_value: self.edit.new_value.clone(),
            target_branch: self.target_branch.clone(),
            branch_prefix: self.branch_prefix.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, flag: &'static str, missing: &mut Vec<&'static str>) -> String {
    non_empty(value).unwrap_or_else(|| {
        missing.push(flag);
        String::new()
    })
}

/// Accept a bare host ("gitlab.example.com") or a full base URL
fn normalize_base_url(host: &str) -> Result<String> {
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let url = url::Url::parse(&candidate)
        .map_err(|e| Error::Config(format!("invalid GitLab host '{host}': {e}")))?;
    if url.host_str().is_none() {
        return Err(Error::Config(format!("invalid GitLab host '{host}'")));
    }

    Ok(candidate.trim_end_matches('/').to_string())
}
