//! Write-back command - patch the value, then merge it through GitLab

use crate::cli::CliProgress;
use crate::cli::style::{Stylize, check, cross};
use anstream::{eprintln, println};
use escargo::config::Config;
use escargo::error::Result;
use escargo::patch::{ValueEditor, YqEditor, patch_value};
use escargo::platform::{GitLabService, PlatformService};
use escargo::submit::{SubmissionOutcome, submit_change};
use escargo::types::PlatformConfig;
use std::process::ExitCode;
use tracing::debug;

/// Run the write-back with the real editor and GitLab client
pub async fn run_writeback(config: &Config) -> Result<ExitCode> {
    let editor = YqEditor::new(config.yq_path.clone());
    let platform = GitLabService::new(config.gitlab_token.clone(), config.platform.clone())?;
    run_with(config, &editor, &platform).await
}

async fn run_with(
    config: &Config,
    editor: &dyn ValueEditor,
    platform: &dyn PlatformService,
) -> Result<ExitCode> {
    print_summary(config, platform.config());
    let progress = CliProgress::new();

    if let Some(output) = patch_value(editor, &config.edit, config.dry_run, &progress).await?
        && !output.output.trim().is_empty()
    {
        debug!(output = %output.output.trim(), "editor output");
    }

    let request = config.change_request();
    let outcome = submit_change(
        platform,
        &request,
        &config.poll,
        &progress,
        config.dry_run,
    )
    .await?;

    Ok(report(&outcome))
}

fn print_summary(config: &Config, project: &PlatformConfig) {
    println!(
        "{} {} {} {} {}",
        "Writing".emphasis(),
        config.edit.new_value.accent(),
        "to".muted(),
        config.edit.value_path.accent(),
        format!("in {}", config.edit.file_path).muted()
    );
    println!(
        "  {} {} ({})",
        "Project:".muted(),
        project.project_id,
        project.base_url
    );
    if config.dry_run {
        println!("  {}", "Dry run: no changes will be made".muted());
    }
    println!();
}

fn report(outcome: &SubmissionOutcome) -> ExitCode {
    match outcome {
        SubmissionOutcome::DryRun { branch, message } => {
            println!();
            println!("{}", "Dry run complete".emphasis());
            println!("  {} {}", "Branch:".muted(), branch.accent());
            println!("  {} {message}", "Message:".muted());
            ExitCode::SUCCESS
        }
        SubmissionOutcome::Aborted { branch } => {
            eprintln!(
                "{} Commit diff is empty, aborting and cleaning up branch! ({})",
                cross(),
                branch.accent()
            );
            ExitCode::FAILURE
        }
        SubmissionOutcome::Merged {
            merge_request,
            status_checks,
        } => {
            println!();
            println!(
                "{} MR {} Success: Merged branch {} into {}!",
                check(),
                merge_request.id,
                merge_request.source_branch.accent(),
                merge_request.target_branch.accent()
            );
            println!(
                "  {}",
                format!("mergeable after {status_checks} status check(s)").muted()
            );
            ExitCode::SUCCESS
        }
    }
}
