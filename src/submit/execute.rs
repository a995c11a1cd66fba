//! Change submission state machine
//!
//! Drives one edit from a fresh working branch to a merged merge request.
//! Each transition is its own function so it can be exercised in isolation;
//! [`submit_change`] chains them in order.

use crate::error::Result;
use crate::platform::PlatformService;
use crate::submit::poll::{PollPolicy, wait_until_mergeable};
use crate::submit::progress::{Phase, ProgressCallback};
use crate::types::{
    Branch, ChangeRequest, Commit, ContentEncoding, FileUpdate, MERGE_REQUEST_DESCRIPTION,
    MergeRequest, NewMergeRequest,
};
use base64::Engine;
use std::path::Path;
use tracing::{debug, info};

/// How a submission ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Dry run: no host calls were made
    DryRun {
        /// Branch that would have been created
        branch: String,
        /// Message that would have been used
        message: String,
    },
    /// The commit changed nothing; the working branch was deleted
    Aborted {
        /// Branch that was cleaned up
        branch: String,
    },
    /// The merge request was merged
    Merged {
        /// Merge request as returned by the merge call
        merge_request: MergeRequest,
        /// Number of readiness checks it took
        status_checks: u32,
    },
}

impl SubmissionOutcome {
    /// Whether the run should be reported as a success
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Aborted { .. })
    }
}

/// Remove a stale working branch left behind by an earlier run
///
/// GitLab's `search` is a substring match, so only an exact name match is
/// deleted. Returns whether a branch was removed.
pub async fn remove_stale_branch(platform: &dyn PlatformService, branch: &str) -> Result<bool> {
    let branches = platform.list_branches(branch).await?;
    let Some(stale) = branches.iter().find(|b| b.name == branch) else {
        debug!(branch, "no stale branch");
        return Ok(false);
    };

    info!(branch = %stale.name, "duplicate branch found, deleting");
    platform.delete_branch(&stale.name).await?;
    Ok(true)
}

/// Read the patched file and build the single-file update commit
pub async fn build_file_update(request: &ChangeRequest, branch: &str) -> Result<FileUpdate> {
    let bytes = tokio::fs::read(Path::new(&request.file_path)).await?;
    let (content, encoding) = match String::from_utf8(bytes) {
        Ok(text) => (text, ContentEncoding::Text),
        Err(e) => (
            base64::engine::general_purpose::STANDARD.encode(e.into_bytes()),
            ContentEncoding::Base64,
        ),
    };

    Ok(FileUpdate {
        branch: branch.to_string(),
        message: request.message(),
        file_path: request.repo_file_path().to_string(),
        content,
        encoding,
    })
}

/// Commit the patched file to the working branch
pub async fn commit_change(
    platform: &dyn PlatformService,
    request: &ChangeRequest,
    branch: &Branch,
) -> Result<Commit> {
    let update = build_file_update(request, &branch.name).await?;
    platform.create_commit(&update).await
}

/// Check that the commit actually changed something
///
/// On an empty diff the working branch is deleted and `false` returned.
pub async fn ensure_non_empty_diff(platform: &dyn PlatformService, branch: &str) -> Result<bool> {
    let diffs = platform.commit_diff(branch).await?;
    debug!(branch, files = diffs.len(), "commit diff");
    if !diffs.is_empty() {
        return Ok(true);
    }

    info!(branch, "commit diff is empty, cleaning up branch");
    platform.delete_branch(branch).await?;
    Ok(false)
}

/// Open the merge request for the working branch
pub async fn open_merge_request(
    platform: &dyn PlatformService,
    request: &ChangeRequest,
    branch: &str,
) -> Result<MergeRequest> {
    platform
        .create_merge_request(&NewMergeRequest {
            source_branch: branch.to_string(),
            target_branch: request.target_branch.clone(),
            title: request.message(),
            description: MERGE_REQUEST_DESCRIPTION.to_string(),
            remove_source_branch: true,
        })
        .await
}

/// Run the whole workflow
///
/// Any host error stops the run where it happened; nothing created earlier
/// is rolled back except on the empty-diff path.
pub async fn submit_change(
    platform: &dyn PlatformService,
    request: &ChangeRequest,
    policy: &PollPolicy,
    progress: &dyn ProgressCallback,
    dry_run: bool,
) -> Result<SubmissionOutcome> {
    let branch_name = request.branch_name();
    let message = request.message();

    if dry_run {
        progress
            .on_message(&format!(
                "dryRun enabled, bypassing gitlab writes (would merge {branch_name} into {}: {message})",
                request.target_branch
            ))
            .await;
        return Ok(SubmissionOutcome::DryRun {
            branch: branch_name,
            message,
        });
    }

    progress.on_phase(Phase::Start).await;

    if remove_stale_branch(platform, &branch_name).await? {
        progress
            .on_message(&format!("Deleted stale branch {branch_name}"))
            .await;
    }
    progress.on_phase(Phase::BranchChecked).await;

    let branch = platform
        .create_branch(&branch_name, &request.target_branch)
        .await?;
    info!(branch = %branch.name, "created branch");
    progress.on_phase(Phase::BranchCreated).await;

    let commit = commit_change(platform, request, &branch).await?;
    info!(sha = %commit.id, committer = %commit.committer_name, "created commit");
    progress.on_phase(Phase::Committed).await;

    let has_changes = ensure_non_empty_diff(platform, &branch.name).await?;
    progress.on_phase(Phase::DiffChecked).await;
    if !has_changes {
        progress.on_phase(Phase::Aborted).await;
        return Ok(SubmissionOutcome::Aborted {
            branch: branch.name,
        });
    }

    let mr = open_merge_request(platform, request, &branch.name).await?;
    info!(iid = mr.iid, url = %mr.web_url, "created merge request");
    progress.on_merge_request(&mr).await;
    progress.on_phase(Phase::MergeRequestCreated).await;

    platform.approve_merge_request(mr.iid).await?;
    progress.on_phase(Phase::Approved).await;

    let status_checks = wait_until_mergeable(platform, mr.iid, policy, progress).await?;
    progress.on_phase(Phase::MergeReady).await;

    let merged = platform.accept_merge_request(mr.iid, &message).await?;
    info!(
        id = merged.id,
        source = %merged.source_branch,
        target = %merged.target_branch,
        "merged merge request"
    );
    progress.on_phase(Phase::Merged).await;

    Ok(SubmissionOutcome::Merged {
        merge_request: merged,
        status_checks,
    })
}
