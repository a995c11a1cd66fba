//! Progress callback trait for interface-agnostic updates
//!
//! The submitter never prints. The CLI (or a test) receives every state
//! transition and poll result through this trait.

use crate::types::{MergeReadiness, MergeRequest};
use async_trait::async_trait;

/// Submission phase, in the order the workflow visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Nothing done yet
    Start,
    /// Stale working branch looked up (and removed if present)
    BranchChecked,
    /// Working branch created from the target branch
    BranchCreated,
    /// Patched file committed to the working branch
    Committed,
    /// Commit diff fetched and found non-empty
    DiffChecked,
    /// Diff was empty; working branch removed
    Aborted,
    /// Merge request opened
    MergeRequestCreated,
    /// Merge request approved
    Approved,
    /// Host reports the merge request can be merged
    MergeReady,
    /// Merge request merged
    Merged,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "Starting"),
            Self::BranchChecked => write!(f, "Checked for stale branch"),
            Self::BranchCreated => write!(f, "Created branch"),
            Self::Committed => write!(f, "Committed change"),
            Self::DiffChecked => write!(f, "Checked commit diff"),
            Self::Aborted => write!(f, "Aborted"),
            Self::MergeRequestCreated => write!(f, "Created merge request"),
            Self::Approved => write!(f, "Approved merge request"),
            Self::MergeReady => write!(f, "Merge request is mergeable"),
            Self::Merged => write!(f, "Merged"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during submission.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called after each state transition
    async fn on_phase(&self, phase: Phase);

    /// Called when a merge request has been opened
    async fn on_merge_request(&self, mr: &MergeRequest);

    /// Called with the result of every merge readiness check
    async fn on_merge_status(&self, attempt: u32, readiness: &MergeReadiness);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_merge_request(&self, _mr: &MergeRequest) {}
    async fn on_merge_status(&self, _attempt: u32, _readiness: &MergeReadiness) {}
    async fn on_message(&self, _message: &str) {}
}
