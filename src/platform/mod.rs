//! Repository host services
//!
//! The change submitter only talks to the host through [`PlatformService`],
//! so tests can swap in a recording stub for the real GitLab client.

mod gitlab;

pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{
    Branch, Commit, FileDiff, FileUpdate, MergeReadiness, MergeRequest, NewMergeRequest,
    PlatformConfig,
};
use async_trait::async_trait;

/// Platform service trait for the branch/commit/merge request workflow
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List branches whose name contains `search`
    async fn list_branches(&self, search: &str) -> Result<Vec<Branch>>;

    /// Delete a branch
    async fn delete_branch(&self, name: &str) -> Result<()>;

    /// Create a branch from `base_ref`
    async fn create_branch(&self, name: &str, base_ref: &str) -> Result<Branch>;

    /// Commit a single file update
    async fn create_commit(&self, update: &FileUpdate) -> Result<Commit>;

    /// Diff of the commit `git_ref` points at
    async fn commit_diff(&self, git_ref: &str) -> Result<Vec<FileDiff>>;

    /// Open a merge request
    async fn create_merge_request(&self, request: &NewMergeRequest) -> Result<MergeRequest>;

    /// Approve a merge request as the authenticated user
    async fn approve_merge_request(&self, iid: u64) -> Result<()>;

    /// Current merge readiness of a merge request
    async fn merge_readiness(&self, iid: u64) -> Result<MergeReadiness>;

    /// Merge a merge request
    async fn accept_merge_request(&self, iid: u64, merge_commit_message: &str)
    -> Result<MergeRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
