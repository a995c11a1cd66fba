//! Core types shared by the patcher, the submitter and the GitLab client

use serde::Deserialize;
use std::fmt;

/// Default prefix for working branches
pub const DEFAULT_BRANCH_PREFIX: &str = "escargo/";

/// Description attached to every merge request escargo opens
pub const MERGE_REQUEST_DESCRIPTION: &str = "automated merge request created by escargo";

/// GitLab project coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Numeric project id or `group/project` path
    pub project_id: String,
    /// Base URL of the GitLab instance (e.g. "https://gitlab.com")
    pub base_url: String,
}

/// A repository branch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    /// Branch name
    pub name: String,
}

/// A commit created through the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    /// Commit SHA
    pub id: String,
    /// First line of the message
    #[serde(default)]
    pub title: String,
    /// Name of the committer
    #[serde(default)]
    pub committer_name: String,
}

/// One file entry of a commit diff
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDiff {
    /// Path before the change
    pub old_path: String,
    /// Path after the change
    pub new_path: String,
    /// Unified diff text
    #[serde(default)]
    pub diff: String,
}

/// A merge request as reported by GitLab
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequest {
    /// Global id
    pub id: u64,
    /// Project-scoped id used in API paths
    pub iid: u64,
    /// Web URL
    #[serde(default)]
    pub web_url: String,
    /// Source branch
    pub source_branch: String,
    /// Target branch
    pub target_branch: String,
    /// Title
    #[serde(default)]
    pub title: String,
}

/// Encoding of commit action content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Plain UTF-8 text
    Text,
    /// Base64 encoded bytes
    Base64,
}

/// A single-file `update` commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    /// Branch to commit to
    pub branch: String,
    /// Commit message
    pub message: String,
    /// Repository path of the file
    pub file_path: String,
    /// New file content
    pub content: String,
    /// How `content` is encoded
    pub encoding: ContentEncoding,
}

/// Options for opening a merge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMergeRequest {
    /// Branch carrying the change
    pub source_branch: String,
    /// Branch to merge into
    pub target_branch: String,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Delete the source branch once merged
    pub remove_source_branch: bool,
}

/// Merge readiness of a merge request
///
/// GitLab computes `merge_status` asynchronously after approval, so a
/// freshly approved merge request usually reports `Pending` for a while.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeReadiness {
    /// `can_be_merged`
    Ready,
    /// `cannot_be_merged` or `cannot_be_merged_recheck`
    Blocked(String),
    /// Still being computed, or a status escargo does not know
    Pending(String),
}

impl MergeReadiness {
    /// Interpret GitLab's `merge_status` string
    pub fn from_status(status: &str) -> Self {
        match status {
            "can_be_merged" => Self::Ready,
            "cannot_be_merged" | "cannot_be_merged_recheck" => Self::Blocked(status.to_string()),
            _ => Self::Pending(status.to_string()),
        }
    }

    /// Whether the merge request can be merged now
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for MergeReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "can_be_merged"),
            Self::Blocked(s) | Self::Pending(s) => write!(f, "{s}"),
        }
    }
}

/// Derive the working branch name for a value
///
/// Pure function of its inputs: the same value always lands on the same
/// branch, which is how stale branches from earlier runs are found.
pub fn derive_branch_name(prefix: &str, new_value: &str) -> String {
    format!("{prefix}{new_value}")
}

/// The edit escargo is asked to carry upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// Path of the values file, as given on the command line
    pub file_path: String,
    /// Key path inside the file
    pub value_path: String,
    /// Value written at `value_path`
    pub new_value: String,
    /// Branch the change is merged into
    pub target_branch: String,
    /// Prefix for the working branch
    pub branch_prefix: String,
}

impl ChangeRequest {
    /// Working branch name
    pub fn branch_name(&self) -> String {
        derive_branch_name(&self.branch_prefix, &self.new_value)
    }

    /// Commit message, merge request title and merge commit message
    pub fn message(&self) -> String {
        format!(
            "updating {} at value path {} with value: {}",
            self.file_path, self.value_path, self.new_value
        )
    }

    /// Path of the file relative to the repository root
    pub fn repo_file_path(&self) -> &str {
        let mut path = self.file_path.as_str();
        while let Some(rest) = path.strip_prefix("./") {
            path = rest;
        }
        path
    }
}
