//! Error types for escargo

use thiserror::Error;

/// Errors that can occur while patching and submitting a change
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// One or more required flags were not supplied
    #[error("all flags are required, missing: {}", .0.join(", "))]
    MissingFlags(Vec<&'static str>),

    /// The value editing utility is not installed or not on PATH
    #[error("value editor '{0}' not found on PATH")]
    EditorNotFound(String),

    /// The value editing utility exited unsuccessfully
    #[error("value editor exited with {status}: {output}")]
    EditorFailed {
        /// Exit status as reported by the OS
        status: String,
        /// Combined stdout/stderr of the editor
        output: String,
    },

    /// GitLab API returned an error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Merge request never became mergeable and the host reports it as blocked
    #[error("merge request !{iid} is blocked from merging after {attempts} status checks")]
    MergeBlocked {
        /// Merge request IID
        iid: u64,
        /// Number of status checks performed
        attempts: u32,
    },

    /// Merge request readiness was still being computed when polling gave up
    #[error("timed out waiting for merge request !{iid} to become mergeable after {attempts} status checks")]
    MergeReadinessTimeout {
        /// Merge request IID
        iid: u64,
        /// Number of status checks performed
        attempts: u32,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error
    ///
    /// Every failure currently maps to 1; the match keeps new variants from
    /// silently inheriting a code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::MissingFlags(_)
            | Self::EditorNotFound(_)
            | Self::EditorFailed { .. }
            | Self::Io(_)
            | Self::GitLabApi(_)
            | Self::Http(_)
            | Self::Json(_)
            | Self::MergeBlocked { .. }
            | Self::MergeReadinessTimeout { .. } => 1,
        }
    }
}

/// Result type alias using escargo's Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flags_message_lists_every_flag() {
        let err = Error::MissingFlags(vec!["--filePath", "--newValue"]);
        assert_eq!(
            err.to_string(),
            "all flags are required, missing: --filePath, --newValue"
        );
    }

    #[test]
    fn test_poll_errors_are_distinguishable() {
        let blocked = Error::MergeBlocked {
            iid: 7,
            attempts: 3,
        };
        let timeout = Error::MergeReadinessTimeout {
            iid: 7,
            attempts: 3,
        };
        assert!(blocked.to_string().contains("blocked"));
        assert!(timeout.to_string().contains("timed out"));
        assert_eq!(blocked.exit_code(), 1);
        assert_eq!(timeout.exit_code(), 1);
    }
}
