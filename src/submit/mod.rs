//! Change submission engine
//!
//! Carries a patched values file upstream:
//! 1. Branch - drop any stale working branch, create a fresh one
//! 2. Commit - push the file, abort if the diff is empty
//! 3. Merge - open, approve, wait for readiness, merge

mod execute;
mod poll;
mod progress;

pub use execute::{
    SubmissionOutcome, build_file_update, commit_change, ensure_non_empty_diff,
    open_merge_request, remove_stale_branch, submit_change,
};
pub use poll::{
    DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_INTERVAL, PollPolicy,
    wait_until_mergeable,
};
pub use progress::{NoopProgress, Phase, ProgressCallback};
