//! escargo - GitOps write-back for helm values
//!
//! Patches one key path in a values file with `yq`, then carries the edit
//! through a GitLab merge request: branch, commit, approve, merge.

pub mod config;
pub mod error;
pub mod patch;
pub mod platform;
pub mod submit;
pub mod types;
