//! Test fixtures

#![allow(dead_code)]

use escargo::submit::PollPolicy;
use escargo::types::{Branch, ChangeRequest, FileDiff, MergeRequest};
use std::path::Path;
use std::time::Duration;

/// Change request for `image.tag = v2` in `path`
pub fn change_request(path: &Path) -> ChangeRequest {
    ChangeRequest {
        file_path: path.display().to_string(),
        value_path: "image.tag".to_string(),
        new_value: "v2".to_string(),
        target_branch: "main".to_string(),
        branch_prefix: "escargo/".to_string(),
    }
}

/// Write a small values file and return its directory guard and path
pub fn values_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("values.yaml");
    std::fs::write(&path, contents).expect("write values file");
    (dir, path)
}

/// Poll policy with millisecond delays for tests
pub fn fast_poll(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        max_attempts,
        interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        backoff: 1.0,
    }
}

/// Branch with the given name
pub fn make_branch(name: &str) -> Branch {
    Branch {
        name: name.to_string(),
    }
}

/// A one-file diff
pub fn make_diff(path: &str) -> FileDiff {
    FileDiff {
        old_path: path.to_string(),
        new_path: path.to_string(),
        diff: "@@ -1 +1 @@\n-  tag: v1\n+  tag: \"v2\"\n".to_string(),
    }
}

/// Merge request as the mock host reports it
pub fn make_mr(iid: u64, source: &str, target: &str, title: &str) -> MergeRequest {
    MergeRequest {
        id: 1000 + iid,
        iid,
        web_url: format!("https://gitlab.example.com/group/app/-/merge_requests/{iid}"),
        source_branch: source.to_string(),
        target_branch: target.to_string(),
        title: title.to_string(),
    }
}
