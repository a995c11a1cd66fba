//! Recording platform service

#![allow(dead_code)]

use super::fixtures::{make_branch, make_mr};
use async_trait::async_trait;
use escargo::error::{Error, Result};
use escargo::platform::PlatformService;
use escargo::types::{
    Branch, Commit, FileDiff, FileUpdate, MergeReadiness, MergeRequest, NewMergeRequest,
    PlatformConfig,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded host call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListBranches(String),
    DeleteBranch(String),
    CreateBranch { name: String, base_ref: String },
    CreateCommit(FileUpdate),
    CommitDiff(String),
    CreateMergeRequest(NewMergeRequest),
    Approve(u64),
    MergeReadiness(u64),
    Accept { iid: u64, message: String },
}

impl Call {
    /// Short operation name, used for ordering assertions
    pub const fn op(&self) -> &'static str {
        match self {
            Self::ListBranches(_) => "list_branches",
            Self::DeleteBranch(_) => "delete_branch",
            Self::CreateBranch { .. } => "create_branch",
            Self::CreateCommit(_) => "create_commit",
            Self::CommitDiff(_) => "commit_diff",
            Self::CreateMergeRequest(_) => "create_merge_request",
            Self::Approve(_) => "approve",
            Self::MergeReadiness(_) => "merge_readiness",
            Self::Accept { .. } => "accept",
        }
    }
}

/// Stubbed GitLab that records every call
pub struct MockPlatformService {
    config: PlatformConfig,
    calls: Mutex<Vec<Call>>,
    branches: Vec<Branch>,
    diff: Vec<FileDiff>,
    statuses: Mutex<VecDeque<MergeReadiness>>,
    fail_op: Option<&'static str>,
}

impl MockPlatformService {
    /// Host with no branches, a one-file diff and an immediately mergeable MR
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                project_id: "group/app".to_string(),
                base_url: "https://gitlab.example.com".to_string(),
            },
            calls: Mutex::new(Vec::new()),
            branches: Vec::new(),
            diff: vec![super::fixtures::make_diff("values.yaml")],
            statuses: Mutex::new(VecDeque::new()),
            fail_op: None,
        }
    }

    /// Branches returned by every search
    pub fn with_branches(mut self, names: &[&str]) -> Self {
        self.branches = names.iter().map(|n| make_branch(n)).collect();
        self
    }

    /// Commit diff to report
    pub fn with_diff(mut self, diff: Vec<FileDiff>) -> Self {
        self.diff = diff;
        self
    }

    /// Merge statuses to report in order; the last one repeats.
    /// With none queued the MR is immediately mergeable.
    pub fn with_statuses(self, statuses: &[&str]) -> Self {
        *self.statuses.lock().unwrap() = statuses
            .iter()
            .map(|s| MergeReadiness::from_status(s))
            .collect();
        self
    }

    /// Fail the named operation with an API error
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_op = Some(op);
        self
    }

    /// All calls in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Operation names in order
    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::op).collect()
    }

    /// Number of calls to `op`
    pub fn count(&self, op: &str) -> usize {
        self.ops().iter().filter(|o| **o == op).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        if self.fail_op == Some(op) {
            return Err(Error::GitLabApi(format!("403 Forbidden from {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_branches(&self, search: &str) -> Result<Vec<Branch>> {
        self.record(Call::ListBranches(search.to_string()))?;
        Ok(self
            .branches
            .iter()
            .filter(|b| b.name.contains(search))
            .cloned()
            .collect())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        self.record(Call::DeleteBranch(name.to_string()))
    }

    async fn create_branch(&self, name: &str, base_ref: &str) -> Result<Branch> {
        self.record(Call::CreateBranch {
            name: name.to_string(),
            base_ref: base_ref.to_string(),
        })?;
        Ok(make_branch(name))
    }

    async fn create_commit(&self, update: &FileUpdate) -> Result<Commit> {
        self.record(Call::CreateCommit(update.clone()))?;
        Ok(Commit {
            id: "abc123".to_string(),
            title: update.message.clone(),
            committer_name: "escargo".to_string(),
        })
    }

    async fn commit_diff(&self, git_ref: &str) -> Result<Vec<FileDiff>> {
        self.record(Call::CommitDiff(git_ref.to_string()))?;
        Ok(self.diff.clone())
    }

    async fn create_merge_request(&self, request: &NewMergeRequest) -> Result<MergeRequest> {
        self.record(Call::CreateMergeRequest(request.clone()))?;
        Ok(make_mr(
            7,
            &request.source_branch,
            &request.target_branch,
            &request.title,
        ))
    }

    async fn approve_merge_request(&self, iid: u64) -> Result<()> {
        self.record(Call::Approve(iid))
    }

    async fn merge_readiness(&self, iid: u64) -> Result<MergeReadiness> {
        self.record(Call::MergeReadiness(iid))?;
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(status.unwrap_or(MergeReadiness::Ready))
    }

    async fn accept_merge_request(
        &self,
        iid: u64,
        merge_commit_message: &str,
    ) -> Result<MergeRequest> {
        self.record(Call::Accept {
            iid,
            message: merge_commit_message.to_string(),
        })?;
        Ok(make_mr(iid, "escargo/v2", "main", merge_commit_message))
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
