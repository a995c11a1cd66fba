//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    Branch, Commit, ContentEncoding, FileDiff, FileUpdate, MergeReadiness, MergeRequest,
    NewMergeRequest, PlatformConfig,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest against the v4 REST API
pub struct GitLabService {
    client: Client,
    token: String,
    config: PlatformConfig,
}

#[derive(Serialize)]
struct CreateCommitPayload<'a> {
    branch: &'a str,
    commit_message: &'a str,
    actions: Vec<CommitActionPayload<'a>>,
}

#[derive(Serialize)]
struct CommitActionPayload<'a> {
    action: &'static str,
    file_path: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<&'static str>,
}

#[derive(Serialize)]
struct CreateMergeRequestPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
    remove_source_branch: bool,
}

#[derive(Serialize)]
struct AcceptMergeRequestPayload<'a> {
    merge_commit_message: &'a str,
}

#[derive(Deserialize)]
struct ApprovalsResponse {
    #[serde(default)]
    merge_status: Option<String>,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GitLabService {
    /// Create a new GitLab service
    ///
    /// # Arguments
    /// * `token` - Personal, project or CI job access token
    /// * `config` - Project id and instance base URL
    pub fn new(token: String, config: PlatformConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("escargo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            config,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4/projects/{}{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.project_id),
            path
        )
    }

    fn branch_url(&self, name: &str) -> String {
        self.api_url(&format!(
            "/repository/branches/{}",
            urlencoding::encode(name)
        ))
    }

    fn merge_request_url(&self, iid: u64, suffix: &str) -> String {
        self.api_url(&format!("/merge_requests/{iid}{suffix}"))
    }
}

/// Turn a non-success response into an error that keeps GitLab's message
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(Error::GitLabApi(format!("{status} from {url}: {body}")))
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn list_branches(&self, search: &str) -> Result<Vec<Branch>> {
        debug!(search, "listing branches");
        let response = self
            .client
            .get(self.api_url("/repository/branches"))
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("search", search)])
            .send()
            .await?;

        let branches: Vec<Branch> = check_status(response).await?.json().await?;
        debug!(search, count = branches.len(), "listed branches");
        Ok(branches)
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        debug!(branch = name, "deleting branch");
        let response = self
            .client
            .delete(self.branch_url(name))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        check_status(response).await?;
        debug!(branch = name, "deleted branch");
        Ok(())
    }

    async fn create_branch(&self, name: &str, base_ref: &str) -> Result<Branch> {
        debug!(branch = name, base_ref, "creating branch");
        let response = self
            .client
            .post(self.api_url("/repository/branches"))
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("branch", name), ("ref", base_ref)])
            .send()
            .await?;

        let branch: Branch = check_status(response).await?.json().await?;
        debug!(branch = %branch.name, "created branch");
        Ok(branch)
    }

    async fn create_commit(&self, update: &FileUpdate) -> Result<Commit> {
        debug!(branch = %update.branch, file = %update.file_path, "creating commit");
        let payload = CreateCommitPayload {
            branch: &update.branch,
            commit_message: &update.message,
            actions: vec![CommitActionPayload {
                action: "update",
                file_path: &update.file_path,
                content: &update.content,
                encoding: match update.encoding {
                    ContentEncoding::Text => None,
                    ContentEncoding::Base64 => Some("base64"),
                },
            }],
        };

        let response = self
            .client
            .post(self.api_url("/repository/commits"))
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?;

        let commit: Commit = check_status(response).await?.json().await?;
        debug!(sha = %commit.id, "created commit");
        Ok(commit)
    }

    async fn commit_diff(&self, git_ref: &str) -> Result<Vec<FileDiff>> {
        debug!(git_ref, "fetching commit diff");
        let response = self
            .client
            .get(self.api_url(&format!(
                "/repository/commits/{}/diff",
                urlencoding::encode(git_ref)
            )))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let diffs: Vec<FileDiff> = check_status(response).await?.json().await?;
        debug!(git_ref, files = diffs.len(), "fetched commit diff");
        Ok(diffs)
    }

    async fn create_merge_request(&self, request: &NewMergeRequest) -> Result<MergeRequest> {
        debug!(
            source = %request.source_branch,
            target = %request.target_branch,
            "creating merge request"
        );
        let payload = CreateMergeRequestPayload {
            source_branch: &request.source_branch,
            target_branch: &request.target_branch,
            title: &request.title,
            description: &request.description,
            remove_source_branch: request.remove_source_branch,
        };

        let response = self
            .client
            .post(self.api_url("/merge_requests"))
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?;

        let mr: MergeRequest = check_status(response).await?.json().await?;
        debug!(iid = mr.iid, "created merge request");
        Ok(mr)
    }

    async fn approve_merge_request(&self, iid: u64) -> Result<()> {
        debug!(iid, "approving merge request");
        let response = self
            .client
            .post(self.merge_request_url(iid, "/approve"))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        check_status(response).await?;
        debug!(iid, "approved merge request");
        Ok(())
    }

    async fn merge_readiness(&self, iid: u64) -> Result<MergeReadiness> {
        debug!(iid, "fetching merge status");
        let response = self
            .client
            .get(self.merge_request_url(iid, "/approvals"))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let approvals: ApprovalsResponse = check_status(response).await?.json().await?;
        let readiness = MergeReadiness::from_status(approvals.merge_status.as_deref().unwrap_or(""));
        debug!(iid, status = %readiness, "fetched merge status");
        Ok(readiness)
    }

    async fn accept_merge_request(
        &self,
        iid: u64,
        merge_commit_message: &str,
    ) -> Result<MergeRequest> {
        debug!(iid, "merging merge request");
        let response = self
            .client
            .put(self.merge_request_url(iid, "/merge"))
            .header("PRIVATE-TOKEN", &self.token)
            .json(&AcceptMergeRequestPayload {
                merge_commit_message,
            })
            .send()
            .await?;

        let mr: MergeRequest = check_status(response).await?.json().await?;
        debug!(iid, "merged merge request");
        Ok(mr)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(project_id: &str) -> GitLabService {
        GitLabService::new(
            "token".to_string(),
            PlatformConfig {
                project_id: project_id.to_string(),
                base_url: "https://gitlab.example.com/".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_api_url_encodes_project_path() {
        let svc = service("group/sub/app");
        assert_eq!(
            svc.api_url("/merge_requests"),
            "https://gitlab.example.com/api/v4/projects/group%2Fsub%2Fapp/merge_requests"
        );
    }

    #[test]
    fn test_branch_url_encodes_slashes() {
        let svc = service("1234");
        assert_eq!(
            svc.branch_url("escargo/v2"),
            "https://gitlab.example.com/api/v4/projects/1234/repository/branches/escargo%2Fv2"
        );
    }
}
