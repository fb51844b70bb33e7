//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, PrSelector, PullRequestFinder};
use crate::types::{
    MergeCapabilities, MergeMessage, MergeMethod, MergeRequest, MergeStateStatus, PrCommit,
    PrState, PullRequest, Repository,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

const PR_FIELDS: &str = r"
    fragment PrFields on PullRequest {
        id
        number
        title
        state
        mergeStateStatus
        headRefName
        baseRefName
        headRepositoryOwner { login }
        isInMergeQueue
        isMergeQueueEnabled
        commits(last: 1) { nodes { commit { oid } } }
    }
";

// GraphQL response envelope

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestByNumber {
    pull_request: Option<GraphQlPullRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestsForBranch {
    pull_requests: Nodes<GraphQlPullRequest>,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct CommitNode {
    commit: PrCommit,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlPullRequest {
    id: String,
    number: u64,
    title: String,
    state: PrState,
    merge_state_status: MergeStateStatus,
    head_ref_name: String,
    base_ref_name: String,
    head_repository_owner: Option<Login>,
    is_in_merge_queue: bool,
    is_merge_queue_enabled: bool,
    commits: Nodes<CommitNode>,
}

impl From<GraphQlPullRequest> for PullRequest {
    fn from(pr: GraphQlPullRequest) -> Self {
        Self {
            id: pr.id,
            number: pr.number,
            title: pr.title,
            state: pr.state,
            merge_state_status: pr.merge_state_status,
            head_ref: pr.head_ref_name,
            base_ref: pr.base_ref_name,
            head_repository_owner: pr.head_repository_owner.map(|o| o.login).unwrap_or_default(),
            is_in_merge_queue: pr.is_in_merge_queue,
            is_merge_queue_enabled: pr.is_merge_queue_enabled,
            commits: pr.commits.nodes.into_iter().map(|n| n.commit).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapabilitiesData {
    merge_commit_allowed: bool,
    rebase_merge_allowed: bool,
    squash_merge_allowed: bool,
    merge_queue: Option<MergeQueue>,
}

#[derive(Deserialize)]
struct MergeQueue {
    configuration: Option<MergeQueueConfiguration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergeQueueConfiguration {
    merge_method: Option<String>,
}

#[derive(Deserialize)]
struct NodeData {
    node: Option<MergeTextData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergeTextData {
    viewer_merge_headline_text: String,
    viewer_merge_body_text: String,
}

/// Build the GraphQL input object for a merge or auto-merge mutation
///
/// Unset optional fields are left out entirely rather than sent empty.
pub fn build_merge_input(request: &MergeRequest) -> Value {
    let mut input = Map::new();
    input.insert("pullRequestId".into(), json!(request.pr_id));
    input.insert("mergeMethod".into(), json!(request.method.as_graphql()));

    let optional = [
        ("commitHeadline", &request.commit_headline),
        ("commitBody", &request.commit_body),
        ("authorEmail", &request.author_email),
        ("expectedHeadOid", &request.expected_head_oid),
    ];
    // A blank value would override the server default with nothing
    for (key, value) in optional {
        if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            input.insert(key.into(), json!(v));
        }
    }

    Value::Object(input)
}

/// GitHub service using octocrab for GraphQL and reqwest for REST calls
pub struct GitHubService {
    client: Octocrab,
    config: Repository,
    /// Token for raw HTTP requests (branch deletion)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// REST API base URL, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service for `repo`
    pub fn new(token: &str, repo: Repository) -> Result<Self> {
        let api_base = repo.host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, repo, &api_base)
    }

    /// Create a service against an explicit API base URL
    pub fn with_api_base(token: &str, repo: Repository, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(&api_base)
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("prmerge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: repo,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response: GraphQlResponse<T> = self
            .client
            .graphql(&json!({ "query": query, "variables": variables }))
            .await?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }

        response
            .data
            .ok_or_else(|| Error::GitHubApi("No data in GraphQL response".to_string()))
    }

    async fn pr_by_number(&self, repo: &Repository, number: u64) -> Result<PullRequest> {
        debug!(repo = %repo, pr_number = number, "fetching PR by number");
        let query = format!(
            "query PullRequestByNumber($owner: String!, $repo: String!, $number: Int!) {{
                repository(owner: $owner, name: $repo) {{
                    pullRequest(number: $number) {{ ...PrFields }}
                }}
            }}
            {PR_FIELDS}"
        );
        let data: RepositoryData<PullRequestByNumber> = self
            .graphql(
                &query,
                json!({ "owner": repo.owner, "repo": repo.name, "number": number }),
            )
            .await?;

        data.repository
            .and_then(|r| r.pull_request)
            .map(Into::into)
            .ok_or_else(|| Error::PullRequestNotFound(format!("{repo}#{number}")))
    }

    async fn pr_for_branch(&self, repo: &Repository, branch: &str) -> Result<PullRequest> {
        debug!(repo = %repo, branch, "fetching PR for branch");
        let query = format!(
            "query PullRequestForBranch($owner: String!, $repo: String!, $headRefName: String!) {{
                repository(owner: $owner, name: $repo) {{
                    pullRequests(headRefName: $headRefName, first: 30, orderBy: {{ field: CREATED_AT, direction: DESC }}) {{
                        nodes {{ ...PrFields }}
                    }}
                }}
            }}
            {PR_FIELDS}"
        );
        let data: RepositoryData<PullRequestsForBranch> = self
            .graphql(
                &query,
                json!({ "owner": repo.owner, "repo": repo.name, "headRefName": branch }),
            )
            .await?;

        let mut candidates = data
            .repository
            .map(|r| r.pull_requests.nodes)
            .unwrap_or_default();

        // Prefer an open PR; otherwise the most recently created one
        let index = candidates
            .iter()
            .position(|pr| pr.state == PrState::Open)
            .or_else(|| (!candidates.is_empty()).then_some(0));

        index
            .map(|i| candidates.swap_remove(i).into())
            .ok_or_else(|| Error::PullRequestNotFound(format!("branch {branch} in {repo}")))
    }

    async fn run_mutation(&self, name: &str, input_type: &str, input: Value) -> Result<()> {
        let query = format!(
            "mutation {name}($input: {input_type}!) {{
                {field}(input: $input) {{ clientMutationId }}
            }}",
            field = lower_first(name)
        );
        let _: Value = self.graphql(&query, json!({ "input": input })).await?;
        Ok(())
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_lowercase().to_string() + chars.as_str()
    })
}

#[async_trait]
impl PullRequestFinder for GitHubService {
    async fn find_pr(&self, selector: &PrSelector) -> Result<(PullRequest, Repository)> {
        match selector {
            PrSelector::Number(number) => {
                let pr = self.pr_by_number(&self.config, *number).await?;
                Ok((pr, self.config.clone()))
            }
            PrSelector::Url { repo, number } => {
                let pr = self.pr_by_number(repo, *number).await?;
                Ok((pr, repo.clone()))
            }
            PrSelector::Branch(branch) => {
                let pr = self.pr_for_branch(&self.config, branch).await?;
                Ok((pr, self.config.clone()))
            }
        }
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn merge_pr(&self, request: &MergeRequest) -> Result<()> {
        debug!(pr_id = %request.pr_id, method = %request.method, "merging PR");
        self.run_mutation(
            "MergePullRequest",
            "MergePullRequestInput",
            build_merge_input(request),
        )
        .await?;
        debug!(pr_id = %request.pr_id, "merge complete");
        Ok(())
    }

    async fn enable_auto_merge(&self, request: &MergeRequest) -> Result<()> {
        debug!(pr_id = %request.pr_id, method = %request.method, "enabling auto-merge");
        self.run_mutation(
            "EnablePullRequestAutoMerge",
            "EnablePullRequestAutoMergeInput",
            build_merge_input(request),
        )
        .await
    }

    async fn disable_auto_merge(&self, pr_id: &str) -> Result<()> {
        debug!(pr_id, "disabling auto-merge");
        self.run_mutation(
            "DisablePullRequestAutoMerge",
            "DisablePullRequestAutoMergeInput",
            json!({ "pullRequestId": pr_id }),
        )
        .await
    }

    async fn delete_remote_branch(&self, repo: &Repository, branch: &str) -> Result<()> {
        debug!(repo = %repo, branch, "deleting remote branch");
        let url = format!(
            "{}/repos/{}/{}/git/refs/heads/{}",
            self.api_base,
            repo.owner,
            repo.name,
            urlencoding::encode(branch)
        );

        let response = self
            .http_client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to delete branch: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(branch, "deleted remote branch");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND
            || (status == StatusCode::UNPROCESSABLE_ENTITY && body.contains("Reference does not exist"))
        {
            debug!(branch, %status, "remote branch already gone");
            return Ok(());
        }

        Err(Error::GitHubApi(format!(
            "Failed to delete branch {branch}: HTTP {status}: {body}"
        )))
    }

    async fn fetch_merge_capabilities(
        &self,
        repo: &Repository,
        base_branch: &str,
    ) -> Result<MergeCapabilities> {
        debug!(repo = %repo, base_branch, "fetching merge capabilities");
        let query = r"
            query RepositoryMergeCapabilities($owner: String!, $repo: String!, $branch: String!) {
                repository(owner: $owner, name: $repo) {
                    mergeCommitAllowed
                    rebaseMergeAllowed
                    squashMergeAllowed
                    mergeQueue(branch: $branch) { configuration { mergeMethod } }
                }
            }
        ";
        let data: RepositoryData<CapabilitiesData> = self
            .graphql(
                query,
                json!({ "owner": repo.owner, "repo": repo.name, "branch": base_branch }),
            )
            .await?;

        let caps = data
            .repository
            .ok_or_else(|| Error::GitHubApi(format!("repository {repo} not found")))?;

        let merge_queue_method = caps
            .merge_queue
            .and_then(|q| q.configuration)
            .and_then(|c| c.merge_method)
            .and_then(|m| MergeMethod::from_graphql(&m));

        let result = MergeCapabilities {
            merge_commit_allowed: caps.merge_commit_allowed,
            rebase_merge_allowed: caps.rebase_merge_allowed,
            squash_merge_allowed: caps.squash_merge_allowed,
            merge_queue_method,
        };
        debug!(?result, "fetched merge capabilities");
        Ok(result)
    }

    async fn fetch_merge_message_defaults(
        &self,
        pr_id: &str,
        method: MergeMethod,
    ) -> Result<MergeMessage> {
        debug!(pr_id, %method, "fetching merge message defaults");
        let query = r"
            query MergeMessageDefaults($id: ID!, $method: PullRequestMergeMethod!) {
                node(id: $id) {
                    ... on PullRequest {
                        viewerMergeHeadlineText(mergeType: $method)
                        viewerMergeBodyText(mergeType: $method)
                    }
                }
            }
        ";
        let data: NodeData = self
            .graphql(query, json!({ "id": pr_id, "method": method.as_graphql() }))
            .await?;

        let text = data
            .node
            .ok_or_else(|| Error::PullRequestNotFound(pr_id.to_string()))?;
        Ok(MergeMessage {
            headline: text.viewer_merge_headline_text,
            body: text.viewer_merge_body_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_input_omits_unset_fields() {
        let input = build_merge_input(&MergeRequest::new("PR_kw1", MergeMethod::Merge));
        let obj = input.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["pullRequestId"], "PR_kw1");
        assert_eq!(obj["mergeMethod"], "MERGE");
    }

    #[test]
    fn test_merge_input_includes_set_fields() {
        let mut request = MergeRequest::new("PR_kw1", MergeMethod::Squash);
        request.commit_headline = Some("Add login (#4)".to_string());
        request.expected_head_oid = Some("abc1234".to_string());
        let input = build_merge_input(&request);

        assert_eq!(input["commitHeadline"], "Add login (#4)");
        assert_eq!(input["expectedHeadOid"], "abc1234");
        assert!(input.get("commitBody").is_none());
        assert!(input.get("authorEmail").is_none());
    }

    #[test]
    fn test_merge_input_omits_blank_commit_text() {
        let mut request = MergeRequest::new("PR_kw1", MergeMethod::Squash);
        request.commit_headline = Some(String::new());
        request.commit_body = Some("  \n".to_string());
        let input = build_merge_input(&request);

        assert!(input.get("commitHeadline").is_none());
        assert!(input.get("commitBody").is_none());
        assert_eq!(input.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("MergePullRequest"), "mergePullRequest");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn test_graphql_pr_conversion() {
        let raw = json!({
            "id": "PR_kw1",
            "number": 7,
            "title": "Add login",
            "state": "OPEN",
            "mergeStateStatus": "BLOCKED",
            "headRefName": "login",
            "baseRefName": "main",
            "headRepositoryOwner": { "login": "someone" },
            "isInMergeQueue": false,
            "isMergeQueueEnabled": true,
            "commits": { "nodes": [{ "commit": { "oid": "deadbeef" } }] }
        });
        let pr: PullRequest = serde_json::from_value::<GraphQlPullRequest>(raw)
            .unwrap()
            .into();
        assert_eq!(pr.merge_state_status, MergeStateStatus::Blocked);
        assert_eq!(pr.head_repository_owner, "someone");
        assert_eq!(pr.last_commit_oid(), Some("deadbeef"));
        assert!(pr.is_merge_queue_enabled);
    }

    #[tokio::test]
    async fn test_delete_remote_branch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/repos/acme/widgets/git/refs/heads/login")
            .match_header("authorization", "Bearer t0ken")
            .with_status(204)
            .create_async()
            .await;

        let repo = Repository::new("acme", "widgets");
        let service = GitHubService::with_api_base("t0ken", repo.clone(), &server.url()).unwrap();
        service.delete_remote_branch(&repo, "login").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_remote_branch_already_gone_is_ok() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/repos/acme/widgets/git/refs/heads/login")
            .with_status(422)
            .with_body(r#"{"message":"Reference does not exist"}"#)
            .create_async()
            .await;

        let repo = Repository::new("acme", "widgets");
        let service = GitHubService::with_api_base("t0ken", repo.clone(), &server.url()).unwrap();
        assert!(service.delete_remote_branch(&repo, "login").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_remote_branch_forbidden_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/repos/acme/widgets/git/refs/heads/login")
            .with_status(403)
            .with_body(r#"{"message":"Must have admin rights"}"#)
            .create_async()
            .await;

        let repo = Repository::new("acme", "widgets");
        let service = GitHubService::with_api_base("t0ken", repo.clone(), &server.url()).unwrap();
        let err = service.delete_remote_branch(&repo, "login").await.unwrap_err();
        assert!(matches!(err, Error::GitHubApi(msg) if msg.contains("403")));
    }
}
