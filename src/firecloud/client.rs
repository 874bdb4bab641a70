//! FireCloud orchestration API client.
//!
//! Submission and workflow lookups are memoized per argument key in caches
//! owned by the client instance: repeated identical calls return the cached
//! value without another network round trip. Entries live for the client's
//! lifetime; this is read-mostly data and eviction is not needed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::WorkspaceConfig;
use crate::error::{Error, Result};

use super::types::{Submission, SubmissionSummary, WorkflowMetadata};

/// Source of submission and workflow metadata.
///
/// The production implementation is [`FireCloudClient`]; tests substitute an
/// in-memory fake so discovery and estimation run without a network.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch a submission, including its member workflows.
    async fn get_submission(&self, submission_id: &str) -> Result<Arc<Submission>>;

    /// Fetch full Cromwell metadata for one workflow of a submission.
    async fn get_workflow(
        &self,
        submission_id: &str,
        workflow_id: &str,
    ) -> Result<Arc<WorkflowMetadata>>;
}

/// HTTP client for one Terra workspace.
pub struct FireCloudClient {
    client: Client,
    api_url: String,
    namespace: String,
    workspace: String,
    auth_token: Option<String>,
    submissions: Mutex<HashMap<String, Arc<Submission>>>,
    workflows: Mutex<HashMap<(String, String), Arc<WorkflowMetadata>>>,
}

impl FireCloudClient {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
            workspace: config.name.clone(),
            auth_token: config.auth_token.clone(),
            submissions: Mutex::new(HashMap::new()),
            workflows: Mutex::new(HashMap::new()),
        }
    }

    /// List submission summaries for the workspace. Not memoized; listings
    /// change as new submissions are launched.
    pub async fn list_submissions(&self) -> Result<Vec<SubmissionSummary>> {
        let url = format!(
            "{}/workspaces/{}/{}/submissions",
            self.api_url, self.namespace, self.workspace
        );
        self.fetch_json(&url).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {url}");
        let mut request = self.client.get(url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteService(format!("GET {url} returned {status}")));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MetadataSource for FireCloudClient {
    async fn get_submission(&self, submission_id: &str) -> Result<Arc<Submission>> {
        if let Some(cached) = self.submissions.lock().await.get(submission_id) {
            return Ok(Arc::clone(cached));
        }
        let url = format!(
            "{}/workspaces/{}/{}/submissions/{submission_id}",
            self.api_url, self.namespace, self.workspace
        );
        let submission = Arc::new(self.fetch_json::<Submission>(&url).await?);
        self.submissions
            .lock()
            .await
            .insert(submission_id.to_string(), Arc::clone(&submission));
        Ok(submission)
    }

    async fn get_workflow(
        &self,
        submission_id: &str,
        workflow_id: &str,
    ) -> Result<Arc<WorkflowMetadata>> {
        let key = (submission_id.to_string(), workflow_id.to_string());
        if let Some(cached) = self.workflows.lock().await.get(&key) {
            return Ok(Arc::clone(cached));
        }
        let url = format!(
            "{}/workspaces/{}/{}/submissions/{submission_id}/workflows/{workflow_id}",
            self.api_url, self.namespace, self.workspace
        );
        let metadata = Arc::new(self.fetch_json::<WorkflowMetadata>(&url).await?);
        self.workflows
            .lock()
            .await
            .insert(key, Arc::clone(&metadata));
        Ok(metadata)
    }
}
