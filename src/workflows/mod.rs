//! Recursive sub-workflow discovery.
//!
//! A submission launches one or more root workflows; any call within them
//! may itself run a sub-workflow, recursively. Discovery walks that graph
//! and collects Cromwell metadata for every reachable workflow.

pub mod expand;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::firecloud::{MetadataSource, WorkflowMetadata};

pub use expand::{concurrent_expand, DEFAULT_MAX_IN_FLIGHT};

/// Retrieve metadata for every workflow of a submission, including
/// sub-workflows, keyed by workflow id.
///
/// Root workflows that failed before execution began carry no workflow id
/// and are skipped. Each reachable workflow is fetched and scanned exactly
/// once, with sibling fetches running concurrently.
pub async fn get_all_workflows(
    source: &Arc<dyn MetadataSource>,
    submission_id: &str,
) -> Result<HashMap<String, Arc<WorkflowMetadata>>> {
    let submission = source.get_submission(submission_id).await?;
    let seeds: HashSet<String> = submission
        .workflows
        .iter()
        .filter_map(|workflow| workflow.workflow_id.clone())
        .filter(|id| !id.is_empty())
        .collect();

    let discovered: Arc<Mutex<HashMap<String, Arc<WorkflowMetadata>>>> =
        Arc::new(Mutex::new(HashMap::new()));

    let expand = {
        let source = Arc::clone(source);
        let discovered = Arc::clone(&discovered);
        let submission_id = submission_id.to_string();
        move |workflow_id: String| {
            let source = Arc::clone(&source);
            let discovered = Arc::clone(&discovered);
            let submission_id = submission_id.clone();
            async move {
                let metadata = source.get_workflow(&submission_id, &workflow_id).await?;
                let children = subworkflow_ids(&metadata);
                discovered.lock().await.insert(workflow_id, metadata);
                Ok(children)
            }
        }
    };

    concurrent_expand(expand, seeds, DEFAULT_MAX_IN_FLIGHT).await?;

    let result = discovered.lock().await.clone();
    Ok(result)
}

/// Collect the sub-workflow ids referenced by any call attempt of a
/// workflow.
fn subworkflow_ids(metadata: &WorkflowMetadata) -> HashSet<String> {
    metadata
        .attempts()
        .filter_map(|(_, attempt)| attempt.get("subWorkflowId"))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::Error;
    use crate::firecloud::Submission;

    /// In-memory metadata source that counts fetches per workflow id.
    struct FakeSource {
        submission: Submission,
        workflows: HashMap<String, WorkflowMetadata>,
        fetches: Mutex<HashMap<String, usize>>,
        submission_fetches: AtomicUsize,
    }

    impl FakeSource {
        fn new(submission: Value, workflows: Vec<(&str, Value)>) -> Self {
            Self {
                submission: serde_json::from_value(submission).unwrap(),
                workflows: workflows
                    .into_iter()
                    .map(|(id, metadata)| (id.to_string(), serde_json::from_value(metadata).unwrap()))
                    .collect(),
                fetches: Mutex::new(HashMap::new()),
                submission_fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MetadataSource for FakeSource {
        async fn get_submission(&self, _submission_id: &str) -> Result<Arc<Submission>> {
            self.submission_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(self.submission.clone()))
        }

        async fn get_workflow(
            &self,
            _submission_id: &str,
            workflow_id: &str,
        ) -> Result<Arc<WorkflowMetadata>> {
            *self
                .fetches
                .lock()
                .await
                .entry(workflow_id.to_string())
                .or_insert(0) += 1;
            self.workflows
                .get(workflow_id)
                .map(|metadata| Arc::new(metadata.clone()))
                .ok_or_else(|| Error::RemoteService(format!("no such workflow {workflow_id}")))
        }
    }

    fn call_with_subworkflow(id: &str) -> Value {
        json!({"subWorkflowId": id, "executionStatus": "Done"})
    }

    #[tokio::test]
    async fn test_discovers_transitive_subworkflows_once_each() {
        // a -> c -> d, b leaf; both a and b are roots.
        let fake = FakeSource::new(
            json!({
                "submissionId": "sub-1",
                "workflows": [
                    {"workflowId": "a"},
                    {"workflowId": "b"},
                    {"status": "Failed"}
                ]
            }),
            vec![
                ("a", json!({"id": "a", "calls": {"wf.run": [call_with_subworkflow("c")]}})),
                ("b", json!({"id": "b", "calls": {}})),
                ("c", json!({"id": "c", "calls": {"sub.run": [call_with_subworkflow("d")]}})),
                ("d", json!({"id": "d", "calls": {"leaf.task": [{"executionStatus": "Done"}]}})),
            ],
        );
        let fake = Arc::new(fake);
        let source: Arc<dyn MetadataSource> = Arc::clone(&fake) as Arc<dyn MetadataSource>;

        let workflows = get_all_workflows(&source, "sub-1").await.unwrap();

        let mut ids: Vec<&str> = workflows.keys().map(String::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(fake.submission_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_subworkflow_fetched_once() {
        let fake = FakeSource::new(
            json!({
                "submissionId": "sub-1",
                "workflows": [{"workflowId": "a"}, {"workflowId": "b"}]
            }),
            vec![
                ("a", json!({"id": "a", "calls": {"wf.run": [call_with_subworkflow("shared")]}})),
                ("b", json!({"id": "b", "calls": {"wf.run": [call_with_subworkflow("shared")]}})),
                ("shared", json!({"id": "shared", "calls": {}})),
            ],
        );
        let fake = Arc::new(fake);
        let source: Arc<dyn MetadataSource> = Arc::clone(&fake) as Arc<dyn MetadataSource>;

        let workflows = get_all_workflows(&source, "sub-1").await.unwrap();
        assert_eq!(workflows.len(), 3);

        let fetches = fake.fetches.lock().await;
        assert!(fetches.values().all(|&count| count == 1), "{fetches:?}");
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_discovery() {
        let fake = FakeSource::new(
            json!({
                "submissionId": "sub-1",
                "workflows": [{"workflowId": "a"}]
            }),
            vec![("a", json!({"id": "a", "calls": {"wf.run": [call_with_subworkflow("missing")]}}))],
        );
        let source: Arc<dyn MetadataSource> = Arc::new(fake);

        let err = get_all_workflows(&source, "sub-1").await.unwrap_err();
        assert!(matches!(err, Error::RemoteService(_)));
    }

    #[tokio::test]
    async fn test_submission_without_started_workflows() {
        let fake = FakeSource::new(
            json!({
                "submissionId": "sub-1",
                "workflows": [{"status": "Aborted"}]
            }),
            vec![],
        );
        let source: Arc<dyn MetadataSource> = Arc::new(fake);

        let workflows = get_all_workflows(&source, "sub-1").await.unwrap();
        assert!(workflows.is_empty());
    }
}
