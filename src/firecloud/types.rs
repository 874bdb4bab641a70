//! Submission and workflow metadata models.
//!
//! Cromwell call metadata is open-ended, so call attempts stay as raw
//! `serde_json::Value`s and are read through [`crate::firecloud::metadata`].
//! The typed fields here are only the ones the discoverer and the CLI need;
//! everything else is preserved in `extra` so JSON dumps stay complete.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One entry from the submissions listing endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub submission_id: String,
    pub submission_date: String,
    pub status: String,
}

/// A submission and its member workflows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: String,
    #[serde(default)]
    pub workflows: Vec<WorkflowRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Reference to a member workflow. Workflows that failed before execution
/// started carry no workflow id and have no metadata to fetch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Cromwell metadata for one workflow execution.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call name to ordered attempt records. A `BTreeMap` keeps call
    /// iteration deterministic across runs.
    #[serde(default)]
    pub calls: BTreeMap<String, Vec<Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl WorkflowMetadata {
    /// Iterate every call attempt in (call name, attempt order) order.
    pub fn attempts(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.calls
            .iter()
            .flat_map(|(name, attempts)| attempts.iter().map(move |a| (name.as_str(), a)))
    }
}
