//! Per-task cost estimation over workflow call metadata.
//!
//! Each non-sub-workflow call attempt yields one [`CostRecord`]. Attempts
//! with missing required fields or unsupported machine types are logged and
//! skipped; a single bad attempt never aborts estimation for the rest of
//! the workflow.

pub mod machine;
pub mod pricing;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::firecloud::metadata::{fetch_field, field_as_i64, field_as_str, optional_field};
use crate::firecloud::WorkflowMetadata;

/// Cromwell timestamp format: ISO-8601 with fractional seconds and a
/// literal `Z`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Sentinel rendered for fields that do not apply to an attempt.
pub const NOT_APPLICABLE: &str = "NA";

/// Whether a preemptible instance was actually preempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preempted {
    /// The attempt was cached or did not run on a preemptible instance.
    NotApplicable,
    Yes,
    No,
}

impl fmt::Display for Preempted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Preempted::NotApplicable => NOT_APPLICABLE,
            Preempted::Yes => "true",
            Preempted::No => "false",
        })
    }
}

impl Serialize for Preempted {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Preempted::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
            Preempted::Yes => serializer.serialize_bool(true),
            Preempted::No => serializer.serialize_bool(false),
        }
    }
}

/// Estimated cost and resource usage for one call attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CostRecord {
    pub task_name: String,
    pub cost: f64,
    pub number_of_cpus: u32,
    pub memory_gb: f64,
    pub disk_gb: f64,
    pub duration_seconds: f64,
    pub call_cached: bool,
    pub preempted: Preempted,
    pub machine_type: String,
}

/// Lazily estimate costs for every leaf task attempt of a workflow, in
/// (call name, attempt) order.
///
/// Attempts that reference sub-workflows are excluded here; they are
/// estimated when their own metadata is visited. Attempts that cannot be
/// estimated are logged against `workflow_id` and skipped.
pub fn estimate_workflow_cost<'a>(
    workflow_id: &'a str,
    metadata: &'a WorkflowMetadata,
) -> impl Iterator<Item = CostRecord> + 'a {
    metadata
        .attempts()
        .filter(|(_, attempt)| attempt.get("subWorkflowId").is_none())
        .filter_map(move |(call_name, attempt)| {
            match estimate_attempt(call_name, attempt) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Unable to estimate costs for workflow {workflow_id}: {err}");
                    None
                }
            }
        })
}

fn estimate_attempt(call_name: &str, attempt: &Value) -> Result<CostRecord> {
    // Call names take the form `workflowName.taskName`. Anything after a
    // second dot is ignored, matching what Cromwell emits for plain calls.
    let task_name = call_name
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::CostEstimation(format!("Malformed call name '{call_name}'")))?
        .to_string();

    let call_cached = optional_field(attempt, "callCaching.hit")
        .map(|value| field_as_i64(value, "callCaching.hit"))
        .transpose()?
        .unwrap_or(0)
        != 0;

    if call_cached {
        // Cache hits reuse a previous call's outputs; no compute ran.
        return Ok(CostRecord {
            task_name,
            cost: 0.0,
            number_of_cpus: 0,
            memory_gb: 0.0,
            disk_gb: 0.0,
            duration_seconds: 0.0,
            call_cached: true,
            preempted: Preempted::NotApplicable,
            machine_type: NOT_APPLICABLE.to_string(),
        });
    }

    let machine_type = field_as_str(fetch_field(attempt, "jes.machineType")?, "jes.machineType")?
        .to_string();
    // The Lifesciences Pipelines API provisions custom N1 machines unless a
    // newer cpu platform was requested.
    let (cpus, memory_gb) = machine::parse_machine_type(&machine_type)?;

    let start = parse_timestamp(field_as_str(fetch_field(attempt, "start")?, "start")?)?;
    let end = parse_timestamp(field_as_str(fetch_field(attempt, "end")?, "end")?)?;
    let runtime_seconds = (end - start).num_milliseconds() as f64 / 1000.0;

    let preemptible = field_as_i64(
        fetch_field(attempt, "runtimeAttributes.preemptible")?,
        "runtimeAttributes.preemptible",
    )? != 0;
    let preempted = if preemptible {
        let backend_status =
            field_as_str(fetch_field(attempt, "backendStatus")?, "backendStatus")?;
        if backend_status == "Preempted" {
            Preempted::Yes
        } else {
            Preempted::No
        }
    } else {
        Preempted::NotApplicable
    };

    let disks = optional_field(attempt, "runtimeAttributes.disks")
        .and_then(Value::as_str)
        .unwrap_or("");
    let disk_gb = if disks.starts_with("local-disk") {
        parse_disk_size(disks)?
    } else {
        // No usable disk description; guess 1 GB.
        1.0
    };
    let disk_cost = if disks.ends_with("LOCAL") {
        pricing::LocalSsd::estimate(disk_gb, runtime_seconds)
    } else {
        pricing::PersistentDisk::estimate(disk_gb, runtime_seconds)
    };

    let cpu_platform = optional_field(attempt, "runtimeAttributes.cpuPlatform")
        .and_then(Value::as_str)
        .unwrap_or("");
    let instance_cost = if matches!(cpu_platform, "Intel Cascade Lake" | "AMD Rome") {
        pricing::CustomN2::estimate(cpus, memory_gb, runtime_seconds, preemptible)
    } else {
        pricing::CustomN1::estimate(cpus, memory_gb, runtime_seconds, preemptible)
    };

    Ok(CostRecord {
        task_name,
        cost: instance_cost + disk_cost,
        number_of_cpus: cpus,
        memory_gb,
        disk_gb,
        duration_seconds: runtime_seconds,
        call_cached: false,
        preempted,
        machine_type,
    })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| Error::CostEstimation(format!("Cannot parse timestamp '{value}': {e}")))
}

/// Parse a `local-disk <size> <type>` descriptor and return the size in GB.
fn parse_disk_size(disks: &str) -> Result<f64> {
    let tokens: Vec<&str> = disks.split_whitespace().collect();
    let size = match tokens.as_slice() {
        [_, size, _] => size,
        _ => {
            return Err(Error::CostEstimation(format!(
                "Cannot parse disk description '{disks}'"
            )))
        }
    };
    size.parse()
        .map_err(|_| Error::CostEstimation(format!("Cannot parse disk size from '{disks}'")))
}
