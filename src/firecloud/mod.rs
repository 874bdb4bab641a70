//! FireCloud orchestration API layer.
//!
//! - `client` - HTTP client with per-key response memoization
//! - `metadata` - dotted-path access into unstructured call metadata
//! - `types` - submission and workflow metadata models

pub mod client;
pub mod metadata;
pub mod types;

pub use client::{FireCloudClient, MetadataSource};
pub use types::{Submission, SubmissionSummary, WorkflowMetadata, WorkflowRef};
