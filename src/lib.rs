//! # Terracost
//!
//! Estimate Google Cloud costs for Terra workflow submissions by walking
//! Cromwell execution metadata.
//!
//! ## Usage
//!
//! ```bash
//! terracost estimate-submission-cost --submission-id <ID> [--tsv]
//! ```
//!
//! ## Modules
//!
//! - `config` - Workspace and API endpoint resolution
//! - `cost` - Per-task cost estimation and GCP price models
//! - `error` - Crate-wide error type
//! - `firecloud` - FireCloud orchestration API client with response memoization
//! - `report` - Fixed-width and TSV report rendering
//! - `workflows` - Recursive sub-workflow discovery with bounded concurrency
pub mod config;
pub mod cost;
pub mod error;
pub mod firecloud;
pub mod report;
pub mod workflows;
