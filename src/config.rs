//! Workspace configuration resolution.
//!
//! Workspace name and namespace are ambient settings: they come from CLI
//! flags when given, otherwise from environment variables. The API base URL
//! and auth token are environment-only.

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.firecloud.org/api";

pub const WORKSPACE_ENV: &str = "TERRA_WORKSPACE";
pub const WORKSPACE_NAMESPACE_ENV: &str = "TERRA_WORKSPACE_NAMESPACE";
pub const API_URL_ENV: &str = "FIRECLOUD_API_URL";
pub const AUTH_TOKEN_ENV: &str = "FIRECLOUD_TOKEN";

/// Resolved settings for talking to one Terra workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Workspace namespace (the Terra billing project).
    pub namespace: String,
    /// Workspace name.
    pub name: String,
    /// Base URL of the FireCloud orchestration API.
    pub api_url: String,
    /// Bearer token for the API, if configured.
    pub auth_token: Option<String>,
}

impl WorkspaceConfig {
    /// Resolve workspace settings from CLI flags, falling back to
    /// environment variables.
    pub fn resolve(workspace: Option<String>, namespace: Option<String>) -> Result<Self> {
        Self::resolve_from(workspace, namespace, |key| std::env::var(key).ok())
    }

    /// Resolve with a custom environment lookup. For testing without
    /// touching process-global environment variables.
    pub fn resolve_from(
        workspace: Option<String>,
        namespace: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let lookup = |key: &str| env(key).filter(|value| !value.is_empty());

        let name = workspace
            .filter(|value| !value.is_empty())
            .or_else(|| lookup(WORKSPACE_ENV))
            .ok_or_else(|| {
                Error::Config(format!(
                    "no workspace name; pass --workspace or set {WORKSPACE_ENV}"
                ))
            })?;
        let namespace = namespace
            .filter(|value| !value.is_empty())
            .or_else(|| lookup(WORKSPACE_NAMESPACE_ENV))
            .ok_or_else(|| {
                Error::Config(format!(
                    "no workspace namespace; pass --workspace-namespace or set {WORKSPACE_NAMESPACE_ENV}"
                ))
            })?;

        Ok(Self {
            namespace,
            name,
            api_url: lookup(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth_token: lookup(AUTH_TOKEN_ENV),
        })
    }
}
