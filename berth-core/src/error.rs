//! Error types for berth-core registries.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ContextName, ProviderName, WorkspaceId};

/// All errors that can arise from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.berth/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("workspace '{id}' not found in context '{context}'")]
    WorkspaceNotFound { context: ContextName, id: WorkspaceId },

    #[error("workspace '{id}' already exists in context '{context}'")]
    WorkspaceExists { context: ContextName, id: WorkspaceId },

    #[error("provider '{name}' does not exist in context '{context}'")]
    ProviderNotFound {
        context: ContextName,
        name: ProviderName,
    },

    #[error("provider '{name}' already exists in context '{context}'")]
    ProviderExists {
        context: ContextName,
        name: ProviderName,
    },

    #[error("invalid provider name '{name}': {reason}")]
    InvalidProviderName { name: String, reason: &'static str },

    #[error("invalid context name '{name}': {reason}")]
    InvalidContextName { name: String, reason: &'static str },

    #[error("invalid workspace name '{0}'")]
    InvalidWorkspaceName(String),

    /// Deleting a provider that workspaces still reference would dangle them.
    #[error(
        "cannot delete provider '{name}': still used by workspace(s) {}",
        join_ids(.workspaces)
    )]
    ProviderInUse {
        name: ProviderName,
        workspaces: Vec<WorkspaceId>,
    },
}

impl RegistryError {
    /// True for the "record does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::WorkspaceNotFound { .. } | RegistryError::ProviderNotFound { .. }
        )
    }
}

fn join_ids(ids: &[WorkspaceId]) -> String {
    ids.iter()
        .map(|id| id.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
