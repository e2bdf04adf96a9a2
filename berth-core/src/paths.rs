//! On-disk layout. Pure path arithmetic, no I/O.
//!
//! ```text
//! ~/.berth/
//!   config.yaml
//!   contexts/<context>/
//!     providers/<provider>/provider.yaml
//!     workspaces/<workspace-id>/workspace.yaml
//! ```

use std::path::{Path, PathBuf};

use crate::types::{ContextName, ProviderName, WorkspaceId};

pub const BERTH_DIR: &str = ".berth";
pub const CONFIG_FILE: &str = "config.yaml";
pub const PROVIDER_FILE: &str = "provider.yaml";
pub const WORKSPACE_FILE: &str = "workspace.yaml";

pub fn berth_root(home: &Path) -> PathBuf {
    home.join(BERTH_DIR)
}

pub fn config_path(home: &Path) -> PathBuf {
    berth_root(home).join(CONFIG_FILE)
}

pub fn context_dir(home: &Path, context: &ContextName) -> PathBuf {
    berth_root(home).join("contexts").join(&context.0)
}

pub fn providers_dir(home: &Path, context: &ContextName) -> PathBuf {
    context_dir(home, context).join("providers")
}

pub fn provider_dir(home: &Path, context: &ContextName, name: &ProviderName) -> PathBuf {
    providers_dir(home, context).join(&name.0)
}

pub fn provider_path(home: &Path, context: &ContextName, name: &ProviderName) -> PathBuf {
    provider_dir(home, context, name).join(PROVIDER_FILE)
}

pub fn workspaces_dir(home: &Path, context: &ContextName) -> PathBuf {
    context_dir(home, context).join("workspaces")
}

pub fn workspace_dir(home: &Path, context: &ContextName, id: &WorkspaceId) -> PathBuf {
    workspaces_dir(home, context).join(&id.0)
}

pub fn workspace_path(home: &Path, context: &ContextName, id: &WorkspaceId) -> PathBuf {
    workspace_dir(home, context, id).join(WORKSPACE_FILE)
}
