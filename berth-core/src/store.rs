//! Registry traits consumed by [`crate::rebind`] and [`crate::rename`].
//!
//! The operations depend on these traits rather than on the filesystem
//! functions directly so that a failing store can be substituted in tests.
//! [`DiskStore`] is the production implementation.

use std::path::{Path, PathBuf};

use crate::config;
use crate::error::RegistryError;
use crate::fsutil;
use crate::provider;
use crate::types::{
    ContextName, GlobalConfig, ProviderName, ProviderRecord, WorkspaceId, WorkspaceRecord,
};
use crate::workspace;

/// Workspace records of one context.
pub trait WorkspaceStore {
    fn list_workspaces(&self, context: &ContextName)
        -> Result<Vec<WorkspaceRecord>, RegistryError>;

    fn load_workspace(
        &self,
        context: &ContextName,
        id: &WorkspaceId,
    ) -> Result<WorkspaceRecord, RegistryError>;

    fn save_workspace(
        &self,
        context: &ContextName,
        record: &WorkspaceRecord,
    ) -> Result<(), RegistryError>;
}

/// Provider records of one context.
pub trait ProviderStore {
    fn provider_exists(
        &self,
        context: &ContextName,
        name: &ProviderName,
    ) -> Result<bool, RegistryError>;

    /// Create `target` as a verbatim copy of `source`. Must reject an invalid
    /// `source` or `target` name, an already-taken `target` and a missing
    /// `source`, all before writing anything.
    fn clone_provider(
        &self,
        context: &ContextName,
        source: &ProviderName,
        target: &ProviderName,
    ) -> Result<ProviderRecord, RegistryError>;

    fn delete_provider(
        &self,
        context: &ContextName,
        name: &ProviderName,
        ignore_not_found: bool,
    ) -> Result<(), RegistryError>;
}

/// The global config file.
pub trait ConfigStore {
    fn load_config(&self) -> Result<GlobalConfig, RegistryError>;

    fn save_config(&self, config: &GlobalConfig) -> Result<(), RegistryError>;
}

/// Filesystem-backed store rooted at `<home>/.berth/`.
#[derive(Debug, Clone)]
pub struct DiskStore {
    home: PathBuf,
}

impl DiskStore {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Root the store at the current user's home directory.
    pub fn open() -> Result<Self, RegistryError> {
        Ok(Self::new(fsutil::home()?))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

impl WorkspaceStore for DiskStore {
    fn list_workspaces(
        &self,
        context: &ContextName,
    ) -> Result<Vec<WorkspaceRecord>, RegistryError> {
        workspace::list_workspaces_at(&self.home, context)
    }

    fn load_workspace(
        &self,
        context: &ContextName,
        id: &WorkspaceId,
    ) -> Result<WorkspaceRecord, RegistryError> {
        workspace::load_workspace_at(&self.home, context, id)
    }

    fn save_workspace(
        &self,
        context: &ContextName,
        record: &WorkspaceRecord,
    ) -> Result<(), RegistryError> {
        workspace::save_workspace_at(&self.home, context, record)
    }
}

impl ProviderStore for DiskStore {
    fn provider_exists(
        &self,
        context: &ContextName,
        name: &ProviderName,
    ) -> Result<bool, RegistryError> {
        provider::provider_exists_at(&self.home, context, name)
    }

    fn clone_provider(
        &self,
        context: &ContextName,
        source: &ProviderName,
        target: &ProviderName,
    ) -> Result<ProviderRecord, RegistryError> {
        provider::clone_provider_at(&self.home, context, source, target)
    }

    fn delete_provider(
        &self,
        context: &ContextName,
        name: &ProviderName,
        ignore_not_found: bool,
    ) -> Result<(), RegistryError> {
        provider::delete_provider_at(&self.home, context, name, ignore_not_found)
    }
}

impl ConfigStore for DiskStore {
    fn load_config(&self) -> Result<GlobalConfig, RegistryError> {
        config::load_config_at(&self.home)
    }

    fn save_config(&self, config: &GlobalConfig) -> Result<(), RegistryError> {
        config::save_config_at(&self.home, config)
    }
}
