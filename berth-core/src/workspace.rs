//! Per-context workspace registry.
//!
//! One YAML file per workspace at
//! `<home>/.berth/contexts/<context>/workspaces/<id>/workspace.yaml`.
//! Every function takes an explicit `home` so tests can root the registry in a
//! `TempDir`; production callers go through [`crate::store::DiskStore`].

use std::path::Path;

use crate::config;
use crate::error::RegistryError;
use crate::fsutil;
use crate::paths;
use crate::provider;
use crate::types::{ContextName, ProviderName, WorkspaceId, WorkspaceRecord};

/// A workspace id must be a canonical single path segment (see
/// [`WorkspaceId::is_canonical`]); the context must be a valid name.
fn check(context: &ContextName, id: &WorkspaceId) -> Result<(), RegistryError> {
    config::validate_context_name(context)?;
    if !id.is_canonical() {
        return Err(RegistryError::InvalidWorkspaceName(id.0.clone()));
    }
    Ok(())
}

/// All workspaces in `context`, sorted by id.
///
/// Directories without a `workspace.yaml` are skipped; a malformed record
/// fails the whole listing with [`RegistryError::Parse`].
pub fn list_workspaces_at(
    home: &Path,
    context: &ContextName,
) -> Result<Vec<WorkspaceRecord>, RegistryError> {
    config::validate_context_name(context)?;
    let mut result = Vec::new();
    for name in fsutil::list_subdirs(&paths::workspaces_dir(home, context))? {
        let id = WorkspaceId::from(name);
        let path = paths::workspace_path(home, context, &id);
        if !path.exists() {
            tracing::debug!(workspace = %id, "skipping workspace directory without record");
            continue;
        }
        result.push(fsutil::read_yaml(&path)?);
    }
    Ok(result)
}

/// Load a single workspace record.
///
/// Returns [`RegistryError::WorkspaceNotFound`] if absent.
pub fn load_workspace_at(
    home: &Path,
    context: &ContextName,
    id: &WorkspaceId,
) -> Result<WorkspaceRecord, RegistryError> {
    check(context, id)?;
    let path = paths::workspace_path(home, context, id);
    if !path.exists() {
        return Err(RegistryError::WorkspaceNotFound {
            context: context.clone(),
            id: id.clone(),
        });
    }
    fsutil::read_yaml(&path)
}

/// Atomically persist `record`, creating its directory if needed.
pub fn save_workspace_at(
    home: &Path,
    context: &ContextName,
    record: &WorkspaceRecord,
) -> Result<(), RegistryError> {
    check(context, &record.id)?;
    fsutil::write_yaml_atomic(&paths::workspace_path(home, context, &record.id), record)
}

/// Register a new workspace bound to `provider`.
///
/// The provider must exist; an existing id is rejected rather than overwritten.
pub fn create_workspace_at(
    home: &Path,
    context: &ContextName,
    id: WorkspaceId,
    provider: ProviderName,
    source: Option<String>,
) -> Result<WorkspaceRecord, RegistryError> {
    check(context, &id)?;
    if paths::workspace_path(home, context, &id).exists() {
        return Err(RegistryError::WorkspaceExists {
            context: context.clone(),
            id,
        });
    }
    if !provider::provider_exists_at(home, context, &provider)? {
        return Err(RegistryError::ProviderNotFound {
            context: context.clone(),
            name: provider,
        });
    }

    let record = WorkspaceRecord::new(id, provider, source);
    save_workspace_at(home, context, &record)?;
    Ok(record)
}

/// Remove a workspace record and its directory.
pub fn delete_workspace_at(
    home: &Path,
    context: &ContextName,
    id: &WorkspaceId,
    ignore_not_found: bool,
) -> Result<(), RegistryError> {
    check(context, id)?;
    let dir = paths::workspace_dir(home, context, id);
    if !dir.exists() {
        if ignore_not_found {
            return Ok(());
        }
        return Err(RegistryError::WorkspaceNotFound {
            context: context.clone(),
            id: id.clone(),
        });
    }
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
