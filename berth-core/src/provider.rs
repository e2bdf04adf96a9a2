//! Per-context provider registry.
//!
//! A provider is a directory at
//! `<home>/.berth/contexts/<context>/providers/<name>/` holding
//! `provider.yaml` plus whatever driver files were installed alongside it.
//! Cloning copies the whole directory, so those files survive a rename.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;

use crate::config;
use crate::error::RegistryError;
use crate::fsutil;
use crate::paths;
use crate::types::{name_violation, ContextName, ProviderName, ProviderRecord, MAX_NAME_LEN};

/// Longest accepted provider name.
pub const MAX_PROVIDER_NAME_LEN: usize = MAX_NAME_LEN;

/// Reject names that cannot safely become a directory name.
///
/// Accepted: 1..=32 chars of `[a-z0-9-]`.
pub fn validate_provider_name(name: &str) -> Result<(), RegistryError> {
    match name_violation(name) {
        Some(reason) => Err(RegistryError::InvalidProviderName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Both path segments a provider lives under must be plain names.
fn check(context: &ContextName, name: &ProviderName) -> Result<(), RegistryError> {
    config::validate_context_name(context)?;
    validate_provider_name(&name.0)
}

pub fn provider_exists_at(
    home: &Path,
    context: &ContextName,
    name: &ProviderName,
) -> Result<bool, RegistryError> {
    check(context, name)?;
    Ok(paths::provider_path(home, context, name).exists())
}

/// All providers in `context`, sorted by name.
pub fn list_providers_at(
    home: &Path,
    context: &ContextName,
) -> Result<Vec<ProviderRecord>, RegistryError> {
    config::validate_context_name(context)?;
    let mut result = Vec::new();
    for name in fsutil::list_subdirs(&paths::providers_dir(home, context))? {
        let path = paths::provider_path(home, context, &ProviderName::from(name));
        if path.exists() {
            result.push(fsutil::read_yaml(&path)?);
        }
    }
    Ok(result)
}

/// Returns [`RegistryError::ProviderNotFound`] if absent.
pub fn load_provider_at(
    home: &Path,
    context: &ContextName,
    name: &ProviderName,
) -> Result<ProviderRecord, RegistryError> {
    check(context, name)?;
    let path = paths::provider_path(home, context, name);
    if !path.exists() {
        return Err(RegistryError::ProviderNotFound {
            context: context.clone(),
            name: name.clone(),
        });
    }
    fsutil::read_yaml(&path)
}

/// Create a new provider record.
pub fn add_provider_at(
    home: &Path,
    context: &ContextName,
    name: ProviderName,
    source: Option<String>,
    options: BTreeMap<String, String>,
) -> Result<ProviderRecord, RegistryError> {
    if provider_exists_at(home, context, &name)? {
        return Err(RegistryError::ProviderExists {
            context: context.clone(),
            name,
        });
    }

    let now = Utc::now();
    let record = ProviderRecord {
        name,
        source,
        options,
        created_at: now,
        updated_at: now,
    };
    fsutil::write_yaml_atomic(&paths::provider_path(home, context, &record.name), &record)?;
    Ok(record)
}

/// Create `target` as a copy of `source`.
///
/// The copy is assembled in a hidden sibling directory and renamed into place,
/// so a failed clone never leaves a half-populated `target` behind.
///
/// Errors, in the order they are checked: [`RegistryError::InvalidContextName`],
/// [`RegistryError::InvalidProviderName`] (target, then source),
/// [`RegistryError::ProviderExists`], [`RegistryError::ProviderNotFound`].
pub fn clone_provider_at(
    home: &Path,
    context: &ContextName,
    source: &ProviderName,
    target: &ProviderName,
) -> Result<ProviderRecord, RegistryError> {
    check(context, target)?;
    validate_provider_name(&source.0)?;
    let target_dir = paths::provider_dir(home, context, target);
    if target_dir.exists() {
        return Err(RegistryError::ProviderExists {
            context: context.clone(),
            name: target.clone(),
        });
    }
    let original = load_provider_at(home, context, source)?;

    let staging = paths::providers_dir(home, context).join(format!(".{}.clone", target.0));
    if staging.exists() {
        std::fs::remove_dir_all(&staging)?;
    }

    let result = stage_clone(home, context, source, original, target, &staging)
        .and_then(|record| {
            std::fs::rename(&staging, &target_dir)?;
            Ok(record)
        });

    if result.is_err() && staging.exists() {
        if let Err(e) = std::fs::remove_dir_all(&staging) {
            tracing::warn!(
                path = %staging.display(),
                error = %e,
                "failed to remove clone staging directory"
            );
        }
    }
    result
}

fn stage_clone(
    home: &Path,
    context: &ContextName,
    source: &ProviderName,
    original: ProviderRecord,
    target: &ProviderName,
    staging: &Path,
) -> Result<ProviderRecord, RegistryError> {
    fsutil::copy_dir(&paths::provider_dir(home, context, source), staging)?;
    let now = Utc::now();
    let record = ProviderRecord {
        name: target.clone(),
        created_at: now,
        updated_at: now,
        ..original
    };
    fsutil::write_yaml_atomic(&staging.join(paths::PROVIDER_FILE), &record)?;
    Ok(record)
}

/// Remove a provider directory.
///
/// With `ignore_not_found`, deleting a missing provider succeeds. Callers are
/// responsible for checking that no workspace still references `name`.
pub fn delete_provider_at(
    home: &Path,
    context: &ContextName,
    name: &ProviderName,
    ignore_not_found: bool,
) -> Result<(), RegistryError> {
    check(context, name)?;
    let dir = paths::provider_dir(home, context, name);
    if !dir.exists() {
        if ignore_not_found {
            return Ok(());
        }
        return Err(RegistryError::ProviderNotFound {
            context: context.clone(),
            name: name.clone(),
        });
    }
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
