//! Repoint a single workspace at a different provider.

use chrono::Utc;
use thiserror::Error;

use crate::error::RegistryError;
use crate::store::{ProviderStore, WorkspaceStore};
use crate::types::{ContextName, ProviderName, WorkspaceId, WorkspaceRecord};

#[derive(Debug, Error)]
pub enum RebindError {
    #[error("loading workspace config: {0}")]
    Load(#[source] RegistryError),

    #[error("checking provider '{name}': {source}")]
    ProviderLookup {
        name: ProviderName,
        #[source]
        source: RegistryError,
    },

    /// The target provider does not exist; the workspace was left untouched.
    #[error("target provider '{name}' not found in context '{context}'")]
    TargetProviderNotFound {
        context: ContextName,
        name: ProviderName,
    },

    #[error("saving workspace config: {0}")]
    Save(#[source] RegistryError),
}

/// What a successful [`rebind`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebindOutcome {
    pub workspace: WorkspaceId,
    pub previous: ProviderName,
    pub current: ProviderName,
}

/// Point workspace `id` at `provider`.
///
/// Touches exactly one workspace record. `provider` must already exist in
/// `context`; otherwise [`RebindError::TargetProviderNotFound`] is returned
/// before any workspace record is read or written.
pub fn rebind<S>(
    store: &S,
    context: &ContextName,
    id: &WorkspaceId,
    provider: &ProviderName,
) -> Result<RebindOutcome, RebindError>
where
    S: WorkspaceStore + ProviderStore + ?Sized,
{
    let exists = store
        .provider_exists(context, provider)
        .map_err(|source| RebindError::ProviderLookup {
            name: provider.clone(),
            source,
        })?;
    if !exists {
        return Err(RebindError::TargetProviderNotFound {
            context: context.clone(),
            name: provider.clone(),
        });
    }

    let mut record = store.load_workspace(context, id).map_err(RebindError::Load)?;

    let previous = record.provider.name.clone();
    tracing::info!(
        workspace = %id,
        from = %previous,
        to = %provider,
        "rebinding workspace"
    );
    repoint(store, context, &mut record, provider).map_err(RebindError::Save)?;

    Ok(RebindOutcome {
        workspace: id.clone(),
        previous,
        current: provider.clone(),
    })
}

/// Set `record`'s binding to `provider` and persist it.
///
/// On error the in-memory record is already modified; callers discard it.
pub(crate) fn repoint<S>(
    store: &S,
    context: &ContextName,
    record: &mut WorkspaceRecord,
    provider: &ProviderName,
) -> Result<(), RegistryError>
where
    S: WorkspaceStore + ?Sized,
{
    record.provider.name = provider.clone();
    record.updated_at = Utc::now();
    store.save_workspace(context, record)
}
