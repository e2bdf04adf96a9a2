//! Provider rename saga.
//!
//! Renaming a provider clones it under the new name, repoints every workspace
//! bound to the old name, moves the context's default provider if it pointed
//! at the old name, and finally deletes the old provider. A failure anywhere
//! after the clone rolls the rebound workspaces back and deletes the clone.
//!
//! ```text
//! Discovering ─▶ Cloning ─▶ Rebinding ─▶ UpdatingDefault ─▶ Committing ─▶ Done(Ok | StaleOldProvider)
//!      │            │           │               │
//!      │            │           └───────────────┴─▶ RollingBack ─▶ Done(RolledBack)
//!      └────────────┴─▶ Done(Discovery | Clone)
//! ```
//!
//! Each arrow is one call to [`RenameSaga::step`]. Workspaces are rebound
//! strictly after the clone exists and strictly before the old provider is
//! deleted, so every binding resolves to an existing provider throughout.
//!
//! No locking is performed. Two concurrent renames in one context, or a crash
//! between steps, can leave both providers present with the affected
//! workspaces split between them.

use thiserror::Error;

use crate::error::RegistryError;
use crate::rebind::repoint;
use crate::store::{ConfigStore, ProviderStore, WorkspaceStore};
use crate::types::{ContextName, GlobalConfig, ProviderName, WorkspaceId, WorkspaceRecord};

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub context: ContextName,
    pub old: ProviderName,
    pub new: ProviderName,
}

/// Result of a committed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameReport {
    pub old: ProviderName,
    pub new: ProviderName,
    /// Workspaces now bound to `new`, in enumeration order.
    pub rebound: Vec<WorkspaceId>,
    /// Whether the context's default provider was moved from `old` to `new`.
    pub default_updated: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A forward step that failed and forces a rollback.
#[derive(Debug, Error)]
pub enum StepFailure {
    #[error("failed to rebind workspace {workspace}: {source}")]
    Rebind {
        workspace: WorkspaceId,
        #[source]
        source: RegistryError,
    },

    #[error("failed to update default provider: {source}")]
    DefaultUpdate {
        #[source]
        source: RegistryError,
    },
}

/// A workspace that could not be restored to the old provider during rollback.
#[derive(Debug, Error)]
#[error("failed to roll back workspace {workspace}: {source}")]
pub struct RollbackFailure {
    pub workspace: WorkspaceId,
    #[source]
    pub source: RegistryError,
}

#[derive(Debug, Error)]
pub enum RenameError {
    /// Listing workspaces failed. Nothing was mutated.
    #[error("listing workspaces: {0}")]
    Discovery(#[source] RegistryError),

    /// The clone was rejected or failed. Nothing was mutated.
    #[error("failed to clone provider: {0}")]
    Clone(#[source] RegistryError),

    /// At least one rebind or the default update failed; the saga rolled back.
    ///
    /// `rollback_failures` and `cleanup` are non-empty only when the rollback
    /// itself was incomplete and manual cleanup may be needed.
    #[error("{}", describe_rollback(.failures, .rollback_failures, .cleanup))]
    RolledBack {
        failures: Vec<StepFailure>,
        rollback_failures: Vec<RollbackFailure>,
        cleanup: Option<RegistryError>,
    },

    /// The rename is complete but the old provider is still on disk.
    #[error(
        "rename to '{new}' succeeded but stale old provider '{old}' could not be removed: {source}"
    )]
    StaleOldProvider {
        old: ProviderName,
        new: ProviderName,
        rebound: Vec<WorkspaceId>,
        default_updated: bool,
        #[source]
        source: RegistryError,
    },
}

impl RenameError {
    /// True when the rename failed because a record does not exist, most
    /// commonly because the old provider is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            RenameError::Discovery(e) | RenameError::Clone(e) => e.is_not_found(),
            _ => false,
        }
    }
}

fn describe_rollback(
    failures: &[StepFailure],
    rollback_failures: &[RollbackFailure],
    cleanup: &Option<RegistryError>,
) -> String {
    let primary = match failures {
        [single] => single.to_string(),
        many => format!(
            "failed to rebind {} workspace(s): {}",
            many.len(),
            join_errors(many)
        ),
    };

    let mut message = match cleanup {
        Some(err) => format!(
            "failed to rebind workspaces and failed to cleanup cloned provider: {err}; original error: {primary}"
        ),
        None => primary,
    };
    if !rollback_failures.is_empty() {
        message.push_str(&format!(
            " ({} workspace(s) could not be rolled back: {})",
            rollback_failures.len(),
            join_errors(rollback_failures)
        ));
    }
    message
}

fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum RenameState {
    Discovering,
    Cloning {
        affected: Vec<WorkspaceRecord>,
    },
    Rebinding {
        affected: Vec<WorkspaceRecord>,
    },
    UpdatingDefault {
        rebound: Vec<WorkspaceId>,
    },
    Committing {
        rebound: Vec<WorkspaceId>,
        default_updated: bool,
    },
    RollingBack {
        rebound: Vec<WorkspaceId>,
        failures: Vec<StepFailure>,
    },
    Done(Result<RenameReport, RenameError>),
}

impl RenameState {
    pub fn name(&self) -> &'static str {
        match self {
            RenameState::Discovering => "discovering",
            RenameState::Cloning { .. } => "cloning",
            RenameState::Rebinding { .. } => "rebinding",
            RenameState::UpdatingDefault { .. } => "updating-default",
            RenameState::Committing { .. } => "committing",
            RenameState::RollingBack { .. } => "rolling-back",
            RenameState::Done(_) => "done",
        }
    }
}

/// Drives one rename through [`RenameState`].
///
/// `config` is the caller's already-loaded global config; it is saved through
/// the store only when the default provider moves, and restored in memory if
/// that save fails.
pub struct RenameSaga<'a, S: ?Sized> {
    store: &'a S,
    config: &'a mut GlobalConfig,
    request: RenameRequest,
}

impl<'a, S> RenameSaga<'a, S>
where
    S: WorkspaceStore + ProviderStore + ConfigStore + ?Sized,
{
    pub fn new(store: &'a S, config: &'a mut GlobalConfig, request: RenameRequest) -> Self {
        Self {
            store,
            config,
            request,
        }
    }

    /// Step from [`RenameState::Discovering`] until done.
    pub fn run(mut self) -> Result<RenameReport, RenameError> {
        tracing::info!(
            old = %self.request.old,
            new = %self.request.new,
            context = %self.request.context,
            "renaming provider using clone and rebinding workspaces"
        );
        let mut state = RenameState::Discovering;
        loop {
            tracing::debug!(state = state.name(), "rename step");
            state = match self.step(state) {
                RenameState::Done(result) => return result,
                next => next,
            };
        }
    }

    /// Perform the single transition out of `state`.
    pub fn step(&mut self, state: RenameState) -> RenameState {
        match state {
            RenameState::Discovering => self.discover(),
            RenameState::Cloning { affected } => self.clone_provider(affected),
            RenameState::Rebinding { affected } => self.rebind_affected(affected),
            RenameState::UpdatingDefault { rebound } => self.update_default(rebound),
            RenameState::Committing {
                rebound,
                default_updated,
            } => self.commit(rebound, default_updated),
            RenameState::RollingBack { rebound, failures } => self.roll_back(rebound, failures),
            done @ RenameState::Done(_) => done,
        }
    }

    fn discover(&self) -> RenameState {
        let RenameRequest { context, old, new } = &self.request;
        let all = match self.store.list_workspaces(context) {
            Ok(all) => all,
            Err(e) => return RenameState::Done(Err(RenameError::Discovery(e))),
        };

        let affected: Vec<WorkspaceRecord> =
            all.into_iter().filter(|w| w.is_bound_to(old)).collect();
        if affected.is_empty() {
            tracing::info!(provider = %old, "no workspaces are bound to this provider");
        } else {
            tracing::info!(
                count = affected.len(),
                from = %old,
                to = %new,
                "workspace(s) will be rebound"
            );
            for w in &affected {
                tracing::info!(workspace = %w.id, "affected workspace");
            }
        }
        RenameState::Cloning { affected }
    }

    fn clone_provider(&self, affected: Vec<WorkspaceRecord>) -> RenameState {
        let RenameRequest { context, old, new } = &self.request;
        match self.store.clone_provider(context, old, new) {
            Ok(_) => {
                tracing::info!(from = %old, to = %new, "provider cloned");
                RenameState::Rebinding { affected }
            }
            Err(e) => RenameState::Done(Err(RenameError::Clone(e))),
        }
    }

    fn rebind_affected(&self, affected: Vec<WorkspaceRecord>) -> RenameState {
        let RenameRequest { context, new, .. } = &self.request;
        let mut rebound = Vec::with_capacity(affected.len());
        let mut failures = Vec::new();

        for mut record in affected {
            let id = record.id.clone();
            tracing::info!(workspace = %id, provider = %new, "rebinding workspace");
            match repoint(self.store, context, &mut record, new) {
                Ok(()) => rebound.push(id),
                Err(source) => {
                    tracing::error!(workspace = %id, error = %source, "failed to rebind workspace");
                    failures.push(StepFailure::Rebind {
                        workspace: id,
                        source,
                    });
                }
            }
        }

        if failures.is_empty() {
            RenameState::UpdatingDefault { rebound }
        } else {
            RenameState::RollingBack { rebound, failures }
        }
    }

    fn update_default(&mut self, rebound: Vec<WorkspaceId>) -> RenameState {
        let RenameRequest { context, old, new } = &self.request;
        if self.config.default_provider(context) != Some(old) {
            return RenameState::Committing {
                rebound,
                default_updated: false,
            };
        }

        let previous = self
            .config
            .set_default_provider(context, Some(new.clone()));
        match self.store.save_config(&*self.config) {
            Ok(()) => {
                tracing::info!(from = %old, to = %new, "updated default provider");
                RenameState::Committing {
                    rebound,
                    default_updated: true,
                }
            }
            Err(source) => {
                self.config.set_default_provider(context, previous);
                tracing::error!(provider = %new, error = %source, "failed to update default provider");
                RenameState::RollingBack {
                    rebound,
                    failures: vec![StepFailure::DefaultUpdate { source }],
                }
            }
        }
    }

    fn commit(&self, rebound: Vec<WorkspaceId>, default_updated: bool) -> RenameState {
        let RenameRequest { context, old, new } = &self.request;
        match self.store.delete_provider(context, old, true) {
            Ok(()) => {
                tracing::info!(provider = %old, "old provider deleted");
                tracing::info!(
                    from = %old,
                    to = %new,
                    rebound = rebound.len(),
                    "provider renamed"
                );
                RenameState::Done(Ok(RenameReport {
                    old: old.clone(),
                    new: new.clone(),
                    rebound,
                    default_updated,
                }))
            }
            Err(source) => {
                tracing::error!(provider = %old, error = %source, "failed to delete old provider");
                RenameState::Done(Err(RenameError::StaleOldProvider {
                    old: old.clone(),
                    new: new.clone(),
                    rebound,
                    default_updated,
                    source,
                }))
            }
        }
    }

    fn roll_back(&self, rebound: Vec<WorkspaceId>, failures: Vec<StepFailure>) -> RenameState {
        let RenameRequest { context, old, new } = &self.request;
        tracing::warn!(
            failures = failures.len(),
            "rebinding or default provider update failed, rolling back"
        );

        let mut rollback_failures = Vec::new();
        for id in rebound {
            let restored = self.store.load_workspace(context, &id).and_then(|mut record| {
                tracing::info!(workspace = %id, provider = %old, "rolling back workspace");
                repoint(self.store, context, &mut record, old)
            });
            if let Err(source) = restored {
                tracing::error!(workspace = %id, error = %source, "failed to roll back workspace");
                rollback_failures.push(RollbackFailure { workspace: id, source });
            }
        }

        let cleanup = match self.store.delete_provider(context, new, true) {
            Ok(()) => {
                tracing::info!(provider = %new, "cloned provider deleted");
                None
            }
            Err(e) => {
                tracing::error!(provider = %new, error = %e, "failed to delete cloned provider");
                Some(e)
            }
        };

        RenameState::Done(Err(RenameError::RolledBack {
            failures,
            rollback_failures,
            cleanup,
        }))
    }
}

/// Rename provider `old` to `new` in `context`, repointing every workspace
/// bound to it. See the module docs for the step order and rollback rules.
pub fn rename_provider<S>(
    store: &S,
    config: &mut GlobalConfig,
    context: &ContextName,
    old: &ProviderName,
    new: &ProviderName,
) -> Result<RenameReport, RenameError>
where
    S: WorkspaceStore + ProviderStore + ConfigStore + ?Sized,
{
    let request = RenameRequest {
        context: context.clone(),
        old: old.clone(),
        new: new.clone(),
    };
    RenameSaga::new(store, config, request).run()
}

// ---------------------------------------------------------------------------
// Unit tests: one transition at a time against an in-memory store
// ---------------------------------------------------------------------------
