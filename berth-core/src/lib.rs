//! Berth core library: workspace/provider registries and the operations that
//! move workspaces between providers.
//!
//! - [`types`]: newtypes, records, global config
//! - [`error`]: [`RegistryError`]
//! - [`paths`]: on-disk layout under `~/.berth/`
//! - [`workspace`], [`provider`], [`config`]: filesystem registries (`_at(home, …)`)
//! - [`store`]: registry traits and the [`DiskStore`] implementation
//! - [`rebind`]: repoint one workspace
//! - [`rename`]: the provider rename saga

pub mod config;
pub mod error;
mod fsutil;
pub mod paths;
pub mod provider;
pub mod rebind;
pub mod rename;
pub mod store;
pub mod types;
pub mod workspace;

pub use error::RegistryError;
pub use rebind::{rebind, RebindError, RebindOutcome};
pub use rename::{
    rename_provider, RenameError, RenameReport, RenameRequest, RenameSaga, RenameState,
    RollbackFailure, StepFailure,
};
pub use store::{ConfigStore, DiskStore, ProviderStore, WorkspaceStore};
pub use types::{
    ContextConfig, ContextName, GlobalConfig, ProviderBinding, ProviderName, ProviderRecord,
    WorkspaceId, WorkspaceRecord,
};
