pub mod provider;
pub mod workspace;

use anyhow::{Context, Result};

use berth_core::{config, ConfigStore, ContextName, DiskStore, GlobalConfig};

use crate::GlobalArgs;

/// Everything one invocation operates on: the on-disk store, the loaded
/// global config and the resolved context.
pub struct Session {
    pub store: DiskStore,
    pub config: GlobalConfig,
    pub context: ContextName,
}

impl Session {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let store = DiskStore::open().context("could not determine home directory")?;
        let config = store
            .load_config()
            .context("failed to load ~/.berth/config.yaml")?;
        let context = config::resolve_context(&config, global.context.as_deref())
            .context("failed to select context")?;
        tracing::debug!(context = %context, home = %store.home().display(), "session opened");
        Ok(Self {
            store,
            config,
            context,
        })
    }

    pub fn save_config(&self) -> Result<()> {
        self.store
            .save_config(&self.config)
            .context("failed to save ~/.berth/config.yaml")
    }
}
