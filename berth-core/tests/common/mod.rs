//! Shared fixtures: a seeded on-disk registry and a `DiskStore` wrapper that
//! records every call and fails on demand.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use berth_core::{
    provider, workspace, ConfigStore, ContextName, DiskStore, GlobalConfig, ProviderName,
    ProviderRecord, ProviderStore, RegistryError, WorkspaceId, WorkspaceRecord, WorkspaceStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Load(String),
    Save(String),
    Exists(String),
    Clone(String, String),
    Delete(String),
    LoadConfig,
    SaveConfig,
}

pub struct FlakyStore {
    inner: DiskStore,
    pub calls: RefCell<Vec<Call>>,
    /// (workspace id, provider it is being bound to)
    fail_save: RefCell<BTreeSet<(String, String)>>,
    fail_delete: RefCell<BTreeSet<String>>,
    fail_config_save: Cell<bool>,
}

impl FlakyStore {
    pub fn new(home: &Path) -> Self {
        Self {
            inner: DiskStore::new(home),
            calls: RefCell::new(Vec::new()),
            fail_save: RefCell::new(BTreeSet::new()),
            fail_delete: RefCell::new(BTreeSet::new()),
            fail_config_save: Cell::new(false),
        }
    }

    /// Fail any save that would bind `workspace` to `provider`.
    pub fn fail_save(&self, workspace: &str, provider: &str) {
        self.fail_save
            .borrow_mut()
            .insert((workspace.to_string(), provider.to_string()));
    }

    pub fn fail_delete(&self, provider: &str) {
        self.fail_delete.borrow_mut().insert(provider.to_string());
    }

    pub fn fail_config_save(&self) {
        self.fail_config_save.set(true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn injected() -> RegistryError {
    RegistryError::Io(std::io::Error::other("injected failure"))
}

impl WorkspaceStore for FlakyStore {
    fn list_workspaces(
        &self,
        context: &ContextName,
    ) -> Result<Vec<WorkspaceRecord>, RegistryError> {
        self.record(Call::List);
        self.inner.list_workspaces(context)
    }

    fn load_workspace(
        &self,
        context: &ContextName,
        id: &WorkspaceId,
    ) -> Result<WorkspaceRecord, RegistryError> {
        self.record(Call::Load(id.0.clone()));
        self.inner.load_workspace(context, id)
    }

    fn save_workspace(
        &self,
        context: &ContextName,
        record: &WorkspaceRecord,
    ) -> Result<(), RegistryError> {
        self.record(Call::Save(record.id.0.clone()));
        let key = (record.id.0.clone(), record.provider.name.0.clone());
        if self.fail_save.borrow().contains(&key) {
            return Err(injected());
        }
        self.inner.save_workspace(context, record)
    }
}

impl ProviderStore for FlakyStore {
    fn provider_exists(
        &self,
        context: &ContextName,
        name: &ProviderName,
    ) -> Result<bool, RegistryError> {
        self.record(Call::Exists(name.0.clone()));
        self.inner.provider_exists(context, name)
    }

    fn clone_provider(
        &self,
        context: &ContextName,
        source: &ProviderName,
        target: &ProviderName,
    ) -> Result<ProviderRecord, RegistryError> {
        self.record(Call::Clone(source.0.clone(), target.0.clone()));
        self.inner.clone_provider(context, source, target)
    }

    fn delete_provider(
        &self,
        context: &ContextName,
        name: &ProviderName,
        ignore_not_found: bool,
    ) -> Result<(), RegistryError> {
        self.record(Call::Delete(name.0.clone()));
        if self.fail_delete.borrow().contains(&name.0) {
            return Err(injected());
        }
        self.inner.delete_provider(context, name, ignore_not_found)
    }
}

impl ConfigStore for FlakyStore {
    fn load_config(&self) -> Result<GlobalConfig, RegistryError> {
        self.record(Call::LoadConfig);
        self.inner.load_config()
    }

    fn save_config(&self, config: &GlobalConfig) -> Result<(), RegistryError> {
        self.record(Call::SaveConfig);
        if self.fail_config_save.get() {
            return Err(injected());
        }
        self.inner.save_config(config)
    }
}

// ---------------------------------------------------------------------------
// Seeding and inspection
// ---------------------------------------------------------------------------

pub fn ctx() -> ContextName {
    ContextName::default()
}

/// Create providers and `(workspace, provider)` bindings in the default context.
pub fn seed(home: &Path, providers: &[&str], workspaces: &[(&str, &str)]) {
    for name in providers {
        provider::add_provider_at(
            home,
            &ctx(),
            ProviderName::from(*name),
            Some("docker".to_string()),
            BTreeMap::from([("DOCKER_HOST".to_string(), format!("unix:///{name}.sock"))]),
        )
        .expect("seed provider");
    }
    for (id, provider) in workspaces {
        workspace::create_workspace_at(
            home,
            &ctx(),
            WorkspaceId::from(*id),
            ProviderName::from(*provider),
            None,
        )
        .expect("seed workspace");
    }
}

pub fn binding(home: &Path, id: &str) -> String {
    workspace::load_workspace_at(home, &ctx(), &WorkspaceId::from(id))
        .expect("load workspace")
        .provider
        .name
        .0
}

pub fn bindings(home: &Path) -> Vec<(String, String)> {
    workspace::list_workspaces_at(home, &ctx())
        .expect("list workspaces")
        .into_iter()
        .map(|w| (w.id.0, w.provider.name.0))
        .collect()
}

pub fn provider_names(home: &Path) -> Vec<String> {
    provider::list_providers_at(home, &ctx())
        .expect("list providers")
        .into_iter()
        .map(|p| p.name.0)
        .collect()
}

pub fn set_default(home: &Path, provider: &str) {
    let mut config = berth_core::config::load_config_at(home).expect("load config");
    config.set_default_provider(&ctx(), Some(ProviderName::from(provider)));
    berth_core::config::save_config_at(home, &config).expect("save config");
}

pub fn default_on_disk(home: &Path) -> Option<String> {
    berth_core::config::load_config_at(home)
        .expect("load config")
        .default_provider(&ctx())
        .map(|p| p.0.clone())
}

pub fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}
