//! Domain types for the Berth registry.
//!
//! Workspaces reference providers by name only; nothing here owns anything
//! across record boundaries. All types are serializable via serde + serde_yaml.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context used when neither the config nor `--context` names one.
pub const DEFAULT_CONTEXT: &str = "default";

/// Longest id [`WorkspaceId::from_name`] will produce.
pub const MAX_WORKSPACE_ID_LEN: usize = 48;

/// Longest accepted provider or context name.
pub const MAX_NAME_LEN: usize = 32;

/// Reason `name` cannot serve as a provider or context directory, if any.
///
/// Accepted: 1..=32 chars of `[a-z0-9-]`. This rules out `/`, `\`, `.` and
/// `..`, so a name always stays a single path segment.
pub(crate) fn name_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is empty");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Some("name is longer than 32 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Some("only lowercase letters, digits and '-' are allowed");
    }
    None
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Namespace within which provider and workspace names are unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextName(pub String);

impl fmt::Display for ContextName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContextName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContextName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Default for ContextName {
    fn default() -> Self {
        Self::from(DEFAULT_CONTEXT)
    }
}

/// Name of a provider record. Validity is enforced by the provider registry,
/// not by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderName(pub String);

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProviderName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProviderName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a workspace record. Immutable once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub String);

impl WorkspaceId {
    /// Derive an id from a user-supplied workspace name or path.
    ///
    /// `./code/My Repo/` becomes `my-repo`. Returns `None` when nothing usable
    /// is left after normalisation.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.to_lowercase().replace('\\', "/");
        let trimmed = lowered.trim_end_matches('/');
        let last = trimmed.rsplit('/').next().unwrap_or(trimmed);

        let replaced: String = last
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        let id: String = replaced
            .trim_start_matches('-')
            .chars()
            .take(MAX_WORKSPACE_ID_LEN)
            .collect();

        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// True when this id is exactly what [`WorkspaceId::from_name`] would
    /// derive from it, i.e. a single normalised path segment.
    pub fn is_canonical(&self) -> bool {
        Self::from_name(&self.0).as_ref() == Some(self)
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WorkspaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkspaceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A workspace's stored reference to the provider that realizes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBinding {
    pub name: ProviderName,
}

/// A persisted development-environment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub id: WorkspaceId,
    pub provider: ProviderBinding,
    /// Where the workspace came from (a path, a git URL, an image).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceRecord {
    pub fn new(id: WorkspaceId, provider: ProviderName, source: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            provider: ProviderBinding { name: provider },
            source,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bound_to(&self, provider: &ProviderName) -> bool {
        &self.provider.name == provider
    }
}

/// A named backend configuration. `options` is opaque to Berth and is
/// copied verbatim when the provider is cloned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub name: ProviderName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Global configuration
// ---------------------------------------------------------------------------

/// Per-context settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<ProviderName>,
}

/// Root of `~/.berth/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub version: u32,
    #[serde(default)]
    pub default_context: ContextName,
    #[serde(default)]
    pub contexts: BTreeMap<ContextName, ContextConfig>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            version: 1,
            default_context: ContextName::default(),
            contexts: BTreeMap::new(),
        }
    }
}

impl GlobalConfig {
    pub fn default_provider(&self, context: &ContextName) -> Option<&ProviderName> {
        self.contexts
            .get(context)
            .and_then(|c| c.default_provider.as_ref())
    }

    /// Set (or clear with `None`) the default provider of `context`.
    /// Returns the previous value.
    pub fn set_default_provider(
        &mut self,
        context: &ContextName,
        provider: Option<ProviderName>,
    ) -> Option<ProviderName> {
        let entry = self.contexts.entry(context.clone()).or_default();
        std::mem::replace(&mut entry.default_provider, provider)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ContextName::from("dev").to_string(), "dev");
        assert_eq!(ProviderName::from("docker").to_string(), "docker");
        assert_eq!(WorkspaceId::from("api").to_string(), "api");
    }

    #[test]
    fn workspace_id_from_path_takes_last_segment() {
        let id = WorkspaceId::from_name("/home/me/code/My Repo/").expect("id");
        assert_eq!(id, WorkspaceId::from("my-repo"));
    }

    #[test]
    fn workspace_id_from_windows_path() {
        let id = WorkspaceId::from_name(r"C:\code\Service_A").expect("id");
        assert_eq!(id.0, "service_a");
    }

    #[test]
    fn workspace_id_strips_leading_dashes_and_truncates() {
        let id = WorkspaceId::from_name(&format!("--{}", "a".repeat(80))).expect("id");
        assert_eq!(id.0.len(), MAX_WORKSPACE_ID_LEN);
        assert!(!id.0.starts_with('-'));
    }

    #[test]
    fn workspace_id_rejects_empty() {
        assert!(WorkspaceId::from_name("///").is_none());
        assert!(WorkspaceId::from_name("").is_none());
    }

    #[test]
    fn canonical_ids_are_single_segments() {
        assert!(WorkspaceId::from("my-repo_2").is_canonical());
        for bad in ["..", ".", "a/b", "../w1", "Upper", "-lead", "", "a\\b"] {
            assert!(!WorkspaceId::from(bad).is_canonical(), "{bad:?} accepted");
        }
    }

    #[test]
    fn name_rule_rejects_path_like_names() {
        assert_eq!(name_violation("docker-2"), None);
        for bad in ["..", ".", "a/b", "../../other", "a\\b", "Upper", ""] {
            assert!(name_violation(bad).is_some(), "{bad:?} accepted");
        }
        assert!(name_violation(&"a".repeat(33)).is_some());
        assert_eq!(name_violation(&"a".repeat(32)), None);
    }

    #[test]
    fn default_provider_set_and_clear() {
        let mut config = GlobalConfig::default();
        let ctx = ContextName::default();
        assert!(config.default_provider(&ctx).is_none());

        let prev = config.set_default_provider(&ctx, Some(ProviderName::from("docker")));
        assert!(prev.is_none());
        assert_eq!(config.default_provider(&ctx), Some(&ProviderName::from("docker")));

        let prev = config.set_default_provider(&ctx, None);
        assert_eq!(prev, Some(ProviderName::from("docker")));
        assert!(config.default_provider(&ctx).is_none());
    }

    #[test]
    fn global_config_serde_roundtrip() {
        let mut config = GlobalConfig::default();
        config.set_default_provider(&ContextName::from("work"), Some(ProviderName::from("k8s")));
        let yaml = serde_yaml::to_string(&config).expect("serialize");
        let back: GlobalConfig = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(config, back);
    }
}
