//! `~/.berth/config.yaml` load/save.
//!
//! The config is loaded once per invocation and passed explicitly to whatever
//! needs it; there is no process-wide "current config".

use std::path::Path;

use crate::error::RegistryError;
use crate::fsutil;
use crate::paths;
use crate::types::{name_violation, ContextName, GlobalConfig};

/// Load the global config, or defaults when the file does not exist yet.
pub fn load_config_at(home: &Path) -> Result<GlobalConfig, RegistryError> {
    let path = paths::config_path(home);
    if !path.exists() {
        return Ok(GlobalConfig::default());
    }
    fsutil::read_yaml(&path)
}

pub fn save_config_at(home: &Path, config: &GlobalConfig) -> Result<(), RegistryError> {
    fsutil::write_yaml_atomic(&paths::config_path(home), config)
}

/// Context names follow the provider name rule: they become a directory
/// under `contexts/`.
pub fn validate_context_name(context: &ContextName) -> Result<(), RegistryError> {
    match name_violation(&context.0) {
        Some(reason) => Err(RegistryError::InvalidContextName {
            name: context.0.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// The context an invocation operates on: the explicit override if given,
/// else the config's `default_context`. Either one must be a valid name.
pub fn resolve_context(
    config: &GlobalConfig,
    requested: Option<&str>,
) -> Result<ContextName, RegistryError> {
    let context = match requested {
        Some(name) => ContextName::from(name),
        None => config.default_context.clone(),
    };
    validate_context_name(&context)?;
    Ok(context)
}
