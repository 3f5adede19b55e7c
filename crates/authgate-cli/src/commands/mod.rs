pub mod check;
pub mod encode;
pub mod flows;
pub mod services;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use authgate::{AuthGateConfig, ConfigError, InMemoryServiceDirectory};

/// Loads the service registry named on the command line or in the configuration.
pub async fn load_directory(
    registry: Option<&Path>,
    config: &AuthGateConfig,
) -> Result<InMemoryServiceDirectory> {
    let path = registry
        .map(Path::to_path_buf)
        .or_else(|| config.registry.location.as_ref().map(PathBuf::from))
        .ok_or_else(|| ConfigError::Missing("registry.location (or --registry)".to_string()))?;

    InMemoryServiceDirectory::load_json_file(&path)
        .await
        .with_context(|| format!("Failed to load service registry {}", path.display()))
}
