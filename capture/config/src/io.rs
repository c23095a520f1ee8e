//! Config file read/write.

use crate::defaults::apply_defaults;
use crate::env::resolve_env_vars;
use crate::schema::CoursecapConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolves the coursecap config directory.
/// Priority: `COURSECAP_CONFIG_DIR` env > `~/.coursecap/`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COURSECAP_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".coursecap");
    }
    PathBuf::from(".coursecap")
}

/// Full path to the main config file under a config directory.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Loads the config from disk: parse YAML, substitute `${VAR}` references,
/// then fill defaults. A missing file is a first run and yields the default
/// config with builtin site profiles.
pub async fn load_config(path: &Path) -> Result<CoursecapConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file does not exist; using defaults");
        let mut config = CoursecapConfig::default();
        apply_defaults(&mut config);
        return Ok(config);
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let tree: serde_json::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config YAML at: {}", path.display()))?;

    let resolved = resolve_env_vars(&tree)
        .with_context(|| format!("failed to resolve env vars in: {}", path.display()))?;

    let mut config: CoursecapConfig = serde_json::from_value(resolved)
        .with_context(|| format!("config does not match the schema: {}", path.display()))?;

    apply_defaults(&mut config);
    info!(path = %path.display(), sites = config.sites.len(), "loaded config");
    Ok(config)
}

/// Writes the config atomically (temp file, then rename), keeping one backup
/// of any previous file.
pub async fn write_config(config: &CoursecapConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
    }

    if path.exists() {
        let bak = path.with_extension("yaml.bak");
        if let Err(e) = fs::copy(path, &bak).await {
            warn!(path = %bak.display(), "failed to back up previous config: {e}");
        }
    }

    let yaml =
        serde_yaml::to_string(config).context("failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("coursecap-io-{}", Uuid::new_v4()))
            .join("config.yaml")
    }

    #[tokio::test]
    async fn missing_file_yields_builtin_profiles() {
        let config = load_config(Path::new("/nonexistent/coursecap/config.yaml"))
            .await
            .unwrap();
        assert_eq!(config.sites.len(), 3);
        assert_eq!(config.collector.base_url, "http://localhost:3000/");
    }

    #[tokio::test]
    async fn write_then_load_round_trips() {
        let path = scratch_path();
        let mut config = CoursecapConfig::default();
        config.collector.base_url = "http://localhost:4000/".to_string();
        write_config(&config, &path).await.unwrap();

        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded.collector.base_url, "http://localhost:4000/");
        // Defaults still applied on top of the stored file.
        assert_eq!(loaded.sites.len(), 3);

        fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_yaml_is_a_parse_error() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, "collector: [not a map").await.unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("parse config YAML"));

        fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn overwrite_keeps_a_backup() {
        let path = scratch_path();
        write_config(&CoursecapConfig::default(), &path).await.unwrap();
        write_config(&CoursecapConfig::default(), &path).await.unwrap();
        assert!(path.with_extension("yaml.bak").exists());

        fs::remove_dir_all(path.parent().unwrap()).await.unwrap();
    }
}
