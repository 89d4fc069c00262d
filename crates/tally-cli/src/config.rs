//! Configuration and path resolution.
//!
//! The store path resolves in order: the `--store` flag (or `TALLY_STORE`
//! via clap), the config file, the XDG default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: Option<String>,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("tally.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<TallyConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Resolve the store path from the flag, the config file, or the default.
pub fn resolve_store_path(flag: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(value) = flag {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    let config_path = default_config_path()?;
    if config_path.exists() {
        let config = read_config(&config_path)?;
        if let Some(path) = config.store.path.filter(|p| !p.trim().is_empty()) {
            return Ok(PathBuf::from(path));
        }
    }

    default_store_path()
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("tally"));
        }
    }
    Ok(home_dir()?.join(".config").join("tally"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("tally"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("tally"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| anyhow::anyhow!("HOME is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let path = resolve_store_path(Some("/tmp/custom.db")).expect("resolve");
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_blank_flag_falls_through() {
        // A blank flag should not resolve to an empty path.
        let path = resolve_store_path(Some("   ")).expect("resolve");
        assert!(!path.as_os_str().is_empty());
    }

    #[test]
    fn test_config_parses() {
        let config: TallyConfig =
            toml::from_str("[store]\npath = \"/data/tally.db\"\n").expect("parse");
        assert_eq!(config.store.path.as_deref(), Some("/data/tally.db"));
    }
}
