use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backend address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "NLQE_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NlqeConfig {
    pub base_url: Option<String>,
    /// Connection string used by `connect` when none is given
    pub connection_string: Option<String>,
}

impl NlqeConfig {
    /// Pick the base URL: explicit flag, then environment, then config file, then default
    pub fn resolve_base_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        flag.or(env)
            .or(self.base_url.as_deref())
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("nlqe.toml")
}

pub fn base_url_from_env() -> Option<String> {
    std::env::var(BASE_URL_ENV).ok()
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<NlqeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: NlqeConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &NlqeConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
