use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "worklog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorklogConfig {
    /// Base URL of the worklog backend, e.g. "http://localhost:8080"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Path of the submit endpoint, joined onto `api_url`
    #[serde(default = "default_submit_path")]
    pub submit_path: String,
    /// Where the persisted rows live. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_submit_path() -> String {
    "/api/worklogs/submit".to_string()
}

impl Default for WorklogConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            submit_path: default_submit_path(),
            data_dir: None,
        }
    }
}

impl WorklogConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join(APP_DIR)
            .join("config.toml"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    /// Directory backing the file store.
    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("Cannot determine data directory")?
                .join(APP_DIR)),
        }
    }
}
