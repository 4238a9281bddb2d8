use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application settings, read from an optional TOML file. Every field has a
/// default; CLI flags override whatever the file provides.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub cors_origin: Option<String>,
    pub autosave_delay_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            cors_origin: None,
            autosave_delay_secs: 3,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                let config = toml::from_str(&content)
                    .with_context(|| format!("parsing config file {}", path.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_secs(self.autosave_delay_secs)
    }
}
