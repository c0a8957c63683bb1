use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LensError, LensResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub similarity: SimilarityConfig,
    pub data: DataConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub history_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub catalog_path: String,
    pub state_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { history_limit: 10 }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self { max_results: 50 }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog_path: "~/.config/tickerlens/catalog.json".to_string(),
            state_path: "~/.local/share/tickerlens/state.json".to_string(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { threads: 2 }
    }
}

impl DataConfig {
    /// Catalog bundle path with `~` expanded
    pub fn catalog_file(&self) -> PathBuf {
        expand_path(&self.catalog_path)
    }

    /// State file path with `~` expanded
    pub fn state_file(&self) -> PathBuf {
        expand_path(&self.state_path)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("tickerlens")
            .join("config.toml")
    }

    /// Load config from file, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a specific file, or return defaults if it is missing
    /// or unreadable
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                    log::warn!("Failed to parse config {}: {}", path.display(), e);
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("Failed to read config {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> LensResult<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Validate and clamp config values to acceptable ranges
    fn validate(&mut self) {
        self.search.history_limit = self.search.history_limit.clamp(1, 100);
        self.similarity.max_results = self.similarity.max_results.clamp(1, 500);
        self.worker.threads = self.worker.threads.clamp(1, 16);
    }

    /// Save config to file
    pub fn save(&self) -> LensResult<()> {
        self.save_to(&Self::config_path())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> LensResult<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Render config as pretty TOML
    pub fn to_toml(&self) -> LensResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LensError::Config(format!("Failed to serialize config: {}", e)))
    }
}
