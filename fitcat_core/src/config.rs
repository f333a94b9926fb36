//! Configuration file support for fitcat.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitcat/config.toml`.
//! Every section is optional; missing keys take their defaults.

use crate::seed::{Resources, SeedOptions};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub resources: ResourceConfig,

    #[serde(default)]
    pub seeding: SeedingConfig,
}

/// Where the catalog store lives
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_store_file")]
    pub store_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_file: default_store_file(),
        }
    }
}

/// Where the bundled reference resources live
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Directory holding the resource files; defaults to `<data_dir>/resources`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_exercises_file")]
    pub exercises: String,

    #[serde(default = "default_foods_file")]
    pub foods: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            dir: None,
            exercises: default_exercises_file(),
            foods: default_foods_file(),
        }
    }
}

/// Seeding behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// Run normalization even when seeding is skipped for a non-empty store
    #[serde(default = "default_true")]
    pub normalize_existing: bool,

    /// Skip rows whose English name repeats an earlier row in the same resource
    #[serde(default = "default_true")]
    pub skip_duplicate_names: bool,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            normalize_existing: true,
            skip_duplicate_names: true,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("fitcat")
}

fn default_store_file() -> String {
    "catalog.json".into()
}

fn default_exercises_file() -> String {
    "exercises.csv".into()
}

fn default_foods_file() -> String {
    "foods.csv".into()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("fitcat").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("data.store_file", &self.data.store_file),
            ("resources.exercises", &self.resources.exercises),
            ("resources.foods", &self.resources.foods),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }

    /// Path of the catalog store file
    pub fn store_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.store_file)
    }

    /// Directory the resource files are read from
    pub fn resource_dir(&self) -> PathBuf {
        self.resources
            .dir
            .clone()
            .unwrap_or_else(|| self.data.data_dir.join("resources"))
    }

    /// Resource locations for the seeder
    pub fn resources(&self) -> Resources {
        Resources::in_dir(
            self.resource_dir(),
            &self.resources.exercises,
            &self.resources.foods,
        )
    }

    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            normalize_existing: self.seeding.normalize_existing,
            skip_duplicate_names: self.seeding.skip_duplicate_names,
        }
    }
}
