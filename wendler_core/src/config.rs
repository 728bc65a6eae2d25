//! Configuration file support for Wendler.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/wendler/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub rest: RestConfig,

    #[serde(default)]
    pub plates: PlateConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Rest interval between sets
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestConfig {
    #[serde(default = "default_rest_seconds")]
    pub seconds: u32,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            seconds: default_rest_seconds(),
        }
    }
}

/// Bar and plate inventory used by the plate calculator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlateConfig {
    #[serde(default = "default_bar_weight")]
    pub bar_weight: f64,

    /// Plate sizes available per side, any order
    #[serde(default = "default_available_plates")]
    pub available: Vec<f64>,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            bar_weight: default_bar_weight(),
            available: default_available_plates(),
        }
    }
}

/// One-rep-max increments applied at the end of each cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Added to squat and deadlift
    #[serde(default = "default_lower_body_increment")]
    pub lower_body_increment: f64,

    /// Added to bench press and overhead press
    #[serde(default = "default_upper_body_increment")]
    pub upper_body_increment: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            lower_body_increment: default_lower_body_increment(),
            upper_body_increment: default_upper_body_increment(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("wendler")
}

fn default_rest_seconds() -> u32 {
    90
}

fn default_bar_weight() -> f64 {
    45.0
}

fn default_available_plates() -> Vec<f64> {
    vec![45.0, 25.0, 10.0, 5.0, 2.5]
}

fn default_lower_body_increment() -> f64 {
    10.0
}

fn default_upper_body_increment() -> f64 {
    5.0
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
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("wendler").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
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

    /// Reject values the plate calculator and timer cannot work with
    fn validate(&self) -> Result<()> {
        if self.plates.bar_weight < 0.0 {
            return Err(Error::Config("bar_weight must not be negative".into()));
        }
        if self.plates.available.iter().any(|p| *p <= 0.0) {
            return Err(Error::Config("plate sizes must be positive".into()));
        }
        Ok(())
    }
}
