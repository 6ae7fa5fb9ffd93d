//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cleaner::DEFAULT_FILL_THRESHOLD;
use crate::pipeline::{DEFAULT_FALLBACK_DEPARTMENT, PipelineOptions};

/// Main userdata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV file to validate
    pub input: PathBuf,

    /// Where the validated CSV is written
    pub output: PathBuf,

    /// Run log, appended to on every run
    #[serde(rename = "log-file")]
    pub log_file: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Share of fields a row must fill to survive cleaning
    #[serde(rename = "fill-threshold")]
    pub fill_threshold: f64,

    /// Seed for synthetic emails and names
    pub seed: Option<u64>,

    /// Department used when no record has one
    #[serde(rename = "fallback-department")]
    pub fallback_department: String,
}

fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("userdata")
        .join("logs")
        .join("valid.log")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("users_data.csv"),
            output: PathBuf::from("users_data_validated.csv"),
            log_file: default_log_file(),
            log_level: None,
            fill_threshold: DEFAULT_FILL_THRESHOLD,
            seed: None,
            fallback_department: DEFAULT_FALLBACK_DEPARTMENT.to_string(),
        }
    }
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fill_threshold) {
            return Err(eyre::eyre!(
                "fill-threshold must be between 0 and 1, got {}",
                self.fill_threshold
            ));
        }
        if self.fallback_department.is_empty() {
            return Err(eyre::eyre!("fallback-department must not be empty"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .userdata.yml
        let local_config = PathBuf::from(".userdata.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/userdata/userdata.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("userdata").join("userdata.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Pipeline options derived from this config
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            fill_threshold: self.fill_threshold,
            seed: self.seed,
            fallback_department: self.fallback_department.clone(),
        }
    }
}
