//! Serializable analysis configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid:
//!
//! ```toml
//! data_dir = "data"
//! output_dir = "output"
//! workbook = "analysis_workbook"
//! holidays_file = "holidays.toml"
//! parallel = false
//!
//! [polygon]
//! base_url = "https://api.polygon.io"
//! api_keys = ["key-one", "key-two"]
//! max_retries = 3
//! retry_wait_secs = 5.0
//! ```

use breachlab_core::calendar::{CalendarError, HolidayTable, MarketCalendar};
use breachlab_core::data::{polygon, ApiKeyPool, DataError, PolygonClient};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("holiday calendar: {0}")]
    Holidays(#[from] CalendarError),
}

/// Top-level configuration for every runner command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory holding companies.csv, disclosures.csv and stock_data.csv.
    pub data_dir: PathBuf,
    /// Directory receiving exported workbooks.
    pub output_dir: PathBuf,
    /// Workbook name; each sheet is written as `{workbook}/{sheet}.csv`.
    pub workbook: String,
    /// Optional TOML holiday table replacing the built-in one.
    pub holidays_file: Option<PathBuf>,
    /// Align disclosures on the rayon pool.
    pub parallel: bool,
    pub polygon: PolygonConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            workbook: "analysis_workbook".to_string(),
            holidays_file: None,
            parallel: false,
            polygon: PolygonConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml(&content)?;

        // Relative paths resolve against the config file's directory.
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        for path in [&mut self.data_dir, &mut self.output_dir] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(h) = self.holidays_file.as_mut() {
            if h.is_relative() {
                *h = base.join(&*h);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workbook.trim().is_empty() {
            return Err(ConfigError::Invalid("workbook name must not be empty".into()));
        }
        self.polygon.validate()
    }

    /// Build the market calendar, loading the holiday file when configured.
    pub fn calendar(&self) -> Result<MarketCalendar, ConfigError> {
        let holidays = match &self.holidays_file {
            Some(path) => HolidayTable::from_file(path)?,
            None => HolidayTable::default(),
        };
        Ok(MarketCalendar::new(holidays))
    }

    /// Directory the analysis workbook is written to.
    pub fn workbook_dir(&self) -> PathBuf {
        self.output_dir.join(&self.workbook)
    }
}

/// Market-data API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolygonConfig {
    pub base_url: String,
    pub api_keys: Vec<String>,
    pub max_retries: u32,
    pub retry_wait_secs: f64,
    pub multiplier: u32,
    pub timespan: String,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            base_url: polygon::DEFAULT_BASE_URL.to_string(),
            api_keys: Vec::new(),
            max_retries: polygon::MAX_RETRIES,
            retry_wait_secs: polygon::RETRY_WAIT.as_secs_f64(),
            multiplier: 1,
            timespan: "day".to_string(),
        }
    }
}

impl PolygonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.retry_wait_secs.is_finite() || self.retry_wait_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "polygon.retry_wait_secs must be a non-negative number, got {}",
                self.retry_wait_secs
            )));
        }
        if self.multiplier == 0 {
            return Err(ConfigError::Invalid("polygon.multiplier must be at least 1".into()));
        }
        Ok(())
    }

    pub fn retry_wait(&self) -> Duration {
        Duration::from_secs_f64(self.retry_wait_secs)
    }

    /// Key pool seeded from the configured keys.
    pub fn key_pool(&self) -> Arc<ApiKeyPool> {
        Arc::new(ApiKeyPool::new(self.api_keys.iter().cloned()))
    }

    /// Build a client over the given key pool.
    pub fn build_client(&self, keys: Arc<ApiKeyPool>) -> Result<PolygonClient, DataError> {
        Ok(PolygonClient::new(keys)?
            .with_base_url(self.base_url.clone())
            .with_retry(self.max_retries, self.retry_wait())
            .with_range(self.multiplier, self.timespan.clone()))
    }
}
