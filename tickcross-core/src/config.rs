//! Bot configuration, loaded once from TOML at startup.
//!
//! Every section has defaults, so a partial (or empty) file is valid.
//! The loaded config is immutable for the life of the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DurationUnit, TradeDuration};
use crate::risk::limits::MAX_COOLDOWN_SECS;
use crate::risk::RiskLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Instrument the feed streams and orders target.
    pub instrument: String,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    pub trade: TradeConfig,
    pub sma: SmaConfig,
    pub risk: RiskLimits,
    pub report: ReportConfig,
    pub trade_log: TradeLogConfig,
}

/// Fixed order parameters used for every admitted trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    pub stake: f64,
    pub currency: String,
    pub duration: u32,
    pub duration_unit: DurationUnit,
}

impl TradeConfig {
    pub fn duration(&self) -> TradeDuration {
        TradeDuration::new(self.duration, self.duration_unit)
    }
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            stake: 1.0,
            currency: "USD".to_string(),
            duration: 1,
            duration_unit: DurationUnit::Minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaConfig {
    pub short_period: usize,
    pub long_period: usize,
}

impl SmaConfig {
    /// Equal periods give identical averages and can never signal.
    pub fn is_degenerate(&self) -> bool {
        self.short_period == self.long_period
    }
}

impl Default for SmaConfig {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 20,
        }
    }
}

/// Live P/L reporter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub interval_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeLogConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for TradeLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("trade_history.csv"),
        }
    }
}

/// The slice of config a trading session needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub instrument: String,
    pub trade: TradeConfig,
    pub sma: SmaConfig,
    pub risk: RiskLimits,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            instrument: "R_75".to_string(),
            log_level: "info".to_string(),
            trade: TradeConfig::default(),
            sma: SmaConfig::default(),
            risk: RiskLimits::default(),
            report: ReportConfig::default(),
            trade_log: TradeLogConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.trim().is_empty() {
            return Err(ConfigError::Invalid("instrument must not be empty".into()));
        }
        if !self.trade.stake.is_finite() || self.trade.stake <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "trade.stake must be a positive amount, got {}",
                self.trade.stake
            )));
        }
        if self.trade.duration == 0 {
            return Err(ConfigError::Invalid("trade.duration must be >= 1".into()));
        }
        if self.sma.short_period == 0 || self.sma.long_period == 0 {
            return Err(ConfigError::Invalid(format!(
                "SMA periods must be >= 1, got short={} long={}",
                self.sma.short_period, self.sma.long_period
            )));
        }
        if !self.risk.stop_loss.is_finite() || self.risk.stop_loss >= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "risk.stop_loss must be negative, got {}",
                self.risk.stop_loss
            )));
        }
        if !self.risk.take_profit.is_finite() || self.risk.take_profit <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "risk.take_profit must be positive, got {}",
                self.risk.take_profit
            )));
        }
        if self.risk.max_trades == 0 {
            return Err(ConfigError::Invalid("risk.max_trades must be >= 1".into()));
        }
        if self.risk.cooldown_secs > MAX_COOLDOWN_SECS {
            return Err(ConfigError::Invalid(format!(
                "risk.cooldown_secs must be <= {MAX_COOLDOWN_SECS}, got {}",
                self.risk.cooldown_secs
            )));
        }
        if self.report.interval_secs == 0 {
            return Err(ConfigError::Invalid("report.interval_secs must be >= 1".into()));
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            instrument: self.instrument.clone(),
            trade: self.trade.clone(),
            sma: self.sma.clone(),
            risk: self.risk.clone(),
        }
    }
}
