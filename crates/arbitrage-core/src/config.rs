// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use arbitrage_types::StrategyKind;
use chrono::TimeDelta;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(String);

/// Everything one pipeline run needs besides the upload itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.loader.validate()?;
        self.strategy.validate()
    }
}

// ============= Limits =============

/// Highest accepted `limits.max_samples`
pub const MAX_SAMPLES_LIMIT: usize = 100_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted upload (bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Largest accepted number of price samples
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_max_samples() -> usize {
    1_000_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_samples: default_max_samples(),
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError("limits.max_upload_bytes must be positive".to_owned()));
        }
        if self.max_samples == 0 || self.max_samples > MAX_SAMPLES_LIMIT {
            return Err(ConfigError(format!(
                "limits.max_samples must be between 1 and {MAX_SAMPLES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============= Loader =============

/// What to do with a row whose timestamp or price cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    /// Abort the whole upload, naming the row
    #[default]
    Reject,
    /// Drop the row with a warning and continue
    Skip,
}

/// Column selector, either a zero-based position or a header name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// IANA timezone used to localize timestamps that carry an offset
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub invalid_rows: InvalidRowPolicy,

    /// First row holds column names
    #[serde(default = "default_has_header")]
    pub has_header: bool,

    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: ColumnRef,

    #[serde(default = "default_price_column")]
    pub price_column: ColumnRef,
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

fn default_has_header() -> bool {
    true
}

fn default_timestamp_column() -> ColumnRef {
    ColumnRef::Index(0)
}

fn default_price_column() -> ColumnRef {
    ColumnRef::Index(1)
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            invalid_rows: InvalidRowPolicy::default(),
            has_header: default_has_header(),
            timestamp_column: default_timestamp_column(),
            price_column: default_price_column(),
        }
    }
}

impl LoaderConfig {
    /// Parsed timezone, UTC when the name is not a known IANA zone
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timezone.parse::<Tz>().is_err() {
            return Err(ConfigError(format!(
                "loader.timezone '{}' is not a known IANA timezone",
                self.timezone
            )));
        }
        if !self.has_header
            && (matches!(self.timestamp_column, ColumnRef::Name(_))
                || matches!(self.price_column, ColumnRef::Name(_)))
        {
            return Err(ConfigError(
                "named columns require loader.has_header = true".to_owned(),
            ));
        }
        if self.timestamp_column == self.price_column {
            return Err(ConfigError(
                "loader.timestamp_column and loader.price_column must differ".to_owned(),
            ));
        }
        Ok(())
    }
}

// ============= Strategy =============

/// Highest accepted `strategy.max_cycles`
///
/// Each extra cycle is another scan over the day's free runs, so the
/// multi-cycle search costs O(samples * max_cycles) per day.
pub const MAX_CYCLES_LIMIT: usize = 24;

/// Highest accepted `strategy.energy_factor` (MWh per cycle)
pub const MAX_ENERGY_FACTOR: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Strategy used when a request does not name one
    #[serde(default)]
    pub default_strategy: StrategyKind,

    /// Consecutive samples forming one charge or discharge window
    #[serde(default = "default_window_samples")]
    pub window_samples: usize,

    /// Minimum time between charge start and discharge start
    #[serde(default = "default_min_separation_minutes")]
    pub min_separation_minutes: u32,

    /// Energy moved per cycle (MWh), multiplies the price spread
    #[serde(default = "default_energy_factor")]
    pub energy_factor: Decimal,

    /// Upper bound of cycles per day for the multi-cycle strategy, at most
    /// [`MAX_CYCLES_LIMIT`]
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

fn default_window_samples() -> usize {
    1
}

fn default_min_separation_minutes() -> u32 {
    60
}

fn default_energy_factor() -> Decimal {
    Decimal::ONE
}

fn default_max_cycles() -> usize {
    2
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            default_strategy: StrategyKind::default(),
            window_samples: default_window_samples(),
            min_separation_minutes: default_min_separation_minutes(),
            energy_factor: default_energy_factor(),
            max_cycles: default_max_cycles(),
        }
    }
}

impl StrategyConfig {
    pub fn min_separation(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.min_separation_minutes))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window_samples == 0 {
            return Err(ConfigError("strategy.window_samples must be at least 1".to_owned()));
        }
        if self.max_cycles == 0 || self.max_cycles > MAX_CYCLES_LIMIT {
            return Err(ConfigError(format!(
                "strategy.max_cycles must be between 1 and {MAX_CYCLES_LIMIT}"
            )));
        }
        if self.energy_factor <= Decimal::ZERO || self.energy_factor > MAX_ENERGY_FACTOR {
            return Err(ConfigError(format!(
                "strategy.energy_factor must be positive and at most {MAX_ENERGY_FACTOR}"
            )));
        }
        Ok(())
    }
}
