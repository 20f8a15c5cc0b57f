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

//! Energy arbitrage pipeline
//!
//! `loader` -> `strategy` (per day, through `search`) -> `aggregator` ->
//! `assembler`. Everything is synchronous and request scoped.

pub mod aggregator;
pub mod assembler;
pub mod config;
pub mod error;
pub mod loader;
pub mod search;
pub mod strategy;

use arbitrage_types::{AggregateResult, StrategyKind};
use tracing::info;

pub use aggregator::DailyAggregator;
pub use assembler::{ChartData, CycleRow, DailyProfitRow, ResultAssembler, ResultView};
pub use config::{
    ColumnRef, ConfigError, InvalidRowPolicy, LimitsConfig, LoaderConfig, PipelineConfig,
    StrategyConfig,
};
pub use error::{ArbitrageError, Result};
pub use loader::{FileFormat, LoadedSeries, PriceSeriesLoader};
pub use strategy::{DayEvaluation, StrategyPolicy, policy_for};

/// Load `bytes`, evaluate every day with `strategy` and aggregate
pub fn run_pipeline(
    file_name: &str,
    bytes: &[u8],
    strategy: StrategyKind,
    config: &PipelineConfig,
) -> Result<AggregateResult> {
    let series = PriceSeriesLoader::new(&config.loader, &config.limits).load(file_name, bytes)?;
    info!(
        file = file_name,
        %strategy,
        days = series.days.len(),
        samples = series.sample_count(),
        "Running arbitrage pipeline"
    );

    let policy = policy_for(strategy, &config.strategy);
    DailyAggregator::new(policy.as_ref()).aggregate(&series.days)
}

/// Strategy named by a request, the configured default when blank or absent
pub fn resolve_strategy(name: Option<&str>, config: &PipelineConfig) -> Result<StrategyKind> {
    match name.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => Ok(name.parse::<StrategyKind>()?),
        None => Ok(config.strategy.default_strategy),
    }
}

/// Full request handling: strategy name in, response view out
///
/// The strategy is resolved before the file is touched, so an unknown name
/// fails the same way whatever was uploaded.
pub fn analyze_upload(
    file_name: &str,
    bytes: &[u8],
    strategy: Option<&str>,
    config: &PipelineConfig,
) -> Result<ResultView> {
    let strategy = resolve_strategy(strategy, config)?;
    let result = run_pipeline(file_name, bytes, strategy, config)?;
    Ok(ResultAssembler::new(config.strategy.energy_factor).assemble(&result))
}
