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

//! CLI entry point for the FluxION arbitrage calculator

mod args;
mod formatters;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arbitrage_core::{
    DailyAggregator, InvalidRowPolicy, PipelineConfig, PriceSeriesLoader, ResultAssembler,
    ResultView, analyze_upload, policy_for, resolve_strategy,
};
use arbitrage_types::StrategyKind;

use crate::args::{Cli, Commands, CompareArgs, InputArgs, OutputFormat, RunArgs};
use crate::formatters::{JsonFormatter, TableFormatter};

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("arbitrage_cli=info,arbitrage_core=warn")),
        )
        .init();

    let cli = Cli::parse();
    let output = match cli.command {
        Commands::Run(args) => run_command(&args)?,
        Commands::Compare(args) => compare_command(&args)?,
        Commands::Strategies => {
            TableFormatter::format_strategies(PipelineConfig::default().strategy.default_strategy)
        }
    };
    print!("{output}");
    Ok(())
}

fn run_command(args: &RunArgs) -> Result<String> {
    let config = pipeline_config(&args.input)?;
    let kind = resolve_strategy(args.strategy.as_deref(), &config)?;
    let (file_name, bytes) = read_input(&args.input.file)?;

    info!(file = %file_name, strategy = %kind, "Running strategy");
    let view = analyze_upload(&file_name, &bytes, Some(kind.id()), &config)?;

    match args.output {
        OutputFormat::Table => Ok(TableFormatter::format_run(&view, args.show_cycles)),
        OutputFormat::Json => JsonFormatter::format_run(&view),
    }
}

fn compare_command(args: &CompareArgs) -> Result<String> {
    let config = pipeline_config(&args.input)?;
    let views = compare_strategies(&args.input.file, &config)?;

    match args.output {
        OutputFormat::Table => Ok(TableFormatter::format_compare(&views)),
        OutputFormat::Json => JsonFormatter::format_compare(&views),
    }
}

/// Loads the file once and evaluates it with every strategy
fn compare_strategies(path: &Path, config: &PipelineConfig) -> Result<Vec<ResultView>> {
    let (file_name, bytes) = read_input(path)?;
    let series = PriceSeriesLoader::new(&config.loader, &config.limits).load(&file_name, &bytes)?;
    let assembler = ResultAssembler::new(config.strategy.energy_factor);

    StrategyKind::ALL
        .into_iter()
        .map(|kind| {
            let policy = policy_for(kind, &config.strategy);
            let result = DailyAggregator::new(policy.as_ref()).aggregate(&series.days)?;
            info!(strategy = %kind, total_profit = %result.total_profit(), "Strategy evaluated");
            Ok(assembler.assemble(&result))
        })
        .collect()
}

fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read price file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((file_name, bytes))
}

/// Config file (if any) with command-line overrides applied on top
fn pipeline_config(input: &InputArgs) -> Result<PipelineConfig> {
    let mut config = match &input.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<PipelineConfig>(&content)
                .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    let strategy = &mut config.strategy;
    if let Some(window_samples) = input.window_samples {
        strategy.window_samples = window_samples;
    }
    if let Some(minutes) = input.min_separation_minutes {
        strategy.min_separation_minutes = minutes;
    }
    if let Some(energy_factor) = input.energy_factor {
        strategy.energy_factor = energy_factor;
    }
    if let Some(max_cycles) = input.max_cycles {
        strategy.max_cycles = max_cycles;
    }
    if input.skip_invalid_rows {
        config.loader.invalid_rows = InvalidRowPolicy::Skip;
    }

    config.validate()?;
    Ok(config)
}
