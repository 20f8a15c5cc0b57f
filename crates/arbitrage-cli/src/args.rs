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

//! Command-line arguments for `arbitrage-sim`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "arbitrage-sim",
    author,
    version,
    about = "FluxION Arbitrage Calculator - Battery arbitrage profit from price files",
    long_about = "Replay a file of electricity prices through the arbitrage pipeline.\n\
    \nEvery calendar day is searched for the best charge and discharge windows\n\
    and the resulting profits are summed over the whole file.\n\
    \nExamples:\n  \
    arbitrage-sim run --file prices.csv                 # Default strategy, table output\n  \
    arbitrage-sim run --file prices.xlsx --output json  # Same response the server returns\n  \
    arbitrage-sim compare --file prices.csv             # Every strategy side by side"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one strategy over a price file
    #[command(
        long_about = "Run one strategy over a CSV, XLSX or XLS price file.\n\
        \nThe first column holds timestamps and the second holds prices unless the\n\
        configuration file names other columns.\n\
        \nExamples:\n  \
        arbitrage-sim run --file prices.csv\n  \
        arbitrage-sim run --file prices.csv --strategy two_charge_two_discharge\n  \
        arbitrage-sim run --file prices.csv --window-samples 24 --min-separation-minutes 120"
    )]
    Run(RunArgs),

    /// Run every strategy over a price file and rank them by total profit
    Compare(CompareArgs),

    /// List the accepted strategy identifiers
    Strategies,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(
        long,
        short = 's',
        help = "Strategy identifier (defaults to the configured default)",
        long_help = "Strategy identifier: one_charge_one_discharge or two_charge_two_discharge.\n\
        The aliases single_pair and constrained_multi are accepted too."
    )]
    pub strategy: Option<String>,

    #[arg(long, short = 'o', value_enum, default_value = "table", help = "Output format")]
    pub output: OutputFormat,

    #[arg(long, help = "Print every cycle of multi-cycle days in the table")]
    pub show_cycles: bool,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, short = 'o', value_enum, default_value = "table", help = "Output format")]
    pub output: OutputFormat,
}

/// Price file plus the pipeline overrides shared by all commands
#[derive(Debug, Args)]
pub struct InputArgs {
    #[arg(long, short = 'f', help = "Price file (.csv, .xlsx or .xls)")]
    pub file: PathBuf,

    #[arg(
        long,
        short = 'c',
        help = "TOML configuration file",
        long_help = "TOML configuration file with [limits], [loader] and [strategy] sections.\n\
        The server's arbitrage.toml can be used as is; [server] is ignored."
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Consecutive samples per charge or discharge window")]
    pub window_samples: Option<usize>,

    #[arg(long, help = "Minimum minutes between charge start and discharge start")]
    pub min_separation_minutes: Option<u32>,

    #[arg(long, help = "Energy moved per cycle in MWh")]
    pub energy_factor: Option<Decimal>,

    #[arg(long, help = "Maximum cycles per day for the multi-cycle strategy")]
    pub max_cycles: Option<usize>,

    #[arg(long, help = "Skip malformed rows instead of failing")]
    pub skip_invalid_rows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
