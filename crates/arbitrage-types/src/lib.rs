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

pub mod pricing;
pub mod profit;
pub mod strategy;
pub mod window;

// Re-export common types for convenience
pub use pricing::{DayBucket, PriceSample};
pub use profit::{AggregateResult, DailyProfitRecord, InfeasibleReason};
pub use strategy::{ParseStrategyError, StrategyKind};
pub use window::{Cycle, MONEY_DECIMALS, Window};
