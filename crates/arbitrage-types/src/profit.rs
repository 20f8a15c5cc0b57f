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

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::strategy::StrategyKind;
use crate::window::{Cycle, MONEY_DECIMALS, Window};

/// Why a day produced no trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum InfeasibleReason {
    /// Not enough samples to place a charge and a discharge window
    TooFewSamples { samples: usize },

    /// Windows could be placed but no pair has a positive spread
    NoProfitableSpread,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSamples { samples } => {
                write!(f, "only {samples} samples, not enough for a charge/discharge pair")
            }
            Self::NoProfitableSpread => write!(f, "no charge/discharge pair with positive spread"),
        }
    }
}

/// Profit outcome of a single day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyProfitRecord {
    date: NaiveDate,
    cycles: Vec<Cycle>,
    profit: Decimal,
    price_diff: Decimal,
    infeasible: Option<InfeasibleReason>,
}

impl DailyProfitRecord {
    /// Record for a day with at least one trade
    ///
    /// Profit is the sum of the per-cycle profits, each already rounded to
    /// cents. The price difference reported is the widest cycle spread.
    /// An empty `cycles` list yields an infeasible record.
    pub fn traded(date: NaiveDate, cycles: Vec<Cycle>, energy_factor: Decimal) -> Self {
        if cycles.is_empty() {
            return Self::infeasible(date, InfeasibleReason::NoProfitableSpread);
        }

        let profit = cycles.iter().map(|c| c.profit(energy_factor)).sum();
        let price_diff = cycles
            .iter()
            .map(Cycle::spread)
            .max()
            .unwrap_or_default()
            .round_dp(MONEY_DECIMALS);

        Self {
            date,
            cycles,
            profit,
            price_diff,
            infeasible: None,
        }
    }

    /// Zero-profit record for a day without a feasible trade
    pub fn infeasible(date: NaiveDate, reason: InfeasibleReason) -> Self {
        Self {
            date,
            cycles: Vec::new(),
            profit: Decimal::ZERO,
            price_diff: Decimal::ZERO,
            infeasible: Some(reason),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Charge window of the first (most profitable) cycle
    pub fn charge_window(&self) -> Option<&Window> {
        self.cycles.first().map(|c| &c.charge)
    }

    /// Discharge window of the first (most profitable) cycle
    pub fn discharge_window(&self) -> Option<&Window> {
        self.cycles.first().map(|c| &c.discharge)
    }

    pub fn profit(&self) -> Decimal {
        self.profit
    }

    pub fn price_diff(&self) -> Decimal {
        self.price_diff
    }

    pub fn infeasible_reason(&self) -> Option<InfeasibleReason> {
        self.infeasible
    }

    pub fn is_feasible(&self) -> bool {
        self.infeasible.is_none()
    }
}

/// Daily records of a whole upload with their running total
///
/// `cumulative_series[i]` is always `cumulative_series[i - 1] + profit[i]`
/// and `total_profit` is the last cumulative value (zero when empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    strategy: StrategyKind,
    total_profit: Decimal,
    daily_records: Vec<DailyProfitRecord>,
    cumulative_series: Vec<Decimal>,
}

impl AggregateResult {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            total_profit: Decimal::ZERO,
            daily_records: Vec::new(),
            cumulative_series: Vec::new(),
        }
    }

    /// Append the next day
    ///
    /// Hands the record back when its date is not after the last appended
    /// date, so the series stays in strict date order.
    pub fn push(&mut self, record: DailyProfitRecord) -> Result<(), DailyProfitRecord> {
        if let Some(last) = self.daily_records.last()
            && record.date <= last.date
        {
            return Err(record);
        }

        self.total_profit += record.profit;
        self.cumulative_series.push(self.total_profit);
        self.daily_records.push(record);
        Ok(())
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn total_profit(&self) -> Decimal {
        self.total_profit
    }

    pub fn daily_records(&self) -> &[DailyProfitRecord] {
        &self.daily_records
    }

    pub fn cumulative_series(&self) -> &[Decimal] {
        &self.cumulative_series
    }

    pub fn total_days(&self) -> usize {
        self.daily_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_records.is_empty()
    }
}
