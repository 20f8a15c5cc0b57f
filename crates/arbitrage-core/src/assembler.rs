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

//! Response projections of an [`AggregateResult`]
//!
//! Everything here is presentation data: dates and times as strings, money
//! as JSON numbers. No computation is left for the consumer.

use arbitrage_types::{AggregateResult, Cycle, DailyProfitRecord, StrategyKind, Window};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Full response body of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultView {
    pub success: bool,
    pub strategy: StrategyKind,
    pub total_profit: f64,
    pub total_days: usize,
    pub daily_profits: Vec<DailyProfitRow>,
    pub chart_data: ChartData,
}

/// Table row for one day, window fields are `None` when nothing traded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProfitRow {
    pub date: String,
    pub charge_start: Option<String>,
    pub charge_end: Option<String>,
    pub charge_price: Option<f64>,
    pub discharge_start: Option<String>,
    pub discharge_end: Option<String>,
    pub discharge_price: Option<f64>,
    pub profit: f64,
    pub price_diff: f64,
    pub feasible: bool,
    pub cycles: Vec<CycleRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRow {
    pub charge_start: String,
    pub charge_end: String,
    pub charge_price: f64,
    pub discharge_start: String,
    pub discharge_end: String,
    pub discharge_price: f64,
    pub profit: f64,
}

/// Chart series sharing one date axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub price_diffs: Vec<f64>,
    pub daily_profits: Vec<f64>,
    pub cumulative_profits: Vec<f64>,
}

impl ChartData {
    /// All series have one entry per date
    pub fn is_aligned(&self) -> bool {
        let len = self.dates.len();
        self.price_diffs.len() == len
            && self.daily_profits.len() == len
            && self.cumulative_profits.len() == len
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    energy_factor: Decimal,
}

impl ResultAssembler {
    /// `energy_factor` is needed to report per-cycle profit
    pub fn new(energy_factor: Decimal) -> Self {
        Self { energy_factor }
    }

    pub fn assemble(&self, result: &AggregateResult) -> ResultView {
        let days = result.total_days();
        let mut rows = Vec::with_capacity(days);
        let mut chart = ChartData {
            dates: Vec::with_capacity(days),
            price_diffs: Vec::with_capacity(days),
            daily_profits: Vec::with_capacity(days),
            cumulative_profits: Vec::with_capacity(days),
        };

        for (record, cumulative) in result.daily_records().iter().zip(result.cumulative_series()) {
            let row = self.row(record);
            chart.dates.push(row.date.clone());
            chart.price_diffs.push(row.price_diff);
            chart.daily_profits.push(row.profit);
            chart.cumulative_profits.push(money(*cumulative));
            rows.push(row);
        }

        ResultView {
            success: true,
            strategy: result.strategy(),
            total_profit: money(result.total_profit()),
            total_days: days,
            daily_profits: rows,
            chart_data: chart,
        }
    }

    fn row(&self, record: &DailyProfitRecord) -> DailyProfitRow {
        let charge = record.charge_window();
        let discharge = record.discharge_window();

        DailyProfitRow {
            date: record.date().format(DATE_FORMAT).to_string(),
            charge_start: charge.map(|w| clock(w.start)),
            charge_end: charge.map(|w| clock(w.end)),
            charge_price: charge.map(price),
            discharge_start: discharge.map(|w| clock(w.start)),
            discharge_end: discharge.map(|w| clock(w.end)),
            discharge_price: discharge.map(price),
            profit: money(record.profit()),
            price_diff: money(record.price_diff()),
            feasible: record.is_feasible(),
            cycles: record.cycles().iter().map(|c| self.cycle_row(c)).collect(),
        }
    }

    fn cycle_row(&self, cycle: &Cycle) -> CycleRow {
        CycleRow {
            charge_start: clock(cycle.charge.start),
            charge_end: clock(cycle.charge.end),
            charge_price: price(&cycle.charge),
            discharge_start: clock(cycle.discharge.start),
            discharge_end: clock(cycle.discharge.end),
            discharge_price: price(&cycle.discharge),
            profit: money(cycle.profit(self.energy_factor)),
        }
    }
}

fn clock(at: NaiveDateTime) -> String {
    at.format(TIME_FORMAT).to_string()
}

fn price(window: &Window) -> f64 {
    window.price.to_f64().unwrap_or_default()
}

fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
