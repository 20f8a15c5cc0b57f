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

use arbitrage_types::{AggregateResult, DailyProfitRecord, DayBucket};
use tracing::{debug, info, warn};

use crate::error::{ArbitrageError, Result};
use crate::strategy::StrategyPolicy;

/// Folds per-day evaluations into daily records and running totals
#[derive(Debug)]
pub struct DailyAggregator<'a> {
    policy: &'a dyn StrategyPolicy,
}

impl<'a> DailyAggregator<'a> {
    pub fn new(policy: &'a dyn StrategyPolicy) -> Self {
        Self { policy }
    }

    /// Profit record for a single day, zero profit when nothing trades
    pub fn record_day(&self, day: &DayBucket) -> DailyProfitRecord {
        let evaluation = self.policy.evaluate(day);

        let record = match evaluation.infeasible {
            Some(reason) => {
                warn!(date = %day.date(), %reason, "Infeasible day, recording zero profit");
                DailyProfitRecord::infeasible(day.date(), reason)
            }
            None => DailyProfitRecord::traded(
                day.date(),
                evaluation.cycles,
                self.policy.energy_factor(),
            ),
        };

        debug!(
            date = %record.date(),
            samples = day.len(),
            cycles = record.cycles().len(),
            profit = %record.profit(),
            "Evaluated day"
        );
        record
    }

    /// Evaluate `days` (ascending dates) into an [`AggregateResult`]
    pub fn aggregate(&self, days: &[DayBucket]) -> Result<AggregateResult> {
        let mut result = AggregateResult::new(self.policy.kind());

        for day in days {
            result.push(self.record_day(day)).map_err(|record| {
                ArbitrageError::malformed(format!("day {} is out of date order", record.date()))
            })?;
        }

        info!(
            strategy = %self.policy.kind(),
            days = result.total_days(),
            total_profit = %result.total_profit(),
            "Aggregated daily profits"
        );
        Ok(result)
    }
}
