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

use arbitrage_types::{Cycle, DayBucket, StrategyKind};
use rust_decimal::Decimal;
use tracing::trace;

use super::{DayEvaluation, StrategyPolicy, too_few_samples};
use crate::config::MAX_CYCLES_LIMIT;
use crate::search::{SearchParams, build_cycle, select_pairs};

/// Up to `max_cycles` non-overlapping charge/discharge cycles per day
///
/// Cycles are picked greedily, widest spread first, each inside the samples
/// the earlier picks left free. This is not guaranteed to find the best
/// combination of cycles.
#[derive(Debug, Clone, Copy)]
pub struct ConstrainedMultiPolicy {
    params: SearchParams,
    energy_factor: Decimal,
    max_cycles: usize,
}

impl ConstrainedMultiPolicy {
    pub fn new(params: SearchParams, energy_factor: Decimal, max_cycles: usize) -> Self {
        Self {
            params,
            energy_factor,
            max_cycles: max_cycles.clamp(1, MAX_CYCLES_LIMIT),
        }
    }
}

impl StrategyPolicy for ConstrainedMultiPolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ConstrainedMulti
    }

    fn evaluate(&self, day: &DayBucket) -> DayEvaluation {
        if let Some(reason) = too_few_samples(day, &self.params) {
            return DayEvaluation::infeasible(reason);
        }

        let pairs = select_pairs(day, &self.params, self.max_cycles);
        trace!(date = %day.date(), cycles = pairs.len(), "Selected cycles");

        let cycles: Vec<Cycle> = pairs
            .iter()
            .filter_map(|pair| build_cycle(day, pair, self.params.window_samples))
            .collect();
        DayEvaluation::traded(cycles)
    }

    fn energy_factor(&self) -> Decimal {
        self.energy_factor
    }
}
