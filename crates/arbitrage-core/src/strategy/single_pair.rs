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

use arbitrage_types::{DayBucket, InfeasibleReason, StrategyKind};
use rust_decimal::Decimal;
use tracing::trace;

use super::{DayEvaluation, StrategyPolicy, too_few_samples};
use crate::search::{SearchParams, best_pair, build_cycle};

/// One charge window followed by one discharge window per day
///
/// Buys in the cheapest admissible window and sells in the dearest later one,
/// provided the spread is positive.
#[derive(Debug, Clone, Copy)]
pub struct SinglePairPolicy {
    params: SearchParams,
    energy_factor: Decimal,
}

impl SinglePairPolicy {
    pub fn new(params: SearchParams, energy_factor: Decimal) -> Self {
        Self {
            params,
            energy_factor,
        }
    }
}

impl StrategyPolicy for SinglePairPolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SinglePair
    }

    fn evaluate(&self, day: &DayBucket) -> DayEvaluation {
        if let Some(reason) = too_few_samples(day, &self.params) {
            return DayEvaluation::infeasible(reason);
        }

        let cycle = best_pair(day, 0..day.len(), &self.params)
            .filter(|pair| pair.spread > Decimal::ZERO)
            .and_then(|pair| {
                trace!(date = %day.date(), ?pair, "Best single pair");
                build_cycle(day, &pair, self.params.window_samples)
            });

        match cycle {
            Some(cycle) => DayEvaluation::traded(vec![cycle]),
            None => DayEvaluation::infeasible(InfeasibleReason::NoProfitableSpread),
        }
    }

    fn energy_factor(&self) -> Decimal {
        self.energy_factor
    }
}
