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

//! Strategy policies deciding which charge/discharge windows a day trades
//!
//! Each [`StrategyKind`] maps to exactly one [`StrategyPolicy`] through
//! [`policy_for`]. Policies are stateless between days and evaluate one
//! [`DayBucket`] at a time.

mod constrained_multi;
mod single_pair;

use std::fmt::Debug;

use arbitrage_types::{Cycle, DayBucket, InfeasibleReason, StrategyKind};
use rust_decimal::Decimal;

use crate::config::StrategyConfig;
use crate::search::SearchParams;

pub use constrained_multi::ConstrainedMultiPolicy;
pub use single_pair::SinglePairPolicy;

/// Outcome of evaluating one day
///
/// `cycles` is empty exactly when `infeasible` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEvaluation {
    pub cycles: Vec<Cycle>,
    pub infeasible: Option<InfeasibleReason>,
}

impl DayEvaluation {
    pub fn traded(cycles: Vec<Cycle>) -> Self {
        if cycles.is_empty() {
            return Self::infeasible(InfeasibleReason::NoProfitableSpread);
        }
        Self {
            cycles,
            infeasible: None,
        }
    }

    pub fn infeasible(reason: InfeasibleReason) -> Self {
        Self {
            cycles: Vec::new(),
            infeasible: Some(reason),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.infeasible.is_none()
    }
}

/// A swappable rule set for choosing a day's trades
pub trait StrategyPolicy: Send + Sync + Debug {
    fn kind(&self) -> StrategyKind;

    /// Human readable strategy name
    fn name(&self) -> &str {
        self.kind().display_name()
    }

    /// Choose the day's charge/discharge cycles
    fn evaluate(&self, day: &DayBucket) -> DayEvaluation;

    /// Energy moved per cycle, the multiplier from spread to profit
    fn energy_factor(&self) -> Decimal;
}

/// Policy implementing `kind`, parameterized from `config`
pub fn policy_for(kind: StrategyKind, config: &StrategyConfig) -> Box<dyn StrategyPolicy> {
    let params = SearchParams::from(config);
    match kind {
        StrategyKind::SinglePair => Box::new(SinglePairPolicy::new(params, config.energy_factor)),
        StrategyKind::ConstrainedMulti => Box::new(ConstrainedMultiPolicy::new(
            params,
            config.energy_factor,
            config.max_cycles,
        )),
    }
}

/// `Some` when the day cannot hold a charge and a discharge window
fn too_few_samples(day: &DayBucket, params: &SearchParams) -> Option<InfeasibleReason> {
    (day.len() < params.min_samples())
        .then_some(InfeasibleReason::TooFewSamples { samples: day.len() })
}
