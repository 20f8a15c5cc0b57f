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

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money values are reported in whole cents
pub const MONEY_DECIMALS: u32 = 2;

/// A charge or discharge interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// First instant of the interval
    pub start: NaiveDateTime,

    /// End of the interval (exclusive), always after `start`
    pub end: NaiveDateTime,

    /// Representative transaction price (mean of the covered samples)
    pub price: Decimal,
}

impl Window {
    /// Returns `None` unless `start < end`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, price: Decimal) -> Option<Self> {
        (start < end).then_some(Self { start, end, price })
    }
}

/// One buy-low / sell-high pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub charge: Window,
    pub discharge: Window,
}

impl Cycle {
    pub fn new(charge: Window, discharge: Window) -> Self {
        Self { charge, discharge }
    }

    /// Unrounded price difference between discharge and charge
    pub fn spread(&self) -> Decimal {
        self.discharge.price - self.charge.price
    }

    /// Profit of this cycle for the given energy throughput, in cents
    pub fn profit(&self, energy_factor: Decimal) -> Decimal {
        (self.spread() * energy_factor).round_dp(MONEY_DECIMALS)
    }
}
