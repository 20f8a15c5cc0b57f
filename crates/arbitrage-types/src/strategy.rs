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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of charge/discharge strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// One charge and one discharge window per day
    #[default]
    #[serde(rename = "one_charge_one_discharge", alias = "single_pair")]
    SinglePair,

    /// Several non-overlapping charge/discharge pairs per day, chosen greedily
    #[serde(rename = "two_charge_two_discharge", alias = "constrained_multi")]
    ConstrainedMulti,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::SinglePair, StrategyKind::ConstrainedMulti];

    /// Identifier used on the wire and in config files
    pub fn id(self) -> &'static str {
        match self {
            Self::SinglePair => "one_charge_one_discharge",
            Self::ConstrainedMulti => "two_charge_two_discharge",
        }
    }

    /// Alternative identifier accepted on input
    pub fn alias(self) -> &'static str {
        match self {
            Self::SinglePair => "single_pair",
            Self::ConstrainedMulti => "constrained_multi",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::SinglePair => "One charge / one discharge",
            Self::ConstrainedMulti => "Multiple charge / discharge cycles",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a strategy identifier is not in [`StrategyKind::ALL`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrategyError(pub String);

impl fmt::Display for ParseStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown strategy '{}'", self.0)
    }
}

impl std::error::Error for ParseStrategyError {}

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                needle.eq_ignore_ascii_case(kind.id()) || needle.eq_ignore_ascii_case(kind.alias())
            })
            .ok_or_else(|| ParseStrategyError(needle.to_owned()))
    }
}
