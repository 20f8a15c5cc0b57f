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

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single spot price observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Wall-clock local time the price applies from
    pub timestamp: NaiveDateTime,

    /// Absolute time of `timestamp`, used for ordering and durations
    ///
    /// Differs from the wall clock only when a timezone was applied, and stays
    /// unique through the repeated hour of a DST fall-back.
    pub instant: DateTime<Utc>,

    /// Price per MWh, may be negative
    pub price: Decimal,
}

impl PriceSample {
    /// Sample whose wall-clock time is also its absolute time (UTC data)
    pub fn new(timestamp: NaiveDateTime, price: Decimal) -> Self {
        Self::at_instant(timestamp, timestamp.and_utc(), price)
    }

    pub fn at_instant(timestamp: NaiveDateTime, instant: DateTime<Utc>, price: Decimal) -> Self {
        Self {
            timestamp,
            instant,
            price,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// All samples of one calendar day, ordered by time
///
/// Only constructible through [`DayBucket::new`], which enforces a non-empty,
/// single-date sequence strictly increasing in absolute time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    date: NaiveDate,
    samples: Vec<PriceSample>,
}

impl DayBucket {
    /// Build a bucket, returning `None` when the samples are empty, span more
    /// than one date or are not strictly increasing in time.
    pub fn new(samples: Vec<PriceSample>) -> Option<Self> {
        let date = samples.first()?.date();
        let same_day = samples.iter().all(|s| s.date() == date);
        let increasing = samples
            .windows(2)
            .all(|pair| pair[0].instant < pair[1].instant);

        (same_day && increasing).then_some(Self { date, samples })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time covered by the sample at `index`
    ///
    /// A sample lasts until the next one starts. The last sample of the day
    /// reuses the spacing in front of it; a lone sample covers nothing.
    pub fn sample_duration(&self, index: usize) -> TimeDelta {
        match (self.samples.get(index), self.samples.get(index + 1)) {
            (Some(current), Some(next)) => next.instant - current.instant,
            (Some(current), None) if index > 0 => {
                current.instant - self.samples[index - 1].instant
            }
            _ => TimeDelta::zero(),
        }
    }

    /// Wall-clock end of the sample at `index` (exclusive)
    pub fn sample_end(&self, index: usize) -> Option<NaiveDateTime> {
        let sample = self.samples.get(index)?;
        Some(sample.timestamp + self.sample_duration(index))
    }
}
