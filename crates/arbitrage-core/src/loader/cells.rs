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

//! Cell values shared by the CSV and spreadsheet readers, and their
//! conversion into timestamps and prices.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Naive formats tried in order; the first is the format price exports use
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// A single cell as read from the file
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl RawCell {
    /// Trimmed text cell, `Empty` for blank strings
    pub fn text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_owned())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::DateTime(value) => write!(f, "{value}"),
        }
    }
}

/// One data row with its 1-based row number in the source file
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row: usize,
    pub timestamp: RawCell,
    pub price: RawCell,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        self.timestamp.is_empty() && self.price.is_empty()
    }
}

/// A timestamp cell resolved in the configured timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// Wall-clock time, decides the calendar day
    pub local: NaiveDateTime,
    /// Absolute time, decides ordering
    pub instant: DateTime<Utc>,
}

/// Turns timestamp cells into local wall-clock time
#[derive(Debug, Clone, Copy)]
pub struct TimestampParser {
    tz: Tz,
}

impl TimestampParser {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn parse(&self, cell: &RawCell) -> Option<ParsedTimestamp> {
        match cell {
            RawCell::DateTime(value) => self.localize(*value),
            RawCell::Text(text) => self.parse_text(text),
            RawCell::Number(serial) => {
                excel_serial_to_datetime(*serial).and_then(|t| self.localize(t))
            }
            #[expect(clippy::cast_precision_loss, reason = "serial day numbers are small")]
            RawCell::Integer(serial) => {
                excel_serial_to_datetime(*serial as f64).and_then(|t| self.localize(t))
            }
            RawCell::Empty => None,
        }
    }

    fn parse_text(&self, text: &str) -> Option<ParsedTimestamp> {
        if let Some(naive) = TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        {
            return self.localize(naive);
        }

        let offset = DateTime::parse_from_rfc3339(text).ok()?;
        Some(ParsedTimestamp {
            local: offset.with_timezone(&self.tz).naive_local(),
            instant: offset.with_timezone(&Utc),
        })
    }

    /// Wall-clock time without an offset, placed in the configured zone
    ///
    /// The first occurrence wins inside a repeated fall-back hour. Times
    /// inside a spring-forward gap keep their distance to the hour before.
    fn localize(&self, local: NaiveDateTime) -> Option<ParsedTimestamp> {
        let zoned = self.tz.from_local_datetime(&local).earliest().or_else(|| {
            let hour = TimeDelta::hours(1);
            self.tz
                .from_local_datetime(&local.checked_sub_signed(hour)?)
                .earliest()?
                .checked_add_signed(hour)
        })?;

        Some(ParsedTimestamp {
            local,
            instant: zoned.with_timezone(&Utc),
        })
    }
}

/// Spreadsheet serial date (days since 1899-12-30) to a timestamp, rounded
/// to the nearest second
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // Serial 61 is 1900-03-01; anything earlier hits the 1900 leap-year bug
    if !serial.is_finite() || serial < 61.0 {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounded by the finiteness check and chrono's range below"
    )]
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Largest accepted price magnitude
///
/// Keeps every window sum, spread, profit and running total far inside
/// `Decimal`'s range for the configured sample and energy factor limits.
pub const MAX_PRICE_MAGNITUDE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Price cell to an exact decimal
pub fn parse_price(cell: &RawCell) -> Option<Decimal> {
    match cell {
        RawCell::Text(text) => text
            .parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::from_scientific(text).ok()),
        RawCell::Integer(value) => Some(Decimal::from(*value)),
        RawCell::Number(value) => Decimal::from_f64(*value),
        RawCell::Empty | RawCell::DateTime(_) => None,
    }
}
