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

//! Price series loading
//!
//! Turns an uploaded CSV or spreadsheet into validated [`DayBucket`]s:
//!
//! 1. Pick a [`RowReader`] from the file extension
//! 2. Read raw (timestamp, price) cells per row
//! 3. Parse cells, applying the configured [`InvalidRowPolicy`]
//! 4. Sort by timestamp, reject duplicates, group by calendar date

mod cells;
mod csv_source;
mod spreadsheet;

use std::ffi::OsStr;
use std::path::Path;

use arbitrage_types::{DayBucket, PriceSample};
use tracing::{debug, info, warn};

use crate::config::{ColumnRef, InvalidRowPolicy, LimitsConfig, LoaderConfig};
use crate::error::{ArbitrageError, Result};

pub use cells::{
    MAX_PRICE_MAGNITUDE, ParsedTimestamp, RawCell, RawRow, TimestampParser,
    excel_serial_to_datetime, parse_price,
};
pub use csv_source::CsvRowReader;
pub use spreadsheet::{SheetKind, SpreadsheetRowReader};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Format from the file extension, case-insensitive
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "" => Err(ArbitrageError::UnsupportedFileType(file_name.to_owned())),
            _ => Err(ArbitrageError::UnsupportedFileType(extension)),
        }
    }

    pub fn reader(self) -> Box<dyn RowReader> {
        match self {
            Self::Csv => Box::new(CsvRowReader),
            Self::Xlsx => Box::new(SpreadsheetRowReader::new(SheetKind::Xlsx)),
            Self::Xls => Box::new(SpreadsheetRowReader::new(SheetKind::Xls)),
        }
    }
}

/// Source of raw table rows
///
/// Implementations only locate cells. Parsing, validation and ordering are
/// shared in [`PriceSeriesLoader`].
pub trait RowReader {
    /// Data rows (the header excluded) with 1-based row numbers
    fn read_rows(&self, bytes: &[u8], schema: &ColumnSchema) -> Result<Vec<RawRow>>;
}

/// Where the timestamp and price columns live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub timestamp: ColumnRef,
    pub price: ColumnRef,
    pub has_header: bool,
}

/// Zero-based positions after header lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub timestamp: usize,
    pub price: usize,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::from(&LoaderConfig::default())
    }
}

impl From<&LoaderConfig> for ColumnSchema {
    fn from(config: &LoaderConfig) -> Self {
        Self {
            timestamp: config.timestamp_column.clone(),
            price: config.price_column.clone(),
            has_header: config.has_header,
        }
    }
}

impl ColumnSchema {
    /// Resolve column references against the header row, if any
    pub fn resolve(&self, header: Option<&[String]>) -> Result<ResolvedColumns> {
        Ok(ResolvedColumns {
            timestamp: column_index(&self.timestamp, header)?,
            price: column_index(&self.price, header)?,
        })
    }
}

fn column_index(column: &ColumnRef, header: Option<&[String]>) -> Result<usize> {
    match (column, header) {
        (ColumnRef::Index(index), Some(names)) if *index >= names.len() => Err(
            ArbitrageError::malformed(format!(
                "missing column {index}, the header has {} columns",
                names.len()
            )),
        ),
        (ColumnRef::Index(index), _) => Ok(*index),
        (ColumnRef::Name(name), names) => names
            .and_then(|names| {
                names
                    .iter()
                    .position(|candidate| candidate.trim().eq_ignore_ascii_case(name.trim()))
            })
            .ok_or_else(|| ArbitrageError::malformed(format!("missing column '{name}'"))),
    }
}

/// Parsed upload, one bucket per calendar date in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSeries {
    pub days: Vec<DayBucket>,
    /// Rows dropped under [`InvalidRowPolicy::Skip`]
    pub skipped_rows: usize,
}

impl LoadedSeries {
    pub fn sample_count(&self) -> usize {
        self.days.iter().map(DayBucket::len).sum()
    }
}

#[derive(Debug)]
pub struct PriceSeriesLoader<'a> {
    config: &'a LoaderConfig,
    limits: &'a LimitsConfig,
}

impl<'a> PriceSeriesLoader<'a> {
    pub fn new(config: &'a LoaderConfig, limits: &'a LimitsConfig) -> Self {
        Self { config, limits }
    }

    pub fn load(&self, file_name: &str, bytes: &[u8]) -> Result<LoadedSeries> {
        if bytes.len() > self.limits.max_upload_bytes {
            return Err(ArbitrageError::InputTooLarge {
                limit: self.limits.max_upload_bytes,
                actual: bytes.len(),
                unit: "bytes",
            });
        }

        let format = FileFormat::from_file_name(file_name)?;
        let schema = ColumnSchema::from(self.config);
        let rows = format.reader().read_rows(bytes, &schema)?;
        debug!(file = file_name, ?format, rows = rows.len(), "Read raw rows");

        let (samples, skipped_rows) = self.parse_rows(rows)?;
        if samples.is_empty() {
            return Err(ArbitrageError::EmptyInput);
        }

        let days = group_by_day(samples)?;
        info!(
            file = file_name,
            days = days.len(),
            skipped_rows,
            "Loaded price series"
        );

        Ok(LoadedSeries { days, skipped_rows })
    }

    /// Parsed samples paired with their source row, plus the skipped count
    fn parse_rows(&self, rows: Vec<RawRow>) -> Result<(Vec<(usize, PriceSample)>, usize)> {
        let parser = TimestampParser::new(self.config.tz());
        let mut samples = Vec::with_capacity(rows.len().min(self.limits.max_samples));
        let mut skipped = 0;

        for raw in rows.into_iter().filter(|raw| !raw.is_blank()) {
            let sample = match parse_row(&parser, &raw) {
                Ok(sample) => sample,
                Err(reason) => match self.config.invalid_rows {
                    InvalidRowPolicy::Reject => {
                        return Err(ArbitrageError::malformed_row(raw.row, reason));
                    }
                    InvalidRowPolicy::Skip => {
                        warn!(row = raw.row, %reason, "Skipping invalid row");
                        skipped += 1;
                        continue;
                    }
                },
            };

            samples.push((raw.row, sample));
            if samples.len() > self.limits.max_samples {
                return Err(ArbitrageError::InputTooLarge {
                    limit: self.limits.max_samples,
                    actual: samples.len(),
                    unit: "samples",
                });
            }
        }

        Ok((samples, skipped))
    }
}

fn parse_row(parser: &TimestampParser, raw: &RawRow) -> std::result::Result<PriceSample, String> {
    if raw.timestamp.is_empty() {
        return Err("missing timestamp".to_owned());
    }
    if raw.price.is_empty() {
        return Err("missing price".to_owned());
    }

    let timestamp = parser
        .parse(&raw.timestamp)
        .ok_or_else(|| format!("invalid timestamp '{}'", raw.timestamp))?;
    let price = parse_price(&raw.price).ok_or_else(|| format!("invalid price '{}'", raw.price))?;
    if price.abs() > MAX_PRICE_MAGNITUDE {
        return Err(format!(
            "price '{}' is outside +/-{MAX_PRICE_MAGNITUDE}",
            raw.price
        ));
    }

    Ok(PriceSample::at_instant(timestamp.local, timestamp.instant, price))
}

/// Sort by absolute time and split into local calendar days
///
/// The sort is stable, so a duplicated instant is reported at the row that
/// appears later in the file. Sorting by date first keeps a day contiguous
/// even where a clock change crosses midnight.
fn group_by_day(mut samples: Vec<(usize, PriceSample)>) -> Result<Vec<DayBucket>> {
    samples.sort_by_key(|(_, sample)| (sample.date(), sample.instant));

    if let Some(pair) = samples
        .windows(2)
        .find(|pair| pair[0].1.instant == pair[1].1.instant)
    {
        let row = pair[0].0.max(pair[1].0);
        return Err(ArbitrageError::malformed_row(
            row,
            format!("duplicate timestamp {}", pair[1].1.timestamp),
        ));
    }

    samples
        .chunk_by(|(_, a), (_, b)| a.date() == b.date())
        .map(|chunk| {
            let day: Vec<PriceSample> = chunk.iter().map(|(_, sample)| *sample).collect();
            let date = day.first().map(PriceSample::date);
            DayBucket::new(day).ok_or_else(|| {
                ArbitrageError::malformed(format!("inconsistent samples for day {date:?}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    fn load_csv(config: &LoaderConfig, csv: &str) -> Result<LoadedSeries> {
        let limits = LimitsConfig::default();
        PriceSeriesLoader::new(config, &limits).load("prices.csv", csv.as_bytes())
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(FileFormat::from_file_name("a.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("dir/b.xlsx").unwrap(), FileFormat::Xlsx);
        assert_eq!(FileFormat::from_file_name("c.Xls").unwrap(), FileFormat::Xls);

        let err = FileFormat::from_file_name("prices.json").unwrap_err();
        assert!(matches!(err, ArbitrageError::UnsupportedFileType(ref ext) if ext == "json"));
        assert!(matches!(
            FileFormat::from_file_name("prices"),
            Err(ArbitrageError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_loads_and_groups_by_day() {
        let csv = "Time,Price\n\
                   2024/03/01 08:00,20.0\n\
                   2024/03/01 12:00,5.0\n\
                   2024/03/01 18:00,45.0\n\
                   2024/03/02 00:00,-3.5\n";
        let series = load_csv(&LoaderConfig::default(), csv).unwrap();

        assert_eq!(series.days.len(), 2);
        assert_eq!(series.sample_count(), 4);
        assert_eq!(series.skipped_rows, 0);
        assert_eq!(series.days[0].len(), 3);
        assert_eq!(series.days[0].samples()[1].timestamp, at(1, 12, 0));
        assert_eq!(series.days[1].samples()[0].price, "-3.5".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_unordered_rows_are_sorted() {
        let csv = "Time,Price\n\
                   2024/03/02 01:00,7\n\
                   2024/03/01 18:00,45\n\
                   2024/03/01 08:00,20\n";
        let series = load_csv(&LoaderConfig::default(), csv).unwrap();

        let timestamps: Vec<_> = series
            .days
            .iter()
            .flat_map(|day| day.samples().iter().map(|s| s.timestamp))
            .collect();
        assert_eq!(timestamps, vec![at(1, 8, 0), at(1, 18, 0), at(2, 1, 0)]);
    }

    #[test]
    fn test_duplicate_timestamp_reports_later_row() {
        let csv = "Time,Price\n\
                   2024/03/01 08:00,20\n\
                   2024/03/01 09:00,21\n\
                   2024/03/01 08:00,22\n";
        let err = load_csv(&LoaderConfig::default(), csv).unwrap_err();
        assert!(matches!(err, ArbitrageError::MalformedInput { row: Some(4), .. }));
    }

    #[test]
    fn test_invalid_price_rejected_with_row() {
        let csv = "Time,Price\n2024/03/01 08:00,20\n2024/03/01 09:00,abc\n";
        let err = load_csv(&LoaderConfig::default(), csv).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed input at row 3: invalid price 'abc'"
        );
    }

    #[test]
    fn test_invalid_rows_skipped_when_configured() {
        let config = LoaderConfig {
            invalid_rows: InvalidRowPolicy::Skip,
            ..LoaderConfig::default()
        };
        let csv = "Time,Price\n\
                   2024/03/01 08:00,20\n\
                   not a date,21\n\
                   2024/03/01 10:00,\n\
                   2024/03/01 11:00,23\n";
        let series = load_csv(&config, csv).unwrap();

        assert_eq!(series.skipped_rows, 2);
        assert_eq!(series.sample_count(), 2);
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let csv = "Time,Price\n2024/03/01 08:00,20\n , \n2024/03/01 09:00,21\n";
        let series = load_csv(&LoaderConfig::default(), csv).unwrap();
        assert_eq!(series.sample_count(), 2);
    }

    #[test]
    fn test_header_only_is_empty_input() {
        assert!(matches!(
            load_csv(&LoaderConfig::default(), "Time,Price\n"),
            Err(ArbitrageError::EmptyInput)
        ));
        assert!(matches!(
            load_csv(&LoaderConfig::default(), ""),
            Err(ArbitrageError::EmptyInput)
        ));
    }

    #[test]
    fn test_named_columns_resolve_case_insensitively() {
        let config = LoaderConfig {
            timestamp_column: ColumnRef::Name("settlementdate".to_owned()),
            price_column: ColumnRef::Name("RRP".to_owned()),
            ..LoaderConfig::default()
        };
        let csv = "REGION,SETTLEMENTDATE,TOTALDEMAND,RRP\n\
                   NSW1,2024/03/01 00:05,7000,88.1\n";
        let series = load_csv(&config, csv).unwrap();

        let sample = series.days[0].samples()[0];
        assert_eq!(sample.timestamp, at(1, 0, 5));
        assert_eq!(sample.price, "88.1".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_missing_named_column() {
        let config = LoaderConfig {
            price_column: ColumnRef::Name("Price".to_owned()),
            ..LoaderConfig::default()
        };
        let err = load_csv(&config, "Time,Value\n2024/03/01 00:00,1\n").unwrap_err();
        assert!(matches!(err, ArbitrageError::MalformedInput { row: None, .. }));
        assert!(err.to_string().contains("'Price'"));
    }

    #[test]
    fn test_headerless_file_numbers_rows_from_one() {
        let config = LoaderConfig {
            has_header: false,
            ..LoaderConfig::default()
        };
        let err = load_csv(&config, "2024/03/01 00:00,1\n2024/03/01 01:00,x\n").unwrap_err();
        assert!(matches!(err, ArbitrageError::MalformedInput { row: Some(2), .. }));
    }

    #[test]
    fn test_byte_limit_checked_before_parsing() {
        let config = LoaderConfig::default();
        let limits = LimitsConfig {
            max_upload_bytes: 8,
            ..LimitsConfig::default()
        };
        let err = PriceSeriesLoader::new(&config, &limits)
            .load("prices.txt", b"0123456789")
            .unwrap_err();
        assert!(matches!(
            err,
            ArbitrageError::InputTooLarge { limit: 8, actual: 10, unit: "bytes" }
        ));
    }

    #[test]
    fn test_sample_limit() {
        let config = LoaderConfig::default();
        let limits = LimitsConfig {
            max_samples: 2,
            ..LimitsConfig::default()
        };
        let csv = "Time,Price\n\
                   2024/03/01 00:00,1\n\
                   2024/03/01 01:00,2\n\
                   2024/03/01 02:00,3\n";
        let err = PriceSeriesLoader::new(&config, &limits)
            .load("prices.csv", csv.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ArbitrageError::InputTooLarge { unit: "samples", .. }
        ));
    }

    #[test]
    fn test_timezone_applies_to_offset_timestamps() {
        let config = LoaderConfig {
            timezone: "Europe/Prague".to_owned(),
            ..LoaderConfig::default()
        };
        let csv = "Time,Price\n2024-03-01T23:30:00+00:00,10\n";
        let series = load_csv(&config, csv).unwrap();

        // 23:30 UTC is 00:30 the next day in Prague (CET, +01:00)
        assert_eq!(series.days[0].date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_fall_back_day_keeps_both_repeated_hours() {
        let config = LoaderConfig {
            timezone: "Europe/Prague".to_owned(),
            ..LoaderConfig::default()
        };
        let csv = "Time,Price\n\
                   2024-10-26T23:00:00Z,30\n\
                   2024-10-27T00:00:00Z,10\n\
                   2024-10-27T01:00:00Z,12\n\
                   2024-10-27T02:00:00Z,40\n\
                   2024-10-27T03:00:00Z,35\n";
        let series = load_csv(&config, csv).unwrap();

        assert_eq!(series.days.len(), 1);
        let day = &series.days[0];
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 10, 27).unwrap());
        let local: Vec<_> = day.samples().iter().map(|s| s.timestamp.time()).collect();
        let hours: Vec<String> = local.iter().map(|t| t.format("%H:%M").to_string()).collect();
        assert_eq!(hours, vec!["01:00", "02:00", "02:00", "03:00", "04:00"]);
        assert!(day.samples().windows(2).all(|pair| pair[0].instant < pair[1].instant));
    }

    #[test]
    fn test_extreme_price_rejected_with_row() {
        let csv = "Time,Price\n\
                   2024/03/01 08:00,-70000000000000000000000000000\n\
                   2024/03/01 12:00,70000000000000000000000000000\n";
        let err = load_csv(&LoaderConfig::default(), csv).unwrap_err();
        assert!(matches!(err, ArbitrageError::MalformedInput { row: Some(2), .. }));
        assert!(err.to_string().contains("outside"));
    }
}
