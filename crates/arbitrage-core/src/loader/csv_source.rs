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

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{ColumnSchema, RawCell, RawRow, RowReader};
use crate::error::{ArbitrageError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads comma-separated files, tolerating ragged rows
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRowReader;

impl RowReader for CsvRowReader {
    fn read_rows(&self, bytes: &[u8], schema: &ColumnSchema) -> Result<Vec<RawRow>> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let mut records = reader.records();
        let mut line = 0;

        let columns = if schema.has_header {
            let Some(header) = records.next() else {
                return Ok(Vec::new());
            };
            let header = header.map_err(|err| csv_error(1, &err))?;
            line = record_line(&header, 1);
            let names: Vec<String> = header.iter().map(str::to_owned).collect();
            schema.resolve(Some(&names))?
        } else {
            schema.resolve(None)?
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(|err| csv_error(line + 1, &err))?;
            line = record_line(&record, line + 1);
            rows.push(RawRow {
                row: line,
                timestamp: cell(&record, columns.timestamp),
                price: cell(&record, columns.price),
            });
        }

        Ok(rows)
    }
}

/// Source line of a record, `fallback` if the reader did not track it
fn record_line(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .and_then(|pos| usize::try_from(pos.line()).ok())
        .unwrap_or(fallback)
}

fn cell(record: &StringRecord, index: usize) -> RawCell {
    record.get(index).map_or(RawCell::Empty, RawCell::text)
}

fn csv_error(fallback_line: usize, err: &csv::Error) -> ArbitrageError {
    let row = err
        .position()
        .and_then(|pos| usize::try_from(pos.line()).ok())
        .unwrap_or(fallback_line);
    ArbitrageError::malformed_row(row, format!("unreadable CSV record: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnRef;

    fn schema() -> ColumnSchema {
        ColumnSchema::default()
    }

    #[test]
    fn test_rows_carry_file_line_numbers() {
        let rows = CsvRowReader
            .read_rows(b"Time,Price\na,1\n\nb,2\n", &schema())
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].timestamp, RawCell::Text("a".to_owned()));
        // The empty line is skipped by the reader but still counted
        assert_eq!(rows[1].row, 4);
    }

    #[test]
    fn test_bom_is_stripped_from_header() {
        let schema = ColumnSchema {
            timestamp: ColumnRef::Name("Time".to_owned()),
            ..ColumnSchema::default()
        };
        let rows = CsvRowReader
            .read_rows(b"\xEF\xBB\xBFTime,Price\nx,1\n", &schema)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_short_rows_yield_empty_cells() {
        let rows = CsvRowReader
            .read_rows(b"Time,Price\n2024/01/01 00:00\n", &schema())
            .unwrap();
        assert_eq!(rows[0].price, RawCell::Empty);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let rows = CsvRowReader
            .read_rows(b"Time,Price\n  2024/01/01 00:00 ,  12.5  \n", &schema())
            .unwrap();
        assert_eq!(rows[0].timestamp, RawCell::Text("2024/01/01 00:00".to_owned()));
        assert_eq!(rows[0].price, RawCell::Text("12.5".to_owned()));
    }

    #[test]
    fn test_index_beyond_header_is_malformed() {
        let schema = ColumnSchema {
            price: ColumnRef::Index(5),
            ..ColumnSchema::default()
        };
        let err = CsvRowReader
            .read_rows(b"Time,Price\nx,1\n", &schema)
            .unwrap_err();
        assert!(matches!(err, ArbitrageError::MalformedInput { row: None, .. }));
    }
}
