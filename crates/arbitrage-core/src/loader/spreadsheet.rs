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

use std::io::Cursor;

use calamine::{Data, Range, Reader, Sheets, Xls, Xlsx};

use super::{ColumnSchema, RawCell, RawRow, RowReader};
use crate::error::{ArbitrageError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Xlsx,
    Xls,
}

/// Reads the first worksheet of an Excel workbook
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetRowReader {
    kind: SheetKind,
}

impl SpreadsheetRowReader {
    pub fn new(kind: SheetKind) -> Self {
        Self { kind }
    }

    fn first_sheet(&self, bytes: &[u8]) -> Result<Range<Data>> {
        let cursor = Cursor::new(bytes);
        let mut workbook: Sheets<_> = match self.kind {
            SheetKind::Xlsx => Xlsx::new(cursor)
                .map(Sheets::Xlsx)
                .map_err(calamine::Error::from),
            SheetKind::Xls => Xls::new(cursor)
                .map(Sheets::Xls)
                .map_err(calamine::Error::from),
        }
        .map_err(|err| ArbitrageError::malformed(format!("cannot open workbook: {err}")))?;

        let Some(name) = workbook.sheet_names().first().cloned() else {
            return Err(ArbitrageError::malformed("workbook contains no worksheets"));
        };

        workbook.worksheet_range(&name).map_err(|err| {
            ArbitrageError::malformed(format!("cannot read worksheet '{name}': {err}"))
        })
    }
}

impl RowReader for SpreadsheetRowReader {
    fn read_rows(&self, bytes: &[u8], schema: &ColumnSchema) -> Result<Vec<RawRow>> {
        let range = self.first_sheet(bytes)?;
        sheet_rows(&range, schema)
    }
}

/// Rows of a worksheet range, numbered as the sheet shows them
///
/// The used range may not start at A1, so positions are translated back to
/// absolute sheet rows and columns.
pub(crate) fn sheet_rows(range: &Range<Data>, schema: &ColumnSchema) -> Result<Vec<RawRow>> {
    let (first_row, first_col) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));
    let mut rows = range
        .rows()
        .enumerate()
        .map(|(offset, cells)| (first_row + offset + 1, cells));

    let columns = if schema.has_header {
        let Some((_, header)) = rows.next() else {
            return Ok(Vec::new());
        };
        let names: Vec<String> = std::iter::repeat_n(String::new(), first_col)
            .chain(header.iter().map(ToString::to_string))
            .collect();
        schema.resolve(Some(&names))?
    } else {
        schema.resolve(None)?
    };

    let cell = |cells: &[Data], column: usize| {
        column
            .checked_sub(first_col)
            .and_then(|index| cells.get(index))
            .map_or(RawCell::Empty, to_raw_cell)
    };

    Ok(rows
        .map(|(row, cells)| RawRow {
            row,
            timestamp: cell(cells, columns.timestamp),
            price: cell(cells, columns.price),
        })
        .collect())
}

fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            RawCell::text(text)
        }
        Data::Int(value) => RawCell::Integer(*value),
        Data::Float(value) => RawCell::Number(*value),
        Data::Bool(value) => RawCell::Text(value.to_string()),
        Data::DateTime(value) => value
            .as_datetime()
            .map_or(RawCell::Number(value.as_f64()), RawCell::DateTime),
        Data::Error(err) => RawCell::Text(format!("{err:?}")),
    }
}
