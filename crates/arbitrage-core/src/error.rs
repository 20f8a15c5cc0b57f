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

//! Error types for the arbitrage pipeline

use arbitrage_types::ParseStrategyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArbitrageError {
    #[error("input contains no price rows")]
    EmptyInput,

    #[error("{}", malformed_message(.row, .reason))]
    MalformedInput { row: Option<usize>, reason: String },

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("input too large: {actual} {unit} exceeds the limit of {limit} {unit}")]
    InputTooLarge {
        limit: usize,
        actual: usize,
        unit: &'static str,
    },

    #[error("unsupported file type '{0}', expected csv, xlsx or xls")]
    UnsupportedFileType(String),
}

impl ArbitrageError {
    pub fn malformed_row(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            row: Some(row),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            row: None,
            reason: reason.into(),
        }
    }
}

fn malformed_message(row: &Option<usize>, reason: &str) -> String {
    match row {
        Some(row) => format!("malformed input at row {row}: {reason}"),
        None => format!("malformed input: {reason}"),
    }
}

impl From<ParseStrategyError> for ArbitrageError {
    fn from(err: ParseStrategyError) -> Self {
        Self::UnknownStrategy(err.0)
    }
}

pub type Result<T> = std::result::Result<T, ArbitrageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_row() {
        let err = ArbitrageError::malformed_row(7, "price 'abc' is not a number");
        assert_eq!(
            err.to_string(),
            "malformed input at row 7: price 'abc' is not a number"
        );

        let err = ArbitrageError::malformed("missing column 'Price'");
        assert_eq!(err.to_string(), "malformed input: missing column 'Price'");
    }

    #[test]
    fn test_too_large_message() {
        let err = ArbitrageError::InputTooLarge {
            limit: 10,
            actual: 12,
            unit: "samples",
        };
        assert_eq!(
            err.to_string(),
            "input too large: 12 samples exceeds the limit of 10 samples"
        );
    }

    #[test]
    fn test_strategy_parse_error_converts() {
        let err: ArbitrageError = ParseStrategyError("foo".to_owned()).into();
        assert!(matches!(err, ArbitrageError::UnknownStrategy(ref s) if s == "foo"));
    }
}
