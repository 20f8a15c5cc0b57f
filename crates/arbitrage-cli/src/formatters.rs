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

//! Output formatters for CLI results

use anyhow::Result;
use arbitrage_core::{DailyProfitRow, ResultView};
use arbitrage_types::StrategyKind;
use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL};
use serde_json::{Value, json};

/// Formatter for pretty tables
#[derive(Debug)]
pub struct TableFormatter;

/// Formatter for machine-readable output, same shape as the server response
#[derive(Debug)]
pub struct JsonFormatter;

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

fn window_cell(start: Option<&str>, end: Option<&str>, price: Option<f64>) -> Cell {
    match (start, end, price) {
        (Some(start), Some(end), Some(price)) => Cell::new(format!("{start}-{end} @ {price:.2}")),
        _ => Cell::new("-").fg(Color::DarkGrey),
    }
}

fn day_cells(row: &DailyProfitRow, cumulative: f64) -> Vec<Cell> {
    let profit = if row.feasible {
        Cell::new(format!("{:.2}", row.profit)).fg(Color::Green)
    } else {
        Cell::new(format!("{:.2}", row.profit)).fg(Color::DarkGrey)
    };
    vec![
        Cell::new(&row.date),
        window_cell(
            row.charge_start.as_deref(),
            row.charge_end.as_deref(),
            row.charge_price,
        ),
        window_cell(
            row.discharge_start.as_deref(),
            row.discharge_end.as_deref(),
            row.discharge_price,
        ),
        Cell::new(format!("{:.2}", row.price_diff)),
        profit,
        Cell::new(format!("{cumulative:.2}")),
    ]
}

impl TableFormatter {
    /// Per-day table followed by a summary line
    pub fn format_run(view: &ResultView, show_cycles: bool) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&[
            "Date",
            "Charge\nwindow @ price",
            "Discharge\nwindow @ price",
            "Spread",
            "Profit",
            "Cumulative",
        ]));

        for (row, cumulative) in view
            .daily_profits
            .iter()
            .zip(&view.chart_data.cumulative_profits)
        {
            table.add_row(day_cells(row, *cumulative));

            if show_cycles && row.cycles.len() > 1 {
                for (n, cycle) in row.cycles.iter().enumerate() {
                    table.add_row(vec![
                        Cell::new(format!("  cycle {}", n + 1)).fg(Color::DarkGrey),
                        Cell::new(format!(
                            "{}-{} @ {:.2}",
                            cycle.charge_start, cycle.charge_end, cycle.charge_price
                        )),
                        Cell::new(format!(
                            "{}-{} @ {:.2}",
                            cycle.discharge_start, cycle.discharge_end, cycle.discharge_price
                        )),
                        Cell::new(format!("{:.2}", cycle.discharge_price - cycle.charge_price)),
                        Cell::new(format!("{:.2}", cycle.profit)),
                        Cell::new(""),
                    ]);
                }
            }
        }

        let traded = view.daily_profits.iter().filter(|row| row.feasible).count();
        format!(
            "{table}\nStrategy: {} | Days: {} ({traded} traded) | Total profit: {:.2}\n",
            view.strategy.display_name(),
            view.total_days,
            view.total_profit
        )
    }

    /// One row per strategy, best total first
    pub fn format_compare(views: &[ResultView]) -> String {
        let mut ranked: Vec<&ResultView> = views.iter().collect();
        ranked.sort_by(|a, b| b.total_profit.total_cmp(&a.total_profit));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&[
            "Strategy",
            "Total\nprofit",
            "Traded\ndays",
            "Best\nday",
            "Average\nper day",
        ]));

        for (rank, view) in ranked.iter().enumerate() {
            let traded = view.daily_profits.iter().filter(|row| row.feasible).count();
            let best = view
                .daily_profits
                .iter()
                .max_by(|a, b| a.profit.total_cmp(&b.profit))
                .map_or_else(|| "-".to_owned(), |row| format!("{} ({:.2})", row.date, row.profit));
            let average = if view.total_days == 0 {
                0.0
            } else {
                view.total_profit / f64::from(u32::try_from(view.total_days).unwrap_or(u32::MAX))
            };

            let name = if rank == 0 {
                Cell::new(view.strategy.display_name())
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new(view.strategy.display_name())
            };

            table.add_row(vec![
                name,
                Cell::new(format!("{:.2}", view.total_profit)),
                Cell::new(format!("{traded}/{}", view.total_days)),
                Cell::new(best),
                Cell::new(format!("{average:.2}")),
            ]);
        }

        format!("{table}\n")
    }

    pub fn format_strategies(default: StrategyKind) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&["Identifier", "Alias", "Name"]));

        for kind in StrategyKind::ALL {
            let id = if kind == default {
                Cell::new(format!("{} (default)", kind.id())).add_attribute(Attribute::Bold)
            } else {
                Cell::new(kind.id())
            };
            table.add_row(vec![id, Cell::new(kind.alias()), Cell::new(kind.display_name())]);
        }

        format!("{table}\n")
    }
}

impl JsonFormatter {
    pub fn format_run(view: &ResultView) -> Result<String> {
        Ok(serde_json::to_string_pretty(view)?)
    }

    pub fn format_compare(views: &[ResultView]) -> Result<String> {
        let summary: Vec<Value> = views
            .iter()
            .map(|view| {
                json!({
                    "strategy": view.strategy,
                    "total_profit": view.total_profit,
                    "total_days": view.total_days,
                    "traded_days": view.daily_profits.iter().filter(|row| row.feasible).count(),
                })
            })
            .collect();
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

#[cfg(test)]
mod tests {
    use arbitrage_core::{PipelineConfig, analyze_upload};

    use super::*;

    const TWO_DAY_CSV: &str = "Time,Price\n\
                               2024/01/15 06:00,15\n\
                               2024/01/15 12:00,25\n\
                               2024/01/16 06:00,30\n\
                               2024/01/16 12:00,20\n";

    fn view(strategy: &str) -> ResultView {
        analyze_upload(
            "prices.csv",
            TWO_DAY_CSV.as_bytes(),
            Some(strategy),
            &PipelineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_table_lists_every_day() {
        let output = TableFormatter::format_run(&view("one_charge_one_discharge"), false);
        assert!(output.contains("2024-01-15"));
        assert!(output.contains("2024-01-16"));
        assert!(output.contains("06:00-12:00 @ 15.00"));
        assert!(output.contains("Days: 2 (1 traded) | Total profit: 10.00"));
    }

    #[test]
    fn test_compare_ranks_best_first() {
        let mut better = view("two_charge_two_discharge");
        better.total_profit = 99.0;
        let views = [view("one_charge_one_discharge"), better];

        let output = TableFormatter::format_compare(&views);
        let multi = output.find(StrategyKind::ConstrainedMulti.display_name()).unwrap();
        let single = output.find(StrategyKind::SinglePair.display_name()).unwrap();
        assert!(multi < single);
    }

    #[test]
    fn test_strategies_marks_default() {
        let output = TableFormatter::format_strategies(StrategyKind::SinglePair);
        assert!(output.contains("one_charge_one_discharge (default)"));
        assert!(output.contains("two_charge_two_discharge"));
    }

    #[test]
    fn test_json_run_matches_server_shape() {
        let output = JsonFormatter::format_run(&view("one_charge_one_discharge")).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["total_days"], 2);
        assert_eq!(value["chart_data"]["cumulative_profits"], json!([10.0, 10.0]));
    }

    #[test]
    fn test_json_compare_summaries() {
        let views = [view("one_charge_one_discharge"), view("two_charge_two_discharge")];
        let value: Value =
            serde_json::from_str(&JsonFormatter::format_compare(&views).unwrap()).unwrap();
        assert_eq!(value[0]["strategy"], "one_charge_one_discharge");
        assert_eq!(value[1]["traded_days"], 1);
    }
}
