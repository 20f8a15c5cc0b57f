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

//! Charge/discharge window search over one day
//!
//! Windows are identified by the index of their first sample. A pair
//! `(i, j)` is admissible when the charge window ends before the discharge
//! window starts (`i + window_samples <= j`) and the start times are at
//! least `min_separation` apart. The best pair maximizes
//! `mean(j) - mean(i)`, found in one left-to-right scan.

use std::ops::Range;

use arbitrage_types::{Cycle, DayBucket, Window};
use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::config::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Samples per window (>= 1)
    pub window_samples: usize,
    pub min_separation: TimeDelta,
}

impl SearchParams {
    pub fn new(window_samples: usize, min_separation: TimeDelta) -> Self {
        Self {
            window_samples: window_samples.max(1),
            min_separation,
        }
    }

    /// Fewest samples that can hold a charge and a discharge window
    pub fn min_samples(&self) -> usize {
        (2 * self.window_samples).max(2)
    }
}

impl From<&StrategyConfig> for SearchParams {
    fn from(config: &StrategyConfig) -> Self {
        Self::new(config.window_samples, config.min_separation())
    }
}

/// Best pair found, as window start indices into the day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCandidate {
    pub charge: usize,
    pub discharge: usize,
    pub spread: Decimal,
}

/// Mean price of every window fully inside `range`
///
/// Element `k` is the window starting at `range.start + k`.
pub fn window_means(bucket: &DayBucket, range: Range<usize>, window_samples: usize) -> Vec<Decimal> {
    let Some(samples) = bucket.samples().get(range) else {
        return Vec::new();
    };
    if window_samples == 0 || samples.len() < window_samples {
        return Vec::new();
    }

    let divisor = Decimal::from(window_samples);
    let mut sum: Decimal = samples[..window_samples].iter().map(|s| s.price).sum();
    let mut means = Vec::with_capacity(samples.len() - window_samples + 1);
    means.push(sum / divisor);

    for (entering, leaving) in samples[window_samples..].iter().zip(samples) {
        sum += entering.price - leaving.price;
        means.push(sum / divisor);
    }

    means
}

/// Highest-spread admissible pair inside `range`
///
/// Ties keep the earliest discharge; among equally cheap charge windows the
/// latest one is used. The spread may be zero or negative.
pub fn best_pair(
    bucket: &DayBucket,
    range: Range<usize>,
    params: &SearchParams,
) -> Option<PairCandidate> {
    let w = params.window_samples;
    if range.len() < 2 * w || range.end > bucket.len() {
        return None;
    }

    let samples = bucket.samples();
    let base = range.start;
    let means = window_means(bucket, range.clone(), w);
    let mean = |index: usize| means[index - base];
    let last_start = range.end - w;

    let mut next_charge = base;
    let mut cheapest: Option<usize> = None;
    let mut best: Option<PairCandidate> = None;

    for discharge in (base + w)..=last_start {
        let discharge_at = samples[discharge].instant;
        while next_charge + w <= discharge
            && discharge_at - samples[next_charge].instant >= params.min_separation
        {
            if cheapest.is_none_or(|current| mean(next_charge) <= mean(current)) {
                cheapest = Some(next_charge);
            }
            next_charge += 1;
        }

        let Some(charge) = cheapest else {
            continue;
        };
        let spread = mean(discharge) - mean(charge);
        if best.is_none_or(|b| spread > b.spread) {
            best = Some(PairCandidate {
                charge,
                discharge,
                spread,
            });
        }
    }

    best
}

/// Greedy selection of up to `max_cycles` non-overlapping profitable pairs
///
/// Each round searches every maximal run of samples not yet used by a chosen
/// window and keeps the widest spread (the earliest run on ties). Stops when
/// no run has a pair with a positive spread. Results are in selection order,
/// so the first pair is the most profitable one.
pub fn select_pairs(
    bucket: &DayBucket,
    params: &SearchParams,
    max_cycles: usize,
) -> Vec<PairCandidate> {
    let w = params.window_samples;
    let mut used = vec![false; bucket.len()];
    let mut selected = Vec::new();

    while selected.len() < max_cycles {
        let best = free_runs(&used)
            .into_iter()
            .filter_map(|run| best_pair(bucket, run, params))
            .filter(|candidate| candidate.spread > Decimal::ZERO)
            .fold(None, |best: Option<PairCandidate>, candidate| {
                if best.is_some_and(|b| b.spread >= candidate.spread) {
                    best
                } else {
                    Some(candidate)
                }
            });

        let Some(pair) = best else {
            break;
        };
        used[pair.charge..pair.charge + w].fill(true);
        used[pair.discharge..pair.discharge + w].fill(true);
        selected.push(pair);
    }

    selected
}

/// Maximal index ranges where `used` is false
fn free_runs(used: &[bool]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;

    for (index, &taken) in used.iter().enumerate() {
        match (taken, start) {
            (false, None) => start = Some(index),
            (true, Some(run_start)) => {
                runs.push(run_start..index);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(run_start) = start {
        runs.push(run_start..used.len());
    }

    runs
}

/// Window covering `window_samples` samples from `start`
pub fn build_window(bucket: &DayBucket, start: usize, window_samples: usize) -> Option<Window> {
    let last = start.checked_add(window_samples)?.checked_sub(1)?;
    let opens = bucket.samples().get(start)?.timestamp;
    let closes = bucket.sample_end(last)?;
    let price = window_means(bucket, start..last + 1, window_samples)
        .first()
        .copied()?;

    Window::new(opens, closes, price)
}

pub fn build_cycle(
    bucket: &DayBucket,
    pair: &PairCandidate,
    window_samples: usize,
) -> Option<Cycle> {
    Some(Cycle::new(
        build_window(bucket, pair.charge, window_samples)?,
        build_window(bucket, pair.discharge, window_samples)?,
    ))
}
