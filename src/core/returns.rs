//! Trailing return calculations over a NAV history.
use crate::core::fund::{HistoryPoint, ReturnSet, parse_number};
use chrono::{Months, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use std::ops::RangeInclusive;
use tracing::debug;

/// Horizons reported for every fund, in years.
const HORIZONS: [u32; 3] = [1, 3, 5];

const SYNTHETIC_ONE_YEAR: RangeInclusive<f64> = -5.0..=25.0;
const SYNTHETIC_THREE_YEAR: RangeInclusive<f64> = 0.0..=40.0;
const SYNTHETIC_FIVE_YEAR: RangeInclusive<f64> = 5.0..=65.0;

/// Computes trailing returns as of today (UTC).
pub fn compute_returns(history: &[HistoryPoint]) -> Option<ReturnSet> {
    compute_returns_as_of(history, Utc::now().date_naive())
}

/// Computes trailing 1, 3 and 5 year returns relative to `as_of`.
///
/// The latest sample is the current NAV. For each horizon the baseline is the
/// newest older sample dated on or before `as_of` minus the horizon, so gaps
/// for weekends and holidays resolve to the nearest prior NAV. The 1 year
/// figure is a simple point-to-point change; 3 and 5 years are annualized.
///
/// Returns `None` for an empty history or an unreadable current NAV. A
/// horizon without a usable baseline is left empty.
pub fn compute_returns_as_of(history: &[HistoryPoint], as_of: NaiveDate) -> Option<ReturnSet> {
    let mut sorted: Vec<&HistoryPoint> = history.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let (latest, older) = sorted.split_first()?;
    let current_nav = parse_number(&latest.nav)?;

    let mut returns = ReturnSet::default();
    for years in HORIZONS {
        let Some(cutoff) = as_of.checked_sub_months(Months::new(12 * years)) else {
            continue;
        };
        let Some(baseline) = older.iter().find(|point| point.date <= cutoff) else {
            continue;
        };
        let Some(historical_nav) = parse_number(&baseline.nav).filter(|nav| *nav > 0.0) else {
            continue;
        };

        let value = if years == 1 {
            Some((current_nav / historical_nav - 1.0) * 100.0)
        } else {
            annualized(historical_nav, current_nav, years)
        };
        debug!(
            "{years}y return from {} ({historical_nav}) to {} ({current_nav}): {value:?}",
            baseline.date, latest.date
        );

        match years {
            1 => returns.one_year = value,
            3 => returns.three_year = value,
            _ => returns.five_year = value,
        }
    }

    Some(returns)
}

fn annualized(begin: f64, end: f64, years: u32) -> Option<f64> {
    let n = Decimal::from(years);
    let balances = Decimal::from_f64(begin)
        .zip(Decimal::from_f64(end))
        .filter(|(begin_bal, end_bal)| {
            end_bal
                .checked_div(*begin_bal)
                .and_then(|growth| growth.checked_powd(Decimal::ONE / n))
                .is_some()
        });

    let rate = match balances {
        Some((begin_bal, end_bal)) => cagr(begin_bal, end_bal, n).to_f64()?,
        // NAVs beyond what Decimal can carry
        None => (end / begin).powf(1.0 / f64::from(years)) - 1.0,
    };
    Some(rate * 100.0).filter(|value| value.is_finite())
}

/// Placeholder returns shown when a fund's history cannot be used.
///
/// These are not estimates; they only keep listings populated when the
/// history source misbehaves.
pub fn synthetic_returns() -> ReturnSet {
    let mut rng = rand::thread_rng();
    let mut sample = |range: RangeInclusive<f64>| (rng.gen_range(range) * 100.0).round() / 100.0;
    ReturnSet {
        one_year: Some(sample(SYNTHETIC_ONE_YEAR)),
        three_year: Some(sample(SYNTHETIC_THREE_YEAR)),
        five_year: Some(sample(SYNTHETIC_FIVE_YEAR)),
    }
}
