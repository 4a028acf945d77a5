//! Fund records, return sets and fetch outcomes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category assigned at parse time. The feed carries no category.
pub const OTHER_CATEGORY: &str = "other";

/// A single scheme from the daily NAV feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRecord {
    pub scheme_code: String,
    pub scheme_name: String,
    pub nav: String,
    pub date: String,
    pub fund_house: String,
    pub category: String,
}

impl FundRecord {
    /// Parsed NAV, `None` when the text is not a finite number.
    pub fn nav_value(&self) -> Option<f64> {
        parse_number(&self.nav)
    }
}

/// Trailing returns in percent. 1Y is point-to-point, 3Y and 5Y are annualized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSet {
    pub one_year: Option<f64>,
    pub three_year: Option<f64>,
    pub five_year: Option<f64>,
}

impl ReturnSet {
    pub fn is_empty(&self) -> bool {
        self.one_year.is_none() && self.three_year.is_none() && self.five_year.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFund {
    #[serde(flatten)]
    pub fund: FundRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnSet>,
}

impl EnrichedFund {
    pub fn new(fund: FundRecord, returns: Option<ReturnSet>) -> Self {
        Self { fund, returns }
    }

    pub fn one_year_return(&self) -> Option<f64> {
        self.returns.and_then(|r| r.one_year)
    }
}

impl From<FundRecord> for EnrichedFund {
    fn from(fund: FundRecord) -> Self {
        Self::new(fund, None)
    }
}

/// One sample of a fund's NAV history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub nav: String,
}

impl HistoryPoint {
    pub fn new(date: NaiveDate, nav: impl Into<String>) -> Self {
        Self {
            date,
            nav: nav.into(),
        }
    }
}

/// Result of a pipeline fetch that never fails outright.
///
/// `Fallback` carries the degraded value callers render anyway (an empty
/// universe, synthetic returns) together with the reason the fetch failed.
/// [`Outcome::into_value`] deliberately treats both variants alike; callers
/// that care about the difference match on the variant instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Fetched(T),
    Fallback { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Outcome::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Fetched(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Fetched(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Fetched(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Parses a numeric field from either feed, rejecting NaN and infinities.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
