//! Parser for the semicolon-delimited AMFI NAV feed.
//!
//! The feed interleaves three kinds of lines:
//!
//! ```text
//! Open Ended Schemes(Equity Scheme - Large Cap Fund)
//! Acme Mutual Fund
//! 100027;INF000A01AB1;-;Acme Bluechip Fund - Regular Plan - Growth;512.3410;14-Oct-2024
//! ```
//!
//! Headers carry context for the record lines that follow them. Records that
//! fail validation are skipped and counted, never reported as errors.

use crate::core::fund::{FundRecord, OTHER_CATEGORY, parse_number};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

const SCHEME_TYPE_MARKERS: [&str; 3] = [
    "open ended schemes",
    "close ended schemes",
    "interval fund schemes",
];

const NAV_UNAVAILABLE: [&str; 4] = ["n.a.", "na", "n/a", "-"];

const MIN_RECORD_FIELDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DropReason {
    EmptyName,
    DirectPlan,
    EmptyCode,
    NavUnavailable,
    EmptyDate,
    InvalidNav,
    DuplicateCode,
    Malformed,
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DropReason::EmptyName => "empty-name",
                DropReason::DirectPlan => "direct-plan",
                DropReason::EmptyCode => "empty-code",
                DropReason::NavUnavailable => "nav-unavailable",
                DropReason::EmptyDate => "empty-date",
                DropReason::InvalidNav => "invalid-nav",
                DropReason::DuplicateCode => "duplicate-code",
                DropReason::Malformed => "malformed",
            }
        )
    }
}

/// Number of skipped lines per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropCounts(BTreeMap<DropReason, usize>);

impl DropCounts {
    fn record(&mut self, reason: DropReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn get(&self, reason: DropReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DropReason, usize)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

impl Display for DropCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(reason, count)| format!("{reason}={count}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub records: Vec<FundRecord>,
    pub dropped: DropCounts,
}

enum Line<'a> {
    SchemeType(&'a str),
    FundHouse(&'a str),
    Record(Vec<&'a str>),
    Unknown,
}

fn classify(line: &str) -> Line<'_> {
    let lower = line.to_lowercase();
    if SCHEME_TYPE_MARKERS.iter().any(|m| lower.contains(m)) {
        return Line::SchemeType(line);
    }

    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() >= MIN_RECORD_FIELDS {
        return Line::Record(fields);
    }

    if !line.contains('(') && !line.contains(')') {
        return Line::FundHouse(line.trim_end_matches(';').trim());
    }

    Line::Unknown
}

fn validate(fields: &[&str], fund_house: &str) -> Result<FundRecord, DropReason> {
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    let (code, name, nav, date) = (field(0), field(3), field(4), field(5));

    if name.is_empty() {
        return Err(DropReason::EmptyName);
    }
    if name.to_lowercase().contains("direct") {
        return Err(DropReason::DirectPlan);
    }
    if code.is_empty() {
        return Err(DropReason::EmptyCode);
    }
    if nav.is_empty() || NAV_UNAVAILABLE.contains(&nav.to_lowercase().as_str()) {
        return Err(DropReason::NavUnavailable);
    }
    if date.is_empty() {
        return Err(DropReason::EmptyDate);
    }
    if !parse_number(nav).is_some_and(|v| v >= 0.0) {
        return Err(DropReason::InvalidNav);
    }

    Ok(FundRecord {
        scheme_code: code.to_string(),
        scheme_name: name.to_string(),
        nav: nav.to_string(),
        date: date.to_string(),
        fund_house: fund_house.to_string(),
        category: OTHER_CATEGORY.to_string(),
    })
}

/// Parses raw feed text, reporting how many lines were skipped and why.
pub fn parse_with_report(raw: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut seen_codes = HashSet::new();
    let mut fund_house = "";
    // Tracked for completeness; records do not carry it.
    let mut _scheme_type = "";

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match classify(line) {
            Line::SchemeType(text) => _scheme_type = text,
            Line::FundHouse(text) => fund_house = text,
            Line::Record(fields) => match validate(&fields, fund_house) {
                Ok(record) => {
                    if seen_codes.insert(record.scheme_code.clone()) {
                        report.records.push(record);
                    } else {
                        report.dropped.record(DropReason::DuplicateCode);
                    }
                }
                Err(reason) => report.dropped.record(reason),
            },
            Line::Unknown => report.dropped.record(DropReason::Malformed),
        }
    }

    report
}

/// Parses raw feed text into fund records in feed order.
pub fn parse(raw: &str) -> Vec<FundRecord> {
    parse_with_report(raw).records
}
