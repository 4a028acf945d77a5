use crate::core::fund::EnrichedFund;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// 1 year return, highest first
    #[default]
    Returns,
    ReturnsAsc,
    /// NAV, highest first
    Nav,
    NavAsc,
    /// Scheme name, A to Z
    Name,
    NameDesc,
    /// Keep input order
    Unsorted,
}

impl SortKey {
    /// Whether the order depends on fetched returns.
    pub fn uses_returns(self) -> bool {
        matches!(self, SortKey::Returns | SortKey::ReturnsAsc)
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortKey::Returns => "returns",
                SortKey::ReturnsAsc => "returns-asc",
                SortKey::Nav => "nav",
                SortKey::NavAsc => "nav-asc",
                SortKey::Name => "name",
                SortKey::NameDesc => "name-desc",
                SortKey::Unsorted => "none",
            }
        )
    }
}

/// Unknown keys map to [`SortKey::Unsorted`] rather than failing.
impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "returns" => SortKey::Returns,
            "returns-asc" => SortKey::ReturnsAsc,
            "nav" => SortKey::Nav,
            "nav-asc" => SortKey::NavAsc,
            "name" => SortKey::Name,
            "name-desc" => SortKey::NameDesc,
            _ => SortKey::Unsorted,
        })
    }
}

/// Orders by 1 year return; funds without one go last in either direction.
fn by_return(a: &EnrichedFund, b: &EnrichedFund, descending: bool) -> Ordering {
    match (a.one_year_return(), b.one_year_return()) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn nav_or_zero(fund: &EnrichedFund) -> f64 {
    fund.fund.nav_value().unwrap_or(0.0)
}

fn by_name(a: &EnrichedFund, b: &EnrichedFund) -> Ordering {
    let (a, b) = (&a.fund.scheme_name, &b.fund.scheme_name);
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_funds(mut funds: Vec<EnrichedFund>, key: SortKey) -> Vec<EnrichedFund> {
    match key {
        SortKey::Returns => funds.sort_by(|a, b| by_return(a, b, true)),
        SortKey::ReturnsAsc => funds.sort_by(|a, b| by_return(a, b, false)),
        SortKey::Nav => funds.sort_by(|a, b| nav_or_zero(b).total_cmp(&nav_or_zero(a))),
        SortKey::NavAsc => funds.sort_by(|a, b| nav_or_zero(a).total_cmp(&nav_or_zero(b))),
        SortKey::Name => funds.sort_by(by_name),
        SortKey::NameDesc => funds.sort_by(|a, b| by_name(b, a)),
        SortKey::Unsorted => {}
    }
    funds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::{FundRecord, OTHER_CATEGORY, ReturnSet};

    fn fund(code: &str, name: &str, nav: &str, one_year: Option<f64>) -> EnrichedFund {
        EnrichedFund::new(
            FundRecord {
                scheme_code: code.to_string(),
                scheme_name: name.to_string(),
                nav: nav.to_string(),
                date: "14-Oct-2024".to_string(),
                fund_house: "Acme Mutual Fund".to_string(),
                category: OTHER_CATEGORY.to_string(),
            },
            one_year.map(|r| ReturnSet {
                one_year: Some(r),
                ..Default::default()
            }),
        )
    }

    fn codes(funds: &[EnrichedFund]) -> Vec<&str> {
        funds.iter().map(|f| f.fund.scheme_code.as_str()).collect()
    }

    fn sample() -> Vec<EnrichedFund> {
        vec![
            fund("a", "beta Fund", "10.0", None),
            fund("b", "Alpha Fund", "abc", Some(-2000.0)),
            fund("c", "gamma Fund", "55.5", Some(12.0)),
            fund("d", "Delta Fund", "5.25", Some(30.0)),
        ]
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("returns".parse::<SortKey>().unwrap(), SortKey::Returns);
        assert_eq!("NAV-ASC".parse::<SortKey>().unwrap(), SortKey::NavAsc);
        assert_eq!("name-desc".parse::<SortKey>().unwrap(), SortKey::NameDesc);
        assert_eq!("popularity".parse::<SortKey>().unwrap(), SortKey::Unsorted);
        assert_eq!(SortKey::ReturnsAsc.to_string(), "returns-asc");
        assert!(SortKey::ReturnsAsc.uses_returns());
        assert!(!SortKey::Name.uses_returns());
    }

    #[test]
    fn test_missing_returns_sort_last() {
        let desc = sort_funds(sample(), SortKey::Returns);
        assert_eq!(codes(&desc), vec!["d", "c", "b", "a"]);

        let asc = sort_funds(sample(), SortKey::ReturnsAsc);
        assert_eq!(codes(&asc), vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn test_unparseable_nav_counts_as_zero() {
        let asc = sort_funds(sample(), SortKey::NavAsc);
        assert_eq!(codes(&asc), vec!["b", "d", "a", "c"]);

        let desc = sort_funds(sample(), SortKey::Nav);
        assert_eq!(codes(&desc), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_name_ordering_ignores_case() {
        let asc = sort_funds(sample(), SortKey::Name);
        assert_eq!(codes(&asc), vec!["b", "a", "d", "c"]);

        let desc = sort_funds(sample(), SortKey::NameDesc);
        assert_eq!(codes(&desc), vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_unsorted_keeps_order() {
        let funds = sort_funds(sample(), "unknown".parse().unwrap());
        assert_eq!(codes(&funds), vec!["a", "b", "c", "d"]);
    }
}
