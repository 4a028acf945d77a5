use crate::core::cache::Cache;
use crate::core::clock::Clock;
use crate::core::config::HistoryProviderConfig;
use crate::core::fund::{EnrichedFund, FundRecord, HistoryPoint, Outcome};
use crate::core::returns::{compute_returns_as_of, synthetic_returns};
use crate::core::source::FundReturnsSource;
use crate::providers::util::{fetch_text, http_client};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Per-fund result kept for the rest of the process.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Computed(EnrichedFund),
    /// The history was unusable; the fund carries synthetic returns and is
    /// not fetched again.
    Fallback { fund: EnrichedFund, reason: String },
}

impl From<HistoryEntry> for Outcome<EnrichedFund> {
    fn from(entry: HistoryEntry) -> Self {
        match entry {
            HistoryEntry::Computed(fund) => Outcome::Fetched(fund),
            HistoryEntry::Fallback { fund, reason } => Outcome::fallback(fund, reason),
        }
    }
}

pub type HistoryCache = Cache<String, HistoryEntry>;

pub struct HistoryProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    cache: Arc<HistoryCache>,
    clock: Arc<dyn Clock>,
}

impl HistoryProvider {
    pub fn new(
        config: &HistoryProviderConfig,
        cache: Arc<HistoryCache>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: http_client(config.timeout())?,
            retries: config.retries,
            cache,
            clock,
        })
    }

    async fn fetch_history(&self, scheme_code: &str) -> Result<Vec<HistoryPoint>> {
        let url = format!("{}/{}", self.base_url, scheme_code);
        debug!("Requesting NAV history from {}", url);

        let body = fetch_text(&self.client, &url, self.retries, 500).await?;
        let response: HistoryResponse = serde_json::from_str(&body).with_context(|| {
            format!("Failed to parse NAV history for scheme: {scheme_code}. Response: '{body}'")
        })?;

        let total = response.data.len();
        let history: Vec<HistoryPoint> = response
            .data
            .into_iter()
            .filter_map(|point| {
                parse_history_date(&point.date).map(|date| HistoryPoint::new(date, point.nav.0))
            })
            .collect();

        if history.len() < total {
            debug!(
                "Skipped {} history points with unreadable dates",
                total - history.len()
            );
        }
        if history.is_empty() {
            return Err(anyhow!("No NAV history for scheme: {scheme_code}"));
        }
        Ok(history)
    }

    async fn resolve(&self, fund: &FundRecord) -> HistoryEntry {
        let history = match self.fetch_history(&fund.scheme_code).await {
            Ok(history) => history,
            Err(e) => return synthesize(fund, format!("{e:#}")),
        };

        match compute_returns_as_of(&history, self.clock.today()) {
            Some(returns) => HistoryEntry::Computed(EnrichedFund::new(fund.clone(), Some(returns))),
            None => synthesize(
                fund,
                format!("Latest NAV unreadable for scheme: {}", fund.scheme_code),
            ),
        }
    }
}

fn synthesize(fund: &FundRecord, reason: String) -> HistoryEntry {
    warn!(
        scheme_code = %fund.scheme_code,
        %reason,
        "Using synthetic returns"
    );
    HistoryEntry::Fallback {
        fund: EnrichedFund::new(fund.clone(), Some(synthetic_returns())),
        reason,
    }
}

#[async_trait]
impl FundReturnsSource for HistoryProvider {
    #[instrument(
        name = "FundReturns",
        skip(self, fund),
        fields(scheme_code = %fund.scheme_code)
    )]
    async fn fund_with_returns(&self, fund: &FundRecord) -> Outcome<EnrichedFund> {
        if let Some(cached) = self.cache.get(&fund.scheme_code).await {
            return cached.into();
        }

        // Concurrent misses for one scheme each fetch; the last insert wins.
        let entry = self.resolve(fund).await;
        self.cache
            .put(fund.scheme_code.clone(), entry.clone())
            .await;
        entry.into()
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    data: Vec<RawHistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct RawHistoryPoint {
    date: String,
    nav: NavText,
}

/// NAV as text, whether the API sends a string or a number.
#[derive(Debug)]
struct NavText(String);

impl<'de> Deserialize<'de> for NavText {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        Ok(NavText(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        }))
    }
}

fn parse_history_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok()
}
