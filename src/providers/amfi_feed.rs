use crate::core::cache::SnapshotCache;
use crate::core::config::FeedProviderConfig;
use crate::core::fund::{FundRecord, Outcome};
use crate::core::parser::parse_with_report;
use crate::core::source::FundUniverseSource;
use crate::providers::util::{fetch_text, http_client};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub type UniverseCache = SnapshotCache<Arc<[FundRecord]>>;

/// Fetches and caches the daily NAV feed for all schemes.
pub struct AmfiFeedProvider {
    feed_url: String,
    client: reqwest::Client,
    retries: usize,
    cache: Arc<UniverseCache>,
}

impl AmfiFeedProvider {
    pub fn new(config: &FeedProviderConfig, cache: Arc<UniverseCache>) -> Result<Self> {
        Ok(Self {
            feed_url: config.feed_url.clone(),
            client: http_client(config.timeout())?,
            retries: config.retries,
            cache,
        })
    }

    async fn download(&self) -> Result<Arc<[FundRecord]>> {
        let body = fetch_text(&self.client, &self.feed_url, self.retries, 500).await?;
        let report = parse_with_report(&body);
        debug!(
            records = report.records.len(),
            dropped = report.dropped.total(),
            "Parsed NAV feed: {}",
            report.dropped
        );
        Ok(report.records.into())
    }
}

#[async_trait]
impl FundUniverseSource for AmfiFeedProvider {
    #[instrument(name = "FundUniverse", skip(self), fields(url = %self.feed_url))]
    async fn fund_universe(&self) -> Outcome<Arc<[FundRecord]>> {
        if let Some(funds) = self.cache.fresh().await {
            return Outcome::Fetched(funds);
        }

        match self.download().await {
            Ok(funds) => {
                self.cache.replace(Arc::clone(&funds)).await;
                Outcome::Fetched(funds)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "NAV feed unavailable");
                Outcome::fallback(Arc::from(Vec::new()), format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = "\
Open Ended Schemes(Equity Scheme - Large Cap Fund)
Acme Mutual Fund
100027;INF000A01AB1;-;Acme Bluechip Fund - Growth;512.3410;14-Oct-2024
100028;INF000A01AB2;-;Acme Bluechip Fund - Direct Plan - Growth;530.1000;14-Oct-2024
";

    fn setup(server: &MockServer) -> (AmfiFeedProvider, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 10, 14, 9, 0, 0).unwrap(),
        ));
        let config = FeedProviderConfig {
            feed_url: format!("{}/spages/NAVAll.txt", server.uri()),
            ..Default::default()
        };
        let cache = Arc::new(UniverseCache::new(config.freshness().unwrap(), clock.clone()));
        (AmfiFeedProvider::new(&config, cache).unwrap(), clock)
    }

    async fn mount_feed(server: &MockServer, status: u16, body: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/spages/NAVAll.txt"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fresh_snapshot_is_served_from_cache() {
        let server = MockServer::start().await;
        mount_feed(&server, 200, FEED, 1).await;
        let (provider, clock) = setup(&server);

        let first = provider.fund_universe().await;
        assert!(!first.is_fallback());
        assert_eq!(first.value().len(), 1);
        assert_eq!(first.value()[0].fund_house, "Acme Mutual Fund");

        clock.advance(Duration::minutes(10));
        let second = provider.fund_universe().await;
        assert_eq!(second.value().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_refetched() {
        let server = MockServer::start().await;
        mount_feed(&server, 200, FEED, 2).await;
        let (provider, clock) = setup(&server);

        provider.fund_universe().await;
        clock.advance(Duration::minutes(15));
        let refreshed = provider.fund_universe().await;
        assert!(!refreshed.is_fallback());
        assert_eq!(refreshed.value().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_empty() {
        let server = MockServer::start().await;
        mount_feed(&server, 500, "Server Error", 1).await;
        let (provider, _clock) = setup(&server);

        let outcome = provider.fund_universe().await;
        assert!(outcome.is_fallback());
        assert!(outcome.value().is_empty());
        assert!(outcome.reason().unwrap().contains("Request to"));
    }

    #[tokio::test]
    async fn test_empty_body_degrades_to_empty() {
        let server = MockServer::start().await;
        mount_feed(&server, 200, "", 1).await;
        let (provider, _clock) = setup(&server);

        let outcome = provider.fund_universe().await;
        assert!(outcome.is_fallback());
        assert!(outcome.reason().unwrap().contains("empty response"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let server = MockServer::start().await;
        let (provider, clock) = setup(&server);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(provider.fund_universe().await.value().len(), 1);

        clock.advance(Duration::minutes(20));
        let failed = provider.fund_universe().await;
        assert!(failed.is_fallback());
        assert!(failed.value().is_empty());

        let kept = provider.cache.latest().await.unwrap();
        assert_eq!(kept.value.len(), 1);
    }
}
