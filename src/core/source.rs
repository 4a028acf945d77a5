//! Seams between the list service and the HTTP providers

use crate::core::fund::{EnrichedFund, FundRecord, Outcome};
use async_trait::async_trait;
use std::sync::Arc;

/// Supplies the full list of funds from the daily NAV feed.
#[async_trait]
pub trait FundUniverseSource: Send + Sync {
    /// An unavailable feed yields `Outcome::Fallback` with an empty list.
    async fn fund_universe(&self) -> Outcome<Arc<[FundRecord]>>;
}

/// Attaches trailing returns to a fund.
#[async_trait]
pub trait FundReturnsSource: Send + Sync {
    async fn fund_with_returns(&self, fund: &FundRecord) -> Outcome<EnrichedFund>;
}
