//! Filtering, enrichment and ordering of the fund universe for display.
use crate::core::fund::{EnrichedFund, FundRecord};
use crate::core::sort::{SortKey, sort_funds};
use crate::core::source::{FundReturnsSource, FundUniverseSource};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use tracing::{debug, info};

const ALL: &str = "all";

fn is_all(filter: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || filter.eq_ignore_ascii_case(ALL)
}

fn matches_category(fund: &FundRecord, category: &str) -> bool {
    if is_all(category) {
        return true;
    }
    let wanted = category.trim().to_lowercase();
    let actual = fund.category.to_lowercase();
    actual == wanted || actual.contains(&wanted)
}

fn matches_fund_house(fund: &FundRecord, fund_house: Option<&str>) -> bool {
    match fund_house {
        Some(house) if !is_all(house) => fund
            .fund_house
            .to_lowercase()
            .contains(&house.trim().to_lowercase()),
        _ => true,
    }
}

pub struct FundListService<'a> {
    universe: &'a dyn FundUniverseSource,
    returns: Option<&'a dyn FundReturnsSource>,
}

impl<'a> FundListService<'a> {
    pub fn new(universe: &'a dyn FundUniverseSource) -> Self {
        Self {
            universe,
            returns: None,
        }
    }

    pub fn with_returns(mut self, returns: &'a dyn FundReturnsSource) -> Self {
        self.returns = Some(returns);
        self
    }

    async fn filtered(&self, category: &str, fund_house: Option<&str>) -> Vec<FundRecord> {
        let outcome = self.universe.fund_universe().await;
        if let Some(reason) = outcome.reason() {
            debug!("Listing from an empty universe: {reason}");
        }
        let funds: Vec<FundRecord> = outcome
            .value()
            .iter()
            .filter(|fund| matches_category(fund, category))
            .filter(|fund| matches_fund_house(fund, fund_house))
            .cloned()
            .collect();
        debug!(
            "{} of {} funds match category '{category}' and fund house {fund_house:?}",
            funds.len(),
            outcome.value().len()
        );
        funds
    }

    /// Funds matching the filters, ordered by `sort`. Returns are not attached.
    pub async fn list_funds(
        &self,
        category: &str,
        sort: SortKey,
        fund_house: Option<&str>,
    ) -> Vec<EnrichedFund> {
        let funds = self.filtered(category, fund_house).await;
        sort_funds(funds.into_iter().map(EnrichedFund::from).collect(), sort)
    }

    /// Like [`Self::list_funds`], with returns fetched for every matching fund
    /// before sorting. At most `concurrency` history requests run at once.
    pub async fn list_funds_with_returns(
        &self,
        category: &str,
        sort: SortKey,
        fund_house: Option<&str>,
        concurrency: usize,
        on_progress: &(dyn Fn() + Sync),
    ) -> Vec<EnrichedFund> {
        let funds = self.filtered(category, fund_house).await;
        let funds = funds.into_iter().map(EnrichedFund::from).collect();
        self.attach_returns(funds, sort, concurrency, on_progress).await
    }

    /// Fetches returns for an already listed set of funds, then sorts them.
    /// Funds are passed through unchanged when no returns source is set.
    pub async fn attach_returns(
        &self,
        funds: Vec<EnrichedFund>,
        sort: SortKey,
        concurrency: usize,
        on_progress: &(dyn Fn() + Sync),
    ) -> Vec<EnrichedFund> {
        let Some(source) = self.returns else {
            return sort_funds(funds, sort);
        };

        info!("Fetching returns for {} funds", funds.len());
        let enriched: Vec<EnrichedFund> = stream::iter(funds.iter())
            .map(|listed| async move {
                let enriched = source.fund_with_returns(&listed.fund).await.into_value();
                on_progress();
                enriched
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        sort_funds(enriched, sort)
    }

    /// Looks up several scheme codes against one universe snapshot, in order.
    pub async fn find_funds(&self, scheme_codes: &[String]) -> Vec<(String, Option<FundRecord>)> {
        let outcome = self.universe.fund_universe().await;
        scheme_codes
            .iter()
            .map(|code| {
                let fund = outcome
                    .value()
                    .iter()
                    .find(|fund| fund.scheme_code == code.trim())
                    .cloned();
                (code.clone(), fund)
            })
            .collect()
    }

    /// Distinct fund houses in the universe, alphabetically.
    pub async fn fund_houses(&self) -> Vec<String> {
        let outcome = self.universe.fund_universe().await;
        let houses: BTreeSet<&str> = outcome
            .value()
            .iter()
            .map(|fund| fund.fund_house.as_str())
            .filter(|house| !house.is_empty())
            .collect();
        houses.into_iter().map(str::to_string).collect()
    }
}
