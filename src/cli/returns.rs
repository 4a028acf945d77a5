use super::ui;
use crate::core::{EnrichedFund, FundListService, FundReturnsSource, Outcome};
use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use futures::future::join_all;
use tracing::{debug, info};

/// Returns lookup for one requested scheme code.
#[derive(Debug, Clone)]
pub enum ReturnLookup {
    Found(Outcome<EnrichedFund>),
    NotFound(String),
}

pub async fn lookup_returns(
    service: &FundListService<'_>,
    returns: &dyn FundReturnsSource,
    scheme_codes: &[String],
) -> Vec<ReturnLookup> {
    let found = service.find_funds(scheme_codes).await;
    let futures = found.into_iter().map(|(code, fund)| async move {
        match fund {
            Some(fund) => ReturnLookup::Found(returns.fund_with_returns(&fund).await),
            None => {
                debug!("Scheme {code} is not in the NAV feed");
                ReturnLookup::NotFound(code)
            }
        }
    });
    join_all(futures).await
}

pub fn returns_table(results: &[ReturnLookup]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Scheme"),
        ui::header_cell("NAV"),
        ui::header_cell("1Y"),
        ui::header_cell("3Y (CAGR)"),
        ui::header_cell("5Y (CAGR)"),
        ui::header_cell("Source"),
    ]);

    for result in results {
        match result {
            ReturnLookup::Found(outcome) => {
                let enriched = outcome.value();
                let returns = enriched.returns.unwrap_or_default();
                let source = if outcome.is_fallback() {
                    Cell::new("estimated").fg(Color::Yellow)
                } else {
                    Cell::new("history")
                };
                table.add_row(vec![
                    Cell::new(&enriched.fund.scheme_code),
                    Cell::new(&enriched.fund.scheme_name),
                    ui::number_cell(&enriched.fund.nav),
                    ui::return_cell(returns.one_year),
                    ui::return_cell(returns.three_year),
                    ui::return_cell(returns.five_year),
                    source,
                ]);
            }
            ReturnLookup::NotFound(code) => {
                table.add_row(vec![
                    Cell::new(code),
                    Cell::new(ui::style_text("Not found in NAV feed", ui::StyleType::Error)),
                    Cell::new(""),
                    ui::return_cell(None),
                    ui::return_cell(None),
                    ui::return_cell(None),
                    Cell::new(""),
                ]);
            }
        }
    }

    table
}

pub async fn run(
    service: &FundListService<'_>,
    returns: &dyn FundReturnsSource,
    scheme_codes: &[String],
) -> Result<()> {
    info!("Calculating returns for {} schemes", scheme_codes.len());

    let results = lookup_returns(service, returns, scheme_codes).await;

    println!("{}", returns_table(&results));
    if results
        .iter()
        .any(|r| matches!(r, ReturnLookup::Found(outcome) if outcome.is_fallback()))
    {
        println!(
            "{}",
            ui::style_text(
                "Estimated returns are placeholders shown when a fund's NAV history is unavailable.",
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::OTHER_CATEGORY;
    use crate::core::{FundRecord, FundUniverseSource, ReturnSet};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct OneFund(AtomicUsize);

    #[async_trait]
    impl FundUniverseSource for OneFund {
        async fn fund_universe(&self) -> Outcome<Arc<[FundRecord]>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Outcome::Fetched(Arc::from(vec![FundRecord {
                scheme_code: "100027".to_string(),
                scheme_name: "Acme Bluechip Fund - Growth".to_string(),
                nav: "512.3410".to_string(),
                date: "14-Oct-2024".to_string(),
                fund_house: "Acme Mutual Fund".to_string(),
                category: OTHER_CATEGORY.to_string(),
            }]))
        }
    }

    struct Estimated;

    #[async_trait]
    impl FundReturnsSource for Estimated {
        async fn fund_with_returns(&self, fund: &FundRecord) -> Outcome<EnrichedFund> {
            let returns = ReturnSet {
                one_year: Some(7.0),
                three_year: Some(9.0),
                five_year: Some(11.0),
            };
            Outcome::fallback(EnrichedFund::new(fund.clone(), Some(returns)), "timeout")
        }
    }

    #[tokio::test]
    async fn test_lookup_and_render() {
        let universe = OneFund::default();
        let service = FundListService::new(&universe);
        let codes = vec![
            "100027".to_string(),
            "999999".to_string(),
            "100027".to_string(),
        ];

        let results = lookup_returns(&service, &Estimated, &codes).await;
        // One feed read serves every requested code
        assert_eq!(universe.0.load(Ordering::SeqCst), 1);
        assert_eq!(results.len(), 3);
        assert!(matches!(&results[0], ReturnLookup::Found(o) if o.is_fallback()));
        assert!(matches!(&results[1], ReturnLookup::NotFound(code) if code == "999999"));
        assert!(matches!(&results[2], ReturnLookup::Found(_)));

        let rendered = returns_table(&results).to_string();
        assert!(rendered.contains("estimated"));
        assert!(rendered.contains("7.00%"));
        assert!(rendered.contains("999999"));
        assert!(rendered.contains("Not found in NAV feed"));
    }
}
