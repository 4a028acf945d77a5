use super::ui;
use crate::core::{EnrichedFund, FundListService, SortKey};
use anyhow::Result;
use comfy_table::{Cell, Table};
use tracing::info;

#[derive(Debug, Clone)]
pub struct FundsQuery {
    pub category: String,
    pub sort: SortKey,
    pub fund_house: Option<String>,
    pub with_returns: bool,
    pub limit: Option<usize>,
}

impl Default for FundsQuery {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            sort: SortKey::default(),
            fund_house: None,
            with_returns: false,
            limit: None,
        }
    }
}

pub fn funds_table(funds: &[EnrichedFund], with_returns: bool) -> Table {
    let mut table = ui::new_styled_table();

    let mut header = vec![
        ui::header_cell("Code"),
        ui::header_cell("Scheme"),
        ui::header_cell("Fund House"),
        ui::header_cell("NAV"),
        ui::header_cell("Date"),
    ];
    if with_returns {
        header.extend([
            ui::header_cell("1Y"),
            ui::header_cell("3Y (CAGR)"),
            ui::header_cell("5Y (CAGR)"),
        ]);
    }
    table.set_header(header);

    for enriched in funds {
        let fund = &enriched.fund;
        let mut row = vec![
            Cell::new(&fund.scheme_code),
            Cell::new(&fund.scheme_name),
            Cell::new(&fund.fund_house),
            ui::number_cell(&fund.nav),
            Cell::new(&fund.date),
        ];
        if with_returns {
            let returns = enriched.returns.unwrap_or_default();
            row.extend([
                ui::return_cell(returns.one_year),
                ui::return_cell(returns.three_year),
                ui::return_cell(returns.five_year),
            ]);
        }
        table.add_row(row);
    }

    table
}

pub async fn run(
    service: &FundListService<'_>,
    query: &FundsQuery,
    concurrency: usize,
) -> Result<()> {
    info!("Listing funds: {query:?}");
    let fund_house = query.fund_house.as_deref();

    let mut funds = service
        .list_funds(&query.category, query.sort, fund_house)
        .await;
    if funds.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No funds to show. The NAV feed may be unavailable, try again later.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let total = funds.len();
    // A returns ordering needs every fund enriched before it can be cut
    let limit_first = !(query.with_returns && query.sort.uses_returns());
    if let Some(limit) = query.limit.filter(|_| limit_first) {
        funds.truncate(limit);
    }

    if query.with_returns {
        let pb = ui::new_progress_bar(funds.len() as u64);
        funds = service
            .attach_returns(funds, query.sort, concurrency, &|| pb.inc(1))
            .await;
        pb.finish_and_clear();
        if let Some(limit) = query.limit {
            funds.truncate(limit);
        }
    }

    println!("{}", funds_table(&funds, query.with_returns));
    println!(
        "{}",
        ui::style_text(
            &format!("Showing {} of {total} funds", funds.len()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

pub async fn run_houses(service: &FundListService<'_>) -> Result<()> {
    let houses = service.fund_houses().await;
    if houses.is_empty() {
        println!(
            "{}",
            ui::style_text("No fund houses found.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", ui::style_text("Fund houses", ui::StyleType::Title));
    for house in houses {
        println!("  {house}");
    }
    Ok(())
}
