use super::ui;
use crate::core::config::FundConfig;
use crate::core::{GrowthContext, GrowthReport, ValuationError};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use console::style;
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Latest standing of one fund, or why it could not be valued.
pub struct FundSummary {
    pub name: String,
    pub report: Result<GrowthReport, ValuationError>,
}

impl FundSummary {
    pub fn balance(&self) -> Option<Decimal> {
        let report = self.report.as_ref().ok()?;
        Some(
            report
                .latest()
                .map_or(report.total_principal, |row| row.total_balance),
        )
    }
}

/// Funds in which the account holds at least one active contribution.
pub async fn held_funds<'a>(context: &GrowthContext<'a>) -> Result<Vec<&'a FundConfig>> {
    let mut held = Vec::new();
    for fund in context.funds {
        if !context
            .ledger
            .list_active(context.account, fund.id)
            .await?
            .is_empty()
        {
            held.push(fund);
        }
    }
    debug!("{} of {} funds hold contributions", held.len(), context.funds.len());
    Ok(held)
}

/// Values `funds` concurrently; one failing fund does not affect the others.
pub async fn collect_summaries(
    context: &GrowthContext<'_>,
    funds: &[&FundConfig],
    end: NaiveDate,
    update_callback: &(dyn Fn() + Sync),
) -> Vec<FundSummary> {
    let futures = funds.iter().map(|fund| async move {
        let report = context.fund_growth(fund.id, end).await;
        update_callback();
        FundSummary {
            name: fund.name.clone(),
            report,
        }
    });

    join_all(futures).await
}

pub fn display_as_table(summaries: &[FundSummary]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Principal"),
        ui::header_cell("Accumulated Profit"),
        ui::header_cell("Balance"),
        ui::header_cell("As Of"),
    ]);

    for summary in summaries {
        match &summary.report {
            Ok(report) => {
                let latest = report.latest();
                table.add_row(vec![
                    Cell::new(&report.product_name),
                    ui::amount_cell(report.total_principal),
                    ui::signed_cell(latest.map_or(Decimal::ZERO, |row| row.accumulated_profit)),
                    ui::format_optional_cell(summary.balance(), |v| format!("{v:.2}")),
                    ui::format_optional_cell(latest.map(|row| row.date), |d| d.to_string()),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(format!(
                        "{}\n{}",
                        summary.name,
                        ui::style_text(&e.to_string(), ui::StyleType::Error)
                    )),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::na_cell(true),
                ]);
            }
        }
    }

    table.to_string()
}

pub async fn run(context: &GrowthContext<'_>, end: NaiveDate) -> Result<()> {
    info!("Summarizing funds as of {}", end);

    let held = held_funds(context).await?;
    if held.is_empty() {
        println!("No contributions recorded yet.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(held.len() as u64, true);
    pb.set_message("Valuing funds...");
    let summaries = collect_summaries(context, &held, end, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    println!("{}", display_as_table(&summaries));

    let balances: Option<Vec<Decimal>> = summaries.iter().map(FundSummary::balance).collect();
    if let Some(balances) = balances
        && summaries.len() > 1
    {
        let grand_total: Decimal = balances.into_iter().sum();
        let total_str = format!("Grand Total: {grand_total:.2}");
        println!("\n{}", style(&total_str).bold().green());
    }

    Ok(())
}
