use super::ui;
use crate::core::{GrowthContext, GrowthReport};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::debug;

impl GrowthReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("NAV"),
            ui::header_cell("Change"),
            ui::header_cell("Change (%)"),
            ui::header_cell("Principal"),
            ui::header_cell("Daily Profit"),
            ui::header_cell("Accumulated Profit"),
            ui::header_cell("Balance"),
        ]);

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(row.date.to_string()),
                ui::price_cell(row.price),
                ui::signed_cell(row.daily_change),
                ui::change_cell(row.daily_change_pct),
                ui::amount_cell(row.total_principal_active),
                ui::signed_cell(row.daily_profit),
                ui::signed_cell(row.accumulated_profit),
                ui::amount_cell(row.total_balance),
            ]);
        }

        let mut output = format!(
            "Fund: {}\n\n",
            ui::style_text(&self.product_name, ui::StyleType::Title)
        );

        if self.rows.is_empty() {
            output.push_str(&ui::style_text(
                "No NAV movements since the first contribution yet.",
                ui::StyleType::Subtle,
            ));
        } else {
            output.push_str(&table.to_string());
        }

        output.push_str(&format!(
            "\n\n{}: {:.2}",
            ui::style_text("Total Principal", ui::StyleType::TotalLabel),
            self.total_principal
        ));
        if let Some(latest) = self.latest() {
            output.push_str(&format!(
                "\n{} ({}): {}",
                ui::style_text("Balance", ui::StyleType::TotalLabel),
                latest.date,
                ui::style_text(
                    &format!("{:.2}", latest.total_balance),
                    ui::StyleType::TotalValue
                )
            ));
        }

        output
    }
}

fn print_report(report: &GrowthReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.display_as_table());
    }
    Ok(())
}

/// Growth of a single contribution.
pub async fn run_contribution(
    context: &GrowthContext<'_>,
    id: u64,
    end: NaiveDate,
    json: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching NAV history...");
    let result = context.contribution_growth(id, end).await;
    pb.finish_and_clear();

    let report = result?;
    debug!("Contribution {} valued over {} days", id, report.rows.len());
    print_report(&report, json)
}

/// Growth of all contributions of the account in a fund.
pub async fn run_fund(
    context: &GrowthContext<'_>,
    fund_id: u32,
    end: NaiveDate,
    json: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching NAV history...");
    let result = context.fund_growth(fund_id, end).await;
    pb.finish_and_clear();

    let report = result?;
    debug!("Fund {} valued over {} days", fund_id, report.rows.len());
    print_report(&report, json)
}
