use super::ui;
use crate::core::config::FundConfig;
use crate::core::ledger::{ContributionLedger, ContributionRecord, ContributionUpdate, NewContribution};
use anyhow::{Result, bail};
use comfy_table::Cell;

fn ensure_fund(funds: &[FundConfig], fund_id: u32) -> Result<()> {
    if !funds.iter().any(|fund| fund.id == fund_id) {
        bail!("Mutual fund {} is not configured", fund_id);
    }
    Ok(())
}

fn fund_name(funds: &[FundConfig], fund_id: u32) -> String {
    funds
        .iter()
        .find(|fund| fund.id == fund_id)
        .map_or_else(|| format!("#{fund_id}"), |fund| fund.name.clone())
}

pub fn display_as_table(records: &[ContributionRecord], funds: &[FundConfig]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Fund"),
        ui::header_cell("Date"),
        ui::header_cell("Amount"),
    ]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(fund_name(funds, record.fund_id)),
            Cell::new(record.date.to_string()),
            ui::amount_cell(record.amount),
        ]);
    }

    table.to_string()
}

pub async fn add(
    ledger: &dyn ContributionLedger,
    funds: &[FundConfig],
    account: &str,
    new: NewContribution,
) -> Result<()> {
    ensure_fund(funds, new.fund_id)?;
    let record = ledger.add(account, new).await?;
    println!(
        "Recorded contribution {} of {:.2} into {} on {}",
        record.id,
        record.amount,
        fund_name(funds, record.fund_id),
        record.date
    );
    Ok(())
}

pub async fn list(
    ledger: &dyn ContributionLedger,
    funds: &[FundConfig],
    account: &str,
    fund_id: Option<u32>,
) -> Result<()> {
    let records = match fund_id {
        Some(fund_id) => ledger.list_active(account, fund_id).await?,
        None => ledger.list(account).await?,
    };

    if records.is_empty() {
        println!("No contributions recorded.");
        return Ok(());
    }
    println!("{}", display_as_table(&records, funds));
    Ok(())
}

pub async fn update(
    ledger: &dyn ContributionLedger,
    funds: &[FundConfig],
    account: &str,
    id: u64,
    update: ContributionUpdate,
) -> Result<()> {
    if let Some(fund_id) = update.fund_id {
        ensure_fund(funds, fund_id)?;
    }
    let record = ledger.update(account, id, update).await?;
    println!(
        "Updated contribution {}: {:.2} into {} on {}",
        record.id,
        record.amount,
        fund_name(funds, record.fund_id),
        record.date
    );
    Ok(())
}

pub async fn remove(ledger: &dyn ContributionLedger, account: &str, id: u64) -> Result<()> {
    ledger.remove(account, id).await?;
    println!("Removed contribution {id}");
    Ok(())
}
