pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::GrowthContext;
use crate::core::config::{AppConfig, FundConfig};
use crate::core::ledger::{ContributionUpdate, NewContribution};
use crate::core::nav::PeriodMode;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Funds,
    Nav {
        fund_id: u32,
        start: NaiveDate,
        end: Option<NaiveDate>,
        period: PeriodMode,
    },
    Add {
        fund_id: u32,
        date: NaiveDate,
        amount: Decimal,
    },
    List {
        fund_id: Option<u32>,
    },
    Update {
        id: u64,
        fund_id: Option<u32>,
        date: Option<NaiveDate>,
        amount: Option<Decimal>,
    },
    Remove {
        id: u64,
    },
    Value {
        id: u64,
        json: bool,
    },
    Growth {
        fund_id: u32,
        json: bool,
    },
    Summary,
}

fn price_source(config: &AppConfig) -> Result<providers::bareksa::BareksaProvider> {
    let bareksa = config.bareksa();
    providers::bareksa::BareksaProvider::new(
        &bareksa.base_url,
        Duration::from_secs(bareksa.timeout_secs),
    )
}

fn find_fund(config: &AppConfig, fund_id: u32) -> Result<&FundConfig> {
    config
        .funds
        .iter()
        .find(|fund| fund.id == fund_id)
        .with_context(|| format!("Mutual fund {fund_id} is not configured"))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("navgrow starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let today = chrono::Local::now().date_naive();
    let account = config.account.as_str();

    match command {
        AppCommand::Funds => {
            cli::funds::run(&config.funds);
            Ok(())
        }
        AppCommand::Nav {
            fund_id,
            start,
            end,
            period,
        } => {
            let fund = find_fund(&config, fund_id)?;
            let source = price_source(&config)?;
            cli::nav::run(&source, fund, start, end.unwrap_or(today), period).await
        }
        AppCommand::Add {
            fund_id,
            date,
            amount,
        } => {
            let ledger = store::open_ledger(&config)?;
            let new = NewContribution {
                fund_id,
                date,
                amount,
            };
            cli::contributions::add(ledger.as_ref(), &config.funds, account, new).await
        }
        AppCommand::List { fund_id } => {
            let ledger = store::open_ledger(&config)?;
            cli::contributions::list(ledger.as_ref(), &config.funds, account, fund_id).await
        }
        AppCommand::Update {
            id,
            fund_id,
            date,
            amount,
        } => {
            let ledger = store::open_ledger(&config)?;
            let update = ContributionUpdate {
                fund_id,
                date,
                amount,
            };
            cli::contributions::update(ledger.as_ref(), &config.funds, account, id, update).await
        }
        AppCommand::Remove { id } => {
            let ledger = store::open_ledger(&config)?;
            cli::contributions::remove(ledger.as_ref(), account, id).await
        }
        AppCommand::Value { id, json } => {
            let ledger = store::open_ledger(&config)?;
            let source = price_source(&config)?;
            let context = GrowthContext {
                ledger: ledger.as_ref(),
                source: &source,
                funds: &config.funds,
                account,
            };
            cli::growth::run_contribution(&context, id, today, json).await
        }
        AppCommand::Growth { fund_id, json } => {
            let ledger = store::open_ledger(&config)?;
            let source = price_source(&config)?;
            let context = GrowthContext {
                ledger: ledger.as_ref(),
                source: &source,
                funds: &config.funds,
                account,
            };
            cli::growth::run_fund(&context, fund_id, today, json).await
        }
        AppCommand::Summary => {
            let ledger = store::open_ledger(&config)?;
            let source = price_source(&config)?;
            let context = GrowthContext {
                ledger: ledger.as_ref(),
                source: &source,
                funds: &config.funds,
                account,
            };
            cli::summary::run(&context, today).await
        }
    }
}
