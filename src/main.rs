use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use navgrow::core::log::init_logging;
use navgrow::core::nav::PeriodMode;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List configured mutual funds
    Funds,
    /// Display the NAV history of a fund
    Nav {
        /// Fund id from the configuration
        #[arg(short, long)]
        fund: u32,
        /// First date (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,
        /// Last date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        end: Option<NaiveDate>,
        /// Period mode: custom, 1m, 3m, 6m, 1y, 3y, 5y
        #[arg(short, long, default_value = "custom")]
        period: PeriodMode,
    },
    /// Record a contribution
    Add {
        #[arg(short, long)]
        fund: u32,
        /// Contribution date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(short, long)]
        amount: Decimal,
    },
    /// List recorded contributions
    List {
        /// Only contributions of this fund
        #[arg(short, long)]
        fund: Option<u32>,
    },
    /// Change a recorded contribution
    Update {
        id: u64,
        #[arg(short, long)]
        fund: Option<u32>,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        amount: Option<Decimal>,
    },
    /// Remove a recorded contribution
    Remove { id: u64 },
    /// Display the day by day growth of one contribution
    Value {
        id: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display the day by day growth of all contributions in a fund
    Growth {
        fund: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display the latest balance of every fund
    Summary,
}

impl From<Commands> for navgrow::AppCommand {
    fn from(cmd: Commands) -> navgrow::AppCommand {
        match cmd {
            Commands::Funds => navgrow::AppCommand::Funds,
            Commands::Nav {
                fund,
                start,
                end,
                period,
            } => navgrow::AppCommand::Nav {
                fund_id: fund,
                start,
                end,
                period,
            },
            Commands::Add { fund, date, amount } => navgrow::AppCommand::Add {
                fund_id: fund,
                date,
                amount,
            },
            Commands::List { fund } => navgrow::AppCommand::List { fund_id: fund },
            Commands::Update {
                id,
                fund,
                date,
                amount,
            } => navgrow::AppCommand::Update {
                id,
                fund_id: fund,
                date,
                amount,
            },
            Commands::Remove { id } => navgrow::AppCommand::Remove { id },
            Commands::Value { id, json } => navgrow::AppCommand::Value { id, json },
            Commands::Growth { fund, json } => navgrow::AppCommand::Growth {
                fund_id: fund,
                json,
            },
            Commands::Summary => navgrow::AppCommand::Summary,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => navgrow::cli::setup::setup(),
        Some(cmd) => navgrow::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
