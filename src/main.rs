//! fintrack - personal finance tracker
//!
//! Usage:
//!   fintrack init                  Initialize the database schema
//!   fintrack add                   Add a transaction interactively
//!   fintrack ingest --file CSV     Ingest transactions from a CSV file
//!   fintrack list                  List stored transactions
//!   fintrack edit 12 --amount 9.99 Patch fields of a transaction
//!   fintrack remove 12             Delete a transaction
//!   fintrack summary               Print monthly summary and category spending
//!   fintrack budget set ...        Set a category budget over a date range
//!   fintrack budget report         Print budget compliance
//!   fintrack export                Write all reports to the export directory

mod config;
mod db;
mod error;
mod models;
mod operations;
mod validate;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;
use crate::db::{budget_repository, category_repository, transaction_repository};
use crate::error::Error;
use crate::models::budget::NewBudget;
use crate::models::transaction::TransactionPatch;
use crate::operations::report::{
    budget_compliance, budget_compliance_report, category_spending, category_spending_report,
    monthly_summary, monthly_summary_report, print_report,
};
use crate::operations::{add, export, ingest};

#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Personal finance tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Database path
    #[arg(long, default_value = "db/finance.db", global = true)]
    db: PathBuf,

    /// Directory report exports are written to
    #[arg(long, default_value = "data/export", global = true)]
    export_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema
    Init,

    /// Add a transaction interactively
    Add {
        /// Owner the transaction is recorded under
        #[arg(long)]
        user: Option<String>,
    },

    /// List stored transactions
    List {
        /// Restrict to one owner
        #[arg(long)]
        user: Option<String>,
    },

    /// Update fields of a transaction
    Edit {
        /// Transaction id
        txn_id: i64,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// New amount
        #[arg(long)]
        amount: Option<String>,

        /// New type (income/expense/investment)
        #[arg(long = "type")]
        txn_type: Option<String>,

        /// New category name (created on first use)
        #[arg(long)]
        category: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Remove a transaction by id
    Remove {
        /// Transaction id
        txn_id: i64,
    },

    /// Ingest transactions from a CSV file
    Ingest {
        /// CSV file to ingest
        #[arg(short, long)]
        file: PathBuf,

        /// Owner the transactions are recorded under
        #[arg(long)]
        user: Option<String>,
    },

    /// Print monthly summary and category spending
    Summary {
        /// Restrict to one owner
        #[arg(long)]
        user: Option<String>,
    },

    /// Manage budgets
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Export all reports as CSV and spreadsheet files
    Export {
        /// Restrict to one owner
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
enum BudgetAction {
    /// Set a spending cap for a category over a date range
    Set {
        /// Category name (created on first use)
        category: String,

        /// Allotted amount
        amount: String,

        /// Range start (YYYY-MM-DD, inclusive)
        #[arg(long)]
        start: NaiveDate,

        /// Range end (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: NaiveDate,

        /// Owner the budget is scoped to
        #[arg(long)]
        user: Option<String>,
    },

    /// Print budget compliance
    Report {
        /// Restrict to one owner
        #[arg(long)]
        user: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::new(cli.db, cli.export_dir);

    match cli.command {
        Commands::Init => cmd_init(&config),
        Commands::Add { user } => cmd_add(&config, user.as_deref()),
        Commands::List { user } => cmd_list(&config, user.as_deref()),
        Commands::Edit {
            txn_id,
            date,
            amount,
            txn_type,
            category,
            description,
            tags,
        } => cmd_edit(
            &config,
            txn_id,
            date,
            amount.as_deref(),
            txn_type.as_deref(),
            category.as_deref(),
            description.as_deref(),
            tags.as_deref(),
        ),
        Commands::Remove { txn_id } => cmd_remove(&config, txn_id),
        Commands::Ingest { file, user } => cmd_ingest(&config, &file, user.as_deref()),
        Commands::Summary { user } => cmd_summary(&config, user.as_deref()),
        Commands::Budget { action } => match action {
            BudgetAction::Set {
                category,
                amount,
                start,
                end,
                user,
            } => cmd_budget_set(&config, &category, &amount, start, end, user.as_deref()),
            BudgetAction::Report { user } => cmd_budget_report(&config, user.as_deref()),
        },
        Commands::Export { user } => cmd_export(&config, user.as_deref()),
    }
}

fn open_db(config: &Config) -> Result<Connection> {
    Ok(db::connection::establish_connection(&config.db_path)?)
}

fn cmd_init(config: &Config) -> Result<()> {
    open_db(config)?;
    println!("Database initialized at {}", config.db_path.display());
    Ok(())
}

fn cmd_add(config: &Config, user: Option<&str>) -> Result<()> {
    let conn = open_db(config)?;
    let txn_id = add::add_transaction_interactive(&conn, user)?;
    println!("Transaction {} added.", txn_id);
    Ok(())
}

fn cmd_list(config: &Config, user: Option<&str>) -> Result<()> {
    let conn = open_db(config)?;
    let transactions = transaction_repository::get_transactions(&conn, user)?;
    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    for t in &transactions {
        let owner = t.user_id.as_deref().unwrap_or("-");
        let description = t.description.as_deref().unwrap_or("");
        let tags = t
            .tags
            .as_deref()
            .map(|tags| format!(" [{}]", tags))
            .unwrap_or_default();
        println!(
            "{:>6}  {}  {:>12}  {:<10}  {:<10}  {}{}",
            t.txn_id, t.date, t.amount, t.txn_type, owner, description, tags
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_edit(
    config: &Config,
    txn_id: i64,
    date: Option<NaiveDate>,
    amount: Option<&str>,
    txn_type: Option<&str>,
    category: Option<&str>,
    description: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    let conn = open_db(config)?;

    let mut patch = TransactionPatch {
        date,
        ..Default::default()
    };
    if let Some(raw) = amount {
        patch.amount = Some(
            validate::format_amount(raw)
                .ok_or_else(|| Error::InvalidData(format!("invalid amount '{}'", raw)))?,
        );
    }
    if let Some(raw) = txn_type {
        patch.txn_type = Some(validate::normalize_transaction_type(raw).ok_or_else(|| {
            Error::InvalidData(format!(
                "invalid transaction type '{}', expected income, expense or investment",
                raw
            ))
        })?);
    }
    if let Some(name) = category {
        patch.category_id = Some(Some(category_repository::get_or_create(&conn, name)?));
    }
    if let Some(raw) = description {
        patch.description = Some(validate::sanitize_string(raw));
    }
    if let Some(raw) = tags {
        let parsed = validate::parse_tags(raw);
        patch.tags = Some(if parsed.is_empty() {
            None
        } else {
            Some(parsed.join(","))
        });
    }

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    transaction_repository::update_transaction(&conn, txn_id, &patch)?;
    println!("Transaction {} updated.", txn_id);
    Ok(())
}

fn cmd_remove(config: &Config, txn_id: i64) -> Result<()> {
    let conn = open_db(config)?;
    transaction_repository::remove_transaction(&conn, txn_id)?;
    println!("Transaction {} removed.", txn_id);
    Ok(())
}

fn cmd_ingest(config: &Config, file: &std::path::Path, user: Option<&str>) -> Result<()> {
    let conn = open_db(config)?;
    let outcome = ingest::ingest_csv(&conn, file, user)?;
    println!(
        "Ingested {} transactions ({} skipped).",
        outcome.inserted,
        outcome.skipped.len()
    );
    for skip in &outcome.skipped {
        println!("  line {}: {}", skip.line, skip.reason);
    }
    Ok(())
}

fn cmd_summary(config: &Config, user: Option<&str>) -> Result<()> {
    let conn = open_db(config)?;
    let transactions = transaction_repository::get_transactions(&conn, user)?;
    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    let categories = category_repository::list_categories(&conn)?;

    println!("Monthly Summary:");
    print_report(&monthly_summary_report(&monthly_summary(&transactions)));
    println!();
    println!("Category Spending:");
    print_report(&category_spending_report(&category_spending(
        &transactions,
        &categories,
    )));
    Ok(())
}

fn cmd_budget_set(
    config: &Config,
    category: &str,
    amount: &str,
    start: NaiveDate,
    end: NaiveDate,
    user: Option<&str>,
) -> Result<()> {
    let conn = open_db(config)?;
    let amount = validate::format_amount(amount)
        .ok_or_else(|| Error::InvalidData(format!("invalid budget amount '{}'", amount)))?;
    let category_id = category_repository::get_or_create(&conn, category)?;
    budget_repository::add_budget(
        &conn,
        &NewBudget {
            category_id,
            amount,
            start_date: start,
            end_date: end,
            user_id: user.map(|u| u.to_string()),
        },
    )?;
    println!(
        "Budget of {} set for '{}' from {} to {}.",
        amount, category, start, end
    );
    Ok(())
}

fn cmd_budget_report(config: &Config, user: Option<&str>) -> Result<()> {
    let conn = open_db(config)?;
    let budgets = budget_repository::budgets_for_user(&conn, user)?;
    if budgets.is_empty() {
        println!("No budgets found.");
        return Ok(());
    }
    let transactions = transaction_repository::get_transactions(&conn, user)?;
    let categories = category_repository::list_categories(&conn)?;

    println!("Budget Compliance:");
    print_report(&budget_compliance_report(&budget_compliance(
        &budgets,
        &transactions,
        &categories,
    )));
    Ok(())
}

fn cmd_export(config: &Config, user: Option<&str>) -> Result<()> {
    let conn = open_db(config)?;
    let transactions = transaction_repository::get_transactions(&conn, user)?;
    if transactions.is_empty() {
        println!("No transactions found for export.");
        return Ok(());
    }
    let categories = category_repository::list_categories(&conn)?;
    let budgets = budget_repository::budgets_for_user(&conn, user)?;

    let reports = [
        monthly_summary_report(&monthly_summary(&transactions)),
        category_spending_report(&category_spending(&transactions, &categories)),
        budget_compliance_report(&budget_compliance(&budgets, &transactions, &categories)),
    ];

    for report in &reports {
        let csv_name = format!("{}.csv", report.name);
        let xml_name = format!("{}.xml", report.name);
        if let Some(path) = export::export_csv(report, &config.export_dir, &csv_name)? {
            println!("Exported {}", path.display());
        }
        if let Some(path) = export::export_spreadsheet(report, &config.export_dir, &xml_name)? {
            println!("Exported {}", path.display());
        }
    }
    Ok(())
}
