//! Interactive transaction entry. Bypasses the ingestion pipeline and
//! writes through the persistence layer directly.

use std::io::{self, BufRead, Write};

use chrono::{Local, NaiveDate};
use rusqlite::Connection;

use crate::config::DATE_FORMAT;
use crate::db::{category_repository, transaction_repository};
use crate::error::{Error, Result};
use crate::models::transaction::NewTransaction;
use crate::validate::{format_amount, normalize_transaction_type, parse_tags, sanitize_string, validate_date};

pub fn add_transaction_interactive(conn: &Connection, user_id: Option<&str>) -> Result<i64> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    add_transaction_from_input(conn, &mut input, user_id)
}

fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Reads one transaction from the given input, line by line. Split from
/// the stdin wrapper so tests can drive it with a buffer.
fn add_transaction_from_input<R: BufRead>(
    conn: &Connection,
    input: &mut R,
    user_id: Option<&str>,
) -> Result<i64> {
    let date_raw = prompt(input, "Date (YYYY-MM-DD) [default today]")?;
    let date = if date_raw.is_empty() {
        Local::now().date_naive()
    } else if validate_date(&date_raw, DATE_FORMAT) {
        NaiveDate::parse_from_str(&date_raw, DATE_FORMAT)
            .map_err(|e| Error::InvalidData(e.to_string()))?
    } else {
        return Err(Error::InvalidData(format!(
            "invalid date '{}', expected YYYY-MM-DD",
            date_raw
        )));
    };

    let amount_raw = prompt(input, "Amount")?;
    let amount = format_amount(&amount_raw)
        .ok_or_else(|| Error::InvalidData(format!("invalid amount '{}'", amount_raw)))?;

    let type_raw = prompt(input, "Type (income/expense/investment)")?;
    let txn_type = normalize_transaction_type(&type_raw).ok_or_else(|| {
        Error::InvalidData(format!(
            "invalid transaction type '{}', expected income, expense or investment",
            type_raw
        ))
    })?;

    let category_raw = prompt(input, "Category (optional)")?;
    let category_id = match category_raw.is_empty() {
        true => None,
        false => Some(category_repository::get_or_create(conn, &category_raw)?),
    };

    let description = sanitize_string(&prompt(input, "Description (optional)")?);

    let tags_raw = prompt(input, "Tags (comma separated, optional)")?;
    let tags = match parse_tags(&tags_raw) {
        tags if tags.is_empty() => None,
        tags => Some(tags.join(",")),
    };

    let txn_id = transaction_repository::insert_transaction(
        conn,
        &NewTransaction {
            date,
            amount,
            txn_type,
            category_id,
            description,
            tags,
            user_id: user_id.map(|u| u.to_string()),
        },
    )?;
    Ok(txn_id)
}
