use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, ToSql, params, params_from_iter};
use rust_decimal::Decimal;

use crate::config::DATE_FORMAT;
use crate::error::{Error, Result};
use crate::models::transaction::{NewTransaction, Transaction, TransactionPatch, TransactionType};

const SELECT_COLUMNS: &str =
    "SELECT txn_id, date, amount, type, category_id, description, tags, user_id FROM transactions";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(1)?;
    let amount_str: String = row.get(2)?;
    let type_str: String = row.get(3)?;

    Ok(Transaction {
        txn_id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        amount: Decimal::from_str(&amount_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        txn_type: TransactionType::parse(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Text,
                format!("invalid transaction type '{}'", type_str).into(),
            )
        })?,
        category_id: row.get(4)?,
        description: row.get(5)?,
        tags: row.get(6)?,
        user_id: row.get(7)?,
    })
}

/// Inserts a transaction and returns the store-assigned id.
pub fn insert_transaction(conn: &Connection, transaction: &NewTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (date, amount, type, category_id, description, tags, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            transaction.date.to_string(),
            transaction.amount.to_string(),
            transaction.txn_type.as_str(),
            transaction.category_id,
            transaction.description,
            transaction.tags,
            transaction.user_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Materializes transactions for one owner, or for all owners, newest
/// first. Every report derives from this.
pub fn get_transactions(conn: &Connection, user_id: Option<&str>) -> Result<Vec<Transaction>> {
    let mut transactions = Vec::new();
    match user_id {
        Some(user) => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE user_id = ?1 ORDER BY date DESC",
                SELECT_COLUMNS
            ))?;
            let rows = stmt.query_map([user], row_to_transaction)?;
            for transaction in rows {
                transactions.push(transaction?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!("{} ORDER BY date DESC", SELECT_COLUMNS))?;
            let rows = stmt.query_map([], row_to_transaction)?;
            for transaction in rows {
                transactions.push(transaction?);
            }
        }
    }
    Ok(transactions)
}

/// Applies a typed patch. An empty patch is a no-op; a missing id is an
/// error.
pub fn update_transaction(conn: &Connection, txn_id: i64, patch: &TransactionPatch) -> Result<()> {
    if patch.is_empty() {
        return Ok(());
    }

    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(date) = patch.date {
        assignments.push("date = ?");
        values.push(Box::new(date.to_string()));
    }
    if let Some(amount) = patch.amount {
        assignments.push("amount = ?");
        values.push(Box::new(amount.to_string()));
    }
    if let Some(txn_type) = patch.txn_type {
        assignments.push("type = ?");
        values.push(Box::new(txn_type.as_str()));
    }
    if let Some(category_id) = patch.category_id {
        assignments.push("category_id = ?");
        values.push(Box::new(category_id));
    }
    if let Some(ref description) = patch.description {
        assignments.push("description = ?");
        values.push(Box::new(description.clone()));
    }
    if let Some(ref tags) = patch.tags {
        assignments.push("tags = ?");
        values.push(Box::new(tags.clone()));
    }

    values.push(Box::new(txn_id));
    let sql = format!(
        "UPDATE transactions SET {} WHERE txn_id = ?",
        assignments.join(", ")
    );
    let rows_affected = conn.execute(&sql, params_from_iter(values))?;

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("transaction {}", txn_id)));
    }
    Ok(())
}

pub fn remove_transaction(conn: &Connection, txn_id: i64) -> Result<()> {
    let rows_affected = conn.execute("DELETE FROM transactions WHERE txn_id = ?1", [txn_id])?;
    if rows_affected == 0 {
        return Err(Error::NotFound(format!("transaction {}", txn_id)));
    }
    Ok(())
}
