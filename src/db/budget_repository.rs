use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

use crate::config::DATE_FORMAT;
use crate::error::{Error, Result};
use crate::models::budget::{Budget, NewBudget};

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let amount_str: String = row.get(1)?;
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;

    Ok(Budget {
        category_id: row.get(0)?,
        amount: Decimal::from_str(&amount_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        start_date: NaiveDate::parse_from_str(&start_str, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        end_date: NaiveDate::parse_from_str(&end_str, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        user_id: row.get(4)?,
    })
}

/// Creates a budget row. The range is validated here: an inverted range
/// is rejected instead of silently matching nothing.
pub fn add_budget(conn: &Connection, budget: &NewBudget) -> Result<()> {
    if budget.start_date > budget.end_date {
        return Err(Error::InvalidBudgetRange {
            start: budget.start_date,
            end: budget.end_date,
        });
    }
    conn.execute(
        "INSERT INTO budgets (category_id, amount, start_date, end_date, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            budget.category_id,
            budget.amount.to_string(),
            budget.start_date.to_string(),
            budget.end_date.to_string(),
            budget.user_id,
        ],
    )?;
    Ok(())
}

/// Budgets scoped to one owner, or every budget row when no owner is
/// given.
pub fn budgets_for_user(conn: &Connection, user_id: Option<&str>) -> Result<Vec<Budget>> {
    let mut budgets = Vec::new();
    match user_id {
        Some(user) => {
            let mut stmt = conn.prepare(
                "SELECT category_id, amount, start_date, end_date, user_id
                 FROM budgets WHERE user_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map([user], row_to_budget)?;
            for budget in rows {
                budgets.push(budget?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT category_id, amount, start_date, end_date, user_id
                 FROM budgets ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], row_to_budget)?;
            for budget in rows {
                budgets.push(budget?);
            }
        }
    }
    Ok(budgets)
}
