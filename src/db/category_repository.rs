use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::category::Category;

/// Case-insensitive lookup by display name. SQLite's LOWER folds ASCII
/// only, which keeps the comparison locale-invariant.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let mut stmt = conn
        .prepare("SELECT category_id, name FROM categories WHERE LOWER(name) = LOWER(?1)")?;
    let category = stmt
        .query_row([name], |row| {
            Ok(Category {
                category_id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?;
    Ok(category)
}

pub fn create_category(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

/// Resolves a category id by name, creating the category on first use.
/// Repeated calls with any casing of the same name return the same id.
pub fn get_or_create(conn: &Connection, name: &str) -> Result<i64> {
    if let Some(category) = find_by_name(conn, name)? {
        return Ok(category.category_id);
    }
    create_category(conn, name)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT category_id, name FROM categories ORDER BY category_id")?;
    let iter = stmt.query_map([], |row| {
        Ok(Category {
            category_id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut categories = Vec::new();
    for category in iter {
        categories.push(category?);
    }
    Ok(categories)
}
