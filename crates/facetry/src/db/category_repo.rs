//! Storage for the `categories` table.

use rusqlite::{params, Row};

use super::{now_rfc3339, Database, DatabaseError};
use crate::catalog::Category;

fn from_row(row: &Row<'_>) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        category_path: row.get("category_path")?,
        level: row.get("level")?,
        name: row.get("name")?,
        is_visible: row.get("is_visible")?,
    })
}

/// Inserts a new category. Fails if the client already has the same path.
pub fn insert(db: &Database, category: &Category) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO categories (id, client_id, category_path, level, name, is_visible, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                category.id,
                category.client_id,
                category.category_path,
                category.level,
                category.name,
                category.is_visible,
                now_rfc3339(),
            ],
        )?;
        Ok(())
    })
}

/// Loads every category of a client, ordered by path.
pub fn list_for_client(db: &Database, client_id: &str) -> Result<Vec<Category>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM categories WHERE client_id = ?1 ORDER BY category_path ASC",
        )?;
        let rows = stmt
            .query_map(params![client_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Loads the categories of a client that are not soft-hidden.
pub fn list_visible(db: &Database, client_id: &str) -> Result<Vec<Category>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM categories WHERE client_id = ?1 AND is_visible = 1
             ORDER BY category_path ASC",
        )?;
        let rows = stmt
            .query_map(params![client_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Finds a category by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Category>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM categories WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Soft-hides or re-shows a category of the given client. Another client's
/// category is reported as not found.
pub fn set_visibility(
    db: &Database,
    client_id: &str,
    id: &str,
    visible: bool,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE categories SET is_visible = ?2 WHERE id = ?1 AND client_id = ?3",
            params![id, visible, client_id],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("Category", id));
        }
        Ok(())
    })
}

/// Counts categories of a client.
pub fn count_for_client(db: &Database, client_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE client_id = ?1",
            params![client_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
