//! Persisted selection queues, one row per user.

use rusqlite::params;

use super::{from_json, now_rfc3339, to_json, Database, DatabaseError};

/// Loads a user's stored queue. Users with no row get an empty list.
pub fn load(db: &Database, user_id: &str) -> Result<Vec<String>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT category_ids FROM selection_queues WHERE user_id = ?1")?;
        let mut rows = stmt.query_map(params![user_id], |r| r.get::<_, String>(0))?;
        match rows.next() {
            Some(raw) => from_json("category_ids", &raw?),
            None => Ok(Vec::new()),
        }
    })
}

/// Replaces a user's stored queue with `ids`.
pub fn upsert(db: &Database, user_id: &str, ids: &[String]) -> Result<(), DatabaseError> {
    let encoded = to_json("category_ids", &ids)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO selection_queues (user_id, category_ids, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                category_ids = excluded.category_ids,
                updated_at = excluded.updated_at",
            params![user_id, encoded, now_rfc3339()],
        )?;
        Ok(())
    })
}
