//! Export audit trail. Rows are only ever appended.

use rusqlite::{params, Row};

use super::{from_json, to_json, Database, DatabaseError};
use crate::export::ExportRecord;

fn from_row(row: &Row<'_>) -> Result<(ExportRecord, String), rusqlite::Error> {
    let ids: String = row.get("category_ids")?;
    Ok((
        ExportRecord {
            id: row.get("id")?,
            job_id: row.get("job_id")?,
            client_id: row.get("client_id")?,
            category_ids: Vec::new(),
            format: row.get("format")?,
            exported_by: row.get("exported_by")?,
            created_at: row.get("created_at")?,
        },
        ids,
    ))
}

pub fn append(db: &Database, record: &ExportRecord) -> Result<(), DatabaseError> {
    let ids = to_json("category_ids", &record.category_ids)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO export_history (id, job_id, client_id, category_ids, format, exported_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.job_id,
                record.client_id,
                ids,
                record.format,
                record.exported_by,
                record.created_at,
            ],
        )?;
        Ok(())
    })
}

/// Export history of a job, oldest first.
pub fn list_for_job(db: &Database, job_id: &str) -> Result<Vec<ExportRecord>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM export_history WHERE job_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt
            .query_map(params![job_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    rows.into_iter()
        .map(|(mut record, ids)| {
            record.category_ids = from_json("category_ids", &ids)?;
            Ok::<_, DatabaseError>(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_list() {
        let db = Database::open_in_memory().unwrap();
        let first = ExportRecord::new("j1", "c1", vec!["a".into()], "u1");
        let second = ExportRecord::new("j1", "c1", vec!["a".into(), "b".into()], "u1");
        append(&db, &first).unwrap();
        append(&db, &second).unwrap();
        append(&db, &ExportRecord::new("j2", "c1", vec![], "u1")).unwrap();

        let history = list_for_job(&db, "j1").unwrap();
        assert_eq!(history, vec![first, second]);
    }
}
