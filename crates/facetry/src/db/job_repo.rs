//! Queries over the `generation_jobs` table, including status transitions.

use rusqlite::{params, Row};

use super::{from_json, now_rfc3339, to_json, Database, DatabaseError};
use crate::generation::{GenerationJob, JobStatus};

/// Raw row; JSON and enum columns are decoded outside the rusqlite closure
/// so their errors keep their own variants.
struct JobRow {
    id: String,
    client_id: String,
    created_by: String,
    name: Option<String>,
    category_ids: String,
    selected_prompts: String,
    status: String,
    total_categories: u32,
    processed_categories: u32,
    progress: u8,
    metadata: String,
    error: Option<String>,
    created_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

fn from_row(row: &Row<'_>) -> Result<JobRow, rusqlite::Error> {
    Ok(JobRow {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        created_by: row.get("created_by")?,
        name: row.get("name")?,
        category_ids: row.get("category_ids")?,
        selected_prompts: row.get("selected_prompts")?,
        status: row.get("status")?,
        total_categories: row.get("total_categories")?,
        processed_categories: row.get("processed_categories")?,
        progress: row.get("progress")?,
        metadata: row.get("metadata")?,
        error: row.get("error")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        completed_at: row.get("completed_at")?,
    })
}

fn decode(row: JobRow) -> Result<GenerationJob, DatabaseError> {
    let status = row
        .status
        .parse::<JobStatus>()
        .map_err(|value| DatabaseError::UnknownValue {
            kind: "job status",
            value,
        })?;
    Ok(GenerationJob {
        id: row.id,
        client_id: row.client_id,
        created_by: row.created_by,
        name: row.name,
        category_ids: from_json("category_ids", &row.category_ids)?,
        selected_prompts: from_json("selected_prompts", &row.selected_prompts)?,
        status,
        total_categories: row.total_categories,
        processed_categories: row.processed_categories,
        progress: row.progress,
        metadata: from_json("metadata", &row.metadata)?,
        error: row.error,
        created_at: row.created_at,
        updated_at: row.updated_at,
        completed_at: row.completed_at,
    })
}

fn query(
    db: &Database,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<GenerationJob>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(args, from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    rows.into_iter().map(decode).collect()
}

/// Inserts a new job row as given.
pub fn insert(db: &Database, job: &GenerationJob) -> Result<(), DatabaseError> {
    let category_ids = to_json("category_ids", &job.category_ids)?;
    let selected_prompts = to_json("selected_prompts", &job.selected_prompts)?;
    let metadata = to_json("metadata", &job.metadata)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO generation_jobs (
                id, client_id, created_by, name, category_ids, selected_prompts,
                status, total_categories, processed_categories, progress,
                metadata, error, created_at, updated_at, completed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                job.id,
                job.client_id,
                job.created_by,
                job.name,
                category_ids,
                selected_prompts,
                job.status.as_str(),
                job.total_categories,
                job.processed_categories,
                job.progress,
                metadata,
                job.error,
                job.created_at,
                job.updated_at,
                job.completed_at,
            ],
        )?;
        log::debug!("Inserted job {} ({})", job.id, job.status);
        Ok(())
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<GenerationJob>, DatabaseError> {
    Ok(query(db, "SELECT * FROM generation_jobs WHERE id = ?1", &[&id])?
        .into_iter()
        .next())
}

/// Lists a client's jobs, newest first.
pub fn list_for_client(
    db: &Database,
    client_id: &str,
    limit: u32,
) -> Result<Vec<GenerationJob>, DatabaseError> {
    query(
        db,
        "SELECT * FROM generation_jobs WHERE client_id = ?1
         ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        &[&client_id, &limit],
    )
}

/// The `limit` most recent completed jobs of a client, newest first.
pub fn recent_completed(
    db: &Database,
    client_id: &str,
    limit: u32,
) -> Result<Vec<GenerationJob>, DatabaseError> {
    query(
        db,
        "SELECT * FROM generation_jobs WHERE client_id = ?1 AND status = 'completed'
         ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        &[&client_id, &limit],
    )
}

fn update(db: &Database, id: &str, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(sql, args)?;
        if changed == 0 {
            return Err(DatabaseError::not_found("GenerationJob", id));
        }
        Ok(())
    })
}

pub fn update_status(db: &Database, id: &str, status: JobStatus) -> Result<(), DatabaseError> {
    update(
        db,
        id,
        "UPDATE generation_jobs SET status = ?2, updated_at = ?3 WHERE id = ?1",
        &[&id, &status.as_str(), &now_rfc3339()],
    )
}

/// Marks a job completed with every category processed.
pub fn mark_completed(db: &Database, id: &str, processed: u32) -> Result<(), DatabaseError> {
    let now = now_rfc3339();
    update(
        db,
        id,
        "UPDATE generation_jobs
         SET status = 'completed', progress = 100, processed_categories = ?2,
             error = NULL, updated_at = ?3, completed_at = ?3
         WHERE id = ?1",
        &[&id, &processed, &now],
    )?;
    log::info!("Job {} completed", id);
    Ok(())
}

pub fn mark_failed(db: &Database, id: &str, error: &str) -> Result<(), DatabaseError> {
    let now = now_rfc3339();
    update(
        db,
        id,
        "UPDATE generation_jobs
         SET status = 'failed', error = ?2, updated_at = ?3, completed_at = ?3
         WHERE id = ?1",
        &[&id, &error, &now],
    )?;
    log::warn!("Job {} failed: {}", id, error);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(client: &str, status: JobStatus) -> GenerationJob {
        GenerationJob::new(
            client,
            "u1",
            vec!["cat-b".into(), "cat-a".into()],
            vec!["p1".into()],
            status,
        )
    }

    #[test]
    fn test_insert_and_find() {
        let db = Database::open_in_memory().unwrap();
        let j = job("c1", JobStatus::Processing)
            .with_name("Spring range")
            .with_metadata(serde_json::json!({"output_format": {"columns": ["X"]}}));
        insert(&db, &j).unwrap();

        let found = find_by_id(&db, &j.id).unwrap().unwrap();
        assert_eq!(found, j);
        assert!(find_by_id(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_mark_completed_and_failed() {
        let db = Database::open_in_memory().unwrap();
        let ok = job("c1", JobStatus::Processing);
        let bad = job("c1", JobStatus::Processing);
        insert(&db, &ok).unwrap();
        insert(&db, &bad).unwrap();

        mark_completed(&db, &ok.id, 2).unwrap();
        mark_failed(&db, &bad.id, "boom").unwrap();

        let ok = find_by_id(&db, &ok.id).unwrap().unwrap();
        assert_eq!(ok.status, JobStatus::Completed);
        assert_eq!(ok.progress, 100);
        assert_eq!(ok.processed_categories, 2);
        assert!(ok.completed_at.is_some());

        let bad = find_by_id(&db, &bad.id).unwrap().unwrap();
        assert_eq!(bad.status, JobStatus::Failed);
        assert_eq!(bad.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_update_missing_job() {
        let db = Database::open_in_memory().unwrap();
        let err = update_status(&db, "nope", JobStatus::Failed).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn test_recent_completed_filters_and_limits() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..3 {
            insert(&db, &job("c1", JobStatus::Completed)).unwrap();
        }
        insert(&db, &job("c1", JobStatus::Failed)).unwrap();
        insert(&db, &job("c2", JobStatus::Completed)).unwrap();

        assert_eq!(recent_completed(&db, "c1", 20).unwrap().len(), 3);
        assert_eq!(recent_completed(&db, "c1", 2).unwrap().len(), 2);
        assert_eq!(list_for_client(&db, "c1", 50).unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_status_is_reported() {
        let db = Database::open_in_memory().unwrap();
        let j = job("c1", JobStatus::Pending);
        insert(&db, &j).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE generation_jobs SET status = 'weird'", [])?;
            Ok(())
        })
        .unwrap();
        let err = find_by_id(&db, &j.id).unwrap_err();
        assert!(matches!(err, DatabaseError::UnknownValue { .. }));
    }
}
