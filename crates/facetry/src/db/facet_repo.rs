//! Facet repository for the `recommended_facets` table.

use rusqlite::{params, Row};

use super::{from_json, to_json, Database, DatabaseError};
use crate::facets::{Priority, RecommendedFacet};

fn from_row(row: &Row<'_>) -> Result<(RecommendedFacet, String), rusqlite::Error> {
    let priority: String = row.get("priority")?;
    let urls: String = row.get("source_urls")?;
    Ok((
        RecommendedFacet {
            id: row.get("id")?,
            job_id: row.get("job_id")?,
            category_id: row.get("category_id")?,
            facet_name: row.get("facet_name")?,
            possible_values: row.get("possible_values")?,
            filling_percentage: row.get("filling_percentage")?,
            priority: Priority::parse_lenient(&priority),
            confidence_score: row.get("confidence_score")?,
            num_sources: row.get("num_sources")?,
            source_urls: Vec::new(),
            sort_order: row.get("sort_order")?,
        },
        urls,
    ))
}

/// Stores a ranked batch atomically. Either every row lands or none does.
pub fn insert_all(db: &Database, facets: &[RecommendedFacet]) -> Result<usize, DatabaseError> {
    let encoded = facets
        .iter()
        .map(|f| to_json("source_urls", &f.source_urls))
        .collect::<Result<Vec<_>, _>>()?;

    db.with_tx(|tx| {
        let mut stmt = tx.prepare(
            "INSERT INTO recommended_facets (
                id, job_id, category_id, facet_name, possible_values, filling_percentage,
                priority, confidence_score, num_sources, source_urls, sort_order
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for (facet, urls) in facets.iter().zip(&encoded) {
            stmt.execute(params![
                facet.id,
                facet.job_id,
                facet.category_id,
                facet.facet_name,
                facet.possible_values,
                facet.filling_percentage,
                facet.priority.as_str(),
                facet.confidence_score,
                facet.num_sources,
                urls,
                facet.sort_order,
            ])?;
        }
        Ok(facets.len())
    })
}

/// Facets of a job in rank order.
pub fn list_for_job(db: &Database, job_id: &str) -> Result<Vec<RecommendedFacet>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM recommended_facets WHERE job_id = ?1 ORDER BY sort_order ASC",
        )?;
        let rows = stmt
            .query_map(params![job_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    rows.into_iter()
        .map(|(mut facet, urls)| {
            facet.source_urls = from_json("source_urls", &urls)?;
            Ok::<_, DatabaseError>(facet)
        })
        .collect()
}

pub fn count_for_job(db: &Database, job_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM recommended_facets WHERE job_id = ?1",
            params![job_id],
            |r| r.get(0),
        )?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::job_repo;
    use crate::facets::{rank, FacetDraft};
    use crate::generation::{GenerationJob, JobStatus};

    fn draft(name: &str, priority: Priority, confidence: u8) -> FacetDraft {
        FacetDraft {
            category_id: "cat-1".to_string(),
            facet_name: name.to_string(),
            possible_values: "A, B".to_string(),
            filling_percentage: 50.0,
            priority,
            confidence_score: confidence,
            num_sources: 1,
            source_urls: vec!["https://example.com/a".to_string()],
        }
    }

    fn seeded_job(db: &Database) -> GenerationJob {
        let job = GenerationJob::new("c1", "u1", vec!["cat-1".into()], vec![], JobStatus::Processing);
        job_repo::insert(db, &job).unwrap();
        job
    }

    #[test]
    fn test_insert_and_list_in_rank_order() {
        let db = Database::open_in_memory().unwrap();
        let job = seeded_job(&db);
        let ranked = rank(
            &job.id,
            vec![
                draft("Low one", Priority::Low, 9),
                draft("High one", Priority::High, 3),
                draft("Medium one", Priority::Medium, 7),
            ],
        );
        assert_eq!(insert_all(&db, &ranked).unwrap(), 3);

        let stored = list_for_job(&db, &job.id).unwrap();
        let names: Vec<_> = stored.iter().map(|f| f.facet_name.as_str()).collect();
        assert_eq!(names, vec!["High one", "Medium one", "Low one"]);
        assert_eq!(stored[0].source_urls, vec!["https://example.com/a"]);
        assert_eq!(count_for_job(&db, &job.id).unwrap(), 3);
    }

    #[test]
    fn test_batch_is_atomic() {
        let db = Database::open_in_memory().unwrap();
        let job = seeded_job(&db);
        let mut ranked = rank(&job.id, vec![draft("A", Priority::High, 5), draft("B", Priority::Low, 5)]);
        // Second row references a job that does not exist.
        ranked[1].job_id = "missing".to_string();

        assert!(insert_all(&db, &ranked).is_err());
        assert_eq!(count_for_job(&db, &job.id).unwrap(), 0);
    }
}
