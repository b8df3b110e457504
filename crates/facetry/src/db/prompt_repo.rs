//! Prompt template repository, covering `prompt_templates` and the per-client
//! `prompt_overrides` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{from_json, now_rfc3339, to_json, Database, DatabaseError};
use crate::prompts::{PromptOverride, PromptTemplate, ResolvedPrompt};

fn template_from_row(row: &Row<'_>) -> Result<(PromptTemplate, String), rusqlite::Error> {
    let metadata: String = row.get("metadata")?;
    Ok((
        PromptTemplate {
            id: row.get("id")?,
            name: row.get("name")?,
            level: row.get("level")?,
            template: row.get("template")?,
            metadata: serde_json::Value::Null,
            is_active: row.get("is_active")?,
        },
        metadata,
    ))
}

fn decode_template(raw: (PromptTemplate, String)) -> Result<PromptTemplate, DatabaseError> {
    let (mut template, metadata) = raw;
    template.metadata = from_json("metadata", &metadata)?;
    Ok(template)
}

fn override_from_row(row: &Row<'_>) -> Result<PromptOverride, rusqlite::Error> {
    Ok(PromptOverride {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        prompt_template_id: row.get("prompt_template_id")?,
        template_content: row.get("template_content")?,
        version: row.get("version")?,
        is_active: row.get("is_active")?,
    })
}

pub fn insert(db: &Database, template: &PromptTemplate) -> Result<(), DatabaseError> {
    let metadata = to_json("metadata", &template.metadata)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO prompt_templates (id, name, level, template, metadata, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                template.id,
                template.name,
                template.level,
                template.template,
                metadata,
                template.is_active,
                now_rfc3339(),
            ],
        )?;
        Ok(())
    })
}

/// Lists active templates ordered by name.
pub fn list_active(db: &Database) -> Result<Vec<PromptTemplate>, DatabaseError> {
    let raw = db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM prompt_templates WHERE is_active = 1 ORDER BY name ASC")?;
        let rows = stmt
            .query_map([], template_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    raw.into_iter().map(decode_template).collect()
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<PromptTemplate>, DatabaseError> {
    let raw = db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT * FROM prompt_templates WHERE id = ?1",
                params![id],
                template_from_row,
            )
            .optional()?)
    })?;
    raw.map(decode_template).transpose()
}

pub fn find_by_name(db: &Database, name: &str) -> Result<Option<PromptTemplate>, DatabaseError> {
    let raw = db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT * FROM prompt_templates WHERE name = ?1 AND is_active = 1",
                params![name],
                template_from_row,
            )
            .optional()?)
    })?;
    raw.map(decode_template).transpose()
}

/// Returns the client's active override for a template, if any.
pub fn active_override(
    db: &Database,
    client_id: &str,
    template_id: &str,
) -> Result<Option<PromptOverride>, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT * FROM prompt_overrides
                 WHERE client_id = ?1 AND prompt_template_id = ?2 AND is_active = 1",
                params![client_id, template_id],
                override_from_row,
            )
            .optional()?)
    })
}

/// Stores new override content for a client, retiring the previous active
/// override. The new row's version is one above the highest seen so far.
pub fn upsert_override(
    db: &Database,
    client_id: &str,
    template_id: &str,
    content: &str,
) -> Result<PromptOverride, DatabaseError> {
    db.with_tx(|tx| {
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM prompt_templates WHERE id = ?1)",
            params![template_id],
            |r| r.get(0),
        )?;
        if !exists {
            return Err(DatabaseError::not_found("PromptTemplate", template_id));
        }

        let current: u32 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM prompt_overrides
             WHERE client_id = ?1 AND prompt_template_id = ?2",
            params![client_id, template_id],
            |r| r.get(0),
        )?;
        tx.execute(
            "UPDATE prompt_overrides SET is_active = 0
             WHERE client_id = ?1 AND prompt_template_id = ?2 AND is_active = 1",
            params![client_id, template_id],
        )?;

        let created = PromptOverride {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            prompt_template_id: template_id.to_string(),
            template_content: content.to_string(),
            version: current + 1,
            is_active: true,
        };
        tx.execute(
            "INSERT INTO prompt_overrides
                (id, client_id, prompt_template_id, template_content, version, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                created.id,
                created.client_id,
                created.prompt_template_id,
                created.template_content,
                created.version,
                now_rfc3339(),
            ],
        )?;
        log::debug!(
            "Override v{} stored for template {} (client {})",
            created.version,
            template_id,
            client_id
        );
        Ok(created)
    })
}

/// Resolves the content a client should send for a template.
pub fn resolve(
    db: &Database,
    client_id: &str,
    template_id: &str,
) -> Result<ResolvedPrompt, DatabaseError> {
    let template = find_by_id(db, template_id)?
        .ok_or_else(|| DatabaseError::not_found("PromptTemplate", template_id))?;
    let active = active_override(db, client_id, template_id)?;
    Ok(ResolvedPrompt::resolve(template, active.as_ref()))
}
