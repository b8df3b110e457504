//! Schema versioning.
//!
//! `_migrations` records the highest applied version. Steps above it run in
//! order; a column addition is tolerated when the column is already there.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    kind: MigrationKind,
}

enum MigrationKind {
    Standard,
    /// Skipped when `table` already has `column`.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_categories_table",
        sql: include_str!("sql/001_create_categories.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 2,
        description: "create_prompt_tables",
        sql: include_str!("sql/002_create_prompts.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 3,
        description: "create_selection_queues_table",
        sql: include_str!("sql/003_create_selection_queues.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 4,
        description: "create_generation_jobs_table",
        sql: include_str!("sql/004_create_generation_jobs.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 5,
        description: "create_recommended_facets_table",
        sql: include_str!("sql/005_create_recommended_facets.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 6,
        description: "create_export_history_table",
        sql: include_str!("sql/006_create_export_history.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 7,
        description: "add_metadata_to_generation_jobs",
        sql: include_str!("sql/007_add_metadata_to_jobs.sql"),
        kind: MigrationKind::AddColumn {
            table: "generation_jobs",
            column: "metadata",
        },
    },
];

/// Applies every step newer than the recorded version.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        log::info!("Applying schema v{} ({})", migration.version, migration.description);

        let needed = match &migration.kind {
            MigrationKind::Standard => true,
            MigrationKind::AddColumn { table, column } => !column_exists(conn, table, column)?,
        };

        if needed {
            conn.execute_batch(migration.sql)
                .map_err(|e| DatabaseError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })?;
        } else {
            log::debug!("Schema v{} already present, recording only", migration.version);
        }

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    let safe = !table.is_empty() && table.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !safe {
        return Err(DatabaseError::Migration {
            version: 0,
            reason: format!("refusing table identifier '{}'", table),
        });
    }
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
