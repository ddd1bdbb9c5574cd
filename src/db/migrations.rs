use rusqlite::Connection;
use tracing::info;

use super::schema::{create_schema, CREATE_MIGRATIONS, SCHEMA_VERSION};
use crate::models::EntityKind;
use crate::utils::{AppError, AppResult};

/// Kör alla migrationer
pub fn run_migrations(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(CREATE_MIGRATIONS)
        .map_err(|e| AppError::schema("schema_migrations", e))?;

    let current_version = get_current_version(conn)?;
    info!("Aktuell schemaversion: {}", current_version);

    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    for kind in EntityKind::ALL {
        create_schema(conn, *kind)?;
    }

    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [SCHEMA_VERSION],
    )
    .map_err(|e| AppError::schema("schema_migrations", e))?;

    info!("Schema skapat, version {}", SCHEMA_VERSION);
    Ok(())
}

/// Hämta aktuell schemaversion
pub fn get_current_version(conn: &Connection) -> AppResult<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| AppError::schema("schema_migrations", e))
}
