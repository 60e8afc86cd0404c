use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (waitlist)");
        conn.execute_batch(
            "
            CREATE TABLE waitlist (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_waitlist_created
                ON waitlist(created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
