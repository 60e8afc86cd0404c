use crate::models::WaitlistRow;
use crate::{Database, DbError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use uuid::Uuid;
use vendra_types::models::WaitlistEntry;

impl Database {
    // -- Waitlist --

    /// Insert a new entry. The database assigns `id` and `created_at`;
    /// a second row with the same email fails with [`DbError::DuplicateEmail`].
    pub fn insert_waitlist_entry(&self, email: &str) -> Result<WaitlistRow, DbError> {
        let row = WaitlistRow {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            // Microsecond precision keeps text ordering equal to insert ordering
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO waitlist (id, email, created_at) VALUES (?1, ?2, ?3)",
                (&row.id, &row.email, &row.created_at),
            )?;
            Ok(())
        })?;

        Ok(row)
    }

    pub fn waitlist_email_exists(&self, email: &str) -> Result<bool, DbError> {
        self.with_conn(|conn| query_email_exists(conn, email))
    }

    pub fn waitlist_count(&self) -> Result<u64, DbError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM waitlist", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

impl WaitlistRow {
    pub fn into_entry(self) -> Result<WaitlistEntry, DbError> {
        let id: Uuid = self
            .id
            .parse()
            .map_err(|e| anyhow::anyhow!("Corrupt waitlist id '{}': {}", self.id, e))?;
        let created_at = self
            .created_at
            .parse::<DateTime<Utc>>()
            .map_err(|e| anyhow::anyhow!("Corrupt created_at '{}' on entry '{}': {}", self.created_at, self.id, e))?;

        Ok(WaitlistEntry {
            id,
            email: self.email,
            created_at,
        })
    }
}

fn query_email_exists(conn: &Connection, email: &str) -> Result<bool, DbError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM waitlist WHERE email = ?1)",
        [email],
        |row| row.get(0),
    )?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_count() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.waitlist_count().unwrap(), 0);

        let row = db.insert_waitlist_entry("a@b.co").unwrap();
        assert_eq!(row.email, "a@b.co");
        db.insert_waitlist_entry("c@d.co").unwrap();

        assert_eq!(db.waitlist_count().unwrap(), 2);
    }

    #[test]
    fn duplicate_email_is_a_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        db.insert_waitlist_entry("a@b.co").unwrap();

        let err = db.insert_waitlist_entry("a@b.co").unwrap_err();
        assert!(matches!(err, DbError::DuplicateEmail));
        assert_eq!(db.waitlist_count().unwrap(), 1);
    }

    #[test]
    fn email_lookup_is_case_sensitive() {
        let db = Database::open_in_memory().unwrap();
        db.insert_waitlist_entry("Bob@gmail.com").unwrap();

        assert!(db.waitlist_email_exists("Bob@gmail.com").unwrap());
        assert!(!db.waitlist_email_exists("bob@gmail.com").unwrap());
        // Different case is a different entry
        db.insert_waitlist_entry("bob@gmail.com").unwrap();
    }

    #[test]
    fn row_converts_to_entry() {
        let db = Database::open_in_memory().unwrap();
        let row = db.insert_waitlist_entry("a@b.co").unwrap();
        let id = row.id.clone();

        let entry = row.into_entry().unwrap();
        assert_eq!(entry.id.to_string(), id);
        assert_eq!(entry.email, "a@b.co");
    }

    #[test]
    fn corrupt_row_is_a_backend_error() {
        let row = WaitlistRow {
            id: "not-a-uuid".into(),
            email: "a@b.co".into(),
            created_at: "2025-01-01T00:00:00Z".into(),
        };
        assert!(matches!(row.into_entry(), Err(DbError::Backend(_))));
    }
}
