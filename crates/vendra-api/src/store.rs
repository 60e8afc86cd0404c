use vendra_db::{Database, DbError};
use vendra_types::models::WaitlistEntry;

/// Persistence used by the signup workflow.
///
/// Calls block; async callers run them through `spawn_blocking`.
/// Implementations must enforce email uniqueness and report a violation
/// as [`DbError::DuplicateEmail`].
pub trait WaitlistStore: Send + Sync + 'static {
    fn insert(&self, email: &str) -> Result<WaitlistEntry, DbError>;

    fn exists_by_email(&self, email: &str) -> Result<bool, DbError>;

    fn count(&self) -> Result<u64, DbError>;
}

impl WaitlistStore for Database {
    fn insert(&self, email: &str) -> Result<WaitlistEntry, DbError> {
        self.insert_waitlist_entry(email)?.into_entry()
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, DbError> {
        self.waitlist_email_exists(email)
    }

    fn count(&self) -> Result<u64, DbError> {
        self.waitlist_count()
    }
}
