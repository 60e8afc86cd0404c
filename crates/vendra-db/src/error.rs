use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The unique index on `waitlist.email` rejected the row.
    #[error("email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                DbError::DuplicateEmail
            }
            _ => DbError::Backend(err.into()),
        }
    }
}
