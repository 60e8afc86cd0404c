/// Database row types, mapped directly from SQLite rows.
/// Kept apart from vendra-types so the DB layer stays independent.

#[derive(Debug)]
pub struct WaitlistRow {
    pub id: String,
    pub email: String,
    pub created_at: String,
}
