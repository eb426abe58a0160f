use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                    // database-assigned user ID
    pub username: String,           // unique login name
    pub password_hash: String,      // Argon2 PHC string, never sent to clients
    pub created_at: OffsetDateTime, // registration timestamp
}
