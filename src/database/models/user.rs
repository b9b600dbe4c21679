use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row from the `users` table. Plots refer to users by `username` only.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
