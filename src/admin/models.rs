use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database model for the admins table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminModel {
    pub id: i64,
    pub name: String,
    pub email: String, // Unique
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt, never leaves the server
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert an admin; id and timestamp come from the store
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
