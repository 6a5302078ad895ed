use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A season holds at most this many tournaments
pub const MAX_TOURNAMENTS_PER_SEASON: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TournamentModel {
    pub id: i64,
    pub season_id: i64,
    pub name: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTournament {
    pub season_id: i64,
    pub name: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
    pub active: bool,
}
