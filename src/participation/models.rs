use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One player's result in one tournament, keyed by (tournament_id, player_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ParticipationModel {
    pub tournament_id: i64,
    pub player_id: i64,
    pub position: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewParticipation {
    pub tournament_id: i64,
    pub player_id: i64,
    pub position: i32,
    pub score: i32,
}
