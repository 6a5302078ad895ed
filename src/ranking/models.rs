use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Derived leaderboard row, keyed by (season_id, player_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RankingModel {
    pub season_id: i64,
    pub player_id: i64,
    pub position: i32,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}
