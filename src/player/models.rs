use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::stats::PlayerStatistics;

/// League member. The four aggregate counters are derived from participations
/// and only ever written through `PlayerRepository::update_statistics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PlayerModel {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub active: bool,
    pub total_tournaments: i32,
    pub total_score: i64,
    pub best_position: Option<i32>,
    pub wins: i32,
    pub created_at: DateTime<Utc>,
}

impl PlayerModel {
    pub fn statistics(&self) -> PlayerStatistics {
        PlayerStatistics {
            total_tournaments: self.total_tournaments,
            total_score: self.total_score,
            best_position: self.best_position,
            wins: self.wins,
        }
    }
}

/// Profile fields accepted on creation; counters start at zero
#[derive(Debug, Clone, Default)]
pub struct NewPlayer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub active: bool,
}
