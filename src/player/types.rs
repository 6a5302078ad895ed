use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::PlayerModel;
use crate::participation::models::ParticipationModel;
use crate::ranking::models::RankingModel;
use crate::season::models::SeasonModel;
use crate::tournament::models::TournamentModel;
use crate::validation::{FieldError, Validate, Validator};

pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Profile fields only; statistic counters sent by clients are ignored
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

fn validate_profile(
    validator: &mut Validator,
    email: Option<&str>,
    phone: Option<&str>,
    nickname: Option<&str>,
    avatar_url: Option<&str>,
    city: Option<&str>,
) -> Result<(), Vec<FieldError>> {
    validator
        .email(email, "email")
        .length(phone, "phone", 10, 20)
        .length(nickname, "nickname", 2, 50)
        .url(avatar_url, "avatar_url")
        .length(city, "city", 2, 100)
        .finish()
}

impl Validate for CreatePlayerRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut validator = Validator::new();
        validator
            .not_blank(Some(self.name.as_str()), "name")
            .length(Some(self.name.trim()), "name", 2, 100);
        validate_profile(
            &mut validator,
            self.email.as_deref(),
            self.phone.as_deref(),
            self.nickname.as_deref(),
            self.avatar_url.as_deref(),
            self.city.as_deref(),
        )
    }
}

impl Validate for UpdatePlayerRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut validator = Validator::new();
        validator
            .not_blank(self.name.as_deref(), "name")
            .length(self.name.as_deref().map(str::trim), "name", 2, 100);
        validate_profile(
            &mut validator,
            self.email.as_deref(),
            self.phone.as_deref(),
            self.nickname.as_deref(),
            self.avatar_url.as_deref(),
            self.city.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn resolve(&self) -> i64 {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSeasonRanking {
    #[serde(flatten)]
    pub ranking: RankingModel,
    pub season: Option<SeasonModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipationHistoryEntry {
    #[serde(flatten)]
    pub participation: ParticipationModel,
    pub tournament: Option<TournamentModel>,
    pub season: Option<SeasonModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub player: PlayerModel,
    pub rankings: Vec<PlayerSeasonRanking>,
    pub participations: Vec<ParticipationHistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerWithStats {
    #[serde(flatten)]
    pub player: PlayerModel,
    pub participation_count: usize,
    pub ranking_count: usize,
    pub latest_ranking: Option<PlayerSeasonRanking>,
}
