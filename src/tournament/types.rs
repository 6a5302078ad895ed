use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::TournamentModel;
use crate::participation::types::ParticipationWithPlayer;
use crate::photo::models::PhotoModel;
use crate::season::models::SeasonModel;
use crate::validation::{FieldError, Validate, Validator};

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub season_id: i64,
    pub name: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

impl Validate for CreateTournamentRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .not_blank(Some(self.name.as_str()), "name")
            .not_blank(Some(self.location.as_str()), "location")
            .finish()
    }
}

/// The owning season cannot be changed
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTournamentRequest {
    pub name: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

impl Validate for UpdateTournamentRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .not_blank(self.name.as_deref(), "name")
            .not_blank(self.location.as_deref(), "location")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentWithSeason {
    #[serde(flatten)]
    pub tournament: TournamentModel,
    pub season: Option<SeasonModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentSummary {
    #[serde(flatten)]
    pub tournament: TournamentModel,
    pub season: Option<SeasonModel>,
    pub participations: Vec<ParticipationWithPlayer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: TournamentModel,
    pub season: Option<SeasonModel>,
    pub participations: Vec<ParticipationWithPlayer>,
    pub photos: Vec<PhotoModel>,
}
