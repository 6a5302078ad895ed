use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::models::ParticipationModel;
use crate::player::{models::PlayerModel, repository::PlayerRepository};
use crate::season::models::SeasonModel;
use crate::shared::AppError;
use crate::tournament::models::TournamentModel;
use crate::validation::{FieldError, Validate, Validator};

#[derive(Debug, Deserialize)]
pub struct AddParticipationRequest {
    pub player_id: i64,
    pub position: i32,
    pub score: i32,
}

impl Validate for AddParticipationRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check(self.position >= 1, "position", "position must be at least 1")
            .check(self.score >= 0, "score", "score must not be negative")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateParticipationRequest {
    pub position: Option<i32>,
    pub score: Option<i32>,
}

impl Validate for UpdateParticipationRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check(
                self.position.map_or(true, |p| p >= 1),
                "position",
                "position must be at least 1",
            )
            .check(
                self.score.map_or(true, |s| s >= 0),
                "score",
                "score must not be negative",
            )
            .finish()
    }
}

/// Participation returned from mutations, with everything it points at resolved
#[derive(Debug, Clone, Serialize)]
pub struct ParticipationDetail {
    #[serde(flatten)]
    pub participation: ParticipationModel,
    pub player: Option<PlayerModel>,
    pub tournament: TournamentModel,
    pub season: Option<SeasonModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipationWithPlayer {
    #[serde(flatten)]
    pub participation: ParticipationModel,
    pub player: Option<PlayerModel>,
}

impl ParticipationWithPlayer {
    /// Resolves players in one lookup, keeping the input order
    pub async fn resolve(
        participations: Vec<ParticipationModel>,
        players: &dyn PlayerRepository,
    ) -> Result<Vec<Self>, AppError> {
        let ids: Vec<i64> = participations.iter().map(|p| p.player_id).collect();
        let by_id: HashMap<i64, PlayerModel> = if ids.is_empty() {
            HashMap::new()
        } else {
            players
                .list_by_ids(&ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        Ok(participations
            .into_iter()
            .map(|participation| Self {
                player: by_id.get(&participation.player_id).cloned(),
                participation,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 0, true)]
    #[case(0, 10, false)]
    #[case(3, -1, false)]
    fn add_request_bounds(#[case] position: i32, #[case] score: i32, #[case] valid: bool) {
        let request = AddParticipationRequest {
            player_id: 1,
            position,
            score,
        };
        assert_eq!(request.validate().is_ok(), valid);
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateParticipationRequest::default().validate().is_ok());
    }

    #[test]
    fn update_rejects_zero_position() {
        let request = UpdateParticipationRequest {
            position: Some(0),
            score: None,
        };
        assert_eq!(request.validate().unwrap_err()[0].field, "position");
    }
}
