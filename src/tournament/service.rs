use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewTournament, TournamentModel, MAX_TOURNAMENTS_PER_SEASON},
    repository::TournamentRepository,
    types::{
        CreateTournamentRequest, TournamentDetail, TournamentSummary, TournamentWithSeason,
        UpdateTournamentRequest,
    },
};
use crate::participation::{
    repository::ParticipationRepository, types::ParticipationWithPlayer,
};
use crate::photo::repository::PhotoRepository;
use crate::player::repository::PlayerRepository;
use crate::season::{models::SeasonModel, repository::SeasonRepository};
use crate::shared::{AppError, KeyedLocks};

/// Tournament lifecycle, including the per-season capacity limit
pub struct TournamentService {
    tournaments: Arc<dyn TournamentRepository>,
    seasons: Arc<dyn SeasonRepository>,
    participations: Arc<dyn ParticipationRepository>,
    players: Arc<dyn PlayerRepository>,
    photos: Arc<dyn PhotoRepository>,
    season_locks: KeyedLocks,
}

impl TournamentService {
    pub fn new(
        tournaments: Arc<dyn TournamentRepository>,
        seasons: Arc<dyn SeasonRepository>,
        participations: Arc<dyn ParticipationRepository>,
        players: Arc<dyn PlayerRepository>,
        photos: Arc<dyn PhotoRepository>,
        season_locks: KeyedLocks,
    ) -> Self {
        Self {
            tournaments,
            seasons,
            participations,
            players,
            photos,
            season_locks,
        }
    }

    async fn require(&self, id: i64) -> Result<TournamentModel, AppError> {
        self.tournaments
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tournament not found".to_string()))
    }

    async fn require_season(&self, season_id: i64) -> Result<SeasonModel, AppError> {
        self.seasons
            .get(season_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Season not found".to_string()))
    }

    /// Count check and insert happen under the season lock
    #[instrument(skip(self, request), fields(season_id = request.season_id))]
    pub async fn create(
        &self,
        request: CreateTournamentRequest,
    ) -> Result<TournamentWithSeason, AppError> {
        let season = self.require_season(request.season_id).await?;

        let lock = self.season_locks.lock_for(season.id).await;
        let _guard = lock.lock().await;

        let existing = self.tournaments.count_by_season(season.id).await?;
        if existing >= MAX_TOURNAMENTS_PER_SEASON {
            warn!(existing, "Season tournament limit reached");
            return Err(AppError::CapacityExceeded(format!(
                "A season can have at most {MAX_TOURNAMENTS_PER_SEASON} tournaments"
            )));
        }

        let tournament = self
            .tournaments
            .create(&NewTournament {
                season_id: season.id,
                name: request.name.trim().to_string(),
                date_time: request.date_time,
                location: request.location.trim().to_string(),
                notes: request.notes,
                active: request.active.unwrap_or(true),
            })
            .await?;

        info!(tournament_id = tournament.id, "Tournament created");
        Ok(TournamentWithSeason {
            tournament,
            season: Some(season),
        })
    }

    /// All tournaments, most recent first
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TournamentSummary>, AppError> {
        let tournaments = self.tournaments.list().await?;
        self.summarize(tournaments).await
    }

    /// Tournaments of one season, oldest first
    #[instrument(skip(self))]
    pub async fn list_by_season(&self, season_id: i64) -> Result<Vec<TournamentSummary>, AppError> {
        self.require_season(season_id).await?;
        let tournaments = self.tournaments.list_by_season(season_id).await?;
        self.summarize(tournaments).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<TournamentDetail, AppError> {
        let tournament = self.require(id).await?;
        let season = self.seasons.get(tournament.season_id).await?;
        let participations = self.participations.list_by_tournament(id).await?;
        let participations =
            ParticipationWithPlayer::resolve(participations, self.players.as_ref()).await?;
        let photos = self.photos.list_by_tournament(id).await?;

        Ok(TournamentDetail {
            tournament,
            season,
            participations,
            photos,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateTournamentRequest,
    ) -> Result<TournamentWithSeason, AppError> {
        let mut tournament = self.require(id).await?;

        if let Some(name) = request.name {
            tournament.name = name.trim().to_string();
        }
        if let Some(date_time) = request.date_time {
            tournament.date_time = date_time;
        }
        if let Some(location) = request.location {
            tournament.location = location.trim().to_string();
        }
        if request.notes.is_some() {
            tournament.notes = request.notes;
        }
        if let Some(active) = request.active {
            tournament.active = active;
        }

        let tournament = self.tournaments.update(&tournament).await?;
        let season = self.seasons.get(tournament.season_id).await?;
        info!(tournament_id = id, "Tournament updated");
        Ok(TournamentWithSeason { tournament, season })
    }

    /// Participations and photos are left to the store's cascade rules
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<TournamentModel, AppError> {
        let tournament = self.require(id).await?;
        self.tournaments.delete(id).await?;
        info!(tournament_id = id, season_id = tournament.season_id, "Tournament deleted");
        Ok(tournament)
    }

    async fn summarize(
        &self,
        tournaments: Vec<TournamentModel>,
    ) -> Result<Vec<TournamentSummary>, AppError> {
        let mut season_ids: Vec<i64> = tournaments.iter().map(|t| t.season_id).collect();
        season_ids.sort_unstable();
        season_ids.dedup();
        let seasons: HashMap<i64, SeasonModel> = if season_ids.is_empty() {
            HashMap::new()
        } else {
            self.seasons
                .list_by_ids(&season_ids)
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        };

        let mut summaries = Vec::with_capacity(tournaments.len());
        for tournament in tournaments {
            let participations = self.participations.list_by_tournament(tournament.id).await?;
            summaries.push(TournamentSummary {
                season: seasons.get(&tournament.season_id).cloned(),
                participations: ParticipationWithPlayer::resolve(
                    participations,
                    self.players.as_ref(),
                )
                .await?,
                tournament,
            });
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::models::NewSeason;
    use crate::shared::test_utils::in_memory_state;
    use crate::shared::AppState;
    use chrono::{Duration, Utc};

    async fn season(state: &AppState, year: i32) -> SeasonModel {
        state
            .repositories
            .seasons
            .create(&NewSeason {
                name: format!("Liga {year}"),
                year,
            })
            .await
            .unwrap()
    }

    fn request(season_id: i64, offset_days: i64) -> CreateTournamentRequest {
        CreateTournamentRequest {
            season_id,
            name: format!("Etapa {offset_days}"),
            date_time: Utc::now() + Duration::days(offset_days),
            location: "Clube".to_string(),
            notes: None,
            active: None,
        }
    }

    #[tokio::test]
    async fn test_thirteenth_tournament_exceeds_capacity() {
        let state = in_memory_state();
        let season = season(&state, 2024).await;
        let service = &state.tournament_service;

        for day in 0..12 {
            service.create(request(season.id, day)).await.unwrap();
        }
        let result = service.create(request(season.id, 12)).await;

        assert!(matches!(result, Err(AppError::CapacityExceeded(_))));
        assert_eq!(
            state
                .repositories
                .tournaments
                .count_by_season(season.id)
                .await
                .unwrap(),
            12
        );
    }

    #[tokio::test]
    async fn test_concurrent_creates_respect_capacity() {
        let state = in_memory_state();
        let season = season(&state, 2024).await;

        let mut handles = Vec::new();
        for day in 0..20 {
            let service = state.tournament_service.clone();
            let season_id = season.id;
            handles.push(tokio::spawn(async move {
                service.create(request(season_id, day)).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 12);
    }

    #[tokio::test]
    async fn test_create_in_missing_season() {
        let state = in_memory_state();
        let result = state.tournament_service.create(request(99, 0)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_returns_season_and_defaults_active() {
        let state = in_memory_state();
        let season = season(&state, 2025).await;

        let created = state
            .tournament_service
            .create(request(season.id, 1))
            .await
            .unwrap();
        assert!(created.tournament.active);
        assert_eq!(created.season, Some(season));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let state = in_memory_state();
        let service = &state.tournament_service;
        assert!(matches!(
            service.update(5, UpdateTournamentRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete(5).await, Err(AppError::NotFound(_))));
    }
}
