use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    models::{NewParticipation, ParticipationModel},
    repository::ParticipationRepository,
    types::{
        AddParticipationRequest, ParticipationDetail, ParticipationWithPlayer,
        UpdateParticipationRequest,
    },
};
use crate::player::{repository::PlayerRepository, service::PlayerService};
use crate::ranking::service::RankingService;
use crate::season::repository::SeasonRepository;
use crate::shared::{AppError, KeyedLocks};
use crate::tournament::{models::TournamentModel, repository::TournamentRepository};

/// Records tournament results and keeps the derived data in step.
///
/// Every mutation runs persist, then season ranking recompute, then player
/// statistics recompute, while holding the season lock. A failed recompute is
/// reported but the persisted change stays.
pub struct ParticipationService {
    participations: Arc<dyn ParticipationRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    players: Arc<dyn PlayerRepository>,
    seasons: Arc<dyn SeasonRepository>,
    ranking_service: Arc<RankingService>,
    player_service: Arc<PlayerService>,
    season_locks: KeyedLocks,
}

impl ParticipationService {
    pub fn new(
        participations: Arc<dyn ParticipationRepository>,
        tournaments: Arc<dyn TournamentRepository>,
        players: Arc<dyn PlayerRepository>,
        seasons: Arc<dyn SeasonRepository>,
        ranking_service: Arc<RankingService>,
        player_service: Arc<PlayerService>,
        season_locks: KeyedLocks,
    ) -> Self {
        Self {
            participations,
            tournaments,
            players,
            seasons,
            ranking_service,
            player_service,
            season_locks,
        }
    }

    async fn require_tournament(&self, tournament_id: i64) -> Result<TournamentModel, AppError> {
        self.tournaments
            .get(tournament_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tournament not found".to_string()))
    }

    #[instrument(skip(self, request), fields(player_id = request.player_id))]
    pub async fn add(
        &self,
        tournament_id: i64,
        request: AddParticipationRequest,
    ) -> Result<ParticipationDetail, AppError> {
        let tournament = self.require_tournament(tournament_id).await?;

        let lock = self.season_locks.lock_for(tournament.season_id).await;
        let _guard = lock.lock().await;

        if self.players.get(request.player_id).await?.is_none() {
            return Err(AppError::NotFound("Player not found".to_string()));
        }
        if self
            .participations
            .get(tournament_id, request.player_id)
            .await?
            .is_some()
        {
            warn!("Player already registered in tournament");
            return Err(AppError::Conflict(
                "Player is already registered in this tournament".to_string(),
            ));
        }

        let participation = self
            .participations
            .create(&NewParticipation {
                tournament_id,
                player_id: request.player_id,
                position: request.position,
                score: request.score,
            })
            .await?;
        info!(position = participation.position, score = participation.score, "Participation added");

        self.refresh_derived(tournament.season_id, participation.player_id)
            .await?;
        self.detail(participation, tournament).await
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        tournament_id: i64,
        player_id: i64,
        request: UpdateParticipationRequest,
    ) -> Result<ParticipationDetail, AppError> {
        let tournament = self.require_tournament(tournament_id).await?;

        let lock = self.season_locks.lock_for(tournament.season_id).await;
        let _guard = lock.lock().await;

        let mut participation = self
            .participations
            .get(tournament_id, player_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Participation not found".to_string()))?;

        if let Some(position) = request.position {
            participation.position = position;
        }
        if let Some(score) = request.score {
            participation.score = score;
        }

        let participation = self.participations.update(&participation).await?;
        info!(position = participation.position, score = participation.score, "Participation updated");

        self.refresh_derived(tournament.season_id, player_id).await?;
        self.detail(participation, tournament).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, tournament_id: i64, player_id: i64) -> Result<(), AppError> {
        let tournament = self.require_tournament(tournament_id).await?;

        let lock = self.season_locks.lock_for(tournament.season_id).await;
        let _guard = lock.lock().await;

        self.participations.delete(tournament_id, player_id).await?;
        info!("Participation removed");

        self.refresh_derived(tournament.season_id, player_id).await
    }

    /// Participations of a tournament by finishing position, with players
    #[instrument(skip(self))]
    pub async fn list(&self, tournament_id: i64) -> Result<Vec<ParticipationWithPlayer>, AppError> {
        self.require_tournament(tournament_id).await?;
        let participations = self.participations.list_by_tournament(tournament_id).await?;
        ParticipationWithPlayer::resolve(participations, self.players.as_ref()).await
    }

    async fn refresh_derived(&self, season_id: i64, player_id: i64) -> Result<(), AppError> {
        if let Err(err) = self.ranking_service.calculate(season_id).await {
            error!(season_id, error = %err, "Ranking recompute failed; participation change kept");
            return Err(err);
        }
        if let Err(err) = self.player_service.update_statistics(player_id).await {
            error!(player_id, error = %err, "Statistics recompute failed; participation change kept");
            return Err(err);
        }
        Ok(())
    }

    async fn detail(
        &self,
        participation: ParticipationModel,
        tournament: TournamentModel,
    ) -> Result<ParticipationDetail, AppError> {
        let player = self.players.get(participation.player_id).await?;
        let season = self.seasons.get(tournament.season_id).await?;
        Ok(ParticipationDetail {
            participation,
            player,
            tournament,
            season,
        })
    }
}
