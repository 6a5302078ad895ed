use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{NewSeason, SeasonModel},
    repository::SeasonRepository,
    types::{CreateSeasonRequest, SeasonOverview, UpdateSeasonRequest},
};
use crate::ranking::{service::RankingService, RankingEntry};
use crate::shared::{AppError, KeyedLocks};
use crate::tournament::repository::TournamentRepository;

/// Leaderboard size shown in season listings
pub const TOP_RANKING_SIZE: usize = 10;

pub struct SeasonService {
    seasons: Arc<dyn SeasonRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    ranking_service: Arc<RankingService>,
    season_locks: KeyedLocks,
}

impl SeasonService {
    pub fn new(
        seasons: Arc<dyn SeasonRepository>,
        tournaments: Arc<dyn TournamentRepository>,
        ranking_service: Arc<RankingService>,
        season_locks: KeyedLocks,
    ) -> Self {
        Self {
            seasons,
            tournaments,
            ranking_service,
            season_locks,
        }
    }

    async fn require(&self, id: i64) -> Result<SeasonModel, AppError> {
        self.seasons
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Season not found".to_string()))
    }

    async fn overview(
        &self,
        season: SeasonModel,
        limit: Option<usize>,
    ) -> Result<SeasonOverview, AppError> {
        let tournaments = self.tournaments.list_by_season(season.id).await?;
        let rankings = self.ranking_service.leaderboard(season.id, limit).await?;
        Ok(SeasonOverview {
            season,
            tournaments,
            rankings,
        })
    }

    #[instrument(skip(self, request), fields(year = request.year))]
    pub async fn create(&self, request: CreateSeasonRequest) -> Result<SeasonModel, AppError> {
        let season = self
            .seasons
            .create(&NewSeason {
                name: request.name.trim().to_string(),
                year: request.year,
            })
            .await?;
        info!(season_id = season.id, "Season created");
        Ok(season)
    }

    /// Newest year first, each with tournaments and the top of the leaderboard
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SeasonOverview>, AppError> {
        let seasons = self.seasons.list().await?;
        let mut overviews = Vec::with_capacity(seasons.len());
        for season in seasons {
            overviews.push(self.overview(season, Some(TOP_RANKING_SIZE)).await?);
        }
        Ok(overviews)
    }

    /// Season whose year is the current calendar year
    #[instrument(skip(self))]
    pub async fn current(&self) -> Result<SeasonOverview, AppError> {
        let year = Utc::now().year();
        let season = self
            .seasons
            .find_by_year(year)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No season registered for {year}")))?;
        self.overview(season, Some(TOP_RANKING_SIZE)).await
    }

    /// Season with tournaments and the full leaderboard
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<SeasonOverview, AppError> {
        let season = self.require(id).await?;
        self.overview(season, None).await
    }

    #[instrument(skip(self))]
    pub async fn top_ranking(&self, id: i64) -> Result<Vec<RankingEntry>, AppError> {
        self.require(id).await?;
        self.ranking_service
            .leaderboard(id, Some(TOP_RANKING_SIZE))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateSeasonRequest,
    ) -> Result<SeasonModel, AppError> {
        let mut season = self.require(id).await?;
        if let Some(name) = request.name {
            season.name = name.trim().to_string();
        }
        if let Some(year) = request.year {
            season.year = year;
        }

        let season = self.seasons.update(&season).await?;
        info!(season_id = id, "Season updated");
        Ok(season)
    }

    /// Tournaments and rankings go with it through the store's cascade rules
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<SeasonModel, AppError> {
        let season = self.require(id).await?;
        self.seasons.delete(id).await?;
        info!(season_id = id, "Season deleted");
        Ok(season)
    }

    /// Forced full recompute; returns the resulting leaderboard
    #[instrument(skip(self))]
    pub async fn calculate_ranking(&self, id: i64) -> Result<Vec<RankingEntry>, AppError> {
        let lock = self.season_locks.lock_for(id).await;
        let _guard = lock.lock().await;

        self.ranking_service.calculate(id).await?;
        self.ranking_service.leaderboard(id, None).await
    }
}
