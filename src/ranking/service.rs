use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{aggregator::aggregate, models::RankingModel, repository::RankingRepository};
use crate::participation::repository::ParticipationRepository;
use crate::player::{models::PlayerModel, repository::PlayerRepository};
use crate::season::repository::SeasonRepository;
use crate::shared::AppError;
use crate::tournament::repository::TournamentRepository;

/// Leaderboard row with the player resolved
#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    #[serde(flatten)]
    pub ranking: RankingModel,
    pub player: Option<PlayerModel>,
}

/// Rebuilds season leaderboards from participations and serves them
pub struct RankingService {
    rankings: Arc<dyn RankingRepository>,
    seasons: Arc<dyn SeasonRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    participations: Arc<dyn ParticipationRepository>,
    players: Arc<dyn PlayerRepository>,
}

impl RankingService {
    pub fn new(
        rankings: Arc<dyn RankingRepository>,
        seasons: Arc<dyn SeasonRepository>,
        tournaments: Arc<dyn TournamentRepository>,
        participations: Arc<dyn ParticipationRepository>,
        players: Arc<dyn PlayerRepository>,
    ) -> Self {
        Self {
            rankings,
            seasons,
            tournaments,
            participations,
            players,
        }
    }

    /// Recomputes the whole leaderboard of a season and persists it.
    ///
    /// Rows whose position and score did not move are not rewritten, so their
    /// `updated_at` stays put. Players left without participations in the
    /// season lose their row. Callers serialize per season.
    #[instrument(skip(self))]
    pub async fn calculate(&self, season_id: i64) -> Result<Vec<RankingModel>, AppError> {
        if self.seasons.get(season_id).await?.is_none() {
            return Err(AppError::NotFound("Season not found".to_string()));
        }

        let tournament_ids: Vec<i64> = self
            .tournaments
            .list_by_season(season_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let participations = if tournament_ids.is_empty() {
            Vec::new()
        } else {
            self.participations
                .list_by_tournament_ids(&tournament_ids)
                .await?
        };

        let ranked = aggregate(&participations);
        let existing: HashMap<i64, RankingModel> = self
            .rankings
            .list_by_season(season_id)
            .await?
            .into_iter()
            .map(|r| (r.player_id, r))
            .collect();

        let now = Utc::now();
        let mut rows = Vec::with_capacity(ranked.len());
        let mut written = 0usize;
        for entry in &ranked {
            match existing.get(&entry.player_id) {
                Some(current)
                    if current.position == entry.position && current.score == entry.score =>
                {
                    rows.push(current.clone());
                }
                _ => {
                    let row = RankingModel {
                        season_id,
                        player_id: entry.player_id,
                        position: entry.position,
                        score: entry.score,
                        updated_at: now,
                    };
                    self.rankings.upsert(&row).await?;
                    written += 1;
                    rows.push(row);
                }
            }
        }

        let ranked_players: HashSet<i64> = ranked.iter().map(|r| r.player_id).collect();
        let mut removed = 0usize;
        for player_id in existing.keys().filter(|id| !ranked_players.contains(*id)) {
            self.rankings.delete(season_id, *player_id).await?;
            removed += 1;
        }

        info!(
            players = rows.len(),
            participations = participations.len(),
            written,
            removed,
            "Season ranking recomputed"
        );
        Ok(rows)
    }

    /// Stored leaderboard in position order, optionally cut to the top `limit`
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        season_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<RankingEntry>, AppError> {
        let mut rankings = self.rankings.list_by_season(season_id).await?;
        if let Some(limit) = limit {
            rankings.truncate(limit);
        }

        let player_ids: Vec<i64> = rankings.iter().map(|r| r.player_id).collect();
        let mut players: HashMap<i64, PlayerModel> = self
            .players
            .list_by_ids(&player_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        debug!(entries = rankings.len(), "Leaderboard loaded");
        Ok(rankings
            .into_iter()
            .map(|ranking| RankingEntry {
                player: players.remove(&ranking.player_id),
                ranking,
            })
            .collect())
    }
}
