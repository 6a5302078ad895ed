use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::{
    models::{NewPlayer, PlayerModel},
    repository::PlayerRepository,
    stats::PlayerStatistics,
    types::{
        CreatePlayerRequest, ParticipationHistoryEntry, PlayerDetail, PlayerSeasonRanking,
        PlayerWithStats, UpdatePlayerRequest,
    },
};
use crate::participation::repository::ParticipationRepository;
use crate::ranking::{repository::RankingRepository, service::RankingService};
use crate::season::{models::SeasonModel, repository::SeasonRepository};
use crate::shared::{AppError, KeyedLocks};
use crate::tournament::{models::TournamentModel, repository::TournamentRepository};

/// Player profiles, history views and the statistics updater
pub struct PlayerService {
    players: Arc<dyn PlayerRepository>,
    participations: Arc<dyn ParticipationRepository>,
    rankings: Arc<dyn RankingRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    seasons: Arc<dyn SeasonRepository>,
    ranking_service: Arc<RankingService>,
    season_locks: KeyedLocks,
    player_locks: KeyedLocks,
}

impl PlayerService {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        participations: Arc<dyn ParticipationRepository>,
        rankings: Arc<dyn RankingRepository>,
        tournaments: Arc<dyn TournamentRepository>,
        seasons: Arc<dyn SeasonRepository>,
        ranking_service: Arc<RankingService>,
        season_locks: KeyedLocks,
        player_locks: KeyedLocks,
    ) -> Self {
        Self {
            players,
            participations,
            rankings,
            tournaments,
            seasons,
            ranking_service,
            season_locks,
            player_locks,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreatePlayerRequest) -> Result<PlayerModel, AppError> {
        let player = self
            .players
            .create(&NewPlayer {
                name: request.name.trim().to_string(),
                email: request.email,
                phone: request.phone,
                nickname: request.nickname,
                avatar_url: request.avatar_url,
                bio: request.bio,
                city: request.city,
                birth_date: request.birth_date,
                active: request.active.unwrap_or(true),
            })
            .await?;

        info!(player_id = player.id, "Player created");
        Ok(player)
    }

    pub async fn list(&self) -> Result<Vec<PlayerModel>, AppError> {
        self.players.list().await
    }

    async fn require(&self, id: i64) -> Result<PlayerModel, AppError> {
        self.players
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Player not found".to_string()))
    }

    /// Player with season rankings and full participation history
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<PlayerDetail, AppError> {
        let player = self.require(id).await?;
        let rankings = self.season_rankings(id).await?;
        let participations = self.participation_history(id).await?;

        Ok(PlayerDetail {
            player,
            rankings,
            participations,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdatePlayerRequest,
    ) -> Result<PlayerModel, AppError> {
        let mut player = self.require(id).await?;

        if let Some(name) = request.name {
            player.name = name.trim().to_string();
        }
        if request.email.is_some() {
            player.email = request.email;
        }
        if request.phone.is_some() {
            player.phone = request.phone;
        }
        if request.nickname.is_some() {
            player.nickname = request.nickname;
        }
        if request.avatar_url.is_some() {
            player.avatar_url = request.avatar_url;
        }
        if request.bio.is_some() {
            player.bio = request.bio;
        }
        if request.city.is_some() {
            player.city = request.city;
        }
        if request.birth_date.is_some() {
            player.birth_date = request.birth_date;
        }
        if let Some(active) = request.active {
            player.active = active;
        }

        let updated = self.players.update_profile(&player).await?;
        info!(player_id = id, "Player updated");
        Ok(updated)
    }

    /// Removes the player with their participations and rebuilds the
    /// leaderboard of every season they played in
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<PlayerModel, AppError> {
        let player = self.require(id).await?;

        let participations = self.participations.list_by_player(id).await?;
        let tournament_ids: Vec<i64> = participations.iter().map(|p| p.tournament_id).collect();
        let season_of: HashMap<i64, i64> = self
            .tournaments
            .list_by_ids(&tournament_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.season_id))
            .collect();

        let mut by_season: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for tournament_id in tournament_ids {
            if let Some(season_id) = season_of.get(&tournament_id) {
                by_season.entry(*season_id).or_default().push(tournament_id);
            }
        }

        // Gone before the season locks, so no new result can reference it
        self.players.delete(id).await?;
        info!(player_id = id, seasons = by_season.len(), "Player deleted");

        for (season_id, tournament_ids) in by_season {
            let lock = self.season_locks.lock_for(season_id).await;
            let _guard = lock.lock().await;

            for tournament_id in tournament_ids {
                // Postgres cascades these with the player row
                match self.participations.delete(tournament_id, id).await {
                    Ok(()) | Err(AppError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                }
            }

            if let Err(err) = self.ranking_service.calculate(season_id).await {
                error!(season_id, error = %err, "Ranking recompute failed after player delete");
                return Err(err);
            }
        }

        Ok(player)
    }

    /// Participations with tournament and season, newest first
    #[instrument(skip(self))]
    pub async fn history(&self, id: i64) -> Result<Vec<ParticipationHistoryEntry>, AppError> {
        self.require(id).await?;
        self.participation_history(id).await
    }

    /// Season rankings, newest season year first
    #[instrument(skip(self))]
    pub async fn rankings(&self, id: i64) -> Result<Vec<PlayerSeasonRanking>, AppError> {
        self.require(id).await?;
        self.season_rankings(id).await
    }

    /// Everyone, highest total score first, with participation and ranking counts
    #[instrument(skip(self))]
    pub async fn list_with_stats(&self) -> Result<Vec<PlayerWithStats>, AppError> {
        let players = self.players.list_by_total_score().await?;
        let mut result = Vec::with_capacity(players.len());

        for player in players {
            let participation_count = self.participations.list_by_player(player.id).await?.len();
            let rankings = self.season_rankings(player.id).await?;
            result.push(PlayerWithStats {
                participation_count,
                ranking_count: rankings.len(),
                latest_ranking: rankings.into_iter().next(),
                player,
            });
        }

        debug!(players = result.len(), "Player statistics listed");
        Ok(result)
    }

    pub async fn top_winners(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError> {
        self.players.top_winners(limit).await
    }

    pub async fn most_active(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError> {
        self.players.most_active(limit).await
    }

    /// Overwrites the four counters from the player's participation history.
    /// Serialized per player.
    #[instrument(skip(self))]
    pub async fn update_statistics(&self, player_id: i64) -> Result<PlayerModel, AppError> {
        let lock = self.player_locks.lock_for(player_id).await;
        let _guard = lock.lock().await;

        self.require(player_id).await?;
        let participations = self.participations.list_by_player(player_id).await?;
        let statistics = PlayerStatistics::from_participations(&participations);

        let player = self
            .players
            .update_statistics(player_id, &statistics)
            .await?;

        info!(
            total_tournaments = statistics.total_tournaments,
            total_score = statistics.total_score,
            wins = statistics.wins,
            "Player statistics recomputed"
        );
        Ok(player)
    }

    async fn participation_history(
        &self,
        player_id: i64,
    ) -> Result<Vec<ParticipationHistoryEntry>, AppError> {
        let participations = self.participations.list_by_player(player_id).await?;

        let tournament_ids: Vec<i64> = participations.iter().map(|p| p.tournament_id).collect();
        let tournaments: HashMap<i64, TournamentModel> = self
            .tournaments
            .list_by_ids(&tournament_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let season_ids: Vec<i64> = tournaments.values().map(|t| t.season_id).collect();
        let seasons = self.seasons_by_id(&season_ids).await?;

        Ok(participations
            .into_iter()
            .map(|participation| {
                let tournament = tournaments.get(&participation.tournament_id).cloned();
                let season = tournament
                    .as_ref()
                    .and_then(|t| seasons.get(&t.season_id).cloned());
                ParticipationHistoryEntry {
                    participation,
                    tournament,
                    season,
                }
            })
            .collect())
    }

    async fn season_rankings(&self, player_id: i64) -> Result<Vec<PlayerSeasonRanking>, AppError> {
        let rankings = self.rankings.list_by_player(player_id).await?;
        let season_ids: Vec<i64> = rankings.iter().map(|r| r.season_id).collect();
        let seasons = self.seasons_by_id(&season_ids).await?;

        let mut entries: Vec<PlayerSeasonRanking> = rankings
            .into_iter()
            .map(|ranking| PlayerSeasonRanking {
                season: seasons.get(&ranking.season_id).cloned(),
                ranking,
            })
            .collect();
        entries.sort_by(|a, b| {
            let year = |entry: &PlayerSeasonRanking| entry.season.as_ref().map(|s| s.year);
            year(b)
                .cmp(&year(a))
                .then(b.ranking.season_id.cmp(&a.ranking.season_id))
        });
        Ok(entries)
    }

    async fn seasons_by_id(&self, ids: &[i64]) -> Result<HashMap<i64, SeasonModel>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .seasons
            .list_by_ids(ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect())
    }
}
