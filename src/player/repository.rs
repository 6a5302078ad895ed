use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewPlayer, PlayerModel};
use super::stats::PlayerStatistics;
use crate::shared::{map_db_error, AppError};

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn create(&self, player: &NewPlayer) -> Result<PlayerModel, AppError>;
    async fn get(&self, id: i64) -> Result<Option<PlayerModel>, AppError>;
    /// Alphabetical by name
    async fn list(&self) -> Result<Vec<PlayerModel>, AppError>;
    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<PlayerModel>, AppError>;
    /// Highest total score first
    async fn list_by_total_score(&self) -> Result<Vec<PlayerModel>, AppError>;
    /// Active players with at least one win, most wins first
    async fn top_winners(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError>;
    /// Active players, most tournaments played first
    async fn most_active(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError>;
    /// Writes profile fields only; the statistic counters are left as stored
    async fn update_profile(&self, player: &PlayerModel) -> Result<PlayerModel, AppError>;
    /// The only write path for the statistic counters
    async fn update_statistics(
        &self,
        id: i64,
        statistics: &PlayerStatistics,
    ) -> Result<PlayerModel, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Default)]
struct PlayerTable {
    next_id: i64,
    rows: BTreeMap<i64, PlayerModel>,
}

/// In-memory implementation of PlayerRepository for development and testing
#[derive(Default)]
pub struct InMemoryPlayerRepository {
    table: RwLock<PlayerTable>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn sorted_by<F>(&self, filter: impl Fn(&PlayerModel) -> bool, key: F) -> Vec<PlayerModel>
    where
        F: Fn(&PlayerModel, &PlayerModel) -> std::cmp::Ordering,
    {
        let table = self.table.read().await;
        let mut players: Vec<PlayerModel> =
            table.rows.values().filter(|p| filter(*p)).cloned().collect();
        players.sort_by(|a, b| key(a, b).then(a.id.cmp(&b.id)));
        players
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self, player), fields(name = %player.name))]
    async fn create(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let model = PlayerModel {
            id: table.next_id,
            name: player.name.clone(),
            email: player.email.clone(),
            phone: player.phone.clone(),
            nickname: player.nickname.clone(),
            avatar_url: player.avatar_url.clone(),
            bio: player.bio.clone(),
            city: player.city.clone(),
            birth_date: player.birth_date,
            active: player.active,
            total_tournaments: 0,
            total_score: 0,
            best_position: None,
            wins: 0,
            created_at: Utc::now(),
        };
        table.rows.insert(model.id, model.clone());

        debug!(player_id = model.id, "Player created in memory");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<PlayerModel>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<PlayerModel>, AppError> {
        Ok(self.sorted_by(|_| true, |a, b| a.name.cmp(&b.name)).await)
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<PlayerModel>, AppError> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }

    async fn list_by_total_score(&self) -> Result<Vec<PlayerModel>, AppError> {
        Ok(self
            .sorted_by(|_| true, |a, b| b.total_score.cmp(&a.total_score))
            .await)
    }

    async fn top_winners(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError> {
        let mut players = self
            .sorted_by(|p| p.active && p.wins > 0, |a, b| b.wins.cmp(&a.wins))
            .await;
        players.truncate(limit.max(0) as usize);
        Ok(players)
    }

    async fn most_active(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError> {
        let mut players = self
            .sorted_by(
                |p| p.active,
                |a, b| b.total_tournaments.cmp(&a.total_tournaments),
            )
            .await;
        players.truncate(limit.max(0) as usize);
        Ok(players)
    }

    #[instrument(skip(self, player), fields(player_id = player.id))]
    async fn update_profile(&self, player: &PlayerModel) -> Result<PlayerModel, AppError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&player.id) else {
            warn!("Player not found for update in memory");
            return Err(AppError::NotFound("Player not found".to_string()));
        };

        row.name = player.name.clone();
        row.email = player.email.clone();
        row.phone = player.phone.clone();
        row.nickname = player.nickname.clone();
        row.avatar_url = player.avatar_url.clone();
        row.bio = player.bio.clone();
        row.city = player.city.clone();
        row.birth_date = player.birth_date;
        row.active = player.active;
        Ok(row.clone())
    }

    #[instrument(skip(self, statistics))]
    async fn update_statistics(
        &self,
        id: i64,
        statistics: &PlayerStatistics,
    ) -> Result<PlayerModel, AppError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            warn!("Player not found for statistics update in memory");
            return Err(AppError::NotFound("Player not found".to_string()));
        };

        row.total_tournaments = statistics.total_tournaments;
        row.total_score = statistics.total_score;
        row.best_position = statistics.best_position;
        row.wins = statistics.wins;
        Ok(row.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            warn!("Player not found for deletion in memory");
            return Err(AppError::NotFound("Player not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PLAYER_COLUMNS: &str = "id, name, email, phone, nickname, avatar_url, bio, city, birth_date, \
     active, total_tournaments, total_score, best_position, wins, created_at";

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self, player), fields(name = %player.name))]
    async fn create(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        let model = sqlx::query_as::<_, PlayerModel>(&format!(
            "INSERT INTO players (name, email, phone, nickname, avatar_url, bio, city, birth_date, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(&player.name)
        .bind(&player.email)
        .bind(&player.phone)
        .bind(&player.nickname)
        .bind(&player.avatar_url)
        .bind(&player.bio)
        .bind(&player.city)
        .bind(player.birth_date)
        .bind(player.active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!(player_id = model.id, "Player created in database");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list(&self) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_total_score(&self) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY total_score DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn top_winners(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE active AND wins > 0 \
             ORDER BY wins DESC, id ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn most_active(&self, limit: i64) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE active \
             ORDER BY total_tournaments DESC, id ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, player), fields(player_id = player.id))]
    async fn update_profile(&self, player: &PlayerModel) -> Result<PlayerModel, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "UPDATE players SET name = $2, email = $3, phone = $4, nickname = $5, avatar_url = $6, \
             bio = $7, city = $8, birth_date = $9, active = $10 \
             WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(player.id)
        .bind(&player.name)
        .bind(&player.email)
        .bind(&player.phone)
        .bind(&player.nickname)
        .bind(&player.avatar_url)
        .bind(&player.bio)
        .bind(&player.city)
        .bind(player.birth_date)
        .bind(player.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Player not found".to_string()))
    }

    #[instrument(skip(self, statistics))]
    async fn update_statistics(
        &self,
        id: i64,
        statistics: &PlayerStatistics,
    ) -> Result<PlayerModel, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "UPDATE players SET total_tournaments = $2, total_score = $3, best_position = $4, wins = $5 \
             WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(id)
        .bind(statistics.total_tournaments)
        .bind(statistics.total_score)
        .bind(statistics.best_position)
        .bind(statistics.wins)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Player not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            warn!("Player not found for deletion");
            return Err(AppError::NotFound("Player not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_player(name: &str) -> NewPlayer {
        NewPlayer {
            name: name.to_string(),
            active: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_profile_update_leaves_statistics() {
        let repo = InMemoryPlayerRepository::new();
        let player = repo.create(&new_player("Ana")).await.unwrap();
        let stats = PlayerStatistics {
            total_tournaments: 3,
            total_score: 210,
            best_position: Some(1),
            wins: 1,
        };
        repo.update_statistics(player.id, &stats).await.unwrap();

        // A stale copy with zeroed counters must not clobber the stored ones
        let updated = repo
            .update_profile(&PlayerModel {
                nickname: Some("Aninha".to_string()),
                ..player
            })
            .await
            .unwrap();

        assert_eq!(updated.nickname.as_deref(), Some("Aninha"));
        assert_eq!(updated.statistics(), stats);
    }

    #[tokio::test]
    async fn test_top_winners_skips_inactive_and_winless() {
        let repo = InMemoryPlayerRepository::new();
        let ana = repo.create(&new_player("Ana")).await.unwrap();
        let bia = repo.create(&new_player("Bia")).await.unwrap();
        let caio = repo.create(&new_player("Caio")).await.unwrap();
        let mut dani = repo.create(&new_player("Dani")).await.unwrap();

        let wins = |wins| PlayerStatistics {
            total_tournaments: 5,
            total_score: 0,
            best_position: Some(1),
            wins,
        };
        repo.update_statistics(ana.id, &wins(1)).await.unwrap();
        repo.update_statistics(bia.id, &wins(3)).await.unwrap();
        repo.update_statistics(dani.id, &wins(9)).await.unwrap();
        dani.active = false;
        repo.update_profile(&dani).await.unwrap();

        let top: Vec<i64> = repo
            .top_winners(10)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(top, vec![bia.id, ana.id]);
        assert!(!top.contains(&caio.id));

        assert_eq!(repo.top_winners(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_alphabetical() {
        let repo = InMemoryPlayerRepository::new();
        for name in ["Zeca", "Ana", "Marta"] {
            repo.create(&new_player(name)).await.unwrap();
        }

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ana", "Marta", "Zeca"]);
    }

    #[tokio::test]
    async fn test_statistics_for_missing_player() {
        let repo = InMemoryPlayerRepository::new();
        let result = repo
            .update_statistics(3, &PlayerStatistics::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
