use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::RankingModel;
use crate::shared::{map_db_error, AppError};

#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Ordered by position ascending
    async fn list_by_season(&self, season_id: i64) -> Result<Vec<RankingModel>, AppError>;
    async fn list_by_player(&self, player_id: i64) -> Result<Vec<RankingModel>, AppError>;
    /// Inserts or replaces the row for (season_id, player_id)
    async fn upsert(&self, ranking: &RankingModel) -> Result<(), AppError>;
    async fn delete(&self, season_id: i64, player_id: i64) -> Result<(), AppError>;
}

/// In-memory implementation of RankingRepository for development and testing
#[derive(Default)]
pub struct InMemoryRankingRepository {
    rows: RwLock<BTreeMap<(i64, i64), RankingModel>>,
}

impl InMemoryRankingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankingRepository for InMemoryRankingRepository {
    async fn list_by_season(&self, season_id: i64) -> Result<Vec<RankingModel>, AppError> {
        let rows = self.rows.read().await;
        let mut rankings: Vec<RankingModel> = rows
            .range((season_id, i64::MIN)..=(season_id, i64::MAX))
            .map(|(_, r)| r.clone())
            .collect();
        rankings.sort_by_key(|r| (r.position, r.player_id));
        Ok(rankings)
    }

    async fn list_by_player(&self, player_id: i64) -> Result<Vec<RankingModel>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|r| r.player_id == player_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, ranking), fields(season_id = ranking.season_id, player_id = ranking.player_id))]
    async fn upsert(&self, ranking: &RankingModel) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        rows.insert((ranking.season_id, ranking.player_id), ranking.clone());
        debug!(position = ranking.position, score = ranking.score, "Ranking upserted in memory");
        Ok(())
    }

    async fn delete(&self, season_id: i64, player_id: i64) -> Result<(), AppError> {
        self.rows.write().await.remove(&(season_id, player_id));
        Ok(())
    }
}

/// PostgreSQL implementation of ranking repository
pub struct PostgresRankingRepository {
    pool: PgPool,
}

impl PostgresRankingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RANKING_COLUMNS: &str = "season_id, player_id, position, score, updated_at";

#[async_trait]
impl RankingRepository for PostgresRankingRepository {
    async fn list_by_season(&self, season_id: i64) -> Result<Vec<RankingModel>, AppError> {
        sqlx::query_as::<_, RankingModel>(&format!(
            "SELECT {RANKING_COLUMNS} FROM rankings WHERE season_id = $1 \
             ORDER BY position ASC, player_id ASC"
        ))
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_player(&self, player_id: i64) -> Result<Vec<RankingModel>, AppError> {
        sqlx::query_as::<_, RankingModel>(&format!(
            "SELECT {RANKING_COLUMNS} FROM rankings WHERE player_id = $1"
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, ranking), fields(season_id = ranking.season_id, player_id = ranking.player_id))]
    async fn upsert(&self, ranking: &RankingModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO rankings (season_id, player_id, position, score, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (season_id, player_id) \
             DO UPDATE SET position = EXCLUDED.position, score = EXCLUDED.score, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(ranking.season_id)
        .bind(ranking.player_id)
        .bind(ranking.position)
        .bind(ranking.score)
        .bind(ranking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!(position = ranking.position, score = ranking.score, "Ranking upserted");
        Ok(())
    }

    async fn delete(&self, season_id: i64, player_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM rankings WHERE season_id = $1 AND player_id = $2")
            .bind(season_id)
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
