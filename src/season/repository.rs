use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewSeason, SeasonModel};
use crate::shared::{map_db_error, AppError};

#[async_trait]
pub trait SeasonRepository: Send + Sync {
    async fn create(&self, season: &NewSeason) -> Result<SeasonModel, AppError>;
    async fn get(&self, id: i64) -> Result<Option<SeasonModel>, AppError>;
    /// Newest year first
    async fn list(&self) -> Result<Vec<SeasonModel>, AppError>;
    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<SeasonModel>, AppError>;
    async fn find_by_year(&self, year: i32) -> Result<Option<SeasonModel>, AppError>;
    async fn update(&self, season: &SeasonModel) -> Result<SeasonModel, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Default)]
struct SeasonTable {
    next_id: i64,
    rows: BTreeMap<i64, SeasonModel>,
}

/// In-memory implementation of SeasonRepository for development and testing
#[derive(Default)]
pub struct InMemorySeasonRepository {
    table: RwLock<SeasonTable>,
}

impl InMemorySeasonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeasonRepository for InMemorySeasonRepository {
    #[instrument(skip(self, season), fields(year = season.year))]
    async fn create(&self, season: &NewSeason) -> Result<SeasonModel, AppError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let model = SeasonModel {
            id: table.next_id,
            name: season.name.clone(),
            year: season.year,
            created_at: Utc::now(),
        };
        table.rows.insert(model.id, model.clone());

        debug!(season_id = model.id, "Season created in memory");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<SeasonModel>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<SeasonModel>, AppError> {
        let table = self.table.read().await;
        let mut seasons: Vec<SeasonModel> = table.rows.values().cloned().collect();
        seasons.sort_by(|a, b| b.year.cmp(&a.year).then(b.id.cmp(&a.id)));
        Ok(seasons)
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<SeasonModel>, AppError> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }

    async fn find_by_year(&self, year: i32) -> Result<Option<SeasonModel>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|s| s.year == year).cloned())
    }

    #[instrument(skip(self, season), fields(season_id = season.id))]
    async fn update(&self, season: &SeasonModel) -> Result<SeasonModel, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&season.id) {
            Some(row) => {
                row.name = season.name.clone();
                row.year = season.year;
                Ok(row.clone())
            }
            None => {
                warn!("Season not found for update in memory");
                Err(AppError::NotFound("Season not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            warn!("Season not found for deletion in memory");
            return Err(AppError::NotFound("Season not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of season repository
pub struct PostgresSeasonRepository {
    pool: PgPool,
}

impl PostgresSeasonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SEASON_COLUMNS: &str = "id, name, year, created_at";

#[async_trait]
impl SeasonRepository for PostgresSeasonRepository {
    #[instrument(skip(self, season), fields(year = season.year))]
    async fn create(&self, season: &NewSeason) -> Result<SeasonModel, AppError> {
        let model = sqlx::query_as::<_, SeasonModel>(&format!(
            "INSERT INTO seasons (name, year) VALUES ($1, $2) RETURNING {SEASON_COLUMNS}"
        ))
        .bind(&season.name)
        .bind(season.year)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!(season_id = model.id, "Season created in database");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<SeasonModel>, AppError> {
        sqlx::query_as::<_, SeasonModel>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list(&self) -> Result<Vec<SeasonModel>, AppError> {
        sqlx::query_as::<_, SeasonModel>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons ORDER BY year DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<SeasonModel>, AppError> {
        sqlx::query_as::<_, SeasonModel>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn find_by_year(&self, year: i32) -> Result<Option<SeasonModel>, AppError> {
        sqlx::query_as::<_, SeasonModel>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE year = $1 ORDER BY id LIMIT 1"
        ))
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, season), fields(season_id = season.id))]
    async fn update(&self, season: &SeasonModel) -> Result<SeasonModel, AppError> {
        sqlx::query_as::<_, SeasonModel>(&format!(
            "UPDATE seasons SET name = $2, year = $3 WHERE id = $1 RETURNING {SEASON_COLUMNS}"
        ))
        .bind(season.id)
        .bind(&season.name)
        .bind(season.year)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Season not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            warn!("Season not found for deletion");
            return Err(AppError::NotFound("Season not found".to_string()));
        }
        Ok(())
    }
}
