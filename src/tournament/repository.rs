use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewTournament, TournamentModel};
use crate::shared::{map_db_error, AppError};

#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create(&self, tournament: &NewTournament) -> Result<TournamentModel, AppError>;
    async fn get(&self, id: i64) -> Result<Option<TournamentModel>, AppError>;
    /// Most recent date first
    async fn list(&self) -> Result<Vec<TournamentModel>, AppError>;
    /// Oldest date first
    async fn list_by_season(&self, season_id: i64) -> Result<Vec<TournamentModel>, AppError>;
    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<TournamentModel>, AppError>;
    async fn count_by_season(&self, season_id: i64) -> Result<i64, AppError>;
    async fn update(&self, tournament: &TournamentModel) -> Result<TournamentModel, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Default)]
struct TournamentTable {
    next_id: i64,
    rows: BTreeMap<i64, TournamentModel>,
}

/// In-memory implementation of TournamentRepository for development and testing
#[derive(Default)]
pub struct InMemoryTournamentRepository {
    table: RwLock<TournamentTable>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    #[instrument(skip(self, tournament), fields(season_id = tournament.season_id))]
    async fn create(&self, tournament: &NewTournament) -> Result<TournamentModel, AppError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let model = TournamentModel {
            id: table.next_id,
            season_id: tournament.season_id,
            name: tournament.name.clone(),
            date_time: tournament.date_time,
            location: tournament.location.clone(),
            notes: tournament.notes.clone(),
            active: tournament.active,
            created_at: Utc::now(),
        };
        table.rows.insert(model.id, model.clone());

        debug!(tournament_id = model.id, "Tournament created in memory");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<TournamentModel>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<TournamentModel>, AppError> {
        let table = self.table.read().await;
        let mut tournaments: Vec<TournamentModel> = table.rows.values().cloned().collect();
        tournaments.sort_by(|a, b| b.date_time.cmp(&a.date_time).then(b.id.cmp(&a.id)));
        Ok(tournaments)
    }

    async fn list_by_season(&self, season_id: i64) -> Result<Vec<TournamentModel>, AppError> {
        let table = self.table.read().await;
        let mut tournaments: Vec<TournamentModel> = table
            .rows
            .values()
            .filter(|t| t.season_id == season_id)
            .cloned()
            .collect();
        tournaments.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.id.cmp(&b.id)));
        Ok(tournaments)
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<TournamentModel>, AppError> {
        let table = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }

    async fn count_by_season(&self, season_id: i64) -> Result<i64, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|t| t.season_id == season_id)
            .count() as i64)
    }

    #[instrument(skip(self, tournament), fields(tournament_id = tournament.id))]
    async fn update(&self, tournament: &TournamentModel) -> Result<TournamentModel, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&tournament.id) {
            Some(row) => {
                *row = TournamentModel {
                    created_at: row.created_at,
                    ..tournament.clone()
                };
                Ok(row.clone())
            }
            None => {
                warn!("Tournament not found for update in memory");
                Err(AppError::NotFound("Tournament not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            warn!("Tournament not found for deletion in memory");
            return Err(AppError::NotFound("Tournament not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of tournament repository
pub struct PostgresTournamentRepository {
    pool: PgPool,
}

impl PostgresTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TOURNAMENT_COLUMNS: &str =
    "id, season_id, name, date_time, location, notes, active, created_at";

#[async_trait]
impl TournamentRepository for PostgresTournamentRepository {
    #[instrument(skip(self, tournament), fields(season_id = tournament.season_id))]
    async fn create(&self, tournament: &NewTournament) -> Result<TournamentModel, AppError> {
        let model = sqlx::query_as::<_, TournamentModel>(&format!(
            "INSERT INTO tournaments (season_id, name, date_time, location, notes, active) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TOURNAMENT_COLUMNS}"
        ))
        .bind(tournament.season_id)
        .bind(&tournament.name)
        .bind(tournament.date_time)
        .bind(&tournament.location)
        .bind(&tournament.notes)
        .bind(tournament.active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!(tournament_id = model.id, "Tournament created in database");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<TournamentModel>, AppError> {
        sqlx::query_as::<_, TournamentModel>(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list(&self) -> Result<Vec<TournamentModel>, AppError> {
        sqlx::query_as::<_, TournamentModel>(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments ORDER BY date_time DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_season(&self, season_id: i64) -> Result<Vec<TournamentModel>, AppError> {
        sqlx::query_as::<_, TournamentModel>(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE season_id = $1 \
             ORDER BY date_time ASC, id ASC"
        ))
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<TournamentModel>, AppError> {
        sqlx::query_as::<_, TournamentModel>(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn count_by_season(&self, season_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tournaments WHERE season_id = $1")
            .bind(season_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, tournament), fields(tournament_id = tournament.id))]
    async fn update(&self, tournament: &TournamentModel) -> Result<TournamentModel, AppError> {
        sqlx::query_as::<_, TournamentModel>(&format!(
            "UPDATE tournaments SET name = $2, date_time = $3, location = $4, notes = $5, active = $6 \
             WHERE id = $1 RETURNING {TOURNAMENT_COLUMNS}"
        ))
        .bind(tournament.id)
        .bind(&tournament.name)
        .bind(tournament.date_time)
        .bind(&tournament.location)
        .bind(&tournament.notes)
        .bind(tournament.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Tournament not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            warn!("Tournament not found for deletion");
            return Err(AppError::NotFound("Tournament not found".to_string()));
        }
        Ok(())
    }
}
