use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewParticipation, ParticipationModel};
use crate::shared::{map_db_error, AppError};

#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    /// Fails with `Conflict` when the (tournament, player) pair already exists
    async fn create(&self, participation: &NewParticipation)
        -> Result<ParticipationModel, AppError>;
    async fn get(
        &self,
        tournament_id: i64,
        player_id: i64,
    ) -> Result<Option<ParticipationModel>, AppError>;
    /// Ordered by position ascending
    async fn list_by_tournament(&self, tournament_id: i64)
        -> Result<Vec<ParticipationModel>, AppError>;
    async fn list_by_tournament_ids(
        &self,
        tournament_ids: &[i64],
    ) -> Result<Vec<ParticipationModel>, AppError>;
    /// Newest first
    async fn list_by_player(&self, player_id: i64) -> Result<Vec<ParticipationModel>, AppError>;
    async fn update(&self, participation: &ParticipationModel)
        -> Result<ParticipationModel, AppError>;
    async fn delete(&self, tournament_id: i64, player_id: i64) -> Result<(), AppError>;
}

/// In-memory implementation of ParticipationRepository for development and testing
#[derive(Default)]
pub struct InMemoryParticipationRepository {
    rows: RwLock<BTreeMap<(i64, i64), ParticipationModel>>,
}

impl InMemoryParticipationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_position(participations: &mut [ParticipationModel]) {
    participations.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.player_id.cmp(&b.player_id))
    });
}

#[async_trait]
impl ParticipationRepository for InMemoryParticipationRepository {
    #[instrument(skip(self, participation), fields(tournament_id = participation.tournament_id, player_id = participation.player_id))]
    async fn create(
        &self,
        participation: &NewParticipation,
    ) -> Result<ParticipationModel, AppError> {
        let mut rows = self.rows.write().await;
        let key = (participation.tournament_id, participation.player_id);
        if rows.contains_key(&key) {
            warn!("Participation already exists in memory");
            return Err(AppError::Conflict(
                "Player is already registered in this tournament".to_string(),
            ));
        }

        let model = ParticipationModel {
            tournament_id: participation.tournament_id,
            player_id: participation.player_id,
            position: participation.position,
            score: participation.score,
            created_at: Utc::now(),
        };
        rows.insert(key, model.clone());

        debug!("Participation created in memory");
        Ok(model)
    }

    async fn get(
        &self,
        tournament_id: i64,
        player_id: i64,
    ) -> Result<Option<ParticipationModel>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .get(&(tournament_id, player_id))
            .cloned())
    }

    async fn list_by_tournament(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<ParticipationModel>, AppError> {
        let rows = self.rows.read().await;
        let mut participations: Vec<ParticipationModel> = rows
            .range((tournament_id, i64::MIN)..=(tournament_id, i64::MAX))
            .map(|(_, p)| p.clone())
            .collect();
        sort_by_position(&mut participations);
        Ok(participations)
    }

    async fn list_by_tournament_ids(
        &self,
        tournament_ids: &[i64],
    ) -> Result<Vec<ParticipationModel>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|p| tournament_ids.contains(&p.tournament_id))
            .cloned()
            .collect())
    }

    async fn list_by_player(&self, player_id: i64) -> Result<Vec<ParticipationModel>, AppError> {
        let rows = self.rows.read().await;
        let mut participations: Vec<ParticipationModel> = rows
            .values()
            .filter(|p| p.player_id == player_id)
            .cloned()
            .collect();
        participations.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.tournament_id.cmp(&a.tournament_id))
        });
        Ok(participations)
    }

    #[instrument(skip(self, participation), fields(tournament_id = participation.tournament_id, player_id = participation.player_id))]
    async fn update(
        &self,
        participation: &ParticipationModel,
    ) -> Result<ParticipationModel, AppError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&(participation.tournament_id, participation.player_id)) {
            Some(row) => {
                row.position = participation.position;
                row.score = participation.score;
                Ok(row.clone())
            }
            None => {
                warn!("Participation not found for update in memory");
                Err(AppError::NotFound("Participation not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, tournament_id: i64, player_id: i64) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        if rows.remove(&(tournament_id, player_id)).is_none() {
            warn!("Participation not found for deletion in memory");
            return Err(AppError::NotFound("Participation not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of participation repository
pub struct PostgresParticipationRepository {
    pool: PgPool,
}

impl PostgresParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PARTICIPATION_COLUMNS: &str = "tournament_id, player_id, position, score, created_at";

#[async_trait]
impl ParticipationRepository for PostgresParticipationRepository {
    #[instrument(skip(self, participation), fields(tournament_id = participation.tournament_id, player_id = participation.player_id))]
    async fn create(
        &self,
        participation: &NewParticipation,
    ) -> Result<ParticipationModel, AppError> {
        let model = sqlx::query_as::<_, ParticipationModel>(&format!(
            "INSERT INTO participations (tournament_id, player_id, position, score) \
             VALUES ($1, $2, $3, $4) RETURNING {PARTICIPATION_COLUMNS}"
        ))
        .bind(participation.tournament_id)
        .bind(participation.player_id)
        .bind(participation.position)
        .bind(participation.score)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!("Participation created in database");
        Ok(model)
    }

    async fn get(
        &self,
        tournament_id: i64,
        player_id: i64,
    ) -> Result<Option<ParticipationModel>, AppError> {
        sqlx::query_as::<_, ParticipationModel>(&format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations \
             WHERE tournament_id = $1 AND player_id = $2"
        ))
        .bind(tournament_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_tournament(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<ParticipationModel>, AppError> {
        sqlx::query_as::<_, ParticipationModel>(&format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations \
             WHERE tournament_id = $1 ORDER BY position ASC, player_id ASC"
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_tournament_ids(
        &self,
        tournament_ids: &[i64],
    ) -> Result<Vec<ParticipationModel>, AppError> {
        sqlx::query_as::<_, ParticipationModel>(&format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations WHERE tournament_id = ANY($1)"
        ))
        .bind(tournament_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_player(&self, player_id: i64) -> Result<Vec<ParticipationModel>, AppError> {
        sqlx::query_as::<_, ParticipationModel>(&format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations \
             WHERE player_id = $1 ORDER BY created_at DESC, tournament_id DESC"
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, participation), fields(tournament_id = participation.tournament_id, player_id = participation.player_id))]
    async fn update(
        &self,
        participation: &ParticipationModel,
    ) -> Result<ParticipationModel, AppError> {
        sqlx::query_as::<_, ParticipationModel>(&format!(
            "UPDATE participations SET position = $3, score = $4 \
             WHERE tournament_id = $1 AND player_id = $2 RETURNING {PARTICIPATION_COLUMNS}"
        ))
        .bind(participation.tournament_id)
        .bind(participation.player_id)
        .bind(participation.position)
        .bind(participation.score)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Participation not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, tournament_id: i64, player_id: i64) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM participations WHERE tournament_id = $1 AND player_id = $2")
                .bind(tournament_id)
                .bind(player_id)
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            warn!("Participation not found for deletion");
            return Err(AppError::NotFound("Participation not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tournament_id: i64, player_id: i64, position: i32, score: i32) -> NewParticipation {
        NewParticipation {
            tournament_id,
            player_id,
            position,
            score,
        }
    }

    #[tokio::test]
    async fn test_duplicate_pair_conflicts_and_keeps_original() {
        let repo = InMemoryParticipationRepository::new();
        repo.create(&entry(1, 7, 2, 80)).await.unwrap();

        let result = repo.create(&entry(1, 7, 1, 100)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let stored = repo.get(1, 7).await.unwrap().unwrap();
        assert_eq!(stored.position, 2);
        assert_eq!(stored.score, 80);
    }

    #[tokio::test]
    async fn test_list_by_tournament_orders_by_position() {
        let repo = InMemoryParticipationRepository::new();
        repo.create(&entry(1, 10, 3, 20)).await.unwrap();
        repo.create(&entry(1, 11, 1, 100)).await.unwrap();
        repo.create(&entry(2, 12, 2, 50)).await.unwrap();
        repo.create(&entry(1, 12, 2, 50)).await.unwrap();

        let positions: Vec<(i64, i32)> = repo
            .list_by_tournament(1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.player_id, p.position))
            .collect();
        assert_eq!(positions, vec![(11, 1), (12, 2), (10, 3)]);
    }

    #[tokio::test]
    async fn test_list_by_tournament_ids_filters() {
        let repo = InMemoryParticipationRepository::new();
        repo.create(&entry(1, 10, 1, 20)).await.unwrap();
        repo.create(&entry(2, 10, 1, 30)).await.unwrap();
        repo.create(&entry(3, 10, 1, 40)).await.unwrap();

        let found = repo.list_by_tournament_ids(&[1, 3]).await.unwrap();
        let total: i32 = found.iter().map(|p| p.score).sum();
        assert_eq!(found.len(), 2);
        assert_eq!(total, 60);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let repo = InMemoryParticipationRepository::new();
        let created = repo.create(&entry(1, 7, 2, 80)).await.unwrap();

        let updated = repo
            .update(&ParticipationModel {
                score: 95,
                ..created.clone()
            })
            .await
            .unwrap();

        assert_eq!(updated.score, 95);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_delete_missing_participation() {
        let repo = InMemoryParticipationRepository::new();
        assert!(matches!(
            repo.delete(1, 1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
