use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{NewPhoto, PhotoCategory, PhotoModel};
use crate::shared::{map_db_error, AppError};

/// Every listing is ordered by photo date, newest first
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn create(&self, photo: &NewPhoto) -> Result<PhotoModel, AppError>;
    async fn get(&self, id: i64) -> Result<Option<PhotoModel>, AppError>;
    async fn list(&self) -> Result<Vec<PhotoModel>, AppError>;
    async fn list_by_category(&self, category: PhotoCategory)
        -> Result<Vec<PhotoModel>, AppError>;
    async fn list_by_tournament(&self, tournament_id: i64) -> Result<Vec<PhotoModel>, AppError>;
    /// Photos tagged with the season directly or with one of its tournaments
    async fn list_by_season(
        &self,
        season_id: i64,
        tournament_ids: &[i64],
    ) -> Result<Vec<PhotoModel>, AppError>;
    async fn list_by_player(&self, player_id: i64) -> Result<Vec<PhotoModel>, AppError>;
    async fn update(&self, photo: &PhotoModel) -> Result<PhotoModel, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    /// Returns how many photos were removed
    async fn delete_by_tournament(&self, tournament_id: i64) -> Result<u64, AppError>;
}

#[derive(Default)]
struct PhotoTable {
    next_id: i64,
    rows: BTreeMap<i64, PhotoModel>,
}

/// In-memory implementation of PhotoRepository for development and testing
#[derive(Default)]
pub struct InMemoryPhotoRepository {
    table: RwLock<PhotoTable>,
}

impl InMemoryPhotoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, predicate: impl Fn(&PhotoModel) -> bool) -> Vec<PhotoModel> {
        let table = self.table.read().await;
        let mut photos: Vec<PhotoModel> = table
            .rows
            .values()
            .filter(|p| predicate(*p))
            .cloned()
            .collect();
        photos.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        photos
    }
}

#[async_trait]
impl PhotoRepository for InMemoryPhotoRepository {
    #[instrument(skip(self, photo), fields(category = %photo.category))]
    async fn create(&self, photo: &NewPhoto) -> Result<PhotoModel, AppError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let model = PhotoModel {
            id: table.next_id,
            image_url: photo.image_url.clone(),
            caption: photo.caption.clone(),
            album: photo.album.clone(),
            category: photo.category,
            date: Utc::now(),
            tournament_id: photo.tournament_id,
            season_id: photo.season_id,
            player_id: photo.player_id,
        };
        table.rows.insert(model.id, model.clone());

        debug!(photo_id = model.id, "Photo created in memory");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<PhotoModel>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<PhotoModel>, AppError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn list_by_category(
        &self,
        category: PhotoCategory,
    ) -> Result<Vec<PhotoModel>, AppError> {
        Ok(self.filtered(|p| p.category == category).await)
    }

    async fn list_by_tournament(&self, tournament_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        Ok(self
            .filtered(|p| p.tournament_id == Some(tournament_id))
            .await)
    }

    async fn list_by_season(
        &self,
        season_id: i64,
        tournament_ids: &[i64],
    ) -> Result<Vec<PhotoModel>, AppError> {
        Ok(self
            .filtered(|p| {
                p.season_id == Some(season_id)
                    || p.tournament_id.is_some_and(|t| tournament_ids.contains(&t))
            })
            .await)
    }

    async fn list_by_player(&self, player_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        Ok(self.filtered(|p| p.player_id == Some(player_id)).await)
    }

    #[instrument(skip(self, photo), fields(photo_id = photo.id))]
    async fn update(&self, photo: &PhotoModel) -> Result<PhotoModel, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&photo.id) {
            Some(row) => {
                *row = PhotoModel {
                    date: row.date,
                    ..photo.clone()
                };
                Ok(row.clone())
            }
            None => {
                warn!("Photo not found for update in memory");
                Err(AppError::NotFound("Photo not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            warn!("Photo not found for deletion in memory");
            return Err(AppError::NotFound("Photo not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_tournament(&self, tournament_id: i64) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table
            .rows
            .retain(|_, p| p.tournament_id != Some(tournament_id));
        let removed = (before - table.rows.len()) as u64;

        info!(removed, "Tournament photos deleted in memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of photo repository
pub struct PostgresPhotoRepository {
    pool: PgPool,
}

impl PostgresPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PHOTO_COLUMNS: &str =
    "id, image_url, caption, album, category, date, tournament_id, season_id, player_id";

#[async_trait]
impl PhotoRepository for PostgresPhotoRepository {
    #[instrument(skip(self, photo), fields(category = %photo.category))]
    async fn create(&self, photo: &NewPhoto) -> Result<PhotoModel, AppError> {
        let model = sqlx::query_as::<_, PhotoModel>(&format!(
            "INSERT INTO photos (image_url, caption, album, category, tournament_id, season_id, player_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PHOTO_COLUMNS}"
        ))
        .bind(&photo.image_url)
        .bind(&photo.caption)
        .bind(&photo.album)
        .bind(photo.category.as_ref())
        .bind(photo.tournament_id)
        .bind(photo.season_id)
        .bind(photo.player_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!(photo_id = model.id, "Photo created in database");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<PhotoModel>, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list(&self) -> Result<Vec<PhotoModel>, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos ORDER BY date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_category(
        &self,
        category: PhotoCategory,
    ) -> Result<Vec<PhotoModel>, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE category = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(category.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_tournament(&self, tournament_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE tournament_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_season(
        &self,
        season_id: i64,
        tournament_ids: &[i64],
    ) -> Result<Vec<PhotoModel>, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos \
             WHERE season_id = $1 OR tournament_id = ANY($2) ORDER BY date DESC, id DESC"
        ))
        .bind(season_id)
        .bind(tournament_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_by_player(&self, player_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE player_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, photo), fields(photo_id = photo.id))]
    async fn update(&self, photo: &PhotoModel) -> Result<PhotoModel, AppError> {
        sqlx::query_as::<_, PhotoModel>(&format!(
            "UPDATE photos SET image_url = $2, caption = $3, album = $4, category = $5, \
             tournament_id = $6, season_id = $7, player_id = $8 \
             WHERE id = $1 RETURNING {PHOTO_COLUMNS}"
        ))
        .bind(photo.id)
        .bind(&photo.image_url)
        .bind(&photo.caption)
        .bind(&photo.album)
        .bind(photo.category.as_ref())
        .bind(photo.tournament_id)
        .bind(photo.season_id)
        .bind(photo.player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            warn!("Photo not found for deletion");
            return Err(AppError::NotFound("Photo not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_tournament(&self, tournament_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM photos WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        info!(removed = result.rows_affected(), "Tournament photos deleted");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(category: PhotoCategory, tournament_id: Option<i64>, season_id: Option<i64>) -> NewPhoto {
        NewPhoto {
            image_url: "/uploads/fotos/foto-1.jpg".to_string(),
            caption: None,
            album: "Etapa 1".to_string(),
            category,
            tournament_id,
            season_id,
            player_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_by_season_includes_tournament_photos() {
        let repo = InMemoryPhotoRepository::new();
        let direct = repo
            .create(&photo(PhotoCategory::Season, None, Some(1)))
            .await
            .unwrap();
        let via_tournament = repo
            .create(&photo(PhotoCategory::BestMoments, Some(10), None))
            .await
            .unwrap();
        repo.create(&photo(PhotoCategory::Season, Some(20), Some(2)))
            .await
            .unwrap();

        let ids: Vec<i64> = repo
            .list_by_season(1, &[10, 11])
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![via_tournament.id, direct.id]);
    }

    #[tokio::test]
    async fn test_delete_by_tournament_counts_removed() {
        let repo = InMemoryPhotoRepository::new();
        repo.create(&photo(PhotoCategory::Season, Some(3), None))
            .await
            .unwrap();
        repo.create(&photo(PhotoCategory::HallOfFame, Some(3), None))
            .await
            .unwrap();
        repo.create(&photo(PhotoCategory::Season, Some(4), None))
            .await
            .unwrap();

        assert_eq!(repo.delete_by_tournament(3).await.unwrap(), 2);
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(repo.delete_by_tournament(3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let repo = InMemoryPhotoRepository::new();
        repo.create(&photo(PhotoCategory::HallOfFame, None, None))
            .await
            .unwrap();
        repo.create(&photo(PhotoCategory::Season, None, None))
            .await
            .unwrap();

        let hall = repo
            .list_by_category(PhotoCategory::HallOfFame)
            .await
            .unwrap();
        assert_eq!(hall.len(), 1);
        assert_eq!(hall[0].category, PhotoCategory::HallOfFame);
    }
}
