use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{NewPhoto, PhotoCategory, PhotoModel},
    repository::PhotoRepository,
    types::{CreatePhotoRequest, Gallery, UpdatePhotoRequest},
};
use crate::shared::AppError;
use crate::tournament::repository::TournamentRepository;

/// Photo records and the gallery views built on them
pub struct PhotoService {
    photos: Arc<dyn PhotoRepository>,
    tournaments: Arc<dyn TournamentRepository>,
}

impl PhotoService {
    pub fn new(photos: Arc<dyn PhotoRepository>, tournaments: Arc<dyn TournamentRepository>) -> Self {
        Self {
            photos,
            tournaments,
        }
    }

    #[instrument(skip(self, request), fields(album = %request.album))]
    pub async fn create(&self, request: CreatePhotoRequest) -> Result<PhotoModel, AppError> {
        let photo = self
            .photos
            .create(&NewPhoto {
                image_url: request.image_url.trim().to_string(),
                caption: request.caption,
                album: request.album.trim().to_string(),
                category: request.category.unwrap_or_default(),
                tournament_id: request.tournament_id,
                season_id: request.season_id,
                player_id: request.player_id,
            })
            .await?;

        info!(photo_id = photo.id, category = %photo.category, "Photo created");
        Ok(photo)
    }

    pub async fn list(&self) -> Result<Vec<PhotoModel>, AppError> {
        self.photos.list().await
    }

    pub async fn get(&self, id: i64) -> Result<PhotoModel, AppError> {
        self.photos
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i64, request: UpdatePhotoRequest) -> Result<PhotoModel, AppError> {
        let mut photo = self.get(id).await?;

        if let Some(image_url) = request.image_url {
            photo.image_url = image_url.trim().to_string();
        }
        if request.caption.is_some() {
            photo.caption = request.caption;
        }
        if let Some(album) = request.album {
            photo.album = album.trim().to_string();
        }
        if let Some(category) = request.category {
            photo.category = category;
        }
        if request.tournament_id.is_some() {
            photo.tournament_id = request.tournament_id;
        }
        if request.season_id.is_some() {
            photo.season_id = request.season_id;
        }
        if request.player_id.is_some() {
            photo.player_id = request.player_id;
        }

        let photo = self.photos.update(&photo).await?;
        info!(photo_id = id, "Photo updated");
        Ok(photo)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<PhotoModel, AppError> {
        let photo = self.get(id).await?;
        self.photos.delete(id).await?;
        info!(photo_id = id, "Photo deleted");
        Ok(photo)
    }

    pub async fn gallery(&self) -> Result<Gallery, AppError> {
        Ok(Gallery::from_photos(self.photos.list().await?))
    }

    /// Unknown category labels fall back to the season section
    #[instrument(skip(self))]
    pub async fn by_category(&self, raw: &str) -> Result<Vec<PhotoModel>, AppError> {
        self.photos
            .list_by_category(PhotoCategory::parse_lenient(raw))
            .await
    }

    pub async fn by_tournament(&self, tournament_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        self.photos.list_by_tournament(tournament_id).await
    }

    /// Tagged with the season itself or with any of its tournaments
    pub async fn by_season(&self, season_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        let tournament_ids: Vec<i64> = self
            .tournaments
            .list_by_season(season_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        self.photos.list_by_season(season_id, &tournament_ids).await
    }

    pub async fn by_player(&self, player_id: i64) -> Result<Vec<PhotoModel>, AppError> {
        self.photos.list_by_player(player_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_tournament(&self, tournament_id: i64) -> Result<u64, AppError> {
        self.photos.delete_by_tournament(tournament_id).await
    }
}
