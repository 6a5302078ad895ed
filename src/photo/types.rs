use serde::{Deserialize, Serialize};

use super::models::{PhotoCategory, PhotoModel};
use crate::validation::{FieldError, Validate, Validator};

#[derive(Debug, Default, Deserialize)]
pub struct CreatePhotoRequest {
    pub image_url: String,
    pub caption: Option<String>,
    pub album: String,
    /// Defaults to `SEASON`
    pub category: Option<PhotoCategory>,
    pub tournament_id: Option<i64>,
    pub season_id: Option<i64>,
    pub player_id: Option<i64>,
}

impl Validate for CreatePhotoRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .not_blank(Some(self.image_url.as_str()), "image_url")
            .not_blank(Some(self.album.as_str()), "album")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePhotoRequest {
    pub image_url: Option<String>,
    pub caption: Option<String>,
    pub album: Option<String>,
    pub category: Option<PhotoCategory>,
    pub tournament_id: Option<i64>,
    pub season_id: Option<i64>,
    pub player_id: Option<i64>,
}

impl Validate for UpdatePhotoRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .not_blank(self.image_url.as_deref(), "image_url")
            .not_blank(self.album.as_deref(), "album")
            .finish()
    }
}

/// All photos split by category
#[derive(Debug, Clone, Default, Serialize)]
pub struct Gallery {
    pub season: Vec<PhotoModel>,
    pub hall_of_fame: Vec<PhotoModel>,
    pub best_moments: Vec<PhotoModel>,
}

impl Gallery {
    pub fn from_photos(photos: Vec<PhotoModel>) -> Self {
        let mut gallery = Self::default();
        for photo in photos {
            match photo.category {
                PhotoCategory::Season => gallery.season.push(photo),
                PhotoCategory::HallOfFame => gallery.hall_of_fame.push(photo),
                PhotoCategory::BestMoments => gallery.best_moments.push(photo),
            }
        }
        gallery
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedPhotos {
    pub deleted: u64,
}
