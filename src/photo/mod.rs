pub use handlers::{
    create_photo, delete_photo, delete_tournament_photos, get_photo, list_photos, photo_gallery,
    photos_by_category, photos_by_player, photos_by_season, photos_by_tournament, update_photo,
    upload_photo,
};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
pub mod upload;
