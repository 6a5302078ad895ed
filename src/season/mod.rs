pub use handlers::{
    calculate_season_ranking, create_season, current_season, delete_season, get_season,
    list_seasons, season_ranking, update_season,
};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
