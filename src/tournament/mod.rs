pub use handlers::{
    create_tournament, delete_tournament, get_tournament, list_season_tournaments,
    list_tournaments, update_tournament,
};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
