pub use handlers::{
    create_player, delete_player, get_player, list_players, most_active_players, player_history,
    player_rankings, player_stats, top_winners, update_player, update_player_statistics,
};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod stats;
pub mod types;
