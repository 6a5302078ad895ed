pub use handlers::{add_participation, list_participations, remove_participation, update_participation};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
