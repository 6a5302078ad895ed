// Library crate for the poker league backend
// This file exposes the public API for the server binary, the seed CLI and integration tests

pub mod admin;
pub mod app;
pub mod auth;
pub mod config;
pub mod participation;
pub mod photo;
pub mod player;
pub mod ranking;
pub mod season;
pub mod shared;
pub mod tournament;
pub mod validation;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::AppConfig;
pub use shared::{AppError, AppState, Repositories};
