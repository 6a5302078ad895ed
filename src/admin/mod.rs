pub use handlers::{create_admin, delete_admin, get_admin, list_admins, update_admin};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
