// Public API - what other modules can use
pub use handlers::{login, profile};
pub use middleware::jwt_auth;
pub use password::{hash_password, verify_password};
pub use token::TokenConfig;
pub use types::AdminClaims;

// Internal modules
mod handlers;
mod middleware;
mod password;
pub mod service;
mod token;
pub mod types;
