use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, Validate, Validator};

/// JWT claims identifying the authenticated admin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminClaims {
    pub sub: i64, // Admin id
    pub email: String,
    pub name: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .email(Some(self.email.as_str()), "email")
            .check(!self.password.is_empty(), "password", "password is required")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    pub admin: AdminSummary,
}
