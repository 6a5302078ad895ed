use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::AdminModel;
use crate::validation::{FieldError, Validate, Validator};

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for CreateAdminRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .not_blank(Some(self.name.as_str()), "name")
            .email(Some(self.email.as_str()), "email")
            .check(
                self.password.chars().count() >= MIN_PASSWORD_LENGTH,
                "password",
                "password must be at least 6 characters",
            )
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for UpdateAdminRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .not_blank(self.name.as_deref(), "name")
            .email(self.email.as_deref(), "email")
            .check(
                self.password
                    .as_ref()
                    .map_or(true, |p| p.chars().count() >= MIN_PASSWORD_LENGTH),
                "password",
                "password must be at least 6 characters",
            )
            .finish()
    }
}

/// Admin as exposed over HTTP (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminModel> for AdminResponse {
    fn from(admin: AdminModel) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            created_at: admin.created_at,
        }
    }
}
