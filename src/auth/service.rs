use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::verify_password,
    token::TokenConfig,
    types::{AdminClaims, AdminSummary, LoginRequest, LoginResponse},
};
use crate::admin::{repository::AdminRepository, types::AdminResponse};
use crate::shared::AppError;

/// Credential checks and token issuance for admins
pub struct AuthService {
    admins: Arc<dyn AdminRepository>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(admins: Arc<dyn AdminRepository>, token_config: TokenConfig) -> Self {
        Self {
            admins,
            token_config,
        }
    }

    /// Returns the admin (without password hash) when the credentials match
    #[instrument(skip(self, password))]
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AdminResponse>, AppError> {
        let Some(admin) = self.admins.find_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &admin.password_hash).await? {
            Ok(Some(AdminResponse::from(admin)))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let admin = match self
            .validate_credentials(&request.email, &request.password)
            .await?
        {
            Some(admin) => admin,
            None => {
                warn!("Login rejected: invalid credentials");
                return Err(AppError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        let access_token = self
            .token_config
            .create_token(admin.id, &admin.email, &admin.name)?;

        info!(admin_id = admin.id, "Admin logged in");

        Ok(LoginResponse {
            access_token,
            admin: AdminSummary {
                id: admin.id,
                name: admin.name,
                email: admin.email,
            },
        })
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, admin_id: i64) -> Result<AdminResponse, AppError> {
        self.admins
            .get(admin_id)
            .await?
            .map(AdminResponse::from)
            .ok_or_else(|| AppError::Unauthorized("Admin not found".to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminClaims, AppError> {
        self.token_config.validate_token(token)
    }
}
