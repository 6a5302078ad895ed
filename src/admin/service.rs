use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::NewAdmin,
    repository::AdminRepository,
    types::{AdminResponse, CreateAdminRequest, UpdateAdminRequest},
};
use crate::auth::hash_password;
use crate::shared::AppError;

/// Whether `upsert_admin` created a new account or reset an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    PasswordUpdated,
}

/// Service for admin account management
pub struct AdminService {
    repository: Arc<dyn AdminRepository>,
}

impl AdminService {
    pub fn new(repository: Arc<dyn AdminRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateAdminRequest) -> Result<AdminResponse, AppError> {
        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let admin = self
            .repository
            .create(&NewAdmin {
                name: request.name,
                email: request.email,
                password_hash: hash_password(&request.password).await?,
            })
            .await?;

        info!(admin_id = admin.id, "Admin created");
        Ok(admin.into())
    }

    pub async fn list(&self) -> Result<Vec<AdminResponse>, AppError> {
        let admins = self.repository.list().await?;
        Ok(admins.into_iter().map(AdminResponse::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<AdminResponse, AppError> {
        self.repository
            .get(id)
            .await?
            .map(AdminResponse::from)
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateAdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let mut admin = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        if let Some(name) = request.name {
            admin.name = name;
        }
        if let Some(email) = request.email {
            if let Some(existing) = self.repository.find_by_email(&email).await? {
                if existing.id != id {
                    return Err(AppError::Conflict("Email already in use".to_string()));
                }
            }
            admin.email = email;
        }
        if let Some(password) = request.password {
            admin.password_hash = hash_password(&password).await?;
        }

        let updated = self.repository.update(&admin).await?;
        info!(admin_id = id, "Admin updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<AdminResponse, AppError> {
        let admin = self.get(id).await?;
        self.repository.delete(id).await?;
        info!(admin_id = id, "Admin deleted");
        Ok(admin)
    }

    /// Idempotent bootstrap: creates the admin, or re-hashes the password of an
    /// existing admin with the same email
    #[instrument(skip(self, name, password))]
    pub async fn upsert_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(AdminResponse, UpsertOutcome), AppError> {
        let password_hash = hash_password(password).await?;

        match self.repository.find_by_email(email).await? {
            Some(mut existing) => {
                existing.password_hash = password_hash;
                let updated = self.repository.update(&existing).await?;
                info!(admin_id = updated.id, "Admin password updated");
                Ok((updated.into(), UpsertOutcome::PasswordUpdated))
            }
            None => {
                let created = self
                    .repository
                    .create(&NewAdmin {
                        name: name.to_string(),
                        email: email.to_string(),
                        password_hash,
                    })
                    .await?;
                info!(admin_id = created.id, "Admin created");
                Ok((created.into(), UpsertOutcome::Created))
            }
        }
    }
}
