use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{AdminModel, NewAdmin};
use crate::shared::{map_db_error, AppError};

/// Trait for admin repository operations
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already taken
    async fn create(&self, admin: &NewAdmin) -> Result<AdminModel, AppError>;
    async fn get(&self, id: i64) -> Result<Option<AdminModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminModel>, AppError>;
    async fn list(&self) -> Result<Vec<AdminModel>, AppError>;
    async fn update(&self, admin: &AdminModel) -> Result<AdminModel, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Default)]
struct AdminTable {
    next_id: i64,
    rows: BTreeMap<i64, AdminModel>,
}

/// In-memory implementation of AdminRepository for development and testing
#[derive(Default)]
pub struct InMemoryAdminRepository {
    table: RwLock<AdminTable>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    #[instrument(skip(self, admin), fields(email = %admin.email))]
    async fn create(&self, admin: &NewAdmin) -> Result<AdminModel, AppError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|a| a.email == admin.email) {
            warn!("Admin email already exists in memory");
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        table.next_id += 1;
        let model = AdminModel {
            id: table.next_id,
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
            created_at: Utc::now(),
        };
        table.rows.insert(model.id, model.clone());

        debug!(admin_id = model.id, "Admin created in memory");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<AdminModel>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminModel>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|a| a.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<AdminModel>, AppError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    #[instrument(skip(self, admin), fields(admin_id = admin.id))]
    async fn update(&self, admin: &AdminModel) -> Result<AdminModel, AppError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|a| a.email == admin.email && a.id != admin.id)
        {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
        match table.rows.get_mut(&admin.id) {
            Some(row) => {
                *row = admin.clone();
                Ok(row.clone())
            }
            None => {
                warn!("Admin not found for update in memory");
                Err(AppError::NotFound("Admin not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            warn!("Admin not found for deletion in memory");
            return Err(AppError::NotFound("Admin not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of admin repository
pub struct PostgresAdminRepository {
    pool: PgPool,
}

impl PostgresAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ADMIN_COLUMNS: &str = "id, name, email, password_hash, created_at";

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    #[instrument(skip(self, admin), fields(email = %admin.email))]
    async fn create(&self, admin: &NewAdmin) -> Result<AdminModel, AppError> {
        let model = sqlx::query_as::<_, AdminModel>(&format!(
            "INSERT INTO admins (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        debug!(admin_id = model.id, "Admin created in database");
        Ok(model)
    }

    async fn get(&self, id: i64) -> Result<Option<AdminModel>, AppError> {
        sqlx::query_as::<_, AdminModel>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminModel>, AppError> {
        sqlx::query_as::<_, AdminModel>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list(&self) -> Result<Vec<AdminModel>, AppError> {
        sqlx::query_as::<_, AdminModel>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, admin), fields(admin_id = admin.id))]
    async fn update(&self, admin: &AdminModel) -> Result<AdminModel, AppError> {
        sqlx::query_as::<_, AdminModel>(&format!(
            "UPDATE admins SET name = $2, email = $3, password_hash = $4 WHERE id = $1 RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(admin.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM admins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            warn!("Admin not found for deletion");
            return Err(AppError::NotFound("Admin not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_admin(email: &str) -> NewAdmin {
        NewAdmin {
            name: "Admin".to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryAdminRepository::new();
        let first = repo.create(&new_admin("a@poker.test")).await.unwrap();
        let second = repo.create(&new_admin("b@poker.test")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryAdminRepository::new();
        repo.create(&new_admin("a@poker.test")).await.unwrap();

        let result = repo.create(&new_admin("a@poker.test")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let repo = InMemoryAdminRepository::new();
        repo.create(&new_admin("a@poker.test")).await.unwrap();
        let mut second = repo.create(&new_admin("b@poker.test")).await.unwrap();

        second.email = "a@poker.test".to_string();
        assert!(matches!(
            repo.update(&second).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_admin() {
        let repo = InMemoryAdminRepository::new();
        let result = repo.delete(99).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
