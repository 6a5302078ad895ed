use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use super::types::{AdminResponse, CreateAdminRequest, UpdateAdminRequest};
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

/// POST /admin
#[instrument(name = "create_admin", skip(state, request))]
pub async fn create_admin(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), AppError> {
    let admin = state.admin_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// GET /admin
#[instrument(name = "list_admins", skip(state))]
pub async fn list_admins(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminResponse>>, AppError> {
    Ok(Json(state.admin_service.list().await?))
}

/// GET /admin/:id
#[instrument(name = "get_admin", skip(state))]
pub async fn get_admin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdminResponse>, AppError> {
    Ok(Json(state.admin_service.get(id).await?))
}

/// PATCH /admin/:id
#[instrument(name = "update_admin", skip(state, request))]
pub async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateAdminRequest>,
) -> Result<Json<AdminResponse>, AppError> {
    Ok(Json(state.admin_service.update(id, request).await?))
}

/// DELETE /admin/:id
#[instrument(name = "delete_admin", skip(state))]
pub async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdminResponse>, AppError> {
    Ok(Json(state.admin_service.delete(id).await?))
}
