use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use super::models::SeasonModel;
use super::types::{CreateSeasonRequest, SeasonOverview, UpdateSeasonRequest};
use crate::ranking::RankingEntry;
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

#[instrument(name = "create_season", skip(state, request))]
pub async fn create_season(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSeasonRequest>,
) -> Result<(StatusCode, Json<SeasonModel>), AppError> {
    let season = state.season_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(season)))
}

#[instrument(name = "list_seasons", skip(state))]
pub async fn list_seasons(
    State(state): State<AppState>,
) -> Result<Json<Vec<SeasonOverview>>, AppError> {
    Ok(Json(state.season_service.list().await?))
}

/// GET /temporadas/current
#[instrument(name = "current_season", skip(state))]
pub async fn current_season(
    State(state): State<AppState>,
) -> Result<Json<SeasonOverview>, AppError> {
    Ok(Json(state.season_service.current().await?))
}

#[instrument(name = "get_season", skip(state))]
pub async fn get_season(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SeasonOverview>, AppError> {
    Ok(Json(state.season_service.get(id).await?))
}

/// GET /temporadas/:id/ranking
#[instrument(name = "season_ranking", skip(state))]
pub async fn season_ranking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    Ok(Json(state.season_service.top_ranking(id).await?))
}

/// POST /temporadas/:id/calculate-ranking
#[instrument(name = "calculate_season_ranking", skip(state))]
pub async fn calculate_season_ranking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    Ok(Json(state.season_service.calculate_ranking(id).await?))
}

#[instrument(name = "update_season", skip(state, request))]
pub async fn update_season(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateSeasonRequest>,
) -> Result<Json<SeasonModel>, AppError> {
    Ok(Json(state.season_service.update(id, request).await?))
}

#[instrument(name = "delete_season", skip(state))]
pub async fn delete_season(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SeasonModel>, AppError> {
    Ok(Json(state.season_service.delete(id).await?))
}
