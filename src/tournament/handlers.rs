use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use super::models::TournamentModel;
use super::types::{
    CreateTournamentRequest, TournamentDetail, TournamentSummary, TournamentWithSeason,
    UpdateTournamentRequest,
};
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

#[instrument(name = "create_tournament", skip(state, request))]
pub async fn create_tournament(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<TournamentWithSeason>), AppError> {
    let tournament = state.tournament_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

#[instrument(name = "list_tournaments", skip(state))]
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<TournamentSummary>>, AppError> {
    Ok(Json(state.tournament_service.list().await?))
}

/// GET /torneios/temporada/:seasonId
#[instrument(name = "list_season_tournaments", skip(state))]
pub async fn list_season_tournaments(
    State(state): State<AppState>,
    Path(season_id): Path<i64>,
) -> Result<Json<Vec<TournamentSummary>>, AppError> {
    Ok(Json(state.tournament_service.list_by_season(season_id).await?))
}

#[instrument(name = "get_tournament", skip(state))]
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TournamentDetail>, AppError> {
    Ok(Json(state.tournament_service.get(id).await?))
}

#[instrument(name = "update_tournament", skip(state, request))]
pub async fn update_tournament(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateTournamentRequest>,
) -> Result<Json<TournamentWithSeason>, AppError> {
    Ok(Json(state.tournament_service.update(id, request).await?))
}

#[instrument(name = "delete_tournament", skip(state))]
pub async fn delete_tournament(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TournamentModel>, AppError> {
    Ok(Json(state.tournament_service.delete(id).await?))
}
