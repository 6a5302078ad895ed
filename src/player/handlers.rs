use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use super::models::PlayerModel;
use super::types::{
    CreatePlayerRequest, LimitQuery, ParticipationHistoryEntry, PlayerDetail,
    PlayerSeasonRanking, PlayerWithStats, UpdatePlayerRequest,
};
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

#[instrument(name = "create_player", skip(state, request))]
pub async fn create_player(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerModel>), AppError> {
    let player = state.player_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerModel>>, AppError> {
    Ok(Json(state.player_service.list().await?))
}

#[instrument(name = "get_player", skip(state))]
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerDetail>, AppError> {
    Ok(Json(state.player_service.get(id).await?))
}

#[instrument(name = "update_player", skip(state, request))]
pub async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdatePlayerRequest>,
) -> Result<Json<PlayerModel>, AppError> {
    Ok(Json(state.player_service.update(id, request).await?))
}

#[instrument(name = "delete_player", skip(state))]
pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerModel>, AppError> {
    Ok(Json(state.player_service.delete(id).await?))
}

/// GET /jogadores/stats
#[instrument(name = "player_stats", skip(state))]
pub async fn player_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerWithStats>>, AppError> {
    Ok(Json(state.player_service.list_with_stats().await?))
}

/// GET /jogadores/top-winners?limit=
#[instrument(name = "top_winners", skip(state))]
pub async fn top_winners(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<PlayerModel>>, AppError> {
    Ok(Json(state.player_service.top_winners(query.resolve()).await?))
}

/// GET /jogadores/most-active?limit=
#[instrument(name = "most_active_players", skip(state))]
pub async fn most_active_players(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<PlayerModel>>, AppError> {
    Ok(Json(state.player_service.most_active(query.resolve()).await?))
}

#[instrument(name = "player_history", skip(state))]
pub async fn player_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ParticipationHistoryEntry>>, AppError> {
    Ok(Json(state.player_service.history(id).await?))
}

#[instrument(name = "player_rankings", skip(state))]
pub async fn player_rankings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<PlayerSeasonRanking>>, AppError> {
    Ok(Json(state.player_service.rankings(id).await?))
}

/// POST /jogadores/:id/update-stats
#[instrument(name = "update_player_statistics", skip(state))]
pub async fn update_player_statistics(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerModel>, AppError> {
    Ok(Json(state.player_service.update_statistics(id).await?))
}
