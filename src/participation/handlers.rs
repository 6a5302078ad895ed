use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::types::{
    AddParticipationRequest, ParticipationDetail, ParticipationWithPlayer,
    UpdateParticipationRequest,
};
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

/// GET /torneios/:id/participacoes
#[instrument(name = "list_participations", skip(state))]
pub async fn list_participations(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> Result<Json<Vec<ParticipationWithPlayer>>, AppError> {
    Ok(Json(state.participation_service.list(tournament_id).await?))
}

/// POST /torneios/:id/participacoes
#[instrument(name = "add_participation", skip(state, request))]
pub async fn add_participation(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
    ValidatedJson(request): ValidatedJson<AddParticipationRequest>,
) -> Result<(StatusCode, Json<ParticipationDetail>), AppError> {
    let detail = state
        .participation_service
        .add(tournament_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PATCH /torneios/:id/participacoes/:jogadorId
#[instrument(name = "update_participation", skip(state, request))]
pub async fn update_participation(
    State(state): State<AppState>,
    Path((tournament_id, player_id)): Path<(i64, i64)>,
    ValidatedJson(request): ValidatedJson<UpdateParticipationRequest>,
) -> Result<Json<ParticipationDetail>, AppError> {
    let detail = state
        .participation_service
        .update(tournament_id, player_id, request)
        .await?;
    Ok(Json(detail))
}

/// DELETE /torneios/:id/participacoes/:jogadorId
#[instrument(name = "remove_participation", skip(state))]
pub async fn remove_participation(
    State(state): State<AppState>,
    Path((tournament_id, player_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    state
        .participation_service
        .remove(tournament_id, player_id)
        .await?;
    Ok(Json(json!({ "message": "Participation removed" })))
}
