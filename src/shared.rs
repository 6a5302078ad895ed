use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{error, warn};

use crate::admin::{
    repository::{AdminRepository, InMemoryAdminRepository, PostgresAdminRepository},
    service::AdminService,
};
use crate::auth::{service::AuthService, TokenConfig};
use crate::participation::{
    repository::{
        InMemoryParticipationRepository, ParticipationRepository, PostgresParticipationRepository,
    },
    service::ParticipationService,
};
use crate::photo::{
    repository::{InMemoryPhotoRepository, PhotoRepository, PostgresPhotoRepository},
    service::PhotoService,
    upload::UploadConfig,
};
use crate::player::{
    repository::{InMemoryPlayerRepository, PlayerRepository, PostgresPlayerRepository},
    service::PlayerService,
};
use crate::ranking::{
    repository::{InMemoryRankingRepository, PostgresRankingRepository, RankingRepository},
    service::RankingService,
};
use crate::season::{
    repository::{InMemorySeasonRepository, PostgresSeasonRepository, SeasonRepository},
    service::SeasonService,
};
use crate::tournament::{
    repository::{InMemoryTournamentRepository, PostgresTournamentRepository, TournamentRepository},
    service::TournamentService,
};
use crate::validation::FieldError;

/// One handle per table; swapping the backing store is a matter of picking a constructor
#[derive(Clone)]
pub struct Repositories {
    pub admins: Arc<dyn AdminRepository>,
    pub seasons: Arc<dyn SeasonRepository>,
    pub tournaments: Arc<dyn TournamentRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub participations: Arc<dyn ParticipationRepository>,
    pub rankings: Arc<dyn RankingRepository>,
    pub photos: Arc<dyn PhotoRepository>,
}

impl Repositories {
    /// In-memory tables for development and tests (no referential integrity)
    pub fn in_memory() -> Self {
        Self {
            admins: Arc::new(InMemoryAdminRepository::new()),
            seasons: Arc::new(InMemorySeasonRepository::new()),
            tournaments: Arc::new(InMemoryTournamentRepository::new()),
            players: Arc::new(InMemoryPlayerRepository::new()),
            participations: Arc::new(InMemoryParticipationRepository::new()),
            rankings: Arc::new(InMemoryRankingRepository::new()),
            photos: Arc::new(InMemoryPhotoRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            admins: Arc::new(PostgresAdminRepository::new(pool.clone())),
            seasons: Arc::new(PostgresSeasonRepository::new(pool.clone())),
            tournaments: Arc::new(PostgresTournamentRepository::new(pool.clone())),
            players: Arc::new(PostgresPlayerRepository::new(pool.clone())),
            participations: Arc::new(PostgresParticipationRepository::new(pool.clone())),
            rankings: Arc::new(PostgresRankingRepository::new(pool.clone())),
            photos: Arc::new(PostgresPhotoRepository::new(pool)),
        }
    }
}

/// Shared application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub admin_service: Arc<AdminService>,
    pub season_service: Arc<SeasonService>,
    pub tournament_service: Arc<TournamentService>,
    pub participation_service: Arc<ParticipationService>,
    pub player_service: Arc<PlayerService>,
    pub ranking_service: Arc<RankingService>,
    pub photo_service: Arc<PhotoService>,
    pub upload_config: UploadConfig,
    /// Raw table handles the services were built from
    pub repositories: Repositories,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        token_config: TokenConfig,
        upload_config: UploadConfig,
    ) -> Self {
        let season_locks = KeyedLocks::new();
        let player_locks = KeyedLocks::new();

        let ranking_service = Arc::new(RankingService::new(
            Arc::clone(&repositories.rankings),
            Arc::clone(&repositories.seasons),
            Arc::clone(&repositories.tournaments),
            Arc::clone(&repositories.participations),
            Arc::clone(&repositories.players),
        ));
        let player_service = Arc::new(PlayerService::new(
            Arc::clone(&repositories.players),
            Arc::clone(&repositories.participations),
            Arc::clone(&repositories.rankings),
            Arc::clone(&repositories.tournaments),
            Arc::clone(&repositories.seasons),
            Arc::clone(&ranking_service),
            season_locks.clone(),
            player_locks,
        ));
        let participation_service = Arc::new(ParticipationService::new(
            Arc::clone(&repositories.participations),
            Arc::clone(&repositories.tournaments),
            Arc::clone(&repositories.players),
            Arc::clone(&repositories.seasons),
            Arc::clone(&ranking_service),
            Arc::clone(&player_service),
            season_locks.clone(),
        ));
        let tournament_service = Arc::new(TournamentService::new(
            Arc::clone(&repositories.tournaments),
            Arc::clone(&repositories.seasons),
            Arc::clone(&repositories.participations),
            Arc::clone(&repositories.players),
            Arc::clone(&repositories.photos),
            season_locks.clone(),
        ));
        let season_service = Arc::new(SeasonService::new(
            Arc::clone(&repositories.seasons),
            Arc::clone(&repositories.tournaments),
            Arc::clone(&ranking_service),
            season_locks,
        ));

        Self {
            auth_service: Arc::new(AuthService::new(
                Arc::clone(&repositories.admins),
                token_config,
            )),
            admin_service: Arc::new(AdminService::new(Arc::clone(&repositories.admins))),
            season_service,
            tournament_service,
            participation_service,
            player_service,
            ranking_service,
            photo_service: Arc::new(PhotoService::new(
                Arc::clone(&repositories.photos),
                Arc::clone(&repositories.tournaments),
            )),
            upload_config,
            repositories,
        }
    }
}

/// Async mutexes keyed by entity id, created on first use
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<RwLock<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_for(&self, key: i64) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.locks.read().await;
            if let Some(lock) = guard.get(&key) {
                return lock.clone();
            }
        }

        let mut guard = self.locks.write().await;
        guard
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

/// What the client gets told about an error; attached to the response so the
/// envelope middleware can add the request path
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub errors: Vec<FieldError>,
}

/// Uniform JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub timestamp: String,
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorField>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorField {
    pub field: String,
    pub message: String,
}

impl ErrorEnvelope {
    fn new(status: StatusCode, path: String, detail: ErrorDetail) -> Self {
        Self {
            status_code: status.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            path,
            message: detail.message,
            errors: detail
                .errors
                .into_iter()
                .map(|e| ErrorField {
                    field: e.field,
                    message: e.message,
                })
                .collect(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JwtError(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::CapacityExceeded(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(self) -> ErrorDetail {
        let (message, errors) = match self {
            AppError::JwtError(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::CapacityExceeded(msg)
            | AppError::BadRequest(msg) => (msg, Vec::new()),
            AppError::Validation(errors) => ("Validation failed".to_string(), errors),
            // Store details stay in the logs
            AppError::DatabaseError(_) | AppError::Internal => {
                ("Internal server error".to_string(), Vec::new())
            }
        };
        ErrorDetail { message, errors }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed with server error");
        }

        let detail = self.detail();
        let mut response =
            (status, Json(ErrorEnvelope::new(status, String::new(), detail.clone()))).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

/// Translates store failures into the error taxonomy
pub fn map_db_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        match db_error.code().as_deref() {
            Some("23505") => {
                warn!(error = %db_error, "Unique constraint violated");
                return AppError::Conflict(match db_error.constraint() {
                    Some(constraint) => format!(
                        "A record with this information already exists ({constraint})"
                    ),
                    None => "A record with this information already exists".to_string(),
                });
            }
            Some("23503") => {
                warn!(error = %db_error, "Foreign key constraint violated");
                return AppError::BadRequest(
                    "Operation violated a foreign key constraint".to_string(),
                );
            }
            _ => {}
        }
    }

    if matches!(error, sqlx::Error::RowNotFound) {
        return AppError::NotFound("Record not found".to_string());
    }

    warn!(error = %error, "Database operation failed");
    AppError::DatabaseError(error.to_string())
}

/// Rewrites every 4xx/5xx response into an `ErrorEnvelope` carrying the request path.
/// Framework rejections (bad path params, unknown routes) are wrapped too.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let detail = match parts.extensions.get::<ErrorDetail>() {
        Some(detail) => detail.clone(),
        None => {
            let bytes = axum::body::to_bytes(body, 64 * 1024)
                .await
                .unwrap_or_default();
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            ErrorDetail {
                message: if text.is_empty() {
                    status.canonical_reason().unwrap_or("Error").to_string()
                } else {
                    text
                },
                errors: Vec::new(),
            }
        }
    };

    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), message = %detail.message, "Request failed");
    } else {
        warn!(%method, %path, status = status.as_u16(), message = %detail.message, "Request rejected");
    }

    let mut response = (status, Json(ErrorEnvelope::new(status, path, detail))).into_response();
    for (name, value) in parts.headers.iter() {
        if name.as_str().starts_with("access-control-") || name == "www-authenticate" {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
    response
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::ranking::models::RankingModel;
    use crate::ranking::repository::RankingRepository;
    use async_trait::async_trait;

    pub const TEST_SECRET: &str = "test-secret";

    pub fn test_token_config() -> TokenConfig {
        TokenConfig::new(TEST_SECRET, 1)
    }

    pub fn in_memory_state() -> AppState {
        AppState::new(
            Repositories::in_memory(),
            test_token_config(),
            UploadConfig::new(std::env::temp_dir().join("poker-league-test-uploads")),
        )
    }

    /// Ranking repository whose writes always fail - for exercising the
    /// no-rollback behaviour of the participation workflow
    pub struct FailingRankingRepository;

    #[async_trait]
    impl RankingRepository for FailingRankingRepository {
        async fn list_by_season(&self, _season_id: i64) -> Result<Vec<RankingModel>, AppError> {
            Ok(Vec::new())
        }
        async fn list_by_player(&self, _player_id: i64) -> Result<Vec<RankingModel>, AppError> {
            Ok(Vec::new())
        }
        async fn upsert(&self, _ranking: &RankingModel) -> Result<(), AppError> {
            Err(AppError::DatabaseError("ranking table unavailable".to_string()))
        }
        async fn delete(&self, _season_id: i64, _player_id: i64) -> Result<(), AppError> {
            Err(AppError::DatabaseError("ranking table unavailable".to_string()))
        }
    }
}
