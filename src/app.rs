use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::photo::upload::{MAX_UPLOAD_BYTES, PUBLIC_URL_PREFIX};
use crate::shared::{error_envelope, AppState};
use crate::{admin, auth, participation, photo, player, season, tournament};

/// Multipart framing on top of the image itself
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes reachable without a token
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/public/fotos/galeria", get(photo::photo_gallery))
        .route("/public/fotos/categoria/:category", get(photo::photos_by_category))
        .route("/public/fotos/temporada/:id", get(photo::photos_by_season))
        .route("/public/fotos/torneio/:id", get(photo::photos_by_tournament))
}

/// Routes behind `jwt_auth`
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/profile", get(auth::profile))
        // admins
        .route("/admin", post(admin::create_admin).get(admin::list_admins))
        .route(
            "/admin/:id",
            get(admin::get_admin)
                .patch(admin::update_admin)
                .delete(admin::delete_admin),
        )
        .route(
            "/admin/fotos/upload",
            post(photo::upload_photo).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // seasons
        .route(
            "/temporadas",
            post(season::create_season).get(season::list_seasons),
        )
        .route("/temporadas/current", get(season::current_season))
        .route(
            "/temporadas/:id",
            get(season::get_season)
                .patch(season::update_season)
                .delete(season::delete_season),
        )
        .route("/temporadas/:id/ranking", get(season::season_ranking))
        .route(
            "/temporadas/:id/calculate-ranking",
            post(season::calculate_season_ranking),
        )
        // tournaments and participations
        .route(
            "/torneios",
            post(tournament::create_tournament).get(tournament::list_tournaments),
        )
        .route(
            "/torneios/temporada/:id",
            get(tournament::list_season_tournaments),
        )
        .route(
            "/torneios/:id",
            get(tournament::get_tournament)
                .patch(tournament::update_tournament)
                .delete(tournament::delete_tournament),
        )
        .route(
            "/torneios/:id/participacoes",
            get(participation::list_participations).post(participation::add_participation),
        )
        .route(
            "/torneios/:id/participacoes/:player_id",
            patch(participation::update_participation)
                .delete(participation::remove_participation),
        )
        // players
        .route(
            "/jogadores",
            post(player::create_player).get(player::list_players),
        )
        .route("/jogadores/stats", get(player::player_stats))
        .route("/jogadores/top-winners", get(player::top_winners))
        .route("/jogadores/most-active", get(player::most_active_players))
        .route(
            "/jogadores/:id",
            get(player::get_player)
                .patch(player::update_player)
                .delete(player::delete_player),
        )
        .route("/jogadores/:id/history", get(player::player_history))
        .route("/jogadores/:id/rankings", get(player::player_rankings))
        .route(
            "/jogadores/:id/update-stats",
            post(player::update_player_statistics),
        )
        // photos
        .route("/fotos", post(photo::create_photo).get(photo::list_photos))
        .route("/fotos/galeria", get(photo::photo_gallery))
        .route("/fotos/categoria/:category", get(photo::photos_by_category))
        .route(
            "/fotos/torneio/:id",
            get(photo::photos_by_tournament).delete(photo::delete_tournament_photos),
        )
        .route("/fotos/temporada/:id", get(photo::photos_by_season))
        .route("/fotos/jogador/:id", get(photo::photos_by_player))
        .route(
            "/fotos/:id",
            get(photo::get_photo)
                .patch(photo::update_photo)
                .delete(photo::delete_photo),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the full HTTP surface: the JSON API under `/api` plus the uploaded
/// photo files under `/uploads/fotos`
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let uploads = ServeDir::new(&state.upload_config.dir);

    let api = public_routes().merge(protected_routes(&state));

    Router::new()
        .nest("/api", api)
        .nest_service(PUBLIC_URL_PREFIX, uploads)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(middleware::from_fn(error_envelope))
}
