use axum::{extract::State, Extension, Json};
use tracing::{info, instrument};

use super::types::{AdminClaims, LoginRequest, LoginResponse};
use crate::admin::types::AdminResponse;
use crate::shared::{AppError, AppState};
use crate::validation::ValidatedJson;

/// HTTP handler for admin login
///
/// POST /auth/login
/// Returns a signed access token and the admin summary
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

/// HTTP handler for the authenticated admin's profile
///
/// GET /auth/profile
#[instrument(name = "profile", skip(state, claims), fields(admin_id = claims.sub))]
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
) -> Result<Json<AdminResponse>, AppError> {
    let admin = state.auth_service.profile(claims.sub).await?;
    info!("Profile loaded");
    Ok(Json(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::types::CreateAdminRequest;
    use crate::shared::test_utils::in_memory_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_login_handler() {
        let state = in_memory_state();
        state
            .admin_service
            .create(CreateAdminRequest {
                name: "Dealer".to_string(),
                email: "dealer@poker.test".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let app = Router::new()
            .route("/auth/login", post(login))
            .with_state(state);

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"email": "dealer@poker.test", "password": "secret1"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let login_response: LoginResponse = serde_json::from_slice(&body).unwrap();
        assert!(login_response.access_token.contains('.')); // JWT has dots
        assert_eq!(login_response.admin.email, "dealer@poker.test");
    }

    #[tokio::test]
    async fn test_login_handler_malformed_json() {
        let app = Router::new()
            .route("/auth/login", post(login))
            .with_state(in_memory_state());

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email": "x"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
