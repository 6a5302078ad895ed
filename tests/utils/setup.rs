//! Test application setup - in-memory state, router and an authenticated admin
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use poker_league::{
    admin::types::CreateAdminRequest,
    auth::{types::LoginRequest, TokenConfig},
    build_router,
    photo::upload::UploadConfig,
    AppState, Repositories,
};

pub const ADMIN_EMAIL: &str = "floor@poker.test";
pub const ADMIN_PASSWORD: &str = "dealer-secret";
const TEST_SECRET: &str = "integration-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or_else(|e| {
            panic!(
                "response body is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.bytes)
            )
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub token: String,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// In-memory application with one admin already logged in
    pub async fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let state = AppState::new(
            Repositories::in_memory(),
            TokenConfig::new(TEST_SECRET, 1),
            UploadConfig::new(upload_dir.path()),
        );

        state
            .admin_service
            .create(CreateAdminRequest {
                name: "Floor Manager".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            })
            .await
            .unwrap();
        let login = state
            .auth_service
            .login(LoginRequest {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            })
            .await
            .unwrap();

        let router = build_router(state.clone(), &[]);
        Self {
            state,
            router,
            token: login.access_token,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    fn builder(&self, method: Method, uri: &str, authorized: bool) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        if authorized {
            builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token))
        } else {
            builder
        }
    }

    /// Authorized request with an optional JSON body
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.call_as(method, uri, body, true).await
    }

    pub async fn call_as(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authorized: bool,
    ) -> TestResponse {
        let builder = self.builder(method, uri, authorized);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.call(Method::DELETE, uri, None).await
    }

    /// Authorized multipart POST built from `(name, filename, content_type, bytes)` parts
    pub async fn post_multipart(
        &self,
        uri: &str,
        parts: &[(&str, Option<&str>, Option<&str>, &[u8])],
    ) -> TestResponse {
        let boundary = "poker-league-boundary";
        let mut body = Vec::new();
        for (name, filename, content_type, bytes) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
                ),
            }
            if let Some(content_type) = content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let request = self
            .builder(Method::POST, uri, true)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}
