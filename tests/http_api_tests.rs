//! HTTP-level tests through the full router: auth guard, error envelope,
//! status codes and the photo upload path

mod utils;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use utils::setup::{ADMIN_EMAIL, ADMIN_PASSWORD};
use utils::{assert_envelope, TestApp};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

async fn create_season(app: &TestApp, year: i32) -> i64 {
    let response = app
        .post("/api/temporadas", json!({ "name": format!("Season {year}"), "year": year }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["id"].as_i64().unwrap()
}

async fn create_tournament(app: &TestApp, season_id: i64, name: &str) -> Value {
    app.post(
        "/api/torneios",
        json!({
            "season_id": season_id,
            "name": name,
            "date_time": "2024-03-01T20:00:00Z",
            "location": "Club",
        }),
    )
    .await
    .json()
}

async fn create_player(app: &TestApp, name: &str) -> i64 {
    let response = app.post("/api/jogadores", json!({ "name": name })).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_login_issues_token_and_rejects_bad_password() {
    let app = TestApp::new().await;

    let ok = app
        .call_as(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            false,
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    let body = ok.json();
    assert!(body["access_token"].as_str().unwrap().contains('.'));
    assert_eq!(body["admin"]["email"], ADMIN_EMAIL);
    assert!(body["admin"].get("password_hash").is_none());

    let bad = app
        .call_as(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": ADMIN_EMAIL, "password": "wrong-password" })),
            false,
        )
        .await;
    assert_envelope(&bad, StatusCode::UNAUTHORIZED, "/api/auth/login");
}

#[tokio::test]
async fn test_protected_routes_reject_missing_and_forged_tokens() {
    let app = TestApp::new().await;

    let missing = app
        .call_as(Method::GET, "/api/jogadores", None, false)
        .await;
    assert_envelope(&missing, StatusCode::UNAUTHORIZED, "/api/jogadores");

    let forged = app
        .send(
            axum::http::Request::builder()
                .uri("/api/auth/profile")
                .header("Authorization", "Bearer not.a.token")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_envelope(&forged, StatusCode::UNAUTHORIZED, "/api/auth/profile");

    let profile = app.get("/api/auth/profile").await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.json()["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_validation_errors_list_each_field() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/temporadas", json!({ "name": " ", "year": 2019 }))
        .await;
    let message = assert_envelope(&response, StatusCode::BAD_REQUEST, "/api/temporadas");
    assert_eq!(message, "Validation failed");

    let fields: Vec<String> = response.json()["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"year".to_string()));
}

#[tokio::test]
async fn test_framework_rejections_use_the_envelope() {
    let app = TestApp::new().await;

    let bad_param = app.get("/api/temporadas/not-a-number").await;
    assert_envelope(&bad_param, StatusCode::BAD_REQUEST, "/api/temporadas/not-a-number");

    let bad_json = app
        .send(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/api/jogadores")
                .header("Authorization", format!("Bearer {}", app.token))
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{\"name\": "))
                .unwrap(),
        )
        .await;
    assert_envelope(&bad_json, StatusCode::BAD_REQUEST, "/api/jogadores");

    let missing = app.get("/api/temporadas/999").await;
    assert_envelope(&missing, StatusCode::NOT_FOUND, "/api/temporadas/999");
}

#[tokio::test]
async fn test_participation_flow_over_http() {
    let app = TestApp::new().await;
    let season_id = create_season(&app, 2024).await;
    let first = create_tournament(&app, season_id, "Stage 1").await["id"]
        .as_i64()
        .unwrap();
    let second = create_tournament(&app, season_id, "Stage 2").await["id"]
        .as_i64()
        .unwrap();
    let ana = create_player(&app, "Ana").await;
    let bruno = create_player(&app, "Bruno").await;

    for (tournament, player, position, score) in [
        (first, ana, 1, 100),
        (first, bruno, 2, 80),
        (second, ana, 2, 50),
        (second, bruno, 1, 80),
    ] {
        let response = app
            .post(
                &format!("/api/torneios/{tournament}/participacoes"),
                json!({ "player_id": player, "position": position, "score": score }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let ranking = app
        .get(&format!("/api/temporadas/{season_id}/ranking"))
        .await
        .json();
    let ranking = ranking.as_array().unwrap();
    assert_eq!(ranking[0]["player_id"], bruno);
    assert_eq!(ranking[0]["position"], 1);
    assert_eq!(ranking[0]["score"], 160);
    assert_eq!(ranking[0]["player"]["name"], "Bruno");
    assert_eq!(ranking[1]["player_id"], ana);
    assert_eq!(ranking[1]["score"], 150);

    let duplicate = app
        .post(
            &format!("/api/torneios/{first}/participacoes"),
            json!({ "player_id": ana, "position": 4, "score": 1 }),
        )
        .await;
    assert_envelope(
        &duplicate,
        StatusCode::CONFLICT,
        &format!("/api/torneios/{first}/participacoes"),
    );

    let updated = app
        .patch(
            &format!("/api/torneios/{second}/participacoes/{ana}"),
            json!({ "score": 90 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["season"]["id"], season_id);

    let ranking = app
        .get(&format!("/api/temporadas/{season_id}/ranking"))
        .await
        .json();
    assert_eq!(ranking[0]["player_id"], ana);
    assert_eq!(ranking[0]["score"], 190);

    let removed = app
        .delete(&format!("/api/torneios/{first}/participacoes/{bruno}"))
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let stats = app.get(&format!("/api/jogadores/{bruno}")).await.json();
    assert_eq!(stats["total_tournaments"], 1);
    assert_eq!(stats["total_score"], 80);
    assert_eq!(stats["wins"], 1);

    let listed = app
        .get(&format!("/api/torneios/{first}/participacoes"))
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_participant_is_not_found() {
    let app = TestApp::new().await;
    let season_id = create_season(&app, 2024).await;
    let tournament = create_tournament(&app, season_id, "Stage 1").await["id"]
        .as_i64()
        .unwrap();

    let missing_player = app
        .post(
            &format!("/api/torneios/{tournament}/participacoes"),
            json!({ "player_id": 77, "position": 1, "score": 10 }),
        )
        .await;
    assert_eq!(missing_player.status, StatusCode::NOT_FOUND);

    let missing_tournament = app
        .post(
            "/api/torneios/555/participacoes",
            json!({ "player_id": 1, "position": 1, "score": 10 }),
        )
        .await;
    assert_eq!(missing_tournament.status, StatusCode::NOT_FOUND);

    let missing_removal = app
        .delete(&format!("/api/torneios/{tournament}/participacoes/77"))
        .await;
    assert_eq!(missing_removal.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_season_capacity_is_a_bad_request() {
    let app = TestApp::new().await;
    let season_id = create_season(&app, 2024).await;
    for index in 0..12 {
        let tournament = create_tournament(&app, season_id, &format!("Stage {index}")).await;
        assert!(tournament["id"].is_i64());
    }

    let response = app
        .post(
            "/api/torneios",
            json!({
                "season_id": season_id,
                "name": "Stage 13",
                "date_time": "2024-12-20T20:00:00Z",
                "location": "Club",
            }),
        )
        .await;
    assert_envelope(&response, StatusCode::BAD_REQUEST, "/api/torneios");

    let listed = app
        .get(&format!("/api/torneios/temporada/{season_id}"))
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_manual_recompute_endpoints() {
    let app = TestApp::new().await;
    let season_id = create_season(&app, 2024).await;
    let player = create_player(&app, "Ana").await;

    let ranking = app
        .post(&format!("/api/temporadas/{season_id}/calculate-ranking"), json!({}))
        .await;
    assert_eq!(ranking.status, StatusCode::OK);
    assert_eq!(ranking.json(), json!([]));

    let stats = app
        .post(&format!("/api/jogadores/{player}/update-stats"), json!({}))
        .await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.json()["total_tournaments"], 0);

    let missing = app
        .post("/api/temporadas/404/calculate-ranking", json!({}))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_admin_email_conflicts() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/admin",
            json!({ "name": "Other", "email": ADMIN_EMAIL, "password": "another-secret" }),
        )
        .await;
    assert_envelope(&response, StatusCode::CONFLICT, "/api/admin");

    let created = app
        .post(
            "/api/admin",
            json!({ "name": "Dealer", "email": "dealer@poker.test", "password": "another-secret" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert!(created.json().get("password_hash").is_none());
}

#[tokio::test]
async fn test_upload_stores_file_and_serves_it() {
    let app = TestApp::new().await;

    let response = app
        .post_multipart(
            "/api/admin/fotos/upload",
            &[
                ("file", Some("final-table.png"), Some("image/png"), PNG_BYTES),
                ("album", None, None, b"Final 2024".as_slice()),
                ("category", None, None, b"HALL_DA_FAMA".as_slice()),
                ("caption", None, None, b"Heads up".as_slice()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let photo = response.json();
    assert_eq!(photo["category"], "HALL_OF_FAME");
    assert_eq!(photo["album"], "Final 2024");

    let url = photo["image_url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/fotos/foto-"));
    assert!(url.ends_with(".png"));

    let filename = url.rsplit('/').next().unwrap();
    let on_disk = std::fs::read(app.upload_dir.path().join(filename)).unwrap();
    assert_eq!(on_disk, PNG_BYTES);

    let served = app.call_as(Method::GET, &url, None, false).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.bytes, PNG_BYTES);

    let gallery = app
        .call_as(Method::GET, "/api/public/fotos/galeria", None, false)
        .await
        .json();
    assert_eq!(gallery["hall_of_fame"].as_array().unwrap().len(), 1);
    assert!(gallery["season"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_non_images_and_missing_files() {
    let app = TestApp::new().await;

    let not_image = app
        .post_multipart(
            "/api/admin/fotos/upload",
            &[
                ("file", Some("notes.txt"), Some("text/plain"), b"hello".as_slice()),
                ("album", None, None, b"Misc".as_slice()),
            ],
        )
        .await;
    assert_envelope(&not_image, StatusCode::BAD_REQUEST, "/api/admin/fotos/upload");
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);

    let no_file = app
        .post_multipart("/api/admin/fotos/upload", &[("album", None, None, b"Misc".as_slice())])
        .await;
    assert_envelope(&no_file, StatusCode::BAD_REQUEST, "/api/admin/fotos/upload");
}

#[tokio::test]
async fn test_photo_queries_and_tournament_cleanup() {
    let app = TestApp::new().await;
    let season_id = create_season(&app, 2024).await;
    let tournament = create_tournament(&app, season_id, "Stage 1").await["id"]
        .as_i64()
        .unwrap();

    for (album, category) in [("Stage 1", "BEST_MOMENTS"), ("Stage 1", "SEASON")] {
        let response = app
            .post(
                "/api/fotos",
                json!({
                    "image_url": "https://cdn.poker.test/a.jpg",
                    "album": album,
                    "category": category,
                    "tournament_id": tournament,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }
    let season_photo = app
        .post(
            "/api/fotos",
            json!({ "image_url": "https://cdn.poker.test/b.jpg", "album": "Opening", "season_id": season_id }),
        )
        .await
        .json();
    assert_eq!(season_photo["category"], "SEASON");

    let by_season = app
        .call_as(
            Method::GET,
            &format!("/api/public/fotos/temporada/{season_id}"),
            None,
            false,
        )
        .await
        .json();
    assert_eq!(by_season.as_array().unwrap().len(), 3);

    let unknown_category = app.get("/api/fotos/categoria/whatever").await.json();
    assert_eq!(unknown_category.as_array().unwrap().len(), 2);

    let deleted = app
        .delete(&format!("/api/fotos/torneio/{tournament}"))
        .await
        .json();
    assert_eq!(deleted["deleted"], 2);

    let remaining = app.get("/api/fotos").await.json();
    assert_eq!(remaining.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let app = TestApp::new().await;

    let health = app.call_as(Method::GET, "/api/health", None, false).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "ok");

    let unknown = app.call_as(Method::GET, "/api/nope", None, false).await;
    assert_envelope(&unknown, StatusCode::NOT_FOUND, "/api/nope");
}
