//! Test assertion helpers
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;

use poker_league::ranking::models::RankingModel;

use super::setup::TestResponse;

/// Asserts the uniform error body and returns its message
pub fn assert_envelope(response: &TestResponse, status: StatusCode, path: &str) -> String {
    assert_eq!(
        response.status,
        status,
        "unexpected status, body: {}",
        String::from_utf8_lossy(&response.bytes)
    );
    let body = response.json();
    assert_eq!(body["statusCode"], status.as_u16());
    assert_eq!(body["path"], path);
    assert!(body["timestamp"].is_string());
    body["message"].as_str().unwrap_or_default().to_string()
}

/// Asserts `(player_id, position, score)` rows in leaderboard order
pub fn assert_ranking(rows: &[RankingModel], expected: &[(i64, i32, i64)]) {
    let actual: Vec<(i64, i32, i64)> = rows
        .iter()
        .map(|r| (r.player_id, r.position, r.score))
        .collect();
    assert_eq!(actual, expected);
}
