#![allow(dead_code)]

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub const BASE_URL: &str = "http://localhost:8000";

pub fn client() -> Client {
    Client::new()
}

/// Numeric suffix from the clock, short enough to keep usernames under 20 chars.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}", ts % 1_000_000_000)
}

pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Register a fresh account and return its bearer token.
pub async fn register_token(client: &Client) -> String {
    let suffix = unique_suffix();
    let resp = client
        .post(url("/api/auth/register"))
        .json(&json!({
            "username": format!("player_{suffix}"),
            "email": format!("player_{suffix}@openings.test"),
            "password": "openings123",
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(resp.status(), 200, "Register should succeed");

    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().expect("token").to_string()
}

/// GET /api/openings/match with the moves encoded as a JSON array.
pub async fn match_moves(client: &Client, moves: &[&str]) -> reqwest::Response {
    let encoded = serde_json::to_string(moves).unwrap();
    client
        .get(url("/api/openings/match"))
        .query(&[("moves", encoded)])
        .send()
        .await
        .expect("Failed to send match request")
}
