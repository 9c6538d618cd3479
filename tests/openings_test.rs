//! Opening match, browse and per-user endpoints.
//!
//! Requires the server to be running on localhost:8000. Assertions hold for
//! an empty catalog as well as an imported one.

mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn match_requires_moves_param() {
    let client = common::client();

    let resp = client
        .get(common::url("/api/openings/match"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());

    for bad in ["e4 e5", "{\"moves\":1}", "[\"e4\", 5]"] {
        let resp = client
            .get(common::url("/api/openings/match"))
            .query(&[("moves", bad)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "{bad} should be rejected");
    }
}

#[tokio::test]
async fn match_reports_search_info() {
    let client = common::client();

    let resp = common::match_moves(&client, &["e4", "e5", "Nf3"]).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["searchInfo"]["normalizedMoves"], "1. e4 e5 2. Nf3");
    assert_eq!(body["searchInfo"]["movesCount"], 3);
    assert_eq!(body["searchInfo"]["moves"], json!(["e4", "e5", "Nf3"]));

    let openings = body["openings"].as_array().unwrap();
    assert_eq!(body["count"], openings.len());
    assert_eq!(body["exactMatches"], !openings.is_empty());

    for o in openings {
        let line = o["moves"].as_str().unwrap();
        assert!(
            "1. e4 e5 2. Nf3".starts_with(line) || line.contains("1. e4 e5 2. Nf3"),
            "{line} does not match the played line"
        );
    }

    for t in body["transitions"].as_array().unwrap() {
        assert!(t["toOpening"].is_object(), "unresolved transition returned");
    }
}

#[tokio::test]
async fn match_results_are_ranked() {
    let client = common::client();

    let resp = common::match_moves(&client, &["d4"]).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let openings = body["openings"].as_array().unwrap();

    // Roots first, then ECO ascending within each group
    let keys: Vec<(bool, String)> = openings
        .iter()
        .map(|o| (o["isEcoRoot"].as_bool().unwrap(), o["eco"].as_str().unwrap().to_string()))
        .collect();
    for pair in keys.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.0 >= b.0, "non-root ranked above root");
        if a.0 == b.0 {
            assert!(a.1 <= b.1, "ECO {} ranked above {}", a.1, b.1);
        }
    }

    let mut ids: Vec<i64> = openings.iter().map(|o| o["id"].as_i64().unwrap()).collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before, "duplicate openings in result");
}

#[tokio::test]
async fn list_openings_paginates_and_validates() {
    let client = common::client();

    let resp = client
        .get(common::url("/api/openings"))
        .query(&[("limit", "5"), ("offset", "0"), ("rootsOnly", "true")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["limit"], 5);
    let openings = body["openings"].as_array().unwrap();
    assert!(openings.len() <= 5);
    assert!(openings.iter().all(|o| o["isEcoRoot"] == true));
    assert!(body["total"].as_i64().unwrap() >= openings.len() as i64);

    let resp = client
        .get(common::url("/api/openings"))
        .query(&[("eco", "X12")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn missing_opening_is_not_found() {
    let client = common::client();
    let token = common::register_token(&client).await;

    let resp = client
        .get(common::url("/api/openings/0"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(common::url("/api/openings/0/visit"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .put(common::url("/api/favorites/0"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(common::url("/api/practice/sessions"))
        .bearer_auth(&token)
        .json(&json!({ "openingId": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

/// Favorite, visit and practice one opening, then read the dashboard.
/// Skipped when no catalog has been imported.
#[tokio::test]
async fn user_flow_over_first_opening() {
    let client = common::client();

    let body: Value = client
        .get(common::url("/api/openings"))
        .query(&[("limit", "1")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let Some(opening_id) = body["openings"][0]["id"].as_i64() else {
        return;
    };

    let token = common::register_token(&client).await;

    // Favorites are idempotent
    for expected_change in [true, false] {
        let resp = client
            .put(common::url(&format!("/api/favorites/{opening_id}")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["changed"], expected_change);
    }

    let resp = client
        .post(common::url(&format!("/api/openings/{opening_id}/visit")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["visitCount"], 1);

    let detail: Value = client
        .get(common::url(&format!("/api/openings/{opening_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["isFavorite"], true);
    assert_eq!(detail["visitCount"], 1);
    assert_eq!(detail["opening"]["id"], opening_id);

    // Practice: start, complete, and reject a second completion
    let session: Value = client
        .post(common::url("/api/practice/sessions"))
        .bearer_auth(&token)
        .json(&json!({ "openingId": opening_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = session["id"].as_i64().unwrap();
    assert!(session["completedAt"].is_null());

    let complete_url = common::url(&format!("/api/practice/sessions/{session_id}/complete"));
    let resp = client
        .post(&complete_url)
        .bearer_auth(&token)
        .json(&json!({ "movesPlayed": 3, "mistakes": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(&complete_url)
        .bearer_auth(&token)
        .json(&json!({ "movesPlayed": 10, "mistakes": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let done: Value = resp.json().await.unwrap();
    assert_eq!(done["accuracy"], 90.0);

    let resp = client
        .post(&complete_url)
        .bearer_auth(&token)
        .json(&json!({ "movesPlayed": 10, "mistakes": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let dashboard: Value = client
        .get(common::url("/api/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["favoritesCount"], 1);
    assert_eq!(dashboard["totalVisits"], 1);
    assert_eq!(dashboard["practice"]["completed"], 1);
    assert_eq!(dashboard["recentSessions"][0]["id"], session_id);

    let resp = client
        .delete(common::url(&format!("/api/favorites/{opening_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["changed"], true);
}

#[tokio::test]
async fn user_endpoints_require_auth() {
    let client = common::client();

    for path in ["/api/favorites", "/api/dashboard", "/api/practice/sessions"] {
        let resp = client.get(common::url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 401, "{path} should require a token");
    }
}

#[tokio::test]
async fn analysis_rejects_invalid_fen() {
    let client = common::client();

    let resp = client
        .post(common::url("/api/analysis"))
        .json(&json!({ "fen": "not a fen", "depth": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("FEN"));
}
