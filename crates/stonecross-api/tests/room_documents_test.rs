//! Integration tests for the room-scoped documents.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use stonecross_combat::domain::visibility::CombatVisibility;

#[tokio::test]
async fn test_map_unlock_toggle_round_trip() {
    // Arrange
    let app = common::build_test_app(CombatVisibility::Private);
    let dm = common::sign_in(&app, "dm").await;
    let player = common::sign_in(&app, "rodney").await;

    // Act
    let (status, headers, _) = common::send(
        &app,
        "PUT",
        "/api/map-unlocks?room=table-1",
        Some(&dm),
        Some(&json!({ "op": "toggle", "town_id": "sunspire" })),
        None,
    )
    .await;
    let (_, _, seen) = common::send(&app, "GET", "/api/map-unlocks?room=table-1", Some(&player), None, None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["etag"], "\"1\"");
    let unlocked = seen["data"]["unlocked"].as_array().unwrap();
    assert!(unlocked.contains(&json!("sunspire")));
    assert_eq!(unlocked.len(), 4);
}

#[tokio::test]
async fn test_room_names_are_sanitized_identically_on_read_and_write() {
    let app = common::build_test_app(CombatVisibility::Private);
    let dm = common::sign_in(&app, "dm").await;

    common::send(
        &app,
        "PUT",
        "/api/old-gods?room=Table%20One",
        Some(&dm),
        Some(&json!({ "gods": [{ "name": "Veyra", "realm": "Tides" }] })),
        None,
    )
    .await;
    let (_, _, json) = common::send(&app, "GET", "/api/old-gods?room=Table_One", Some(&dm), None, None).await;

    assert_eq!(json["data"]["gods"][0]["name"], "Veyra");
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let app = common::build_test_app(CombatVisibility::Private);
    let dm = common::sign_in(&app, "dm").await;

    common::send(
        &app,
        "PUT",
        "/api/old-gods?room=a",
        Some(&dm),
        Some(&json!({ "gods": [{ "name": "Veyra" }] })),
        None,
    )
    .await;
    let (_, _, json) = common::send(&app, "GET", "/api/old-gods?room=b", Some(&dm), None, None).await;

    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_optimistic_writer_flow() {
    // Arrange: the operator reads version 1 of the seeded NPC directory.
    let app = common::build_test_app(CombatVisibility::Private);
    let dm = common::sign_in(&app, "dm").await;
    let (_, headers, _) = common::send(&app, "GET", "/api/npcs", Some(&dm), None, None).await;
    let etag = headers["etag"].to_str().unwrap().to_owned();
    assert_eq!(etag, "\"1\"");
    let upsert = json!({
        "op": "upsert",
        "npc": { "name": "Mira", "title": "Innkeeper", "town_id": "stonecross" }
    });

    // Act
    let (first, headers, _) = common::send(&app, "PUT", "/api/npcs", Some(&dm), Some(&upsert), Some(&etag)).await;
    let (stale, _, conflict) = common::send(&app, "PUT", "/api/npcs", Some(&dm), Some(&upsert), Some(&etag)).await;

    // Assert
    assert_eq!(first, StatusCode::OK);
    assert_eq!(headers["etag"], "\"2\"");
    assert_eq!(stale, StatusCode::CONFLICT);
    assert_eq!(conflict["error"], "concurrency_conflict");
}

#[tokio::test]
async fn test_full_replacement_from_sync_writer_is_accepted() {
    // The sync writer PUTs whole documents as read, envelope fields included.
    let app = common::build_test_app(CombatVisibility::Private);
    let dm = common::sign_in(&app, "dm").await;
    let (_, _, current) = common::send(&app, "GET", "/api/map-unlocks", Some(&dm), None, None).await;
    let mut body = current["data"].clone();
    body["unlocked"] = json!(["stonecross", "eldergate"]);

    let (status, _, json) = common::send(&app, "PUT", "/api/map-unlocks", Some(&dm), Some(&body), Some("\"1\"")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["unlocked"], json!(["stonecross", "eldergate"]));
    assert_eq!(json["data"]["version"], 2);
}

#[tokio::test]
async fn test_players_cannot_write_any_room_document() {
    let app = common::build_test_app(CombatVisibility::Shared);
    let player = common::sign_in(&app, "rodney").await;

    for (path, body) in [
        ("/api/map-unlocks", json!({ "unlocked": ["stonecross"] })),
        ("/api/npcs", json!({ "npcs": [] })),
        ("/api/shops", json!({ "shops": [] })),
        ("/api/old-gods", json!({ "gods": [] })),
    ] {
        let (status, _, _) = common::send(&app, "PUT", path, Some(&player), Some(&body), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
    }
    let (status, _, _) = common::send(
        &app,
        "POST",
        "/api/combat",
        Some(&player),
        Some(&json!({ "command": "advance_turn" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
