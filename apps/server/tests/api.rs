//! End-to-end API tests against the router with an in-memory database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use turnstile_core::{OrderStatus, ReserveLine, SeatRef, SellableUnit, DEFAULT_HOLD_DURATION_MS};
use turnstile_db::{Database, DbConfig};
use turnstile_server::{create_router, AppState, ServerConfig};

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        database_path: ":memory:".into(),
        hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
        sweep_interval_secs: 60,
        admin_token: Some(ADMIN_TOKEN.to_string()),
    }
}

async fn test_app() -> (Router, Database, String) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let event = db.capacity().create_event("Show", None).await.unwrap();
    db.capacity()
        .create_tier(&event.id, "tier-ga", "General Admission", 10)
        .await
        .unwrap();
    db.capacity()
        .create_seats(
            &event.id,
            &[SeatRef::new("A", "1", "5"), SeatRef::new("A", "1", "6")],
        )
        .await
        .unwrap();

    let app = create_router(AppState::new(db.clone(), test_config()));
    (app, db, event.id)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn availability_snapshot_has_wire_shape() {
    let (app, db, event_id) = test_app().await;

    db.orders()
        .record_order(
            &event_id,
            OrderStatus::Completed,
            &[ReserveLine::new(SellableUnit::tier("tier-ga"), 3)],
        )
        .await
        .unwrap();

    let (status, body) = send(&app, get_request(&format!("/events/{event_id}/availability"))).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["eventId"], event_id.as_str());
    // 10 GA + 2 seats
    assert_eq!(body["totalCapacity"], 12);
    assert_eq!(body["totalSold"], 3);
    assert_eq!(body["totalAvailable"], 9);
    assert_eq!(body["holdDurationMs"], DEFAULT_HOLD_DURATION_MS);

    let tiers = body["ticketTypes"].as_array().unwrap();
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0]["ticketTypeId"], "tier-ga");
    assert_eq!(tiers[0]["totalCapacity"], 10);
    assert_eq!(tiers[0]["sold"], 3);
    assert_eq!(tiers[0]["available"], 7);
}

#[tokio::test]
async fn reserve_then_conflict_then_release() {
    let (app, _db, event_id) = test_app().await;
    let uri = format!("/events/{event_id}/availability");

    // Session A takes 7 of 10.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({"tickets": [{"ticketTypeId": "tier-ga", "quantity": 7}], "sessionId": "sess-a"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["holdIds"].as_array().unwrap().len(), 1);
    assert!(body["heldUntil"].is_string());

    // Session B wants 5 → 409 with the accurate remainder.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({"tickets": [{"ticketTypeId": "tier-ga", "quantity": 5}], "sessionId": "sess-b"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let conflicts = body["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["ticketTypeId"], "tier-ga");
    assert_eq!(conflicts[0]["requested"], 5);
    assert_eq!(conflicts[0]["available"], 3);

    // A releases; B fits now.
    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("{uri}?sessionId=sess-a"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({"tickets": [{"ticketTypeId": "tier-ga", "quantity": 5}], "sessionId": "sess-b"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn release_with_ticket_type_ids_is_scoped_to_those_tiers() {
    let (app, db, event_id) = test_app().await;
    db.capacity()
        .create_tier(&event_id, "tier-vip", "VIP", 5)
        .await
        .unwrap();
    let uri = format!("/events/{event_id}/availability");

    // One session holds both tiers.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({
                "tickets": [
                    {"ticketTypeId": "tier-ga", "quantity": 4},
                    {"ticketTypeId": "tier-vip", "quantity": 2}
                ],
                "sessionId": "sess-a"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Releasing only tier-ga leaves the VIP hold in place.
    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("{uri}?sessionId=sess-a&ticketTypeIds=tier-ga"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, get_request(&uri)).await;
    let tiers = body["ticketTypes"].as_array().unwrap();
    let held_of = |id: &str| {
        tiers
            .iter()
            .find(|t| t["ticketTypeId"] == id)
            .unwrap()["held"]
            .clone()
    };
    assert_eq!(held_of("tier-ga"), 0);
    assert_eq!(held_of("tier-vip"), 2);
}

#[tokio::test]
async fn seat_flow_reserve_map_release() {
    let (app, _db, event_id) = test_app().await;

    // X holds A-1-5.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{event_id}/seats"),
            json!({"seats": [{"sectionId": "A", "row": "1", "number": "5"}], "sessionId": "sess-x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heldSeats"], json!(["A-1-5"]));

    // Y sees it held, and requesting it conflicts by seat id.
    let (status, body) = send(
        &app,
        get_request(&format!("/events/{event_id}/seats?sessionId=sess-y")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heldSeats"], json!(["A-1-5"]));
    assert_eq!(body["myHolds"], json!([]));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{event_id}/seats"),
            json!({"seats": [{"sectionId": "A", "row": "1", "number": "5"}], "sessionId": "sess-y"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflicts"], json!(["A-1-5"]));

    // X's own view reports the seat under myHolds.
    let (_, body) = send(
        &app,
        get_request(&format!("/events/{event_id}/seats?sessionId=sess-x")),
    )
    .await;
    assert_eq!(body["myHolds"], json!(["A-1-5"]));
    assert_eq!(body["heldSeats"], json!([]));

    // Release by seat id; releasing twice is fine.
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Request::builder()
                .method("DELETE")
                .uri(format!(
                    "/events/{event_id}/seats?sessionId=sess-x&seatIds=A-1-5"
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    // Y gets the seat now.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{event_id}/seats"),
            json!({"seats": [{"sectionId": "A", "row": "1", "number": "5"}], "sessionId": "sess-y"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_blocks_are_gated_and_reduce_availability() {
    let (app, _db, event_id) = test_app().await;
    let uri = format!("/events/{event_id}/blocks");

    // No token → 401.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({"units": [{"ticketTypeId": "tier-ga", "quantity": 4}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // With the token the blocks land: a GA quantity and a single seat.
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
            .body(Body::from(
                json!({
                    "units": [
                        {"ticketTypeId": "tier-ga", "quantity": 4},
                        {"sectionId": "A", "row": "1", "number": "5"}
                    ],
                    "reason": "VIP hold"
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    let ga_block_id = blocks
        .iter()
        .find(|b| b["unitId"] == "tier-ga")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Blocked capacity reads as held and shrinks availability; the blocked
    // seat shows up on the seat map.
    let (_, body) = send(&app, get_request(&format!("/events/{event_id}/availability"))).await;
    let tier = &body["ticketTypes"][0];
    assert_eq!(tier["held"], 4);
    assert_eq!(tier["available"], 6);

    let (_, body) = send(&app, get_request(&format!("/events/{event_id}/seats"))).await;
    assert_eq!(body["heldSeats"], json!(["A-1-5"]));

    // Remove the GA block by id; removal is idempotent.
    let delete_uri = format!("{uri}/{ga_block_id}");
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Request::builder()
                .method("DELETE")
                .uri(&delete_uri)
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (_, body) = send(&app, get_request(&format!("/events/{event_id}/availability"))).await;
    assert_eq!(body["ticketTypes"][0]["held"], 0);

    // The seat block is still listed.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let remaining = body["blocks"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["unitId"], "A-1-5");
    assert_eq!(remaining[0]["createdBy"], "admin");
}

#[tokio::test]
async fn ceiling_rejection_lists_every_requested_seat() {
    let (app, db, _event_id) = test_app().await;

    // A tiny event where the ceiling, not any seat, is the constraint.
    let event = db.capacity().create_event("Cabaret", Some(1)).await.unwrap();
    db.capacity()
        .create_seats(
            &event.id,
            &[SeatRef::new("B", "2", "1"), SeatRef::new("B", "2", "2")],
        )
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{}/seats", event.id),
            json!({
                "seats": [
                    {"sectionId": "B", "row": "2", "number": "1"},
                    {"sectionId": "B", "row": "2", "number": "2"}
                ],
                "sessionId": "sess-x"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    // Both seats were free individually; the response still names seats,
    // never the event id.
    assert_eq!(body["conflicts"], json!(["B-2-1", "B-2-2"]));

    // A one-seat request fits under the ceiling.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{}/seats", event.id),
            json!({
                "seats": [{"sectionId": "B", "row": "2", "number": "1"}],
                "sessionId": "sess-x"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn error_taxonomy_maps_to_status_codes() {
    let (app, _db, event_id) = test_app().await;

    // Unknown event → 404.
    let (status, body) = send(&app, get_request("/events/evt-missing/availability")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    // Empty request → 400.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{event_id}/availability"),
            json!({"tickets": [], "sessionId": "sess-a"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    // Zero quantity → 400.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/events/{event_id}/availability"),
            json!({"tickets": [{"ticketTypeId": "tier-ga", "quantity": 0}], "sessionId": "sess-a"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _db, _event_id) = test_app().await;
    let (status, body) = send(&app, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
