//! Reserved-seat endpoints: seat map, seat reservation and release.
//!
//! ```text
//! GET    /events/{id}/seats?sessionId=           → seat map
//! POST   /events/{id}/seats                      → reserve seats (409 on conflict)
//! DELETE /events/{id}/seats?sessionId=&seatIds=  → release seats
//! ```
//!
//! Seat conflicts are reported as a flat list of seat ids; the requesting
//! client already knows it asked for quantity 1 of each.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use turnstile_core::{ReserveLine, SeatRef, SellableUnit};
use turnstile_db::ReserveOutcome;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Wire Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapResponse {
    pub sold_seats: Vec<String>,
    pub held_seats: Vec<String>,
    pub my_holds: Vec<String>,
    pub hold_duration_ms: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    pub section_id: String,
    pub row: String,
    pub number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSeatsRequest {
    pub seats: Vec<SeatRequest>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSeatsResponse {
    pub success: bool,
    pub held_seats: Vec<String>,
    pub held_until: DateTime<Utc>,
    pub hold_duration_ms: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatConflictResponse {
    pub error: String,
    /// Seat ids that could not be held.
    pub conflicts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSeatsQuery {
    pub session_id: String,
    /// Comma-separated seat ids; omitted means all of the session's holds.
    pub seat_ids: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /events/{id}/seats?sessionId=
pub async fn get_seat_map(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(query): Query<SeatMapQuery>,
) -> Result<Json<SeatMapResponse>, ApiError> {
    let map = state
        .db
        .availability()
        .seat_map(&event_id, query.session_id.as_deref())
        .await?;

    Ok(Json(SeatMapResponse {
        sold_seats: map.sold_seats,
        held_seats: map.held_seats,
        my_holds: map.my_holds,
        hold_duration_ms: state.config.hold_duration_ms,
    }))
}

/// POST /events/{id}/seats
pub async fn reserve_seats(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<ReserveSeatsRequest>,
) -> Result<Response, ApiError> {
    let lines: Vec<ReserveLine> = request
        .seats
        .iter()
        .map(|s| {
            ReserveLine::new(
                SellableUnit::seat(SeatRef::new(&s.section_id, &s.row, &s.number)),
                1,
            )
        })
        .collect();

    let outcome = state
        .db
        .holds()
        .reserve(
            &event_id,
            &request.session_id,
            &lines,
            state.config.hold_duration(),
        )
        .await?;

    match outcome {
        ReserveOutcome::Reserved { holds, held_until } => Ok(Json(ReserveSeatsResponse {
            success: true,
            held_seats: holds.into_iter().map(|h| h.unit_id).collect(),
            held_until,
            hold_duration_ms: state.config.hold_duration_ms,
        })
        .into_response()),
        ReserveOutcome::Rejected { conflicts } => {
            // The event-ceiling conflict carries the event id, not a seat id.
            // This response lists seats only; when the ceiling alone overflows,
            // the all-or-nothing request denies every requested seat.
            let requested: Vec<String> = lines.iter().map(|l| l.unit.unit_id()).collect();
            let mut denied: Vec<String> = conflicts
                .into_iter()
                .map(|c| c.unit_id)
                .filter(|id| requested.contains(id))
                .collect();
            if denied.is_empty() {
                denied = requested;
            }
            Ok((
                StatusCode::CONFLICT,
                Json(SeatConflictResponse {
                    error: "CONFLICT".to_string(),
                    conflicts: denied,
                }),
            )
                .into_response())
        }
    }
}

/// DELETE /events/{id}/seats?sessionId=&seatIds=
pub async fn release_seats(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(query): Query<ReleaseSeatsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let seat_ids: Option<Vec<String>> = query.seat_ids.as_deref().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    });
    // An empty seatIds= means the same as omitting it.
    let seat_ids = seat_ids.filter(|ids: &Vec<String>| !ids.is_empty());

    state
        .db
        .holds()
        .release(&event_id, &query.session_id, seat_ids.as_deref())
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
