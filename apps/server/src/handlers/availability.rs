//! GA (ticket-tier) availability and reservation endpoints.
//!
//! Wire contract, stable for existing checkout clients:
//!
//! ```text
//! GET    /events/{id}/availability  → availability snapshot
//! POST   /events/{id}/availability  → reserve tiers (409 on conflict)
//! DELETE /events/{id}/availability  → release this session's holds
//! ```
//!
//! The snapshot has no separate "blocked" field: operator blocks read as
//! held inventory, which is what a buyer-facing client should display.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use turnstile_core::{ReserveLine, SellableUnit, UnitConflict, UnitKind};
use turnstile_db::ReserveOutcome;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Wire Shapes
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTypeAvailability {
    pub ticket_type_id: String,
    pub total_capacity: i64,
    pub sold: i64,
    pub held: i64,
    pub available: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub event_id: String,
    pub total_capacity: i64,
    pub total_sold: i64,
    pub total_held: i64,
    pub total_available: i64,
    pub ticket_types: Vec<TicketTypeAvailability>,
    pub hold_duration_ms: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub ticket_type_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveTicketsRequest {
    pub tickets: Vec<TicketRequest>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveTicketsResponse {
    pub success: bool,
    pub hold_ids: Vec<String>,
    pub held_until: DateTime<Utc>,
    pub hold_duration_ms: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketConflict {
    pub ticket_type_id: String,
    pub requested: i64,
    pub available: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    pub error: String,
    pub conflicts: Vec<TicketConflict>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseQuery {
    pub session_id: String,
    /// Comma-separated tier ids; omitted means all of the session's holds.
    pub ticket_type_ids: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /events/{id}/availability
pub async fn get_availability(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let snapshot = state.db.availability().event_availability(&event_id).await?;

    // Fire-and-forget housekeeping: keep the live-hold set small for
    // subsequent reads. Never affects this response.
    let sweeper = state.db.holds();
    let sweep_event = event_id.clone();
    tokio::spawn(async move {
        if let Err(err) = sweeper.sweep_expired(&sweep_event).await {
            warn!(event_id = %sweep_event, error = %err, "Opportunistic sweep failed");
        }
    });

    let ticket_types = snapshot
        .units
        .iter()
        .filter(|u| u.kind == UnitKind::Ga)
        .map(|u| TicketTypeAvailability {
            ticket_type_id: u.unit_id.clone(),
            total_capacity: u.capacity,
            sold: u.sold,
            held: u.held + u.blocked,
            available: u.available,
        })
        .collect();

    Ok(Json(AvailabilityResponse {
        event_id: snapshot.event_id,
        total_capacity: snapshot.total_capacity,
        total_sold: snapshot.total_sold,
        total_held: snapshot.total_held + snapshot.total_blocked,
        total_available: snapshot.total_available,
        ticket_types,
        hold_duration_ms: state.config.hold_duration_ms,
    }))
}

/// POST /events/{id}/availability
pub async fn reserve_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<ReserveTicketsRequest>,
) -> Result<Response, ApiError> {
    let lines: Vec<ReserveLine> = request
        .tickets
        .iter()
        .map(|t| ReserveLine::new(SellableUnit::tier(&t.ticket_type_id), t.quantity))
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
        ReserveOutcome::Reserved { holds, held_until } => Ok(Json(ReserveTicketsResponse {
            success: true,
            hold_ids: holds.into_iter().map(|h| h.id).collect(),
            held_until,
            hold_duration_ms: state.config.hold_duration_ms,
        })
        .into_response()),
        ReserveOutcome::Rejected { conflicts } => {
            Ok((StatusCode::CONFLICT, Json(ticket_conflicts(conflicts))).into_response())
        }
    }
}

/// DELETE /events/{id}/availability?sessionId=&ticketTypeIds=
///
/// With `ticketTypeIds`, releases only the named tiers; without, every hold
/// this session has on the event, tier and seat alike.
pub async fn release_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(query): Query<ReleaseQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tier_ids: Option<Vec<String>> = query.ticket_type_ids.as_deref().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    });
    // An empty ticketTypeIds= means the same as omitting it.
    let tier_ids = tier_ids.filter(|ids: &Vec<String>| !ids.is_empty());

    state
        .db
        .holds()
        .release(&event_id, &query.session_id, tier_ids.as_deref())
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

fn ticket_conflicts(conflicts: Vec<UnitConflict>) -> ConflictResponse {
    ConflictResponse {
        error: "CONFLICT".to_string(),
        conflicts: conflicts
            .into_iter()
            .map(|c| TicketConflict {
                ticket_type_id: c.unit_id,
                requested: c.requested,
                available: c.available,
            })
            .collect(),
    }
}
