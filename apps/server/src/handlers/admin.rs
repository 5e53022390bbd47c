//! Operator endpoints: admin blocks.
//!
//! ```text
//! GET    /events/{id}/blocks            → list blocks
//! POST   /events/{id}/blocks            → create blocks (201)
//! DELETE /events/{id}/blocks/{blockId}  → remove one block
//! ```
//!
//! Gated by a bearer token (`TURNSTILE_ADMIN_TOKEN`). When no token is
//! configured the whole surface is locked: these endpoints mutate capacity
//! and must never be open by accident. Audit rows attribute actions to the
//! token principal.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use turnstile_core::{AdminBlock, SeatRef, SellableUnit, UnitKind};
use turnstile_db::BlockSpec;

use crate::error::ApiError;
use crate::state::AppState;

/// The actor recorded in the inventory log for token-authenticated calls.
const ADMIN_ACTOR: &str = "admin";

// =============================================================================
// Wire Shapes
// =============================================================================

/// One unit to block: either `ticketTypeId` (GA) or the seat coordinates
/// `sectionId`/`row`/`number`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockUnitRequest {
    pub ticket_type_id: Option<String>,
    pub section_id: Option<String>,
    pub row: Option<String>,
    pub number: Option<String>,
    /// Quantity to block (GA only; seats always block exactly 1).
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlocksRequest {
    pub units: Vec<BlockUnitRequest>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub id: String,
    pub unit_kind: String,
    pub unit_id: String,
    pub quantity: i64,
    pub reason: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminBlock> for BlockView {
    fn from(block: AdminBlock) -> Self {
        BlockView {
            id: block.id,
            unit_kind: match block.kind {
                UnitKind::Ga => "ga".to_string(),
                UnitKind::Reserved => "reserved".to_string(),
            },
            unit_id: block.unit_id,
            quantity: block.quantity,
            reason: block.reason,
            created_by: block.created_by,
            created_at: block.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocksResponse {
    pub blocks: Vec<BlockView>,
}

// =============================================================================
// Authorization
// =============================================================================

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        return Err(ApiError::Unauthorized(
            "Admin surface is not configured".to_string(),
        ));
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Invalid or missing admin token".to_string(),
        )),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /events/{id}/blocks
pub async fn list_blocks(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BlocksResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let blocks = state.db.blocks().list(&event_id).await?;
    Ok(Json(BlocksResponse {
        blocks: blocks.into_iter().map(BlockView::from).collect(),
    }))
}

/// POST /events/{id}/blocks
pub async fn create_blocks(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CreateBlocksRequest>,
) -> Result<Response, ApiError> {
    require_admin(&state, &headers)?;

    let mut specs = Vec::with_capacity(request.units.len());
    for unit in &request.units {
        let sellable = match (&unit.ticket_type_id, &unit.section_id, &unit.row, &unit.number) {
            (Some(tier_id), None, None, None) => SellableUnit::tier(tier_id),
            (None, Some(section_id), Some(row), Some(number)) => {
                SellableUnit::seat(SeatRef::new(section_id, row, number))
            }
            _ => {
                return Err(ApiError::BadRequest(
                    "Each unit needs either ticketTypeId or sectionId/row/number".to_string(),
                ))
            }
        };
        specs.push(BlockSpec::new(sellable, unit.quantity));
    }

    let created = state
        .db
        .blocks()
        .block(&event_id, &specs, request.reason.as_deref(), ADMIN_ACTOR)
        .await?;

    let body = Json(BlocksResponse {
        blocks: created.into_iter().map(BlockView::from).collect(),
    });
    Ok((StatusCode::CREATED, body).into_response())
}

/// DELETE /events/{id}/blocks/{blockId}
///
/// Idempotent like the repository call underneath: removing a block that is
/// already gone still answers success.
pub async fn remove_block(
    State(state): State<AppState>,
    Path((event_id, block_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &headers)?;

    state
        .db
        .blocks()
        .unblock(&event_id, &[block_id], ADMIN_ACTOR)
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
