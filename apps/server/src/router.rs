use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, availability, seats};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/events/:event_id/availability",
            get(availability::get_availability)
                .post(availability::reserve_tickets)
                .delete(availability::release_tickets),
        )
        .route(
            "/events/:event_id/seats",
            get(seats::get_seat_map)
                .post(seats::reserve_seats)
                .delete(seats::release_seats),
        )
        .route(
            "/events/:event_id/blocks",
            get(admin::list_blocks).post(admin::create_blocks),
        )
        .route(
            "/events/:event_id/blocks/:block_id",
            axum::routing::delete(admin::remove_block),
        )
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let healthy = state.db.health_check().await;
    Json(serde_json::json!({
        "status": if healthy { "ok" } else { "degraded" }
    }))
}
