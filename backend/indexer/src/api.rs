//! Read-only REST API over the indexed events.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProposalEventsResponse {
    pub proposal_id: u64,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: IndexerError) -> Response {
    let status = match err {
        IndexerError::InvalidProposalId(_) => StatusCode::BAD_REQUEST,
        _ => {
            error!("API query failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn events_response(events: Vec<EventRecord>) -> Response {
    let count = events.len();
    (StatusCode::OK, Json(EventsResponse { count, events })).into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => events_response(events),
        Err(e) => error_response(e),
    }
}

/// `GET /proposals/:id/events`
///
/// Submission, verification, votes and payouts recorded for one proposal.
pub async fn get_proposal_events(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let proposal_id: u64 = match raw_id.parse() {
        Ok(id) => id,
        Err(_) => return error_response(IndexerError::InvalidProposalId(raw_id)),
    };

    match db::get_events_for_proposal(&state.pool, proposal_id).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(ProposalEventsResponse {
                    proposal_id,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// `GET /winners`
///
/// One `winner_selected` event per closed cycle.
pub async fn get_winners(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_winners(&state.pool).await {
        Ok(events) => events_response(events),
        Err(e) => error_response(e),
    }
}
