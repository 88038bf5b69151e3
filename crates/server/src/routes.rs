use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use models::challan::{Challan, ChallanDraft};
use service::{challans::ChallanService, ocr::OcrClient};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub challans: Arc<ChallanService>,
    pub ocr: Arc<OcrClient>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Deserialize)]
pub struct PlateQuery {
    plate: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    challan_id: Option<String>,
}

#[derive(Deserialize)]
pub struct OcrRequest {
    image: Option<String>,
}

fn require_plate(q: PlateQuery) -> Result<String, JsonApiError> {
    match q.plate {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(JsonApiError::bad_request("plate number is required")),
    }
}

/// Full collection, for the admin table.
async fn list_challans(State(state): State<ServerState>) -> Json<Vec<Challan>> {
    Json(state.challans.list_all().await)
}

/// First challan for a plate; 404 when the plate has no record.
async fn search(
    State(state): State<ServerState>,
    Query(q): Query<PlateQuery>,
) -> Result<Json<Challan>, JsonApiError> {
    let plate = require_plate(q)?;
    match state.challans.find_by_plate(&plate).await {
        Some(challan) => Ok(Json(challan)),
        None => Err(JsonApiError::not_found("no challan found for this plate number")),
    }
}

/// Full ticket history for a plate, newest first. An unknown plate is an
/// empty list, not an error.
async fn history(
    State(state): State<ServerState>,
    Query(q): Query<PlateQuery>,
) -> Result<Json<Vec<Challan>>, JsonApiError> {
    let plate = require_plate(q)?;
    Ok(Json(state.challans.history_by_plate(&plate).await))
}

async fn issue_challan(
    State(state): State<ServerState>,
    Json(draft): Json<ChallanDraft>,
) -> Result<Json<Challan>, JsonApiError> {
    let challan = state.challans.issue(draft).await?;
    Ok(Json(challan))
}

/// Mock payment completion: flips the challan to `Paid`.
async fn pay_challan(
    State(state): State<ServerState>,
    Json(req): Json<PayRequest>,
) -> Result<Json<Challan>, JsonApiError> {
    let id = match req.challan_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(JsonApiError::bad_request("challanId is required")),
    };
    match state.challans.mark_paid(&id).await? {
        Some(challan) => Ok(Json(challan)),
        None => Err(JsonApiError::not_found("challan not found")),
    }
}

/// Plate recognition for camera capture / photo upload.
async fn recognize_plate(
    State(state): State<ServerState>,
    Json(req): Json<OcrRequest>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let image = match req.image {
        Some(image) if !image.trim().is_empty() => image,
        _ => return Err(JsonApiError::bad_request("image is required")),
    };
    let recognized = state.ocr.recognize(&image).await?;
    Ok(Json(recognized))
}

/// Build the full application router.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .route("/api/challans", get(list_challans).post(issue_challan))
        .route("/api/challans/pay", post(pay_challan))
        .route("/api/search", get(search))
        .route("/api/history", get(history))
        .route("/api/ocr", post(recognize_plate));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
