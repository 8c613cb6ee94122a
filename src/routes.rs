// ABOUTME: HTTP routes for the marketplace booking API
// ABOUTME: Axum handlers mapping the booking core onto REST endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! # `HTTP` routes
//!
//! Thin axum layer over the booking service. Errors flow out as typed
//! `AppError` values and render with their mapped status codes: 404 for
//! missing resources, 409 for lost claim races, 400 for bad input, 504
//! for budget expiry, 500 for everything fatal.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{CreateSlotRequest, SubmitBookingRequest};
use crate::services::bookings::BookingService;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The booking transaction coordinator
    pub booking: BookingService,
}

/// Build the marketplace API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/booking/trainer/:trainer_id/slots",
            get(list_trainer_slots),
        )
        .route(
            "/api/booking/trainer/:trainer_id/availability",
            post(publish_availability),
        )
        .route("/api/booking/submit", post(submit_booking))
        .route("/api/booking/:booking_id", get(get_booking))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Optional window bounds for the slot listing
#[derive(Debug, Deserialize)]
struct SlotWindowQuery {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

/// List a trainer's open slots (display only, no concurrency concerns)
async fn list_trainer_slots(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Query(window): Query<SlotWindowQuery>,
) -> AppResult<impl IntoResponse> {
    let slots = state
        .booking
        .list_open_slots(trainer_id, window.from, window.to)
        .await?;
    Ok(Json(slots))
}

/// Publish a new availability slot for a trainer
async fn publish_availability(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Json(request): Json<CreateSlotRequest>,
) -> AppResult<impl IntoResponse> {
    let slot = state.booking.publish_slot(trainer_id, &request).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Submit a booking for a slot
async fn submit_booking(
    State(state): State<AppState>,
    Json(request): Json<SubmitBookingRequest>,
) -> AppResult<impl IntoResponse> {
    let booking = state
        .booking
        .create_booking(request.slot_id, request.trainee_user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Fetch a booking by id
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = state.booking.get_booking(booking_id).await?;
    Ok(Json(booking))
}
