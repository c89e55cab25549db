// src/routes/pin.rs

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::{ApiJson, ApiPath, ApiQuery, MatchQuery};
use crate::{
    auth::AuthUser,
    error::AppResult,
    models::{Match, Paginated, Pin, PinDetails, PinRequest, PinRequestPatch},
    service::requests::CreateRequestInput,
    AppState,
};

// ───────────────────────────────────────
// Profile
// ───────────────────────────────────────
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<PinDetails>,
) -> AppResult<(StatusCode, Json<Pin>)> {
    let pin = state.service.create_pin_profile(who.user_id, b).await?;
    Ok((StatusCode::CREATED, Json(pin)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
) -> AppResult<Json<Pin>> {
    Ok(Json(state.service.pin_for(&who).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<PinDetails>,
) -> AppResult<Json<Pin>> {
    Ok(Json(state.service.update_pin_profile(&who, b).await?))
}

// ───────────────────────────────────────
// Requests
// ───────────────────────────────────────
pub async fn create_request(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<CreateRequestInput>,
) -> AppResult<(StatusCode, Json<PinRequest>)> {
    let pin = state.service.pin_for(&who).await?;
    let request = state.service.create_pin_request(pin.pin_id, b).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
) -> AppResult<Json<Vec<PinRequest>>> {
    let pin = state.service.pin_for(&who).await?;
    Ok(Json(state.service.list_pin_requests(pin.pin_id).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<PinRequest>> {
    let pin = state.service.pin_for(&who).await?;
    Ok(Json(state.service.get_own_request(pin.pin_id, id).await?))
}

pub async fn update_request(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(b): ApiJson<PinRequestPatch>,
) -> AppResult<Json<PinRequest>> {
    let pin = state.service.pin_for(&who).await?;
    Ok(Json(state.service.update_own_request(pin.pin_id, id, b).await?))
}

pub async fn history(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiQuery(q): ApiQuery<MatchQuery>,
) -> AppResult<Json<Paginated<Match>>> {
    let pin = state.service.pin_for(&who).await?;
    let (filter, page) = q.split();
    Ok(Json(state.service.pin_history(pin.pin_id, filter, page).await?))
}
