// src/routes/csr.rs

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Extension, Json,
};

use super::{ApiJson, ApiPath, ApiQuery, MatchQuery, RequestQuery};
use crate::{
    auth::AuthUser,
    error::AppResult,
    models::{CsrRep, CsrRepDetails, Match, MatchPatch, Paginated, PinRequest, Shortlist},
    service::{
        matching::{CreateMatchInput, CreateShortlistInput},
        requests::ViewContext,
    },
    AppState,
};

fn view_context(headers: &HeaderMap) -> ViewContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    ViewContext {
        // first hop of a proxied request
        ip_address: header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
            .or_else(|| header("x-real-ip")),
        user_agent: header(USER_AGENT.as_str()),
    }
}

// ───────────────────────────────────────
// Profile
// ───────────────────────────────────────
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<CsrRepDetails>,
) -> AppResult<(StatusCode, Json<CsrRep>)> {
    let rep = state.service.create_csr_profile(who.user_id, b).await?;
    Ok((StatusCode::CREATED, Json(rep)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
) -> AppResult<Json<CsrRep>> {
    Ok(Json(state.service.csr_rep_for(&who).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<CsrRepDetails>,
) -> AppResult<Json<CsrRep>> {
    Ok(Json(state.service.update_csr_profile(&who, b).await?))
}

// ───────────────────────────────────────
// Request search
// ───────────────────────────────────────
pub async fn search_requests(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RequestQuery>,
) -> AppResult<Json<Paginated<PinRequest>>> {
    let (filter, page) = q.split();
    Ok(Json(state.service.search_requests(filter, page).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<PinRequest>> {
    let rep = state.service.csr_rep_for(&who).await?;
    let request = state.service.get_request(id, rep.csr_rep_id, view_context(&headers)).await?;
    Ok(Json(request))
}

// ───────────────────────────────────────
// Shortlist
// ───────────────────────────────────────
pub async fn add_to_shortlist(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<CreateShortlistInput>,
) -> AppResult<(StatusCode, Json<Shortlist>)> {
    let rep = state.service.csr_rep_for(&who).await?;
    let shortlist = state.service.add_to_shortlist(rep.csr_rep_id, b).await?;
    Ok((StatusCode::CREATED, Json(shortlist)))
}

pub async fn list_shortlist(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
) -> AppResult<Json<Vec<Shortlist>>> {
    let rep = state.service.csr_rep_for(&who).await?;
    Ok(Json(state.service.list_shortlist(rep.csr_rep_id).await?))
}

pub async fn remove_from_shortlist(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    let rep = state.service.csr_rep_for(&who).await?;
    state.service.remove_from_shortlist(rep.csr_rep_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ───────────────────────────────────────
// Matches
// ───────────────────────────────────────
pub async fn create_match(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<CreateMatchInput>,
) -> AppResult<(StatusCode, Json<Match>)> {
    let rep = state.service.csr_rep_for(&who).await?;
    let created = state.service.create_match(rep.csr_rep_id, b).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_matches(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiQuery(q): ApiQuery<MatchQuery>,
) -> AppResult<Json<Paginated<Match>>> {
    let rep = state.service.csr_rep_for(&who).await?;
    let (filter, page) = q.split();
    Ok(Json(state.service.csr_matches(rep.csr_rep_id, filter, page).await?))
}

pub async fn get_match(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Match>> {
    let rep = state.service.csr_rep_for(&who).await?;
    Ok(Json(state.service.get_own_match(rep.csr_rep_id, id).await?))
}

pub async fn update_match(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(b): ApiJson<MatchPatch>,
) -> AppResult<Json<Match>> {
    let rep = state.service.csr_rep_for(&who).await?;
    Ok(Json(state.service.update_match(rep.csr_rep_id, id, b).await?))
}

pub async fn history(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiQuery(q): ApiQuery<MatchQuery>,
) -> AppResult<Json<Paginated<Match>>> {
    let rep = state.service.csr_rep_for(&who).await?;
    let (filter, page) = q.split();
    Ok(Json(state.service.csr_history(rep.csr_rep_id, filter, page).await?))
}
