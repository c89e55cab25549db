// src/routes/mod.rs

use axum::{
    extract::{FromRequest, FromRequestParts, Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{MatchFilter, Page, RequestFilter, Role},
    AppState,
};

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod csr;
pub mod health;
pub mod pin;
pub mod profile;

// ───────────────────────────────────────
// Extractors with `{"error": ...}` rejections
// ───────────────────────────────────────
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Blank query values count as absent.
fn present(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

// ───────────────────────────────────────
// Search query strings
// ───────────────────────────────────────
#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub urgency: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub search: Option<String>,
}

impl RequestQuery {
    pub fn split(self) -> (RequestFilter, Page) {
        let filter = RequestFilter {
            category_id: self.category_id,
            status: present(self.status),
            urgency: present(self.urgency),
            start_date: self.start_date,
            end_date: self.end_date,
            location: present(self.location),
            search: present(self.search),
        };
        (filter, Page::new(self.page, self.page_size))
    }
}

/// Match searches are always pinned to the caller, so no party ids here.
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl MatchQuery {
    pub fn split(self) -> (MatchFilter, Page) {
        let filter = MatchFilter {
            category_id: self.category_id,
            status: present(self.status),
            start_date: self.start_date,
            end_date: self.end_date,
            ..Default::default()
        };
        (filter, Page::new(self.page, self.page_size))
    }
}

// ───────────────────────────────────────
// Middleware
// ───────────────────────────────────────
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> AppResult<Response> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Authentication("authorization header required".into()))?;
    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Authentication("invalid token".into()))?;

    let who = state.tokens.verify(token)?;
    req.extensions_mut().insert(who);
    Ok(next.run(req).await)
}

async fn require_role(allowed: &'static [Role], req: Request, next: Next) -> AppResult<Response> {
    let who = req
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::Authentication("authorization header required".into()))?;
    if !allowed.contains(&who.role) {
        return Err(AppError::Authorization("insufficient permissions".into()));
    }
    Ok(next.run(req).await)
}

async fn pin_only(req: Request, next: Next) -> AppResult<Response> {
    require_role(&[Role::Pin], req, next).await
}

async fn csr_only(req: Request, next: Next) -> AppResult<Response> {
    require_role(&[Role::CsrRep], req, next).await
}

async fn admin_only(req: Request, next: Next) -> AppResult<Response> {
    require_role(&[Role::Admin], req, next).await
}

// ───────────────────────────────────────
// Router
// ───────────────────────────────────────

/// Full route table; CORS and tracing layers are added by the caller.
pub fn router(state: AppState) -> Router {
    let pin_routes = Router::new()
        .route(
            "/api/v1/pin/profile",
            post(pin::create_profile).get(pin::get_profile).put(pin::update_profile),
        )
        .route("/api/v1/pin/requests", post(pin::create_request).get(pin::list_requests))
        .route("/api/v1/pin/requests/:id", get(pin::get_request).put(pin::update_request))
        .route("/api/v1/pin/history", get(pin::history))
        .route_layer(middleware::from_fn(pin_only));

    let csr_routes = Router::new()
        .route(
            "/api/v1/csr/profile",
            post(csr::create_profile).get(csr::get_profile).put(csr::update_profile),
        )
        .route("/api/v1/csr/requests", get(csr::search_requests))
        .route("/api/v1/csr/requests/:id", get(csr::get_request))
        .route("/api/v1/csr/shortlist", post(csr::add_to_shortlist).get(csr::list_shortlist))
        .route("/api/v1/csr/shortlist/:id", delete(csr::remove_from_shortlist))
        .route("/api/v1/csr/matches", post(csr::create_match).get(csr::list_matches))
        .route("/api/v1/csr/matches/:id", get(csr::get_match).put(csr::update_match))
        .route("/api/v1/csr/history", get(csr::history))
        .route_layer(middleware::from_fn(csr_only));

    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/companies",
            post(admin::create_company).get(admin::list_companies),
        )
        .route(
            "/api/v1/admin/categories",
            post(admin::create_category).get(admin::list_categories),
        )
        .route("/api/v1/admin/categories/:id", axum::routing::put(admin::update_category))
        .route("/api/v1/admin/reports", post(admin::generate_report).get(admin::list_reports))
        .route_layer(middleware::from_fn(admin_only));

    let api = Router::new()
        .route("/api/v1/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/api/v1/companies", get(catalog::list_companies))
        .route("/api/v1/categories", get(catalog::list_categories))
        .merge(pin_routes)
        .merge(csr_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ping", get(health::ping))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(api)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{auth::TokenIssuer, service::Service, store::MemoryStore, AppState};

    pub fn app() -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenIssuer::new(b"route-secret", Duration::hours(1));
        let state = AppState { service: Arc::new(Service::new(store.clone(), tokens.clone())), tokens };
        (store, super::router(state))
    }

    pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    /// Registers and logs in; returns the bearer token.
    pub async fn login_as(app: &Router, username: &str, role: &str) -> String {
        let (status, _) = send(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "secret123",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(serde_json::json!({ "username": username, "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::testing::{app, login_as, send};

    #[tokio::test]
    async fn api_requires_a_bearer_token() {
        let (_, app) = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authorization header required");

        let (status, body) = send(&app, Method::GET, "/api/v1/profile", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid token");
    }

    #[tokio::test]
    async fn role_groups_reject_other_roles() {
        let (_, app) = app();
        let pin = login_as(&app, "pia", "pin").await;

        for uri in ["/api/v1/csr/requests", "/api/v1/admin/companies", "/api/v1/csr/shortlist"] {
            let (status, body) = send(&app, Method::GET, uri, Some(&pin), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body["error"], "insufficient permissions");
        }

        let (status, _) = send(&app, Method::GET, "/api/v1/companies", Some(&pin), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn profile_reads_the_token_identity() {
        let (_, app) = app();
        let token = login_as(&app, "quin", "csr_rep").await;

        let (status, body) = send(&app, Method::GET, "/api/v1/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "quin");
        assert_eq!(body["role"], "csr_rep");
        assert!(body.get("password_hash").is_none());

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/profile",
            Some(&token),
            Some(json!({ "email": "quin@corp.example" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "quin@corp.example");
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let (_, app) = app();
        let (status, body) = send(&app, Method::POST, "/auth/login", None, Some(json!({ "username": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
