// src/routes/health.rs

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct PingResp {
    pub message: &'static str,
}

/// Liveness check for the load balancer.
pub async fn healthz() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn ping() -> Json<PingResp> {
    Json(PingResp { message: "pong" })
}
