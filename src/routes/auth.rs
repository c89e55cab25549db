// src/routes/auth.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::ApiJson;
use crate::{error::AppResult, models::User, service::LoginResponse, AppState};

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(b): ApiJson<RegisterBody>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.service.register_user(&b.username, &b.email, &b.password, &b.role).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(b): ApiJson<LoginBody>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.service.login(&b.username, &b.password).await?))
}
