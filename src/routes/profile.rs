// src/routes/profile.rs

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use super::ApiJson;
use crate::{auth::AuthUser, error::AppResult, models::User, AppState};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
) -> AppResult<Json<User>> {
    Ok(Json(state.service.current_user(&who).await?))
}

#[derive(Deserialize)]
pub struct UpdateProfileBody {
    pub email: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(b): ApiJson<UpdateProfileBody>,
) -> AppResult<Json<User>> {
    Ok(Json(state.service.update_profile(&who, b.email).await?))
}
