// src/routes/catalog.rs
//
// Read-only catalog for any signed-in role.

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{Company, ServiceCategory},
    AppState,
};

pub async fn list_companies(State(state): State<AppState>) -> AppResult<Json<Vec<Company>>> {
    Ok(Json(state.service.list_companies().await?))
}

/// Active categories only.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<ServiceCategory>>> {
    Ok(Json(state.service.list_active_categories().await?))
}
