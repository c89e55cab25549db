// src/routes/admin.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{present, ApiJson, ApiPath, ApiQuery};
use crate::{
    error::AppResult,
    models::{CategoryPatch, Company, NewCategory, NewCompany, Report, ServiceCategory},
    service::admin::GenerateReportInput,
    AppState,
};

pub async fn create_company(
    State(state): State<AppState>,
    ApiJson(b): ApiJson<NewCompany>,
) -> AppResult<(StatusCode, Json<Company>)> {
    let company = state.service.create_company(b).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn list_companies(State(state): State<AppState>) -> AppResult<Json<Vec<Company>>> {
    Ok(Json(state.service.list_companies().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(b): ApiJson<NewCategory>,
) -> AppResult<(StatusCode, Json<ServiceCategory>)> {
    let category = state.service.create_category(b).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Every category, including inactive ones.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<ServiceCategory>>> {
    Ok(Json(state.service.list_categories().await?))
}

pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(b): ApiJson<CategoryPatch>,
) -> AppResult<Json<ServiceCategory>> {
    Ok(Json(state.service.update_category(id, b).await?))
}

pub async fn generate_report(
    State(state): State<AppState>,
    ApiJson(b): ApiJson<GenerateReportInput>,
) -> AppResult<(StatusCode, Json<Report>)> {
    let report = state.service.generate_report(b).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub report_type: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_reports(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ReportQuery>,
) -> AppResult<Json<Vec<Report>>> {
    Ok(Json(state.service.list_reports(present(q.report_type), q.limit).await?))
}
