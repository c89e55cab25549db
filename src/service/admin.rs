// src/service/admin.rs

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::{required, Service};
use crate::{
    error::{AppError, AppResult},
    models::*,
};

pub const DEFAULT_REPORT_LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
            ReportPeriod::Yearly => "yearly",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            ReportPeriod::Daily => 1,
            ReportPeriod::Weekly => 7,
            ReportPeriod::Monthly => 30,
            ReportPeriod::Yearly => 365,
        }
    }

    /// Window ending at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(self.days()), now)
    }
}

impl FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportPeriod::Daily),
            "weekly" => Ok(ReportPeriod::Weekly),
            "monthly" => Ok(ReportPeriod::Monthly),
            "yearly" => Ok(ReportPeriod::Yearly),
            other => Err(format!("unknown report period: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReportInput {
    #[serde(default)]
    pub report_type: String,
    #[serde(default)]
    pub period: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Service {
    // ───────────────────────────────────────
    // Companies
    // ───────────────────────────────────────
    pub async fn create_company(&self, mut new: NewCompany) -> AppResult<Company> {
        new.name = required(&new.name, "name")?;
        Ok(self.store.create_company(new).await?)
    }

    pub async fn list_companies(&self) -> AppResult<Vec<Company>> {
        Ok(self.store.list_companies().await?)
    }

    // ───────────────────────────────────────
    // Service categories
    // ───────────────────────────────────────
    pub async fn create_category(&self, mut new: NewCategory) -> AppResult<ServiceCategory> {
        new.name = required(&new.name, "name")?;
        Ok(self.store.create_category(new).await?)
    }

    pub async fn list_categories(&self) -> AppResult<Vec<ServiceCategory>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn list_active_categories(&self) -> AppResult<Vec<ServiceCategory>> {
        Ok(self.store.list_active_categories().await?)
    }

    pub async fn update_category(&self, category_id: i64, mut patch: CategoryPatch) -> AppResult<ServiceCategory> {
        if let Some(name) = &patch.name {
            patch.name = Some(required(name, "name")?);
        }
        Ok(self.store.update_category(category_id, patch).await?)
    }

    // ───────────────────────────────────────
    // Reports
    // ───────────────────────────────────────

    /// Computes request/match statistics for the window and stores them as a
    /// snapshot. Explicit dates override the period's default window.
    pub async fn generate_report(&self, input: GenerateReportInput) -> AppResult<Report> {
        let report_type = required(&input.report_type, "report_type")?;
        let period: ReportPeriod = input.period.parse().map_err(AppError::Validation)?;

        let (default_start, default_end) = period.window(Utc::now());
        let start = input.start_date.unwrap_or(default_start);
        let end = input.end_date.unwrap_or(default_end);
        if start > end {
            return Err(AppError::validation("start_date must not be after end_date"));
        }

        let stats = self.store.request_stats(start, end).await?;
        let data = serde_json::to_value(&stats).map_err(|e| AppError::Storage(e.to_string()))?;
        let report = self
            .store
            .create_report(NewReport { report_type, period: period.as_str().into(), data })
            .await?;
        tracing::info!(report_id = report.report_id, period = period.as_str(), "report generated");
        Ok(report)
    }

    pub async fn list_reports(&self, report_type: Option<String>, limit: Option<i64>) -> AppResult<Vec<Report>> {
        let limit = limit.unwrap_or(DEFAULT_REPORT_LIMIT).clamp(1, MAX_PAGE_SIZE);
        let report_type = report_type.filter(|t| !t.trim().is_empty());
        Ok(self.store.list_reports(report_type.as_deref(), limit).await?)
    }
}
