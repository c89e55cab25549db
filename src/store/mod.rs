// src/store/mod.rs
//
// Access layer: typed persistence operations shared by the Postgres and
// in-memory backends. No business validation lives here beyond existence
// and uniqueness.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::*;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user_by_id(&self, id: i64) -> StoreResult<User>;
    async fn get_user_by_username(&self, username: &str) -> StoreResult<User>;
    async fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<User>;

    // profiles
    async fn create_pin(&self, new: NewPin) -> StoreResult<Pin>;
    async fn get_pin_by_user_id(&self, user_id: i64) -> StoreResult<Pin>;
    async fn update_pin(&self, id: i64, patch: PinDetails) -> StoreResult<Pin>;
    async fn create_csr_rep(&self, new: NewCsrRep) -> StoreResult<CsrRep>;
    async fn get_csr_rep_by_user_id(&self, user_id: i64) -> StoreResult<CsrRep>;
    async fn update_csr_rep(&self, id: i64, patch: CsrRepDetails) -> StoreResult<CsrRep>;

    // catalog
    async fn create_company(&self, new: NewCompany) -> StoreResult<Company>;
    async fn get_company(&self, id: i64) -> StoreResult<Company>;
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn create_category(&self, new: NewCategory) -> StoreResult<ServiceCategory>;
    async fn get_category(&self, id: i64) -> StoreResult<ServiceCategory>;
    async fn list_categories(&self) -> StoreResult<Vec<ServiceCategory>>;
    async fn list_active_categories(&self) -> StoreResult<Vec<ServiceCategory>>;
    async fn update_category(&self, id: i64, patch: CategoryPatch) -> StoreResult<ServiceCategory>;

    // requests
    async fn create_request(&self, new: NewPinRequest) -> StoreResult<PinRequest>;
    async fn get_request(&self, id: i64) -> StoreResult<PinRequest>;
    async fn list_requests_by_pin(&self, pin_id: i64) -> StoreResult<Vec<PinRequest>>;
    async fn search_requests(
        &self,
        filter: &RequestFilter,
        page: Page,
    ) -> StoreResult<(Vec<PinRequest>, i64)>;
    async fn update_request(&self, id: i64, patch: PinRequestPatch) -> StoreResult<PinRequest>;
    /// Appends the view log and bumps `view_count` by one as a single unit.
    async fn record_view(&self, log: NewViewLog) -> StoreResult<ViewLog>;
    async fn increment_shortlist_count(&self, request_id: i64) -> StoreResult<()>;

    // shortlists
    /// Inserts the row and bumps the request's `shortlist_count` atomically.
    async fn create_shortlist(&self, new: NewShortlist) -> StoreResult<Shortlist>;
    async fn get_shortlist(&self, id: i64) -> StoreResult<Shortlist>;
    async fn list_shortlists_by_csr_rep(&self, csr_rep_id: i64) -> StoreResult<Vec<Shortlist>>;
    async fn delete_shortlist(&self, id: i64) -> StoreResult<()>;
    async fn shortlist_exists(&self, csr_rep_id: i64, request_id: i64) -> StoreResult<bool>;

    // matches
    async fn create_match(&self, new: NewMatch) -> StoreResult<Match>;
    async fn get_match(&self, id: i64) -> StoreResult<Match>;
    async fn search_matches(&self, filter: &MatchFilter, page: Page) -> StoreResult<(Vec<Match>, i64)>;
    async fn update_match(&self, id: i64, patch: MatchPatch) -> StoreResult<Match>;

    // reporting
    async fn create_report(&self, new: NewReport) -> StoreResult<Report>;
    async fn list_reports(&self, report_type: Option<&str>, limit: i64) -> StoreResult<Vec<Report>>;
    async fn request_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<RequestStats>;
}
