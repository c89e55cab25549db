// src/service/requests.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{non_blank, required, Service};
use crate::{
    error::{AppError, AppResult},
    models::*,
    store::StoreError,
};

pub const DEFAULT_URGENCY: &str = "medium";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequestInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: i64,
    pub urgency: Option<String>,
    pub preferred_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub special_notes: Option<String>,
}

/// Where a CSR view came from; recorded on the view log.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Service {
    async fn ensure_active_category(&self, category_id: i64) -> AppResult<()> {
        match self.store.get_category(category_id).await {
            Ok(c) if c.is_active => Ok(()),
            Ok(_) => Err(AppError::validation(format!("category {category_id} is not active"))),
            Err(StoreError::NotFound(_)) => {
                Err(AppError::validation(format!("category {category_id} does not exist")))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create_pin_request(&self, pin_id: i64, input: CreateRequestInput) -> AppResult<PinRequest> {
        let title = required(&input.title, "title")?;
        let description = required(&input.description, "description")?;
        self.ensure_active_category(input.category_id).await?;

        let request = self
            .store
            .create_request(NewPinRequest {
                pin_id,
                category_id: input.category_id,
                title,
                description,
                urgency: non_blank(input.urgency).unwrap_or_else(|| DEFAULT_URGENCY.into()),
                preferred_date: input.preferred_date,
                location: non_blank(input.location),
                special_notes: input.special_notes,
            })
            .await?;
        tracing::info!(request_id = request.request_id, pin_id, "request created");
        Ok(request)
    }

    pub async fn list_pin_requests(&self, pin_id: i64) -> AppResult<Vec<PinRequest>> {
        Ok(self.store.list_requests_by_pin(pin_id).await?)
    }

    /// A request owned by `pin_id`; anyone else's request reads as missing.
    pub async fn get_own_request(&self, pin_id: i64, request_id: i64) -> AppResult<PinRequest> {
        let request = self.store.get_request(request_id).await?;
        if request.pin_id != pin_id {
            return Err(StoreError::NotFound("request").into());
        }
        Ok(request)
    }

    pub async fn update_own_request(
        &self,
        pin_id: i64,
        request_id: i64,
        patch: PinRequestPatch,
    ) -> AppResult<PinRequest> {
        self.get_own_request(pin_id, request_id).await?;
        if let Some(title) = &patch.title {
            required(title, "title")?;
        }
        if let Some(description) = &patch.description {
            required(description, "description")?;
        }
        if let Some(category_id) = patch.category_id {
            self.ensure_active_category(category_id).await?;
        }
        Ok(self.store.update_request(request_id, patch).await?)
    }

    pub async fn search_requests(&self, filter: RequestFilter, page: Page) -> AppResult<Paginated<PinRequest>> {
        let (data, total) = self.store.search_requests(&filter, page).await?;
        Ok(Paginated::new(data, page, total))
    }

    /// CSR read of a request. The view log and counter bump are best-effort:
    /// their failure is logged and the read still succeeds.
    pub async fn get_request(
        &self,
        request_id: i64,
        viewer_csr_rep_id: i64,
        ctx: ViewContext,
    ) -> AppResult<PinRequest> {
        let request = self.store.get_request(request_id).await?;

        let log = NewViewLog {
            csr_rep_id: viewer_csr_rep_id,
            request_id,
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
        };
        if let Err(e) = self.store.record_view(log).await {
            tracing::warn!(request_id, csr_rep_id = viewer_csr_rep_id, error = %e, "failed to record request view");
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        service::testing,
        store::{MemoryStore, Store},
    };

    async fn seeded() -> (Arc<MemoryStore>, Service, Pin, ServiceCategory) {
        let (store, svc) = testing::service();
        let pin = testing::pin(&svc, "pat").await;
        let category = testing::category(&store, "Groceries").await;
        (store, svc, pin, category)
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let (_, svc, pin, category) = seeded().await;
        let r = svc
            .create_pin_request(pin.pin_id, testing::request_input(category.category_id, "Weekly shop"))
            .await
            .unwrap();
        assert_eq!(r.urgency, "medium");
        assert_eq!(r.status, "open");
        assert_eq!((r.view_count, r.shortlist_count), (0, 0));

        let mut input = testing::request_input(category.category_id, "Ride to clinic");
        input.urgency = Some("high".into());
        let r = svc.create_pin_request(pin.pin_id, input).await.unwrap();
        assert_eq!(r.urgency, "high");
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_and_inactive_categories() {
        let (store, svc, pin, category) = seeded().await;
        let mut input = testing::request_input(category.category_id, "x");
        input.title = "  ".into();
        assert!(matches!(
            svc.create_pin_request(pin.pin_id, input).await,
            Err(AppError::Validation(_))
        ));

        store
            .update_category(category.category_id, CategoryPatch { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(matches!(
            svc.create_pin_request(pin.pin_id, testing::request_input(category.category_id, "x")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.create_pin_request(pin.pin_id, testing::request_input(4242, "x")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn search_by_status_returns_only_that_status() {
        let (_, svc, pin, category) = seeded().await;
        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let r = svc
                .create_pin_request(pin.pin_id, testing::request_input(category.category_id, title))
                .await
                .unwrap();
            ids.push(r.request_id);
        }
        svc.update_own_request(
            pin.pin_id,
            ids[1],
            PinRequestPatch { status: Some("completed".into()), ..Default::default() },
        )
        .await
        .unwrap();

        let open = svc
            .search_requests(RequestFilter { status: Some("open".into()), ..Default::default() }, Page::default())
            .await
            .unwrap();
        assert_eq!(open.pagination.total, 2);
        assert!(open.data.iter().all(|r| r.status == "open"));

        let all = svc.search_requests(RequestFilter::default(), Page::default()).await.unwrap();
        let got: Vec<i64> = all.data.iter().map(|r| r.request_id).collect();
        assert_eq!(got, vec![ids[2], ids[1], ids[0]]);
    }

    #[tokio::test]
    async fn search_matches_location_and_text_case_insensitively() {
        let (_, svc, pin, category) = seeded().await;
        let mut input = testing::request_input(category.category_id, "Garden cleanup");
        input.location = Some("Jurong West".into());
        svc.create_pin_request(pin.pin_id, input).await.unwrap();
        svc.create_pin_request(pin.pin_id, testing::request_input(category.category_id, "Tutoring"))
            .await
            .unwrap();

        let by_location = svc
            .search_requests(RequestFilter { location: Some("jurong".into()), ..Default::default() }, Page::default())
            .await
            .unwrap();
        assert_eq!(by_location.pagination.total, 1);

        let by_text = svc
            .search_requests(
                RequestFilter {
                    search: Some("GARDEN".into()),
                    category_id: Some(category.category_id),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_text.data.len(), 1);
        assert_eq!(by_text.data[0].title, "Garden cleanup");

        let none = svc
            .search_requests(RequestFilter { urgency: Some("urgent".into()), ..Default::default() }, Page::default())
            .await
            .unwrap();
        assert_eq!(none.pagination.total, 0);
        assert!(none.data.is_empty());
    }

    #[tokio::test]
    async fn pagination_returns_the_requested_window() {
        let (_, svc, pin, category) = seeded().await;
        let mut ids = Vec::new();
        for i in 1..=25 {
            let r = svc
                .create_pin_request(pin.pin_id, testing::request_input(category.category_id, &format!("req {i}")))
                .await
                .unwrap();
            ids.push(r.request_id);
        }
        ids.reverse(); // newest first

        let page = svc
            .search_requests(RequestFilter::default(), Page::new(Some(2), Some(10)))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.page_size, 10);
        let got: Vec<i64> = page.data.iter().map(|r| r.request_id).collect();
        assert_eq!(got, ids[10..20].to_vec());

        let last = svc
            .search_requests(RequestFilter::default(), Page::new(Some(3), Some(10)))
            .await
            .unwrap();
        assert_eq!(last.data.len(), 5);
    }

    #[tokio::test]
    async fn concurrent_views_are_all_counted() {
        let (store, svc, pin, category) = seeded().await;
        let company = testing::company(&store).await;
        let rep = testing::csr_rep(&svc, "quinn", company.company_id).await;
        let request = svc
            .create_pin_request(pin.pin_id, testing::request_input(category.category_id, "Meals"))
            .await
            .unwrap();

        let svc = Arc::new(svc);
        let (request_id, csr_rep_id) = (request.request_id, rep.csr_rep_id);
        let n = 32;
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    svc.get_request(request_id, csr_rep_id, ViewContext::default()).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let after = store.get_request(request_id).await.unwrap();
        assert_eq!(after.view_count, n);
        assert_eq!(store.view_logs_for(request_id).await.len(), n as usize);
    }

    #[tokio::test]
    async fn owner_reads_are_scoped_and_uncounted() {
        let (store, svc, pin, category) = seeded().await;
        let other = testing::pin(&svc, "rae").await;
        let request = svc
            .create_pin_request(pin.pin_id, testing::request_input(category.category_id, "Mine"))
            .await
            .unwrap();

        svc.get_own_request(pin.pin_id, request.request_id).await.unwrap();
        assert!(matches!(
            svc.get_own_request(other.pin_id, request.request_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.update_own_request(other.pin_id, request.request_id, PinRequestPatch::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.get_request(request.request_id).await.unwrap().view_count, 0);
    }

    #[tokio::test]
    async fn failed_view_bookkeeping_does_not_fail_the_read() {
        let (store, svc, pin, category) = seeded().await;
        let company = testing::company(&store).await;
        let rep = testing::csr_rep(&svc, "sol", company.company_id).await;
        let request = svc
            .create_pin_request(pin.pin_id, testing::request_input(category.category_id, "Laundry"))
            .await
            .unwrap();

        store.fail_view_writes();
        let got = svc
            .get_request(request.request_id, rep.csr_rep_id, ViewContext::default())
            .await
            .unwrap();
        assert_eq!(got.request_id, request.request_id);
        assert_eq!(got.title, "Laundry");

        assert_eq!(store.get_request(request.request_id).await.unwrap().view_count, 0);
        assert!(store.view_logs_for(request.request_id).await.is_empty());
    }

    #[tokio::test]
    async fn viewing_a_missing_request_is_not_found() {
        let (_, svc, ..) = seeded().await;
        assert!(matches!(
            svc.get_request(777, 1, ViewContext::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
