// src/service/matching.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{non_blank, Service};
use crate::{
    error::{AppError, AppResult},
    models::*,
    store::StoreError,
};

pub const DEFAULT_PRIORITY: &str = "medium";
pub const COMPLETED: &str = "completed";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateShortlistInput {
    pub request_id: i64,
    pub notes: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMatchInput {
    pub request_id: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

fn check_rating(rating: Option<i16>) -> AppResult<()> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => {
            Err(AppError::validation("rating must be between 1 and 5"))
        }
        _ => Ok(()),
    }
}

impl Service {
    // ───────────────────────────────────────
    // Shortlist
    // ───────────────────────────────────────
    pub async fn add_to_shortlist(&self, csr_rep_id: i64, input: CreateShortlistInput) -> AppResult<Shortlist> {
        let request = self.store.get_request(input.request_id).await?;

        // check-then-insert; the partial unique index backs this up under races
        if self.store.shortlist_exists(csr_rep_id, request.request_id).await? {
            return Err(AppError::Conflict("request already shortlisted".into()));
        }
        let shortlist = self
            .store
            .create_shortlist(NewShortlist {
                csr_rep_id,
                request_id: request.request_id,
                notes: input.notes,
                priority: non_blank(input.priority).unwrap_or_else(|| DEFAULT_PRIORITY.into()),
            })
            .await?;
        Ok(shortlist)
    }

    pub async fn list_shortlist(&self, csr_rep_id: i64) -> AppResult<Vec<Shortlist>> {
        Ok(self.store.list_shortlists_by_csr_rep(csr_rep_id).await?)
    }

    /// Soft-deletes the row. `shortlist_count` is left as is: it counts every
    /// shortlisting ever made, not the current ones.
    pub async fn remove_from_shortlist(&self, csr_rep_id: i64, shortlist_id: i64) -> AppResult<()> {
        let shortlist = self.store.get_shortlist(shortlist_id).await?;
        if shortlist.csr_rep_id != csr_rep_id {
            return Err(StoreError::NotFound("shortlist").into());
        }
        Ok(self.store.delete_shortlist(shortlist_id).await?)
    }

    // ───────────────────────────────────────
    // Matches
    // ───────────────────────────────────────
    pub async fn create_match(&self, csr_rep_id: i64, input: CreateMatchInput) -> AppResult<Match> {
        let request = self.store.get_request(input.request_id).await?;
        let created = self
            .store
            .create_match(NewMatch {
                csr_rep_id,
                request_id: request.request_id,
                pin_id: request.pin_id,
                start_date: input.start_date,
                notes: input.notes,
            })
            .await?;
        tracing::info!(match_id = created.match_id, csr_rep_id, request_id = request.request_id, "match created");
        Ok(created)
    }

    pub async fn search_matches(&self, filter: MatchFilter, page: Page) -> AppResult<Paginated<Match>> {
        let (data, total) = self.store.search_matches(&filter, page).await?;
        Ok(Paginated::new(data, page, total))
    }

    /// A match the CSR rep is party to; anyone else's reads as missing.
    pub async fn get_own_match(&self, csr_rep_id: i64, match_id: i64) -> AppResult<Match> {
        let m = self.store.get_match(match_id).await?;
        if m.csr_rep_id != csr_rep_id {
            return Err(StoreError::NotFound("match").into());
        }
        Ok(m)
    }

    /// Partial update. Status is free text with no transition graph; only the
    /// rating range is enforced.
    pub async fn update_match(&self, csr_rep_id: i64, match_id: i64, mut patch: MatchPatch) -> AppResult<Match> {
        check_rating(patch.rating)?;
        self.get_own_match(csr_rep_id, match_id).await?;
        if patch.status.as_deref() == Some(COMPLETED) && patch.completed_at.is_none() {
            patch.completed_at = Some(Utc::now());
        }
        Ok(self.store.update_match(match_id, patch).await?)
    }

    pub async fn pin_history(&self, pin_id: i64, mut filter: MatchFilter, page: Page) -> AppResult<Paginated<Match>> {
        filter.pin_id = Some(pin_id);
        self.search_matches(filter, page).await
    }

    pub async fn csr_matches(&self, csr_rep_id: i64, mut filter: MatchFilter, page: Page) -> AppResult<Paginated<Match>> {
        filter.csr_rep_id = Some(csr_rep_id);
        self.search_matches(filter, page).await
    }

    /// Completed engagements unless the caller asks for another status.
    pub async fn csr_history(&self, csr_rep_id: i64, mut filter: MatchFilter, page: Page) -> AppResult<Paginated<Match>> {
        filter.status.get_or_insert_with(|| COMPLETED.into());
        self.csr_matches(csr_rep_id, filter, page).await
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

    struct Fixture {
        store: Arc<MemoryStore>,
        svc: Service,
        pin: Pin,
        rep: CsrRep,
        category: ServiceCategory,
        request: PinRequest,
    }

    async fn fixture() -> Fixture {
        let (store, svc) = testing::service();
        let pin = testing::pin(&svc, "uma").await;
        let company = testing::company(&store).await;
        let rep = testing::csr_rep(&svc, "vic", company.company_id).await;
        let category = testing::category(&store, "Transport").await;
        let request = svc
            .create_pin_request(pin.pin_id, testing::request_input(category.category_id, "Ride"))
            .await
            .unwrap();
        Fixture { store, svc, pin, rep, category, request }
    }

    fn shortlist_input(request_id: i64) -> CreateShortlistInput {
        CreateShortlistInput { request_id, notes: None, priority: None }
    }

    fn match_input(request_id: i64) -> CreateMatchInput {
        CreateMatchInput { request_id, start_date: None, notes: Some("first visit".into()) }
    }

    #[tokio::test]
    async fn shortlisting_twice_conflicts_and_counts_once() {
        let f = fixture().await;
        let s = f.svc.add_to_shortlist(f.rep.csr_rep_id, shortlist_input(f.request.request_id)).await.unwrap();
        assert_eq!(s.priority, "medium");
        assert_eq!(f.store.get_request(f.request.request_id).await.unwrap().shortlist_count, 1);

        let err = f
            .svc
            .add_to_shortlist(f.rep.csr_rep_id, shortlist_input(f.request.request_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(f.store.get_request(f.request.request_id).await.unwrap().shortlist_count, 1);
    }

    #[tokio::test]
    async fn removal_keeps_the_counter_and_allows_reshortlisting() {
        let f = fixture().await;
        let s = f.svc.add_to_shortlist(f.rep.csr_rep_id, shortlist_input(f.request.request_id)).await.unwrap();
        f.svc.remove_from_shortlist(f.rep.csr_rep_id, s.shortlist_id).await.unwrap();

        assert!(f.svc.list_shortlist(f.rep.csr_rep_id).await.unwrap().is_empty());
        assert_eq!(f.store.get_request(f.request.request_id).await.unwrap().shortlist_count, 1);

        f.svc.add_to_shortlist(f.rep.csr_rep_id, shortlist_input(f.request.request_id)).await.unwrap();
        assert_eq!(f.store.get_request(f.request.request_id).await.unwrap().shortlist_count, 2);
        assert_eq!(f.svc.list_shortlist(f.rep.csr_rep_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_the_owner_may_remove_a_shortlist() {
        let f = fixture().await;
        let company = testing::company(&f.store).await;
        let other = testing::csr_rep(&f.svc, "wes", company.company_id).await;
        let s = f.svc.add_to_shortlist(f.rep.csr_rep_id, shortlist_input(f.request.request_id)).await.unwrap();

        assert!(matches!(
            f.svc.remove_from_shortlist(other.csr_rep_id, s.shortlist_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.svc.add_to_shortlist(f.rep.csr_rep_id, shortlist_input(9999)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn match_binds_rep_request_and_owning_pin() {
        let f = fixture().await;
        let m = f.svc.create_match(f.rep.csr_rep_id, match_input(f.request.request_id)).await.unwrap();
        assert_eq!(m.status, "pending");
        assert_eq!(m.pin_id, f.pin.pin_id);
        assert_eq!(m.request_id, f.request.request_id);
        assert_eq!(m.rating, None);
    }

    #[tokio::test]
    async fn rating_must_be_between_one_and_five() {
        let f = fixture().await;
        let m = f.svc.create_match(f.rep.csr_rep_id, match_input(f.request.request_id)).await.unwrap();

        let err = f
            .svc
            .update_match(f.rep.csr_rep_id, m.match_id, MatchPatch { rating: Some(6), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = f
            .svc
            .update_match(f.rep.csr_rep_id, m.match_id, MatchPatch { rating: Some(0), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let updated = f
            .svc
            .update_match(
                f.rep.csr_rep_id,
                m.match_id,
                MatchPatch { rating: Some(5), feedback: Some("great".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, Some(5));
        assert_eq!(updated.feedback.as_deref(), Some("great"));
        assert_eq!(updated.status, "pending");
    }

    #[tokio::test]
    async fn status_changes_are_not_restricted() {
        let f = fixture().await;
        let m = f.svc.create_match(f.rep.csr_rep_id, match_input(f.request.request_id)).await.unwrap();
        let status = |s: &str| MatchPatch { status: Some(s.into()), ..Default::default() };

        let done = f.svc.update_match(f.rep.csr_rep_id, m.match_id, status("completed")).await.unwrap();
        assert_eq!(done.status, "completed");
        assert!(done.completed_at.is_some());

        let back = f.svc.update_match(f.rep.csr_rep_id, m.match_id, status("pending")).await.unwrap();
        assert_eq!(back.status, "pending");
    }

    #[tokio::test]
    async fn match_searches_are_scoped_and_filterable() {
        let f = fixture().await;
        let other_category = testing::category(&f.store, "Meals").await;
        let meals = f
            .svc
            .create_pin_request(f.pin.pin_id, testing::request_input(other_category.category_id, "Lunch"))
            .await
            .unwrap();
        let m1 = f.svc.create_match(f.rep.csr_rep_id, match_input(f.request.request_id)).await.unwrap();
        let m2 = f.svc.create_match(f.rep.csr_rep_id, match_input(meals.request_id)).await.unwrap();
        f.svc
            .update_match(f.rep.csr_rep_id, m1.match_id, MatchPatch { status: Some("completed".into()), ..Default::default() })
            .await
            .unwrap();

        let by_category = f
            .svc
            .csr_matches(
                f.rep.csr_rep_id,
                MatchFilter { category_id: Some(f.category.category_id), ..Default::default() },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_category.data.len(), 1);
        assert_eq!(by_category.data[0].match_id, m1.match_id);

        let history = f.svc.csr_history(f.rep.csr_rep_id, MatchFilter::default(), Page::default()).await.unwrap();
        assert_eq!(history.pagination.total, 1);

        let pin_side = f.svc.pin_history(f.pin.pin_id, MatchFilter::default(), Page::default()).await.unwrap();
        let ids: Vec<i64> = pin_side.data.iter().map(|m| m.match_id).collect();
        assert_eq!(ids, vec![m2.match_id, m1.match_id]);

        let company = testing::company(&f.store).await;
        let stranger = testing::csr_rep(&f.svc, "xia", company.company_id).await;
        assert_eq!(
            f.svc.csr_matches(stranger.csr_rep_id, MatchFilter::default(), Page::default()).await.unwrap().pagination.total,
            0
        );
        assert!(matches!(
            f.svc.get_own_match(stranger.csr_rep_id, m1.match_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
