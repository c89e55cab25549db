// src/store/memory.rs
//
// In-process backend used when no DATABASE_URL is configured. Mirrors the
// Postgres semantics: soft-deleted rows are invisible, uniqueness ignores
// soft-deleted rows, and counters are bumped under the table lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::models::*;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    pins: Vec<Pin>,
    csr_reps: Vec<CsrRep>,
    companies: Vec<Company>,
    categories: Vec<ServiceCategory>,
    requests: Vec<PinRequest>,
    shortlists: Vec<Shortlist>,
    matches: Vec<Match>,
    view_logs: Vec<ViewLog>,
    reports: Vec<Report>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    fail_view_writes: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `record_view` fail with a backend error.
    #[cfg(test)]
    pub fn fail_view_writes(&self) {
        self.fail_view_writes.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(test)]
    fn view_writes_fail(&self) -> bool {
        self.fail_view_writes.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[cfg(not(test))]
    fn view_writes_fail(&self) -> bool {
        false
    }

    #[cfg(test)]
    pub async fn view_logs_for(&self, request_id: i64) -> Vec<ViewLog> {
        let t = self.tables.read().await;
        t.view_logs.iter().filter(|v| v.request_id == request_id).cloned().collect()
    }
}

trait Live {
    fn is_live(&self) -> bool;
}

macro_rules! live_rows {
    ($($ty:ty),*) => {
        $(impl Live for $ty {
            fn is_live(&self) -> bool { self.deleted_at.is_none() }
        })*
    };
}
live_rows!(User, Pin, CsrRep, Company, ServiceCategory, PinRequest, Shortlist, Match, Report);

fn find<'a, T: Live>(rows: &'a [T], pred: impl Fn(&T) -> bool, entity: &'static str) -> StoreResult<&'a T> {
    rows.iter().find(|r| r.is_live() && pred(&**r)).ok_or(StoreError::NotFound(entity))
}

fn find_mut<'a, T: Live>(
    rows: &'a mut [T],
    pred: impl Fn(&T) -> bool,
    entity: &'static str,
) -> StoreResult<&'a mut T> {
    rows.iter_mut().find(|r| r.is_live() && pred(&**r)).ok_or(StoreError::NotFound(entity))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn request_matches(r: &PinRequest, f: &RequestFilter) -> bool {
    r.deleted_at.is_none()
        && f.category_id.map_or(true, |c| r.category_id == c)
        && f.status.as_ref().map_or(true, |s| &r.status == s)
        && f.urgency.as_ref().map_or(true, |u| &r.urgency == u)
        && f.start_date.map_or(true, |d| r.created_at >= d)
        && f.end_date.map_or(true, |d| r.created_at <= d)
        && f.location.as_ref().map_or(true, |l| {
            r.location.as_deref().is_some_and(|loc| contains_ci(loc, l))
        })
        && f.search.as_ref().map_or(true, |s| {
            contains_ci(&r.title, s) || contains_ci(&r.description, s)
        })
}

/// Newest first, ties broken by id, then sliced to the page.
fn paginate<T: Clone>(
    mut rows: Vec<&T>,
    key: impl Fn(&T) -> (DateTime<Utc>, i64),
    page: Page,
) -> (Vec<T>, i64) {
    rows.sort_by(|a, b| key(*b).cmp(&key(*a)));
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.page_size as usize)
        .cloned()
        .collect();
    (items, total)
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let live_users = || t.users.iter().filter(|u| u.deleted_at.is_none());
        if live_users().any(|u| u.username == new.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if live_users().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = Utc::now();
        let user = User {
            user_id: t.next_id(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<User> {
        let t = self.tables.read().await;
        find(&t.users, |u| u.user_id == id, "user").cloned()
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        let t = self.tables.read().await;
        find(&t.users, |u| u.username == username, "user").cloned()
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if let Some(email) = &patch.email {
            if t.users.iter().any(|u| u.deleted_at.is_none() && u.user_id != id && &u.email == email) {
                return Err(StoreError::Duplicate("email"));
            }
        }
        let user = find_mut(&mut t.users, |u| u.user_id == id, "user")?;
        set(&mut user.email, patch.email);
        set(&mut user.is_active, patch.is_active);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_pin(&self, new: NewPin) -> StoreResult<Pin> {
        let mut t = self.tables.write().await;
        if t.pins.iter().any(|p| p.deleted_at.is_none() && p.user_id == new.user_id) {
            return Err(StoreError::Duplicate("PIN profile"));
        }
        let now = Utc::now();
        let d = new.details;
        let pin = Pin {
            pin_id: t.next_id(),
            user_id: new.user_id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: d.phone,
            address: d.address,
            date_of_birth: d.date_of_birth,
            emergency_contact: d.emergency_contact,
            medical_info: d.medical_info,
            special_needs: d.special_needs,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.pins.push(pin.clone());
        Ok(pin)
    }

    async fn get_pin_by_user_id(&self, user_id: i64) -> StoreResult<Pin> {
        let t = self.tables.read().await;
        find(&t.pins, |p| p.user_id == user_id, "PIN profile").cloned()
    }

    async fn update_pin(&self, id: i64, d: PinDetails) -> StoreResult<Pin> {
        let mut t = self.tables.write().await;
        let pin = find_mut(&mut t.pins, |p| p.pin_id == id, "PIN profile")?;
        set(&mut pin.first_name, d.first_name);
        set(&mut pin.last_name, d.last_name);
        set_opt(&mut pin.phone, d.phone);
        set_opt(&mut pin.address, d.address);
        set_opt(&mut pin.date_of_birth, d.date_of_birth);
        set_opt(&mut pin.emergency_contact, d.emergency_contact);
        set_opt(&mut pin.medical_info, d.medical_info);
        set_opt(&mut pin.special_needs, d.special_needs);
        pin.updated_at = Utc::now();
        Ok(pin.clone())
    }

    async fn create_csr_rep(&self, new: NewCsrRep) -> StoreResult<CsrRep> {
        let mut t = self.tables.write().await;
        if t.csr_reps.iter().any(|c| c.deleted_at.is_none() && c.user_id == new.user_id) {
            return Err(StoreError::Duplicate("CSR profile"));
        }
        let now = Utc::now();
        let d = new.details;
        let rep = CsrRep {
            csr_rep_id: t.next_id(),
            user_id: new.user_id,
            company_id: new.company_id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: d.phone,
            department: d.department,
            position: d.position,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.csr_reps.push(rep.clone());
        Ok(rep)
    }

    async fn get_csr_rep_by_user_id(&self, user_id: i64) -> StoreResult<CsrRep> {
        let t = self.tables.read().await;
        find(&t.csr_reps, |c| c.user_id == user_id, "CSR profile").cloned()
    }

    async fn update_csr_rep(&self, id: i64, d: CsrRepDetails) -> StoreResult<CsrRep> {
        let mut t = self.tables.write().await;
        let rep = find_mut(&mut t.csr_reps, |c| c.csr_rep_id == id, "CSR profile")?;
        set(&mut rep.company_id, d.company_id);
        set(&mut rep.first_name, d.first_name);
        set(&mut rep.last_name, d.last_name);
        set_opt(&mut rep.phone, d.phone);
        set_opt(&mut rep.department, d.department);
        set_opt(&mut rep.position, d.position);
        rep.updated_at = Utc::now();
        Ok(rep.clone())
    }

    async fn create_company(&self, new: NewCompany) -> StoreResult<Company> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let company = Company {
            company_id: t.next_id(),
            name: new.name,
            industry: new.industry,
            address: new.address,
            phone: new.phone,
            email: new.email,
            website: new.website,
            description: new.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.companies.push(company.clone());
        Ok(company)
    }

    async fn get_company(&self, id: i64) -> StoreResult<Company> {
        let t = self.tables.read().await;
        find(&t.companies, |c| c.company_id == id, "company").cloned()
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Company> = t.companies.iter().filter(|c| c.deleted_at.is_none()).cloned().collect();
        rows.sort_by(|a, b| (&a.name, a.company_id).cmp(&(&b.name, b.company_id)));
        Ok(rows)
    }

    async fn create_category(&self, new: NewCategory) -> StoreResult<ServiceCategory> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let category = ServiceCategory {
            category_id: t.next_id(),
            name: new.name,
            description: new.description,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> StoreResult<ServiceCategory> {
        let t = self.tables.read().await;
        find(&t.categories, |c| c.category_id == id, "category").cloned()
    }

    async fn list_categories(&self) -> StoreResult<Vec<ServiceCategory>> {
        let t = self.tables.read().await;
        let mut rows: Vec<ServiceCategory> =
            t.categories.iter().filter(|c| c.deleted_at.is_none()).cloned().collect();
        rows.sort_by(|a, b| (&a.name, a.category_id).cmp(&(&b.name, b.category_id)));
        Ok(rows)
    }

    async fn list_active_categories(&self) -> StoreResult<Vec<ServiceCategory>> {
        let mut rows = self.list_categories().await?;
        rows.retain(|c| c.is_active);
        Ok(rows)
    }

    async fn update_category(&self, id: i64, patch: CategoryPatch) -> StoreResult<ServiceCategory> {
        let mut t = self.tables.write().await;
        let c = find_mut(&mut t.categories, |c| c.category_id == id, "category")?;
        set(&mut c.name, patch.name);
        set_opt(&mut c.description, patch.description);
        set(&mut c.is_active, patch.is_active);
        c.updated_at = Utc::now();
        Ok(c.clone())
    }

    async fn create_request(&self, new: NewPinRequest) -> StoreResult<PinRequest> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let request = PinRequest {
            request_id: t.next_id(),
            pin_id: new.pin_id,
            category_id: new.category_id,
            title: new.title,
            description: new.description,
            urgency: new.urgency,
            status: "open".into(),
            preferred_date: new.preferred_date,
            location: new.location,
            special_notes: new.special_notes,
            view_count: 0,
            shortlist_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.requests.push(request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: i64) -> StoreResult<PinRequest> {
        let t = self.tables.read().await;
        find(&t.requests, |r| r.request_id == id, "request").cloned()
    }

    async fn list_requests_by_pin(&self, pin_id: i64) -> StoreResult<Vec<PinRequest>> {
        let t = self.tables.read().await;
        let rows = t.requests.iter().filter(|r| r.deleted_at.is_none() && r.pin_id == pin_id).collect();
        let (items, _) = paginate(rows, |r| (r.created_at, r.request_id), Page { page: 1, page_size: i64::MAX });
        Ok(items)
    }

    async fn search_requests(
        &self,
        filter: &RequestFilter,
        page: Page,
    ) -> StoreResult<(Vec<PinRequest>, i64)> {
        let t = self.tables.read().await;
        let rows = t.requests.iter().filter(|r| request_matches(r, filter)).collect();
        Ok(paginate(rows, |r| (r.created_at, r.request_id), page))
    }

    async fn update_request(&self, id: i64, p: PinRequestPatch) -> StoreResult<PinRequest> {
        let mut t = self.tables.write().await;
        let r = find_mut(&mut t.requests, |r| r.request_id == id, "request")?;
        set(&mut r.title, p.title);
        set(&mut r.description, p.description);
        set(&mut r.category_id, p.category_id);
        set(&mut r.urgency, p.urgency);
        set(&mut r.status, p.status);
        set_opt(&mut r.preferred_date, p.preferred_date);
        set_opt(&mut r.location, p.location);
        set_opt(&mut r.special_notes, p.special_notes);
        r.updated_at = Utc::now();
        Ok(r.clone())
    }

    async fn record_view(&self, log: NewViewLog) -> StoreResult<ViewLog> {
        if self.view_writes_fail() {
            return Err(StoreError::Backend("view log write failed".into()));
        }
        let mut t = self.tables.write().await;
        let request = t
            .requests
            .iter_mut()
            .find(|r| r.request_id == log.request_id)
            .ok_or(StoreError::NotFound("request"))?;
        request.view_count += 1;

        let row = ViewLog {
            view_log_id: t.next_id(),
            csr_rep_id: log.csr_rep_id,
            request_id: log.request_id,
            ip_address: log.ip_address,
            user_agent: log.user_agent,
            created_at: Utc::now(),
        };
        t.view_logs.push(row.clone());
        Ok(row)
    }

    async fn increment_shortlist_count(&self, request_id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let request = t
            .requests
            .iter_mut()
            .find(|r| r.request_id == request_id)
            .ok_or(StoreError::NotFound("request"))?;
        request.shortlist_count += 1;
        Ok(())
    }

    async fn create_shortlist(&self, new: NewShortlist) -> StoreResult<Shortlist> {
        let mut t = self.tables.write().await;
        if t.shortlists.iter().any(|s| {
            s.deleted_at.is_none() && s.csr_rep_id == new.csr_rep_id && s.request_id == new.request_id
        }) {
            return Err(StoreError::Duplicate("shortlist"));
        }
        // row and counter change together or not at all
        let request = t
            .requests
            .iter_mut()
            .find(|r| r.is_live() && r.request_id == new.request_id)
            .ok_or(StoreError::NotFound("request"))?;
        request.shortlist_count += 1;

        let now = Utc::now();
        let row = Shortlist {
            shortlist_id: t.next_id(),
            csr_rep_id: new.csr_rep_id,
            request_id: new.request_id,
            notes: new.notes,
            priority: new.priority,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.shortlists.push(row.clone());
        Ok(row)
    }

    async fn get_shortlist(&self, id: i64) -> StoreResult<Shortlist> {
        let t = self.tables.read().await;
        find(&t.shortlists, |s| s.shortlist_id == id, "shortlist").cloned()
    }

    async fn list_shortlists_by_csr_rep(&self, csr_rep_id: i64) -> StoreResult<Vec<Shortlist>> {
        let t = self.tables.read().await;
        let rows = t
            .shortlists
            .iter()
            .filter(|s| s.deleted_at.is_none() && s.csr_rep_id == csr_rep_id)
            .collect();
        let (items, _) = paginate(rows, |s| (s.created_at, s.shortlist_id), Page { page: 1, page_size: i64::MAX });
        Ok(items)
    }

    async fn delete_shortlist(&self, id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let s = find_mut(&mut t.shortlists, |s| s.shortlist_id == id, "shortlist")?;
        s.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn shortlist_exists(&self, csr_rep_id: i64, request_id: i64) -> StoreResult<bool> {
        let t = self.tables.read().await;
        Ok(t.shortlists.iter().any(|s| {
            s.deleted_at.is_none() && s.csr_rep_id == csr_rep_id && s.request_id == request_id
        }))
    }

    async fn create_match(&self, new: NewMatch) -> StoreResult<Match> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let row = Match {
            match_id: t.next_id(),
            csr_rep_id: new.csr_rep_id,
            request_id: new.request_id,
            pin_id: new.pin_id,
            status: "pending".into(),
            start_date: new.start_date,
            end_date: None,
            completed_at: None,
            rating: None,
            feedback: None,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.matches.push(row.clone());
        Ok(row)
    }

    async fn get_match(&self, id: i64) -> StoreResult<Match> {
        let t = self.tables.read().await;
        find(&t.matches, |m| m.match_id == id, "match").cloned()
    }

    async fn search_matches(&self, f: &MatchFilter, page: Page) -> StoreResult<(Vec<Match>, i64)> {
        let t = self.tables.read().await;
        let category_of = |request_id: i64| {
            t.requests.iter().find(|r| r.request_id == request_id).map(|r| r.category_id)
        };
        let rows = t
            .matches
            .iter()
            .filter(|m| {
                m.deleted_at.is_none()
                    && f.csr_rep_id.map_or(true, |id| m.csr_rep_id == id)
                    && f.pin_id.map_or(true, |id| m.pin_id == id)
                    && f.category_id.map_or(true, |c| category_of(m.request_id) == Some(c))
                    && f.status.as_ref().map_or(true, |s| &m.status == s)
                    && f.start_date.map_or(true, |d| m.created_at >= d)
                    && f.end_date.map_or(true, |d| m.created_at <= d)
            })
            .collect();
        Ok(paginate(rows, |m| (m.created_at, m.match_id), page))
    }

    async fn update_match(&self, id: i64, p: MatchPatch) -> StoreResult<Match> {
        let mut t = self.tables.write().await;
        let m = find_mut(&mut t.matches, |m| m.match_id == id, "match")?;
        set(&mut m.status, p.status);
        set_opt(&mut m.start_date, p.start_date);
        set_opt(&mut m.end_date, p.end_date);
        set_opt(&mut m.completed_at, p.completed_at);
        set_opt(&mut m.rating, p.rating);
        set_opt(&mut m.feedback, p.feedback);
        set_opt(&mut m.notes, p.notes);
        m.updated_at = Utc::now();
        Ok(m.clone())
    }

    async fn create_report(&self, new: NewReport) -> StoreResult<Report> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let report = Report {
            report_id: t.next_id(),
            report_type: new.report_type,
            period: new.period,
            data: new.data,
            generated_at: now,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.reports.push(report.clone());
        Ok(report)
    }

    async fn list_reports(&self, report_type: Option<&str>, limit: i64) -> StoreResult<Vec<Report>> {
        let t = self.tables.read().await;
        let rows = t
            .reports
            .iter()
            .filter(|r| r.deleted_at.is_none() && report_type.map_or(true, |ty| r.report_type == ty))
            .collect();
        let (items, _) = paginate(rows, |r| (r.generated_at, r.report_id), Page { page: 1, page_size: limit.max(0) });
        Ok(items)
    }

    async fn request_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<RequestStats> {
        let t = self.tables.read().await;
        let in_window = |at: DateTime<Utc>| at >= start && at <= end;

        let requests: Vec<&PinRequest> =
            t.requests.iter().filter(|r| r.deleted_at.is_none() && in_window(r.created_at)).collect();

        let mut by_status: Vec<StatusCount> = Vec::new();
        let mut by_urgency: Vec<UrgencyCount> = Vec::new();
        for r in &requests {
            match by_status.iter_mut().find(|s| s.status == r.status) {
                Some(s) => s.count += 1,
                None => by_status.push(StatusCount { status: r.status.clone(), count: 1 }),
            }
            match by_urgency.iter_mut().find(|u| u.urgency == r.urgency) {
                Some(u) => u.count += 1,
                None => by_urgency.push(UrgencyCount { urgency: r.urgency.clone(), count: 1 }),
            }
        }
        by_status.sort_by(|a, b| a.status.cmp(&b.status));
        by_urgency.sort_by(|a, b| a.urgency.cmp(&b.urgency));

        let matches: Vec<&Match> =
            t.matches.iter().filter(|m| m.deleted_at.is_none() && in_window(m.created_at)).collect();

        Ok(RequestStats {
            total_requests: requests.len() as i64,
            by_status,
            by_urgency,
            total_matches: matches.len() as i64,
            completed_matches: matches.iter().filter(|m| m.status == "completed").count() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortlist(csr_rep_id: i64, request_id: i64) -> NewShortlist {
        NewShortlist { csr_rep_id, request_id, notes: None, priority: "low".into() }
    }

    fn request(pin_id: i64) -> NewPinRequest {
        NewPinRequest {
            pin_id,
            category_id: 1,
            title: "t".into(),
            description: "d".into(),
            urgency: "low".into(),
            preferred_date: None,
            location: None,
            special_notes: None,
        }
    }

    #[tokio::test]
    async fn uniqueness_ignores_soft_deleted_rows() {
        let store = MemoryStore::new();
        let r = store.create_request(request(1)).await.unwrap();
        let first = store.create_shortlist(shortlist(1, r.request_id)).await.unwrap();
        assert!(matches!(
            store.create_shortlist(shortlist(1, r.request_id)).await,
            Err(StoreError::Duplicate("shortlist"))
        ));

        store.delete_shortlist(first.shortlist_id).await.unwrap();
        assert!(!store.shortlist_exists(1, r.request_id).await.unwrap());
        assert!(matches!(
            store.get_shortlist(first.shortlist_id).await,
            Err(StoreError::NotFound("shortlist"))
        ));
        assert!(matches!(
            store.delete_shortlist(first.shortlist_id).await,
            Err(StoreError::NotFound(_))
        ));

        store.create_shortlist(shortlist(1, r.request_id)).await.unwrap();
        assert!(store.shortlist_exists(1, r.request_id).await.unwrap());
        assert_eq!(store.get_request(r.request_id).await.unwrap().shortlist_count, 2);
    }

    #[tokio::test]
    async fn shortlist_on_a_missing_request_leaves_nothing_behind() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.create_shortlist(shortlist(1, 42)).await,
            Err(StoreError::NotFound("request"))
        ));
        assert!(!store.shortlist_exists(1, 42).await.unwrap());
        assert!(store.list_shortlists_by_csr_rep(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn counters_on_missing_requests_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.increment_shortlist_count(9).await,
            Err(StoreError::NotFound("request"))
        ));
        let log = NewViewLog { csr_rep_id: 1, request_id: 9, ..Default::default() };
        assert!(store.record_view(log).await.is_err());
        assert!(store.view_logs_for(9).await.is_empty());
    }

    #[tokio::test]
    async fn stats_respect_the_window() {
        let store = MemoryStore::new();
        store.create_request(request(1)).await.unwrap();

        let now = Utc::now();
        let stats = store.request_stats(now - chrono::Duration::hours(1), now).await.unwrap();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.by_status, vec![StatusCount { status: "open".into(), count: 1 }]);

        let stale = store
            .request_stats(now - chrono::Duration::days(3), now - chrono::Duration::days(2))
            .await
            .unwrap();
        assert_eq!(stale, RequestStats::default());
    }
}
