// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar, Pool, Postgres, QueryBuilder};

use super::{Store, StoreError, StoreResult};
use crate::models::*;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// Common error mapper
fn db_error(entity: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| match e {
        sqlx::Error::RowNotFound => StoreError::NotFound(entity),
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
            StoreError::Duplicate(duplicate_key(db.constraint()))
        }
        other => StoreError::Backend(other.to_string()),
    }
}

fn duplicate_key(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "username",
        Some("users_email_key") => "email",
        Some("shortlists_csr_rep_request_key") => "shortlist",
        Some("pins_user_id_key") => "PIN profile",
        Some("csr_reps_user_id_key") => "CSR profile",
        _ => "record",
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_request_filters(qb: &mut QueryBuilder<'_, Postgres>, f: &RequestFilter) {
    if let Some(category_id) = f.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(status) = &f.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(urgency) = &f.urgency {
        qb.push(" AND urgency = ").push_bind(urgency.clone());
    }
    if let Some(start) = f.start_date {
        qb.push(" AND created_at >= ").push_bind(start);
    }
    if let Some(end) = f.end_date {
        qb.push(" AND created_at <= ").push_bind(end);
    }
    if let Some(location) = &f.location {
        qb.push(" AND location ILIKE ").push_bind(like_pattern(location));
    }
    if let Some(search) = &f.search {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_match_filters(qb: &mut QueryBuilder<'_, Postgres>, f: &MatchFilter) {
    if f.category_id.is_some() {
        qb.push(" JOIN public.pin_requests r ON r.request_id = m.request_id");
    }
    qb.push(" WHERE m.deleted_at IS NULL");
    if let Some(category_id) = f.category_id {
        qb.push(" AND r.category_id = ").push_bind(category_id);
    }
    if let Some(csr_rep_id) = f.csr_rep_id {
        qb.push(" AND m.csr_rep_id = ").push_bind(csr_rep_id);
    }
    if let Some(pin_id) = f.pin_id {
        qb.push(" AND m.pin_id = ").push_bind(pin_id);
    }
    if let Some(status) = &f.status {
        qb.push(" AND m.status = ").push_bind(status.clone());
    }
    if let Some(start) = f.start_date {
        qb.push(" AND m.created_at >= ").push_bind(start);
    }
    if let Some(end) = f.end_date {
        qb.push(" AND m.created_at <= ").push_bind(end);
    }
}

#[async_trait]
impl Store for PgStore {
    // ───────────────────────────────────────
    // Users
    // ───────────────────────────────────────
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        query_as::<_, User>(
            r#"
            INSERT INTO public.users(username, email, password_hash, role)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#
        )
        .bind(new.username).bind(new.email).bind(new.password_hash).bind(new.role)
        .fetch_one(&self.pool).await.map_err(db_error("user"))
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<User> {
        query_as::<_, User>(r#"SELECT * FROM public.users WHERE user_id = $1 AND deleted_at IS NULL"#)
            .bind(id).fetch_one(&self.pool).await.map_err(db_error("user"))
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        query_as::<_, User>(r#"SELECT * FROM public.users WHERE username = $1 AND deleted_at IS NULL"#)
            .bind(username).fetch_one(&self.pool).await.map_err(db_error("user"))
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        query_as::<_, User>(
            r#"
            UPDATE public.users SET
              email = COALESCE($2, email),
              is_active = COALESCE($3, is_active),
              updated_at = now()
            WHERE user_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id).bind(patch.email).bind(patch.is_active)
        .fetch_one(&self.pool).await.map_err(db_error("user"))
    }

    // ───────────────────────────────────────
    // Profiles
    // ───────────────────────────────────────
    async fn create_pin(&self, new: NewPin) -> StoreResult<Pin> {
        let d = new.details;
        query_as::<_, Pin>(
            r#"
            INSERT INTO public.pins(user_id, first_name, last_name, phone, address, date_of_birth,
                                    emergency_contact, medical_info, special_needs)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            RETURNING *
            "#
        )
        .bind(new.user_id).bind(new.first_name).bind(new.last_name)
        .bind(d.phone).bind(d.address).bind(d.date_of_birth)
        .bind(d.emergency_contact).bind(d.medical_info).bind(d.special_needs)
        .fetch_one(&self.pool).await.map_err(db_error("PIN profile"))
    }

    async fn get_pin_by_user_id(&self, user_id: i64) -> StoreResult<Pin> {
        query_as::<_, Pin>(r#"SELECT * FROM public.pins WHERE user_id = $1 AND deleted_at IS NULL"#)
            .bind(user_id).fetch_one(&self.pool).await.map_err(db_error("PIN profile"))
    }

    async fn update_pin(&self, id: i64, d: PinDetails) -> StoreResult<Pin> {
        query_as::<_, Pin>(
            r#"
            UPDATE public.pins SET
              first_name = COALESCE($2, first_name),
              last_name = COALESCE($3, last_name),
              phone = COALESCE($4, phone),
              address = COALESCE($5, address),
              date_of_birth = COALESCE($6, date_of_birth),
              emergency_contact = COALESCE($7, emergency_contact),
              medical_info = COALESCE($8, medical_info),
              special_needs = COALESCE($9, special_needs),
              updated_at = now()
            WHERE pin_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id).bind(d.first_name).bind(d.last_name).bind(d.phone).bind(d.address)
        .bind(d.date_of_birth).bind(d.emergency_contact).bind(d.medical_info).bind(d.special_needs)
        .fetch_one(&self.pool).await.map_err(db_error("PIN profile"))
    }

    async fn create_csr_rep(&self, new: NewCsrRep) -> StoreResult<CsrRep> {
        let d = new.details;
        query_as::<_, CsrRep>(
            r#"
            INSERT INTO public.csr_reps(user_id, company_id, first_name, last_name, phone, department, position)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#
        )
        .bind(new.user_id).bind(new.company_id).bind(new.first_name).bind(new.last_name)
        .bind(d.phone).bind(d.department).bind(d.position)
        .fetch_one(&self.pool).await.map_err(db_error("CSR profile"))
    }

    async fn get_csr_rep_by_user_id(&self, user_id: i64) -> StoreResult<CsrRep> {
        query_as::<_, CsrRep>(r#"SELECT * FROM public.csr_reps WHERE user_id = $1 AND deleted_at IS NULL"#)
            .bind(user_id).fetch_one(&self.pool).await.map_err(db_error("CSR profile"))
    }

    async fn update_csr_rep(&self, id: i64, d: CsrRepDetails) -> StoreResult<CsrRep> {
        query_as::<_, CsrRep>(
            r#"
            UPDATE public.csr_reps SET
              company_id = COALESCE($2, company_id),
              first_name = COALESCE($3, first_name),
              last_name = COALESCE($4, last_name),
              phone = COALESCE($5, phone),
              department = COALESCE($6, department),
              position = COALESCE($7, position),
              updated_at = now()
            WHERE csr_rep_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id).bind(d.company_id).bind(d.first_name).bind(d.last_name)
        .bind(d.phone).bind(d.department).bind(d.position)
        .fetch_one(&self.pool).await.map_err(db_error("CSR profile"))
    }

    // ───────────────────────────────────────
    // Catalog
    // ───────────────────────────────────────
    async fn create_company(&self, new: NewCompany) -> StoreResult<Company> {
        query_as::<_, Company>(
            r#"
            INSERT INTO public.companies(name, industry, address, phone, email, website, description)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#
        )
        .bind(new.name).bind(new.industry).bind(new.address).bind(new.phone)
        .bind(new.email).bind(new.website).bind(new.description)
        .fetch_one(&self.pool).await.map_err(db_error("company"))
    }

    async fn get_company(&self, id: i64) -> StoreResult<Company> {
        query_as::<_, Company>(r#"SELECT * FROM public.companies WHERE company_id = $1 AND deleted_at IS NULL"#)
            .bind(id).fetch_one(&self.pool).await.map_err(db_error("company"))
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        query_as::<_, Company>(r#"SELECT * FROM public.companies WHERE deleted_at IS NULL ORDER BY name, company_id"#)
            .fetch_all(&self.pool).await.map_err(db_error("company"))
    }

    async fn create_category(&self, new: NewCategory) -> StoreResult<ServiceCategory> {
        query_as::<_, ServiceCategory>(
            r#"
            INSERT INTO public.service_categories(name, description, is_active)
            VALUES ($1,$2,$3)
            RETURNING *
            "#
        )
        .bind(new.name).bind(new.description).bind(new.is_active)
        .fetch_one(&self.pool).await.map_err(db_error("category"))
    }

    async fn get_category(&self, id: i64) -> StoreResult<ServiceCategory> {
        query_as::<_, ServiceCategory>(
            r#"SELECT * FROM public.service_categories WHERE category_id = $1 AND deleted_at IS NULL"#)
            .bind(id).fetch_one(&self.pool).await.map_err(db_error("category"))
    }

    async fn list_categories(&self) -> StoreResult<Vec<ServiceCategory>> {
        query_as::<_, ServiceCategory>(
            r#"SELECT * FROM public.service_categories WHERE deleted_at IS NULL ORDER BY name, category_id"#)
            .fetch_all(&self.pool).await.map_err(db_error("category"))
    }

    async fn list_active_categories(&self) -> StoreResult<Vec<ServiceCategory>> {
        query_as::<_, ServiceCategory>(
            r#"SELECT * FROM public.service_categories
               WHERE is_active AND deleted_at IS NULL
               ORDER BY name, category_id"#)
            .fetch_all(&self.pool).await.map_err(db_error("category"))
    }

    async fn update_category(&self, id: i64, patch: CategoryPatch) -> StoreResult<ServiceCategory> {
        query_as::<_, ServiceCategory>(
            r#"
            UPDATE public.service_categories SET
              name = COALESCE($2, name),
              description = COALESCE($3, description),
              is_active = COALESCE($4, is_active),
              updated_at = now()
            WHERE category_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id).bind(patch.name).bind(patch.description).bind(patch.is_active)
        .fetch_one(&self.pool).await.map_err(db_error("category"))
    }

    // ───────────────────────────────────────
    // Requests
    // ───────────────────────────────────────
    async fn create_request(&self, new: NewPinRequest) -> StoreResult<PinRequest> {
        query_as::<_, PinRequest>(
            r#"
            INSERT INTO public.pin_requests(pin_id, category_id, title, description, urgency, status,
                                            preferred_date, location, special_notes)
            VALUES ($1,$2,$3,$4,$5,'open',$6,$7,$8)
            RETURNING *
            "#
        )
        .bind(new.pin_id).bind(new.category_id).bind(new.title).bind(new.description)
        .bind(new.urgency).bind(new.preferred_date).bind(new.location).bind(new.special_notes)
        .fetch_one(&self.pool).await.map_err(db_error("request"))
    }

    async fn get_request(&self, id: i64) -> StoreResult<PinRequest> {
        query_as::<_, PinRequest>(
            r#"SELECT * FROM public.pin_requests WHERE request_id = $1 AND deleted_at IS NULL"#)
            .bind(id).fetch_one(&self.pool).await.map_err(db_error("request"))
    }

    async fn list_requests_by_pin(&self, pin_id: i64) -> StoreResult<Vec<PinRequest>> {
        query_as::<_, PinRequest>(
            r#"SELECT * FROM public.pin_requests
               WHERE pin_id = $1 AND deleted_at IS NULL
               ORDER BY created_at DESC, request_id DESC"#)
            .bind(pin_id).fetch_all(&self.pool).await.map_err(db_error("request"))
    }

    async fn search_requests(
        &self,
        filter: &RequestFilter,
        page: Page,
    ) -> StoreResult<(Vec<PinRequest>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM public.pin_requests WHERE deleted_at IS NULL",
        );
        push_request_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("request"))?;

        let mut rows = QueryBuilder::<Postgres>::new(
            "SELECT * FROM public.pin_requests WHERE deleted_at IS NULL",
        );
        push_request_filters(&mut rows, filter);
        rows.push(" ORDER BY created_at DESC, request_id DESC LIMIT ")
            .push_bind(page.page_size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = rows
            .build_query_as::<PinRequest>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("request"))?;

        Ok((items, total))
    }

    async fn update_request(&self, id: i64, p: PinRequestPatch) -> StoreResult<PinRequest> {
        query_as::<_, PinRequest>(
            r#"
            UPDATE public.pin_requests SET
              title = COALESCE($2, title),
              description = COALESCE($3, description),
              category_id = COALESCE($4, category_id),
              urgency = COALESCE($5, urgency),
              status = COALESCE($6, status),
              preferred_date = COALESCE($7, preferred_date),
              location = COALESCE($8, location),
              special_notes = COALESCE($9, special_notes),
              updated_at = now()
            WHERE request_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id).bind(p.title).bind(p.description).bind(p.category_id).bind(p.urgency)
        .bind(p.status).bind(p.preferred_date).bind(p.location).bind(p.special_notes)
        .fetch_one(&self.pool).await.map_err(db_error("request"))
    }

    async fn record_view(&self, log: NewViewLog) -> StoreResult<ViewLog> {
        let mut tx = self.pool.begin().await.map_err(db_error("view log"))?;

        let row = query_as::<_, ViewLog>(
            r#"
            INSERT INTO public.view_logs(csr_rep_id, request_id, ip_address, user_agent)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#
        )
        .bind(log.csr_rep_id).bind(log.request_id).bind(log.ip_address).bind(log.user_agent)
        .fetch_one(&mut *tx).await.map_err(db_error("view log"))?;

        // atomic in-store increment, never read-modify-write
        let res = query(r#"UPDATE public.pin_requests SET view_count = view_count + 1 WHERE request_id = $1"#)
            .bind(log.request_id)
            .execute(&mut *tx).await.map_err(db_error("request"))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("request"));
        }

        tx.commit().await.map_err(db_error("view log"))?;
        Ok(row)
    }

    async fn increment_shortlist_count(&self, request_id: i64) -> StoreResult<()> {
        let res = query(
            r#"UPDATE public.pin_requests SET shortlist_count = shortlist_count + 1 WHERE request_id = $1"#)
            .bind(request_id)
            .execute(&self.pool).await.map_err(db_error("request"))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("request"));
        }
        Ok(())
    }

    // ───────────────────────────────────────
    // Shortlists
    // ───────────────────────────────────────
    async fn create_shortlist(&self, new: NewShortlist) -> StoreResult<Shortlist> {
        let mut tx = self.pool.begin().await.map_err(db_error("shortlist"))?;

        let res = query(
            r#"UPDATE public.pin_requests SET shortlist_count = shortlist_count + 1
               WHERE request_id = $1 AND deleted_at IS NULL"#)
            .bind(new.request_id)
            .execute(&mut *tx).await.map_err(db_error("request"))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("request"));
        }

        let row = query_as::<_, Shortlist>(
            r#"
            INSERT INTO public.shortlists(csr_rep_id, request_id, notes, priority)
            VALUES ($1,$2,$3,$4)
            RETURNING *
            "#
        )
        .bind(new.csr_rep_id).bind(new.request_id).bind(new.notes).bind(new.priority)
        .fetch_one(&mut *tx).await.map_err(db_error("shortlist"))?;

        tx.commit().await.map_err(db_error("shortlist"))?;
        Ok(row)
    }

    async fn get_shortlist(&self, id: i64) -> StoreResult<Shortlist> {
        query_as::<_, Shortlist>(
            r#"SELECT * FROM public.shortlists WHERE shortlist_id = $1 AND deleted_at IS NULL"#)
            .bind(id).fetch_one(&self.pool).await.map_err(db_error("shortlist"))
    }

    async fn list_shortlists_by_csr_rep(&self, csr_rep_id: i64) -> StoreResult<Vec<Shortlist>> {
        query_as::<_, Shortlist>(
            r#"SELECT * FROM public.shortlists
               WHERE csr_rep_id = $1 AND deleted_at IS NULL
               ORDER BY created_at DESC, shortlist_id DESC"#)
            .bind(csr_rep_id).fetch_all(&self.pool).await.map_err(db_error("shortlist"))
    }

    async fn delete_shortlist(&self, id: i64) -> StoreResult<()> {
        let res = query(
            r#"UPDATE public.shortlists SET deleted_at = now() WHERE shortlist_id = $1 AND deleted_at IS NULL"#)
            .bind(id)
            .execute(&self.pool).await.map_err(db_error("shortlist"))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound("shortlist"));
        }
        Ok(())
    }

    async fn shortlist_exists(&self, csr_rep_id: i64, request_id: i64) -> StoreResult<bool> {
        query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                 SELECT 1 FROM public.shortlists
                 WHERE csr_rep_id = $1 AND request_id = $2 AND deleted_at IS NULL)"#)
            .bind(csr_rep_id).bind(request_id)
            .fetch_one(&self.pool).await.map_err(db_error("shortlist"))
    }

    // ───────────────────────────────────────
    // Matches
    // ───────────────────────────────────────
    async fn create_match(&self, new: NewMatch) -> StoreResult<Match> {
        query_as::<_, Match>(
            r#"
            INSERT INTO public.matches(csr_rep_id, request_id, pin_id, status, start_date, notes)
            VALUES ($1,$2,$3,'pending',$4,$5)
            RETURNING *
            "#
        )
        .bind(new.csr_rep_id).bind(new.request_id).bind(new.pin_id)
        .bind(new.start_date).bind(new.notes)
        .fetch_one(&self.pool).await.map_err(db_error("match"))
    }

    async fn get_match(&self, id: i64) -> StoreResult<Match> {
        query_as::<_, Match>(r#"SELECT * FROM public.matches WHERE match_id = $1 AND deleted_at IS NULL"#)
            .bind(id).fetch_one(&self.pool).await.map_err(db_error("match"))
    }

    async fn search_matches(&self, filter: &MatchFilter, page: Page) -> StoreResult<(Vec<Match>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM public.matches m");
        push_match_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("match"))?;

        let mut rows = QueryBuilder::<Postgres>::new("SELECT m.* FROM public.matches m");
        push_match_filters(&mut rows, filter);
        rows.push(" ORDER BY m.created_at DESC, m.match_id DESC LIMIT ")
            .push_bind(page.page_size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = rows
            .build_query_as::<Match>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("match"))?;

        Ok((items, total))
    }

    async fn update_match(&self, id: i64, p: MatchPatch) -> StoreResult<Match> {
        query_as::<_, Match>(
            r#"
            UPDATE public.matches SET
              status = COALESCE($2, status),
              start_date = COALESCE($3, start_date),
              end_date = COALESCE($4, end_date),
              completed_at = COALESCE($5, completed_at),
              rating = COALESCE($6, rating),
              feedback = COALESCE($7, feedback),
              notes = COALESCE($8, notes),
              updated_at = now()
            WHERE match_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id).bind(p.status).bind(p.start_date).bind(p.end_date).bind(p.completed_at)
        .bind(p.rating).bind(p.feedback).bind(p.notes)
        .fetch_one(&self.pool).await.map_err(db_error("match"))
    }

    // ───────────────────────────────────────
    // Reporting
    // ───────────────────────────────────────
    async fn create_report(&self, new: NewReport) -> StoreResult<Report> {
        query_as::<_, Report>(
            r#"
            INSERT INTO public.reports(report_type, period, data, generated_at)
            VALUES ($1,$2,$3, now())
            RETURNING *
            "#
        )
        .bind(new.report_type).bind(new.period).bind(new.data)
        .fetch_one(&self.pool).await.map_err(db_error("report"))
    }

    async fn list_reports(&self, report_type: Option<&str>, limit: i64) -> StoreResult<Vec<Report>> {
        query_as::<_, Report>(
            r#"SELECT * FROM public.reports
               WHERE deleted_at IS NULL AND ($1::text IS NULL OR report_type = $1)
               ORDER BY generated_at DESC, report_id DESC
               LIMIT $2"#)
            .bind(report_type).bind(limit)
            .fetch_all(&self.pool).await.map_err(db_error("report"))
    }

    async fn request_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<RequestStats> {
        let total_requests = query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM public.pin_requests
               WHERE deleted_at IS NULL AND created_at BETWEEN $1 AND $2"#)
            .bind(start).bind(end)
            .fetch_one(&self.pool).await.map_err(db_error("request"))?;

        let by_status = query_as::<_, StatusCount>(
            r#"SELECT status, COUNT(*) AS count FROM public.pin_requests
               WHERE deleted_at IS NULL AND created_at BETWEEN $1 AND $2
               GROUP BY status ORDER BY status"#)
            .bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(db_error("request"))?;

        let by_urgency = query_as::<_, UrgencyCount>(
            r#"SELECT urgency, COUNT(*) AS count FROM public.pin_requests
               WHERE deleted_at IS NULL AND created_at BETWEEN $1 AND $2
               GROUP BY urgency ORDER BY urgency"#)
            .bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(db_error("request"))?;

        let (total_matches, completed_matches) = query_as::<_, (i64, i64)>(
            r#"SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'completed')
               FROM public.matches
               WHERE deleted_at IS NULL AND created_at BETWEEN $1 AND $2"#)
            .bind(start).bind(end)
            .fetch_one(&self.pool).await.map_err(db_error("match"))?;

        Ok(RequestStats { total_requests, by_status, by_urgency, total_matches, completed_matches })
    }
}
