// src/service/accounts.rs

use serde::Serialize;

use super::{non_blank, required, Service};
use crate::{
    auth::{hash_password_blocking, verify_password_blocking, AuthUser},
    error::{AppError, AppResult},
    models::*,
    store::StoreError,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("invalid credentials".into())
}

impl Service {
    // ───────────────────────────────────────
    // Registration & login
    // ───────────────────────────────────────
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> AppResult<User> {
        let username = required(username, "username")?;
        let email = required(email, "email")?;
        if !email.contains('@') {
            return Err(AppError::validation("email is invalid"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let role: Role = role.parse().map_err(AppError::Validation)?;

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let user = self
            .store
            .create_user(NewUser { username, email, password_hash, role })
            .await?;
        tracing::info!(user_id = user.user_id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let user = match self.store.get_user_by_username(username.trim()).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Err(invalid_credentials()),
            Err(e) => return Err(e.into()),
        };
        if !user.is_active || !verify_password_blocking(password.to_string(), user.password_hash.clone()).await {
            return Err(invalid_credentials());
        }
        let token = self.tokens.issue(user.user_id, user.role)?;
        Ok(LoginResponse { token, user })
    }

    pub async fn current_user(&self, who: &AuthUser) -> AppResult<User> {
        Ok(self.store.get_user_by_id(who.user_id).await?)
    }

    pub async fn update_profile(&self, who: &AuthUser, email: Option<String>) -> AppResult<User> {
        let email = non_blank(email);
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(AppError::validation("email is invalid"));
        }
        let patch = UserPatch { email, ..Default::default() };
        Ok(self.store.update_user(who.user_id, patch).await?)
    }

    // ───────────────────────────────────────
    // PIN profile
    // ───────────────────────────────────────
    pub async fn create_pin_profile(&self, user_id: i64, mut details: PinDetails) -> AppResult<Pin> {
        let first_name = required(details.first_name.take().as_deref().unwrap_or_default(), "first_name")?;
        let last_name = required(details.last_name.take().as_deref().unwrap_or_default(), "last_name")?;
        Ok(self.store.create_pin(NewPin { user_id, first_name, last_name, details }).await?)
    }

    /// The caller's PIN profile; every PIN-scoped operation starts here.
    pub async fn pin_for(&self, who: &AuthUser) -> AppResult<Pin> {
        match self.store.get_pin_by_user_id(who.user_id).await {
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound("PIN profile not found".into())),
            other => Ok(other?),
        }
    }

    pub async fn update_pin_profile(&self, who: &AuthUser, details: PinDetails) -> AppResult<Pin> {
        let pin = self.pin_for(who).await?;
        Ok(self.store.update_pin(pin.pin_id, details).await?)
    }

    // ───────────────────────────────────────
    // CSR profile
    // ───────────────────────────────────────
    pub async fn create_csr_profile(&self, user_id: i64, mut details: CsrRepDetails) -> AppResult<CsrRep> {
        let company_id = details
            .company_id
            .take()
            .ok_or_else(|| AppError::validation("company_id is required"))?;
        self.ensure_company(company_id).await?;
        let first_name = required(details.first_name.take().as_deref().unwrap_or_default(), "first_name")?;
        let last_name = required(details.last_name.take().as_deref().unwrap_or_default(), "last_name")?;
        Ok(self
            .store
            .create_csr_rep(NewCsrRep { user_id, company_id, first_name, last_name, details })
            .await?)
    }

    pub async fn csr_rep_for(&self, who: &AuthUser) -> AppResult<CsrRep> {
        match self.store.get_csr_rep_by_user_id(who.user_id).await {
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound("CSR profile not found".into())),
            other => Ok(other?),
        }
    }

    pub async fn update_csr_profile(&self, who: &AuthUser, details: CsrRepDetails) -> AppResult<CsrRep> {
        let rep = self.csr_rep_for(who).await?;
        if let Some(company_id) = details.company_id {
            self.ensure_company(company_id).await?;
        }
        Ok(self.store.update_csr_rep(rep.csr_rep_id, details).await?)
    }

    async fn ensure_company(&self, company_id: i64) -> AppResult<()> {
        match self.store.get_company(company_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound(_)) => {
                Err(AppError::validation(format!("company {company_id} does not exist")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
