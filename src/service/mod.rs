// src/service/mod.rs
//
// Matching workflow: business rules on top of the access layer. Stateless
// between calls; everything durable lives behind `Store`.

use std::sync::Arc;

use crate::{
    auth::TokenIssuer,
    error::{AppError, AppResult},
    store::Store,
};

pub mod accounts;
pub mod admin;
pub mod matching;
pub mod requests;

pub use accounts::LoginResponse;

pub struct Service {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl Service {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

/// Trimmed value of a mandatory text field.
fn required(value: &str, field: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

/// `Some` only for non-blank input.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::Duration;

    use super::Service;
    use crate::{
        auth::TokenIssuer,
        models::*,
        store::{MemoryStore, Store},
    };

    pub fn service() -> (Arc<MemoryStore>, Service) {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenIssuer::new(b"test-secret", Duration::hours(1));
        (store.clone(), Service::new(store, tokens))
    }

    pub async fn user(svc: &Service, name: &str, role: &str) -> User {
        svc.register_user(name, &format!("{name}@example.com"), "secret123", role)
            .await
            .unwrap()
    }

    pub async fn pin(svc: &Service, name: &str) -> Pin {
        let u = user(svc, name, "pin").await;
        svc.create_pin_profile(
            u.user_id,
            PinDetails {
                first_name: Some(name.into()),
                last_name: Some("Tan".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    pub async fn csr_rep(svc: &Service, name: &str, company_id: i64) -> CsrRep {
        let u = user(svc, name, "csr_rep").await;
        svc.create_csr_profile(
            u.user_id,
            CsrRepDetails {
                company_id: Some(company_id),
                first_name: Some(name.into()),
                last_name: Some("Lim".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    pub async fn company(store: &MemoryStore) -> Company {
        store
            .create_company(NewCompany { name: "Acme".into(), ..Default::default() })
            .await
            .unwrap()
    }

    pub async fn category(store: &MemoryStore, name: &str) -> ServiceCategory {
        store
            .create_category(NewCategory { name: name.into(), description: None, is_active: true })
            .await
            .unwrap()
    }

    pub fn request_input(category_id: i64, title: &str) -> super::requests::CreateRequestInput {
        super::requests::CreateRequestInput {
            title: title.into(),
            description: format!("{title} description"),
            category_id,
            urgency: None,
            preferred_date: None,
            location: None,
            special_notes: None,
        }
    }
}
