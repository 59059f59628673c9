// src/middleware/tenancy.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;

use crate::{
    common::error::ApiError, // Usamos o nosso ApiError para rejeição
    config::AppState,
    middleware::i18n::Locale,
};

// O nome do nosso cabeçalho HTTP customizado
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";

// A organização que o usuário quer acessar (raiz do multi-tenant)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationContext(pub Uuid);

impl<S> FromRequestParts<S> for OrganizationContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Já resolvido pelo tenant_guard
        if let Some(ctx) = parts.extensions.get::<OrganizationContext>() {
            return Ok(*ctx);
        }

        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;
        let reject = |key: &str| ApiError::new(StatusCode::BAD_REQUEST, app_state.i18n_store.translate(&locale.0, key));

        let value = parts
            .headers
            .get(ORGANIZATION_ID_HEADER)
            .ok_or_else(|| reject("errors.missing_organization"))?;

        let organization_id = value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or_else(|| reject("errors.invalid_organization"))?;

        Ok(OrganizationContext(organization_id))
    }
}
