// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::OrganizationContext},
    models::auth::{AccessContext, Identity},
};

// Valida o Bearer emitido pelo provedor de identidade
async fn identify(parts: &mut Parts, app_state: &AppState) -> Result<Identity, AppError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, app_state)
            .await
            .map_err(|_| AppError::InvalidToken)?;

    app_state.auth_service.validate_token(bearer.token())
}

// Autenticação + organização + vínculo de membro.
// Deixa nos extensions o AccessContext usado por todas as decisões.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let Ok(locale) = Locale::from_request_parts(&mut parts, &app_state).await;
    let i18n = &app_state.i18n_store;

    // 1. Quem é
    let identity = identify(&mut parts, &app_state)
        .await
        .map_err(|e| e.to_api_error(&locale, i18n))?;

    // 2. Em qual organização
    let organization = OrganizationContext::from_request_parts(&mut parts, &app_state).await?;

    // 3. É membro?
    let ctx = app_state
        .access_service
        .context_for(identity.user_id, organization.0)
        .await
        .map_err(|e| e.to_api_error(&locale, i18n))?
        .ok_or_else(|| {
            tracing::warn!("🚫 Usuário {} não é membro da organização {}", identity.user_id, organization.0);
            ApiError::new(StatusCode::FORBIDDEN, i18n.translate(&locale.0, "errors.not_a_member"))
        })?;

    // Insere o contexto nos "extensions" da requisição
    parts.extensions.insert(organization);
    parts.extensions.insert(ctx);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

// Extrator para obter o contexto de decisão diretamente nos handlers
impl<S> FromRequestParts<S> for AccessContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AccessContext>().copied().ok_or_else(|| {
            tracing::error!("AccessContext ausente: rota sem tenant_guard?");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Contexto de acesso ausente")
        })
    }
}
