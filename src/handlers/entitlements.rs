// src/handlers/entitlements.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        access::QuotaQuery,
        auth::AccessContext,
        entitlement::{Feature, QuotaCheck, ResourceKind, Subscription},
    },
};

// =============================================================================
//  1. FEATURES E ASSINATURA
// =============================================================================

// GET /api/features
#[utoipa::path(
    get,
    path = "/api/features",
    tag = "Entitlements",
    responses(
        (status = 200, description = "Catálogo de features", body = Vec<Feature>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_features(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let features = app_state
        .feature_service
        .list_features()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(features))
}

// GET /api/features/enabled
#[utoipa::path(
    get,
    path = "/api/features/enabled",
    tag = "Entitlements",
    responses(
        (status = 200, description = "Features ligadas para a organização (ordenadas)", body = Vec<String>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_enabled_features(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let enabled = app_state
        .feature_service
        .resolve_enabled_features(ctx.organization_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(enabled.into_iter().collect::<Vec<String>>()))
}

// GET /api/subscription
#[utoipa::path(
    get,
    path = "/api/subscription",
    tag = "Entitlements",
    responses(
        (status = 200, description = "Assinatura corrente", body = Subscription),
        (status = 404, description = "Nenhuma assinatura corrente")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = app_state
        .feature_service
        .get_subscription(ctx.organization_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(subscription))
}

// =============================================================================
//  2. QUOTAS
// =============================================================================

// GET /api/quota/{resource}?increment=1
#[utoipa::path(
    get,
    path = "/api/quota/{resource}",
    tag = "Entitlements",
    params(
        ("resource" = String, Path, description = "properties | units (lots) | users | extranet_tenants"),
        QuotaQuery,
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    responses(
        (status = 200, description = "Resultado da verificação (allowed pode ser false)", body = QuotaCheck),
        (status = 404, description = "Organização sem assinatura corrente")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    Path(resource): Path<String>,
    Query(query): Query<QuotaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resource: ResourceKind = resource
        .parse()
        .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))?;

    let check = app_state
        .quota_service
        .check_quota(ctx.organization_id, resource, query.increment)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(check))
}

// POST /api/quota/{resource}/enforce?increment=1
// Para quem vai criar o recurso em seguida: recusa vira 403 com os números.
#[utoipa::path(
    post,
    path = "/api/quota/{resource}/enforce",
    tag = "Entitlements",
    params(
        ("resource" = String, Path, description = "properties | units (lots) | users | extranet_tenants"),
        QuotaQuery,
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    responses(
        (status = 200, description = "Há espaço no plano", body = QuotaCheck),
        (status = 403, description = "Quota excedida (details: resource, currentCount, limit)")
    ),
    security(("api_jwt" = []))
)]
pub async fn enforce_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    Path(resource): Path<String>,
    Query(query): Query<QuotaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resource: ResourceKind = resource
        .parse()
        .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))?;

    let check = app_state
        .quota_service
        .enforce_quota(ctx.organization_id, resource, query.increment)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(check))
}
