// src/handlers/navigation.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ManageOrganization, ManageProfiles, RequireGrant, RequirePlatformAdmin},
    },
    models::{
        auth::AccessContext,
        navigation::{
            NavigationItem, NavigationOverridePayload, OrganizationNavigationItem, ProfileNavigationItem,
            ResolvedNavigationItem, UpsertNavigationItemPayload,
        },
    },
};

// GET /api/navigation
#[utoipa::path(
    get,
    path = "/api/navigation",
    tag = "Navigation",
    responses(
        (status = 200, description = "Árvore de navegação do usuário", body = Vec<ResolvedNavigationItem>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_navigation(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let tree = app_state
        .navigation_service
        .resolve_navigation(&ctx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tree))
}

// PUT /api/navigation/items
#[utoipa::path(
    put,
    path = "/api/navigation/items",
    tag = "Navigation",
    request_body = UpsertNavigationItemPayload,
    responses(
        (status = 200, description = "Item criado ou atualizado", body = NavigationItem),
        (status = 400, description = "Ciclo na hierarquia, portão vazio ou permissão fora do catálogo"),
        (status = 403, description = "Catálogo global: só administrador da plataforma"),
        (status = 404, description = "Pai inexistente")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_navigation_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePlatformAdmin,
    Json(payload): Json<UpsertNavigationItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .navigation_service
        .upsert_item(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(item))
}

// PUT /api/profiles/{profile_id}/navigation/{key}
#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/navigation/{key}",
    tag = "Navigation",
    request_body = NavigationOverridePayload,
    responses(
        (status = 200, description = "Override do perfil gravado", body = ProfileNavigationItem)
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("key" = String, Path, description = "Chave do item"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_profile_navigation_override(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path((profile_id, key)): Path<(Uuid, String)>,
    Json(payload): Json<NavigationOverridePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .editable_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let row = app_state
        .navigation_service
        .set_profile_override(profile.id, &key, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(row))
}

// PUT /api/navigation/overrides/{key}
#[utoipa::path(
    put,
    path = "/api/navigation/overrides/{key}",
    tag = "Navigation",
    request_body = NavigationOverridePayload,
    responses(
        (status = 200, description = "Override da organização gravado", body = OrganizationNavigationItem)
    ),
    params(
        ("key" = String, Path, description = "Chave do item"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_organization_navigation_override(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageOrganization>,
    Path(key): Path<String>,
    Json(payload): Json<NavigationOverridePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let row = app_state
        .navigation_service
        .set_organization_override(ctx.organization_id, &key, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(row))
}
