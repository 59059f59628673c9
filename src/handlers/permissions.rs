// src/handlers/permissions.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ManageProfiles, ReadProfiles, RequireGrant},
    },
    models::{
        auth::AccessContext,
        permission::{
            ActionPermissionInput, FieldPermission, FieldPermissionInput, ObjectPermission, ObjectPermissionInput,
            ProfileActionPermission,
        },
    },
};

// =============================================================================
//  1. PERMISSÕES DE OBJETO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/object-permissions",
    tag = "Permissions",
    responses(
        (status = 200, description = "Permissões de objeto do perfil", body = Vec<ObjectPermission>),
        (status = 404, description = "Perfil inexistente")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_object_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ReadProfiles>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .visible_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .permission_service
        .get_object_permissions(profile.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/object-permissions",
    tag = "Permissions",
    request_body = Vec<ObjectPermissionInput>,
    responses(
        (status = 200, description = "Permissões gravadas (botões re-sincronizados)", body = Vec<ObjectPermission>),
        (status = 400, description = "Tipo de objeto ou combinação inválida"),
        (status = 403, description = "Sem direito administrativo ou perfil de sistema")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn put_object_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<Vec<ObjectPermissionInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .profile_service
        .put_object_permissions(ctx.organization_id, profile_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// =============================================================================
//  2. PERMISSÕES DE CAMPO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/field-permissions",
    tag = "Permissions",
    responses(
        (status = 200, description = "Linhas explícitas de campo (ausente = padrão do catálogo)", body = Vec<FieldPermission>)
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_field_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ReadProfiles>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .visible_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .permission_service
        .get_field_permissions(profile.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/field-permissions",
    tag = "Permissions",
    request_body = Vec<FieldPermissionInput>,
    responses(
        (status = 200, description = "Permissões de campo gravadas", body = Vec<FieldPermission>),
        (status = 400, description = "canEdit sem canRead ou campo repetido")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn put_field_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<Vec<FieldPermissionInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .profile_service
        .put_field_permissions(ctx.organization_id, profile_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// =============================================================================
//  3. PERMISSÕES NOMEADAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/action-permissions",
    tag = "Permissions",
    responses(
        (status = 200, description = "Permissões nomeadas do perfil", body = Vec<ProfileActionPermission>)
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_action_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ReadProfiles>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .visible_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .permission_service
        .get_action_permissions(profile.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/action-permissions",
    tag = "Permissions",
    request_body = Vec<ActionPermissionInput>,
    responses(
        (status = 200, description = "Permissões nomeadas gravadas", body = Vec<ProfileActionPermission>),
        (status = 400, description = "Permissão desconhecida")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn put_action_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<Vec<ActionPermissionInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .profile_service
        .put_action_permissions(ctx.organization_id, profile_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}
