// src/handlers/buttons.rs

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
        rbac::{ManageProfiles, ReadProfiles, RequireGrant},
    },
    models::{
        auth::AccessContext,
        button::{ButtonOverrideInput, ButtonPermissionView, ProfileButtonPermission},
    },
};

// GET /api/profiles/{profile_id}/button-permissions
#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/button-permissions",
    tag = "Buttons",
    responses(
        (status = 200, description = "Botões com o retrato da permissão de objeto", body = Vec<ButtonPermissionView>)
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_button_permissions(
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

    let views = app_state
        .button_service
        .get_button_permissions(profile.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(views))
}

// PUT /api/profiles/{profile_id}/button-permissions
// Cada linha enviada vira override, mesmo que repita o valor derivado.
#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/button-permissions",
    tag = "Buttons",
    request_body = Vec<ButtonOverrideInput>,
    responses(
        (status = 200, description = "Overrides gravados", body = Vec<ProfileButtonPermission>),
        (status = 404, description = "Botão ou perfil inexistente")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn put_button_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<Vec<ButtonOverrideInput>>,
) -> Result<impl IntoResponse, ApiError> {
    for input in &payload {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    }

    let profile = app_state
        .profile_service
        .editable_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .button_service
        .put_button_permissions(profile.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// POST /api/profiles/{profile_id}/button-permissions/sync
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/button-permissions/sync",
    tag = "Buttons",
    responses(
        (status = 200, description = "Estado sincronizado (overrides intactos)", body = Vec<ProfileButtonPermission>)
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn sync_buttons(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    // Sincronizar não altera a semântica do perfil: vale também para perfis de sistema
    let profile = app_state
        .profile_service
        .visible_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .button_service
        .sync_button_permissions(profile.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// DELETE /api/profiles/{profile_id}/button-permissions/{button_key}
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/button-permissions/{button_key}",
    tag = "Buttons",
    responses(
        (status = 200, description = "Override removido e linha recalculada", body = ProfileButtonPermission)
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("button_key" = String, Path, description = "Chave do botão"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_button_override(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path((profile_id, button_key)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .editable_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let row = app_state
        .button_service
        .reset_button_override(profile.id, &button_key)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(row))
}
