// src/handlers/profiles.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
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
        profile::{AssignProfilePayload, CreateProfilePayload, OrganizationMember, Profile},
    },
};

// GET /api/profiles
#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "Profiles",
    responses(
        (status = 200, description = "Perfis de sistema + perfis da organização", body = Vec<Profile>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_profiles(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ReadProfiles>,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = app_state
        .profile_service
        .list_profiles(ctx.organization_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profiles))
}

// POST /api/profiles
#[utoipa::path(
    post,
    path = "/api/profiles",
    tag = "Profiles",
    request_body = CreateProfilePayload,
    responses(
        (status = 201, description = "Perfil criado", body = Profile),
        (status = 409, description = "Nome já usado na organização")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Json(payload): Json<CreateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Validar o payload
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    // 2. Criar
    let profile = app_state
        .profile_service
        .create_profile(ctx.organization_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// DELETE /api/profiles/{profile_id}
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}",
    tag = "Profiles",
    responses(
        (status = 204, description = "Perfil removido com todas as permissões"),
        (status = 403, description = "Perfil de sistema")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do Perfil"),
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .profile_service
        .delete_profile(ctx.organization_id, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/members/profile
#[utoipa::path(
    put,
    path = "/api/members/profile",
    tag = "Profiles",
    request_body = AssignProfilePayload,
    responses(
        (status = 200, description = "Perfil do membro atualizado", body = OrganizationMember),
        (status = 404, description = "Usuário não é membro ou perfil inexistente")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    _guard: RequireGrant<ManageProfiles>,
    Json(payload): Json<AssignProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .profile_service
        .assign_profile(ctx.organization_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(
        "👥 Usuário {} agora com perfil {:?} na organização {}",
        member.user_id,
        member.profile_id,
        member.organization_id
    );

    Ok(Json(member))
}
