// src/handlers/access.rs
//
// As três perguntas do motor. Negado = 200 com `allowed: false`, nunca 403.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        access::{AccessDecision, ActionAccessQuery, FeatureAccessQuery, ObjectAccessQuery, PermissionMatrix},
        auth::AccessContext,
        permission::{ObjectAction, ObjectType},
    },
};

// Valores desconhecidos são erro de entrada (400), não "negado"
fn parse_object_query(query: &ObjectAccessQuery) -> Result<(ObjectType, ObjectAction), AppError> {
    Ok((query.object_type.parse()?, query.action.parse()?))
}

// GET /api/access/object?objectType=Tenant&action=edit
#[utoipa::path(
    get,
    path = "/api/access/object",
    tag = "Access",
    params(
        ObjectAccessQuery,
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    responses(
        (status = 200, description = "Decisão", body = AccessDecision),
        (status = 400, description = "Tipo de objeto ou ação desconhecidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn can_access_object(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    Query(query): Query<ObjectAccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (object_type, action) =
        parse_object_query(&query).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let allowed = app_state
        .access_service
        .can_access_object(&ctx, object_type, action)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AccessDecision { allowed }))
}

// GET /api/access/feature?featureKey=reports&permissionName=reports:export
#[utoipa::path(
    get,
    path = "/api/access/feature",
    tag = "Access",
    params(
        FeatureAccessQuery,
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    responses(
        (status = 200, description = "Decisão", body = AccessDecision)
    ),
    security(("api_jwt" = []))
)]
pub async fn can_access_feature(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    Query(query): Query<FeatureAccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let allowed = app_state
        .access_service
        .can_access_feature(&ctx, &query.feature_key, query.permission_name.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AccessDecision { allowed }))
}

// GET /api/access/action?permissionName=reports:export
#[utoipa::path(
    get,
    path = "/api/access/action",
    tag = "Access",
    params(
        ActionAccessQuery,
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    responses(
        (status = 200, description = "Decisão", body = AccessDecision)
    ),
    security(("api_jwt" = []))
)]
pub async fn can_perform_action(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    Query(query): Query<ActionAccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let allowed = app_state
        .access_service
        .can_perform_action(&ctx, &query.permission_name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AccessDecision { allowed }))
}

// GET /api/me/permissions
#[utoipa::path(
    get,
    path = "/api/me/permissions",
    tag = "Access",
    params(
        ("x-organization-id" = Uuid, Header, description = "ID da Organização")
    ),
    responses(
        (status = 200, description = "Matriz de permissões para a interface", body = PermissionMatrix)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
) -> Result<impl IntoResponse, ApiError> {
    let matrix = app_state
        .access_service
        .permission_matrix(&ctx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(matrix))
}
