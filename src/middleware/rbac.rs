// src/middleware/rbac.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::marker::PhantomData;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::AccessContext,
        permission::{ObjectAction, ObjectType},
    },
};

/// 1. O Trait que define o par (objeto, ação) exigido
pub trait GrantDef: Send + Sync + 'static {
    const OBJECT_TYPE: ObjectType;
    const ACTION: ObjectAction;
}

/// 2. O Extractor (Guardião). Pressupõe o tenant_guard na rota.
pub struct RequireGrant<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireGrant<T>
where
    T: GrantDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Contexto (usuário + organização + perfil)
        let ctx = AccessContext::from_request_parts(parts, state).await?;

        // B. Decide
        app_state
            .access_service
            .require_object(&ctx, T::OBJECT_TYPE, T::ACTION)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(RequireGrant(PhantomData))
    }
}

/// Guardião dos catálogos globais (valem para todas as organizações).
/// Não depende de perfil: só a lista PLATFORM_ADMIN_IDS concede.
pub struct RequirePlatformAdmin;

impl<S> FromRequestParts<S> for RequirePlatformAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;
        let ctx = AccessContext::from_request_parts(parts, state).await?;

        app_state
            .access_service
            .require_platform_admin(&ctx)
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(RequirePlatformAdmin)
    }
}

// ---
// DEFINIÇÃO DOS DIREITOS (TIPOS)
// ---

/// Direito administrativo: criar/alterar perfis e suas permissões.
pub struct ManageProfiles;
impl GrantDef for ManageProfiles {
    const OBJECT_TYPE: ObjectType = ObjectType::Profile;
    const ACTION: ObjectAction = ObjectAction::Edit;
}

pub struct ReadProfiles;
impl GrantDef for ReadProfiles {
    const OBJECT_TYPE: ObjectType = ObjectType::Profile;
    const ACTION: ObjectAction = ObjectAction::Read;
}

/// Overrides de navegação da organização inteira.
pub struct ManageOrganization;
impl GrantDef for ManageOrganization {
    const OBJECT_TYPE: ObjectType = ObjectType::Organization;
    const ACTION: ObjectAction = ObjectAction::Edit;
}
