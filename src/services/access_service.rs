// src/services/access_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::ProfileStore,
    models::{
        access::{ObjectPermissionEntry, PermissionMatrix},
        auth::AccessContext,
        permission::{ObjectAction, ObjectType},
    },
    services::{
        button_service::ButtonService, feature_service::FeatureService, navigation_service::NavigationService,
        permission_service::PermissionService,
    },
};

/// Ponto único de decisão. Nenhuma operação aqui grava nada.
///
/// "Negado" é sempre `Ok(false)`; erro só para entrada inválida ou falha de banco.
#[derive(Clone)]
pub struct AccessService {
    profiles: Arc<dyn ProfileStore>,
    permissions: PermissionService,
    features: FeatureService,
    buttons: ButtonService,
    navigation: NavigationService,
    // Usuários com direito sobre os catálogos globais (fora de qualquer organização)
    platform_admins: Arc<HashSet<Uuid>>,
}

impl AccessService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        permissions: PermissionService,
        features: FeatureService,
        buttons: ButtonService,
        navigation: NavigationService,
    ) -> Self {
        Self { profiles, permissions, features, buttons, navigation, platform_admins: Arc::default() }
    }

    pub fn with_platform_admins(mut self, platform_admins: HashSet<Uuid>) -> Self {
        self.platform_admins = Arc::new(platform_admins);
        self
    }

    pub fn is_platform_admin(&self, user_id: Uuid) -> bool {
        self.platform_admins.contains(&user_id)
    }

    /// Escrita em catálogo global. Perfil de organização nenhum concede isso.
    pub fn require_platform_admin(&self, ctx: &AccessContext) -> Result<(), AppError> {
        if self.is_platform_admin(ctx.user_id) {
            return Ok(());
        }
        tracing::warn!(
            "🚫 Usuário {} tentou alterar catálogo global a partir da organização {}",
            ctx.user_id,
            ctx.organization_id
        );
        Err(AppError::Forbidden("Requer administrador da plataforma".into()))
    }

    /// Monta o contexto da requisição. `None` quando o usuário não é membro ativo.
    /// Perfil apagado ou inativo conta como "sem perfil".
    pub async fn context_for(&self, user_id: Uuid, organization_id: Uuid) -> Result<Option<AccessContext>, AppError> {
        let Some(member) = self.profiles.find_member(user_id, organization_id).await? else {
            return Ok(None);
        };

        let profile_id = match member.profile_id {
            Some(profile_id) => self
                .profiles
                .find_profile(profile_id)
                .await?
                .filter(|profile| profile.is_active)
                .map(|profile| profile.id),
            None => None,
        };

        if profile_id.is_none() {
            tracing::debug!(
                "Usuário {} sem perfil ativo na organização {}: fallback {:?}",
                user_id,
                organization_id,
                self.permissions.fallback()
            );
        }

        Ok(Some(AccessContext { user_id, organization_id, profile_id }))
    }

    pub async fn can_access_object(
        &self,
        ctx: &AccessContext,
        object_type: ObjectType,
        action: ObjectAction,
    ) -> Result<bool, AppError> {
        let caps = self.permissions.resolve_object_permission(ctx.profile_id, object_type).await?;
        Ok(caps.allows(action))
    }

    /// Feature ligada no plano E, se informado, a permissão nomeada no perfil.
    pub async fn can_access_feature(
        &self,
        ctx: &AccessContext,
        feature_key: &str,
        permission_name: Option<&str>,
    ) -> Result<bool, AppError> {
        if !self.features.is_feature_enabled(ctx.organization_id, feature_key).await? {
            return Ok(false);
        }
        match permission_name {
            Some(name) => self.can_perform_action(ctx, name).await,
            None => Ok(true),
        }
    }

    pub async fn can_perform_action(&self, ctx: &AccessContext, permission_name: &str) -> Result<bool, AppError> {
        self.permissions.resolve_action_permission(ctx.profile_id, permission_name).await
    }

    /// Versão "de escrita" de `can_access_object`: negado vira `Forbidden`.
    /// A administração de perfis exige `Profile` + `edit`.
    pub async fn require_object(
        &self,
        ctx: &AccessContext,
        object_type: ObjectType,
        action: ObjectAction,
    ) -> Result<(), AppError> {
        if self.can_access_object(ctx, object_type, action).await? {
            return Ok(());
        }
        tracing::warn!(
            "🚫 Usuário {} sem {} em {} na organização {}",
            ctx.user_id,
            action,
            object_type,
            ctx.organization_id
        );
        Err(AppError::Forbidden(format!("Requer {} em {}", action, object_type)))
    }

    /// Matriz completa para a interface, calculada na hora e sem gravar.
    pub async fn permission_matrix(&self, ctx: &AccessContext) -> Result<PermissionMatrix, AppError> {
        let mut objects = Vec::with_capacity(ObjectType::ALL.len());
        for object_type in ObjectType::ALL {
            let capabilities = self.permissions.resolve_object_permission(ctx.profile_id, object_type).await?;
            objects.push(ObjectPermissionEntry {
                object_type,
                access_level: capabilities.access_level(),
                capabilities,
            });
        }

        let features = self.features.resolve_enabled_features(ctx.organization_id).await?;
        let buttons = self.buttons.effective_buttons(ctx.profile_id, &features).await?;
        let navigation = self.navigation.resolve_navigation_with(ctx, &features).await?;

        Ok(PermissionMatrix {
            objects,
            features: features.into_iter().collect(),
            buttons,
            navigation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoProfileFallback;
    use crate::models::permission::{AccessLevel, ObjectPermissionInput};
    use crate::services::test_support::Fixture;

    #[tokio::test]
    async fn viewer_can_read_but_not_edit_tenants() {
        let fx = Fixture::new().await;
        let ctx = fx.access_service.context_for(fx.viewer_user, fx.organization_id).await.unwrap().unwrap();
        assert_eq!(ctx.profile_id, Some(fx.viewer_profile));

        assert!(fx.access_service.can_access_object(&ctx, ObjectType::Tenant, ObjectAction::Read).await.unwrap());
        assert!(!fx.access_service.can_access_object(&ctx, ObjectType::Tenant, ObjectAction::Edit).await.unwrap());
        assert!(!fx.access_service.can_access_object(&ctx, ObjectType::Lease, ObjectAction::Read).await.unwrap());
    }

    #[tokio::test]
    async fn tenant_admin_is_not_a_platform_admin() {
        let fx = Fixture::new().await;
        assert!(matches!(
            fx.access_service.require_platform_admin(&fx.admin_context()),
            Err(AppError::Forbidden(_))
        ));

        let platform = fx.platform_admin_context();
        assert!(fx.access_service.require_platform_admin(&platform).is_ok());
        // Direito de plataforma não vale como permissão de objeto
        assert!(!fx.access_service.can_access_object(&platform, ObjectType::Tenant, ObjectAction::Read).await.unwrap());
    }

    #[tokio::test]
    async fn decisions_are_repeatable() {
        let fx = Fixture::new().await;
        let ctx = fx.viewer_context();
        let mut answers = Vec::new();
        for _ in 0..3 {
            answers.push((
                fx.access_service.can_access_object(&ctx, ObjectType::Tenant, ObjectAction::Read).await.unwrap(),
                fx.access_service.can_access_feature(&ctx, "tenant_portal", None).await.unwrap(),
                fx.access_service.can_perform_action(&ctx, "reports:export").await.unwrap(),
            ));
        }
        assert!(answers.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(answers[0], (true, true, false));
    }

    #[tokio::test]
    async fn granting_more_never_revokes_what_was_allowed() {
        let fx = Fixture::new().await;
        let profile = fx.custom_profile;
        let ctx = fx.context_with_profile(profile);
        let levels = ["Read", "ReadWrite", "All"];
        let mut allowed_before: Vec<ObjectAction> = Vec::new();

        for level in levels {
            let input = ObjectPermissionInput {
                object_type: "Property".into(),
                access_level: Some(level.into()),
                ..Default::default()
            };
            fx.profile_service.put_object_permissions(fx.organization_id, profile, &[input]).await.unwrap();

            for action in &allowed_before {
                assert!(fx.access_service.can_access_object(&ctx, ObjectType::Property, *action).await.unwrap());
            }

            allowed_before.clear();
            for action in [
                ObjectAction::Create,
                ObjectAction::Read,
                ObjectAction::Edit,
                ObjectAction::Delete,
                ObjectAction::ViewAll,
            ] {
                if fx.access_service.can_access_object(&ctx, ObjectType::Property, action).await.unwrap() {
                    allowed_before.push(action);
                }
            }
        }
        assert_eq!(allowed_before.len(), 5);
    }

    #[tokio::test]
    async fn feature_with_permission_needs_both() {
        let fx = Fixture::new().await;
        let admin = fx.admin_context();
        let viewer = fx.viewer_context();

        assert!(fx.access_service.can_access_feature(&admin, "tenant_portal", Some("reports:export")).await.unwrap());
        assert!(!fx.access_service.can_access_feature(&viewer, "tenant_portal", Some("reports:export")).await.unwrap());
        // Feature desligada nega mesmo com a permissão
        assert!(!fx.access_service.can_access_feature(&admin, "reports", Some("reports:export")).await.unwrap());
        assert!(matches!(
            fx.access_service.can_access_feature(&admin, " ", None).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn non_members_get_no_context() {
        let fx = Fixture::new().await;
        assert!(fx.access_service.context_for(Uuid::new_v4(), fx.organization_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn member_without_profile_follows_fallback() {
        let fx = Fixture::with_fallback(NoProfileFallback::ReadOnly).await;
        let ctx = fx.access_service.context_for(fx.unassigned_user, fx.organization_id).await.unwrap().unwrap();
        assert_eq!(ctx.profile_id, None);
        assert!(fx.access_service.can_access_object(&ctx, ObjectType::Tenant, ObjectAction::Read).await.unwrap());
        assert!(!fx.access_service.can_access_object(&ctx, ObjectType::Tenant, ObjectAction::ViewAll).await.unwrap());
        assert!(matches!(
            fx.access_service.require_object(&ctx, ObjectType::Profile, ObjectAction::Edit).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn admin_right_is_profile_edit() {
        let fx = Fixture::new().await;
        let (profile, edit) = (ObjectType::Profile, ObjectAction::Edit);
        assert!(fx.access_service.require_object(&fx.admin_context(), profile, edit).await.is_ok());
        assert!(matches!(
            fx.access_service.require_object(&fx.viewer_context(), profile, edit).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn matrix_covers_every_object_type() {
        let fx = Fixture::new().await;
        let matrix = fx.access_service.permission_matrix(&fx.viewer_context()).await.unwrap();

        assert_eq!(matrix.objects.len(), ObjectType::ALL.len());
        let tenant = matrix.objects.iter().find(|o| o.object_type == ObjectType::Tenant).unwrap();
        assert_eq!(tenant.access_level, AccessLevel::Read);
        assert!(matrix.features.contains(&"tenant_portal".to_string()));
        assert!(!matrix.features.contains(&"reports".to_string()));

        let view = matrix.buttons.iter().find(|b| b.key == "tenant.view").unwrap();
        assert!(view.is_enabled);
        let create = matrix.buttons.iter().find(|b| b.key == "tenant.create").unwrap();
        assert!(!create.is_enabled);
    }
}
