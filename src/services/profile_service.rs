// src/services/profile_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::store::ProfileStore,
    models::{
        permission::{
            ActionPermissionInput, FieldCapability, FieldPermission, FieldPermissionInput, ObjectPermission,
            ObjectPermissionInput, ObjectType, ProfileActionPermission,
        },
        profile::{AssignProfilePayload, CreateProfilePayload, OrganizationMember, Profile},
    },
    services::{button_service::ButtonService, permission_service::PermissionService},
};

/// Administração de perfis e escrita das permissões.
/// Quem chama já passou pelo guardião `RequireGrant<ManageProfiles>`.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    permissions: PermissionService,
    buttons: ButtonService,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>, permissions: PermissionService, buttons: ButtonService) -> Self {
        Self { store, permissions, buttons }
    }

    // =========================================================================
    //  1. ESCOPO
    // =========================================================================

    /// Perfil global ou da própria organização. Perfil de outra organização = inexistente.
    pub async fn visible_profile(&self, organization_id: Uuid, profile_id: Uuid) -> Result<Profile, AppError> {
        let profile = self.permissions.require_profile(profile_id).await?;
        match profile.organization_id {
            None => Ok(profile),
            Some(owner) if owner == organization_id => Ok(profile),
            Some(_) => Err(AppError::ResourceNotFound(format!("Perfil {}", profile_id))),
        }
    }

    /// Igual a `visible_profile`, mas perfis de sistema são só leitura pela API.
    pub async fn editable_profile(&self, organization_id: Uuid, profile_id: Uuid) -> Result<Profile, AppError> {
        let profile = self.visible_profile(organization_id, profile_id).await?;
        if profile.is_system_profile {
            tracing::warn!("🚫 Tentativa de alterar o perfil de sistema '{}'", profile.name);
            return Err(AppError::Forbidden(format!(
                "O perfil de sistema '{}' não pode ser alterado",
                profile.name
            )));
        }
        Ok(profile)
    }

    // =========================================================================
    //  2. CRUD DE PERFIS
    // =========================================================================

    pub async fn list_profiles(&self, organization_id: Uuid) -> Result<Vec<Profile>, AppError> {
        self.store.list_profiles(organization_id).await
    }

    pub async fn create_profile(
        &self,
        organization_id: Uuid,
        payload: &CreateProfilePayload,
    ) -> Result<Profile, AppError> {
        // Valida o que será gravado, não o que chegou
        let payload = CreateProfilePayload {
            name: payload.name.trim().to_string(),
            display_name: payload.display_name.trim().to_string(),
            description: payload.description.clone(),
        };
        payload.validate()?;

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            organization_id: Some(organization_id),
            name: payload.name,
            display_name: payload.display_name,
            description: payload.description,
            is_system_profile: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_profile(&profile).await?;
        tracing::info!("👤 Perfil '{}' criado na organização {}", created.name, organization_id);
        Ok(created)
    }

    pub async fn delete_profile(&self, organization_id: Uuid, profile_id: Uuid) -> Result<(), AppError> {
        let profile = self.editable_profile(organization_id, profile_id).await?;
        self.store.delete_profile(profile.id).await?;
        tracing::info!("🗑️ Perfil '{}' removido (permissões em cascata)", profile.name);
        Ok(())
    }

    pub async fn assign_profile(
        &self,
        organization_id: Uuid,
        payload: &AssignProfilePayload,
    ) -> Result<OrganizationMember, AppError> {
        if let Some(profile_id) = payload.profile_id {
            let profile = self.visible_profile(organization_id, profile_id).await?;
            if !profile.is_active {
                return Err(AppError::InvalidInput(format!("O perfil '{}' está inativo", profile.name)));
            }
        }

        self.store
            .set_member_profile(organization_id, payload.user_id, payload.profile_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Membro {}", payload.user_id)))
    }

    // =========================================================================
    //  3. ESCRITA DE PERMISSÕES (último a gravar vence)
    // =========================================================================

    pub async fn put_object_permissions(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
        inputs: &[ObjectPermissionInput],
    ) -> Result<Vec<ObjectPermission>, AppError> {
        self.editable_profile(organization_id, profile_id).await?;

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (object_type, caps) = input.resolve()?;
            if !seen.insert(object_type) {
                return Err(AppError::InvalidInput(format!("Tipo de objeto repetido: {}", object_type)));
            }
            rows.push(ObjectPermission::from_capabilities(profile_id, object_type, caps));
        }

        self.store.upsert_object_permissions(&rows).await?;
        tracing::info!("🔐 {} permissão(ões) de objeto gravada(s) no perfil {}", rows.len(), profile_id);

        // Linhas de botão não-override acompanham a nova permissão
        self.buttons.sync_button_permissions(profile_id).await?;

        self.store.list_object_permissions(profile_id).await
    }

    pub async fn put_field_permissions(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
        inputs: &[FieldPermissionInput],
    ) -> Result<Vec<FieldPermission>, AppError> {
        self.editable_profile(organization_id, profile_id).await?;

        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            input.validate()?;
            let object_type: ObjectType = input.object_type.parse()?;
            if !seen.insert((object_type, input.field_name.clone())) {
                return Err(AppError::InvalidInput(format!(
                    "Campo repetido: {}.{}",
                    object_type, input.field_name
                )));
            }

            let capability = FieldCapability::new(input.can_read, input.can_edit)?;
            rows.push(FieldPermission {
                profile_id,
                object_type,
                field_name: input.field_name.clone(),
                access_level: capability.access_level,
                can_read: capability.can_read,
                can_edit: capability.can_edit,
                updated_at: now,
            });
        }

        self.store.upsert_field_permissions(&rows).await?;
        self.store.list_field_permissions(profile_id).await
    }

    pub async fn put_action_permissions(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
        inputs: &[ActionPermissionInput],
    ) -> Result<Vec<ProfileActionPermission>, AppError> {
        self.editable_profile(organization_id, profile_id).await?;

        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            input.validate()?;
            if self.store.find_action_definition(&input.permission_name).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Permissão desconhecida: '{}'",
                    input.permission_name
                )));
            }
            rows.push(ProfileActionPermission {
                profile_id,
                permission_name: input.permission_name.clone(),
                is_granted: input.is_granted,
            });
        }

        self.store.upsert_profile_actions(&rows).await?;
        self.store.list_profile_actions(profile_id).await
    }
}
