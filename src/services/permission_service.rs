// src/services/permission_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::NoProfileFallback,
    db::store::ProfileStore,
    models::{
        permission::{CapabilitySet, FieldCapability, FieldPermission, ObjectPermission, ObjectType, ProfileActionPermission},
        profile::Profile,
    },
};

/// Resolve as capacidades de um perfil. Só leitura, sem estado próprio.
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn ProfileStore>,
    fallback: NoProfileFallback,
}

impl PermissionService {
    pub fn new(store: Arc<dyn ProfileStore>, fallback: NoProfileFallback) -> Self {
        Self { store, fallback }
    }

    pub fn fallback(&self) -> NoProfileFallback {
        self.fallback
    }

    pub async fn require_profile(&self, profile_id: Uuid) -> Result<Profile, AppError> {
        self.store
            .find_profile(profile_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Perfil {}", profile_id)))
    }

    // =========================================================================
    //  1. OBJETO
    // =========================================================================

    /// Sem perfil -> política de fallback. Sem linha -> nenhum acesso.
    pub async fn resolve_object_permission(
        &self,
        profile_id: Option<Uuid>,
        object_type: ObjectType,
    ) -> Result<CapabilitySet, AppError> {
        let Some(profile_id) = profile_id else {
            return Ok(self.fallback.object_capabilities());
        };

        let caps = self
            .store
            .find_object_permission(profile_id, object_type)
            .await?
            .map(|row| row.capabilities())
            .unwrap_or(CapabilitySet::NONE);

        Ok(caps)
    }

    // =========================================================================
    //  2. CAMPO
    // =========================================================================

    /// Sem linha: campos sensíveis ficam em None, os demais em Read.
    pub async fn resolve_field_permission(
        &self,
        profile_id: Option<Uuid>,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<FieldCapability, AppError> {
        if field_name.trim().is_empty() {
            return Err(AppError::InvalidInput("fieldName é obrigatório".into()));
        }

        let is_sensitive = self
            .store
            .find_field_definition(object_type, field_name)
            .await?
            .map(|definition| definition.is_sensitive)
            .unwrap_or(false);

        let Some(profile_id) = profile_id else {
            let capability = match self.fallback {
                NoProfileFallback::ReadOnly if !is_sensitive => FieldCapability::READ,
                _ => FieldCapability::NONE,
            };
            return Ok(capability);
        };

        let capability = match self.store.find_field_permission(profile_id, object_type, field_name).await? {
            Some(row) => FieldCapability::from(&row),
            None if is_sensitive => FieldCapability::NONE,
            None => FieldCapability::READ,
        };

        Ok(capability)
    }

    // =========================================================================
    //  3. PERMISSÕES NOMEADAS
    // =========================================================================

    /// Mesma mecânica do objeto, mas indexada pelo nome. Ausente = negado.
    pub async fn resolve_action_permission(
        &self,
        profile_id: Option<Uuid>,
        permission_name: &str,
    ) -> Result<bool, AppError> {
        if permission_name.trim().is_empty() {
            return Err(AppError::InvalidInput("permissionName é obrigatório".into()));
        }

        // O fallback só cobre leitura de objetos, nunca ações nomeadas
        let Some(profile_id) = profile_id else {
            return Ok(false);
        };

        let granted = self
            .store
            .find_profile_action(profile_id, permission_name)
            .await?
            .map(|row| row.is_granted)
            .unwrap_or(false);

        Ok(granted)
    }

    // =========================================================================
    //  4. LEITURAS ADMINISTRATIVAS
    // =========================================================================

    /// A ação está no catálogo `action_permissions`?
    pub async fn action_exists(&self, permission_name: &str) -> Result<bool, AppError> {
        Ok(self.store.find_action_definition(permission_name).await?.is_some())
    }

    pub async fn get_object_permissions(&self, profile_id: Uuid) -> Result<Vec<ObjectPermission>, AppError> {
        self.require_profile(profile_id).await?;
        self.store.list_object_permissions(profile_id).await
    }

    pub async fn get_field_permissions(&self, profile_id: Uuid) -> Result<Vec<FieldPermission>, AppError> {
        self.require_profile(profile_id).await?;
        self.store.list_field_permissions(profile_id).await
    }

    pub async fn get_action_permissions(&self, profile_id: Uuid) -> Result<Vec<ProfileActionPermission>, AppError> {
        self.require_profile(profile_id).await?;
        self.store.list_profile_actions(profile_id).await
    }
}
