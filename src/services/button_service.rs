// src/services/button_service.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::ButtonStore,
    models::{
        button::{ButtonDefinition, ButtonOverrideInput, ButtonPermissionView, EffectiveButton, ProfileButtonPermission},
        permission::{CapabilitySet, ObjectType},
    },
    services::permission_service::PermissionService,
};

/// Linha que a sincronização produziria para um botão.
fn derived_row(profile_id: Uuid, button: &ButtonDefinition, caps: &CapabilitySet) -> ProfileButtonPermission {
    ProfileButtonPermission {
        profile_id,
        button_key: button.key.clone(),
        is_enabled: caps.allows(button.action),
        is_visible: true,
        custom_label: None,
        custom_icon: None,
        is_override: false,
        updated_at: Utc::now(),
    }
}

/// A linha já está em sincronia com o que seria derivado?
fn matches_derived(row: &ProfileButtonPermission, expected_enabled: bool) -> bool {
    !row.is_override
        && row.is_enabled == expected_enabled
        && row.is_visible
        && row.custom_label.is_none()
        && row.custom_icon.is_none()
}

#[derive(Clone)]
pub struct ButtonService {
    store: Arc<dyn ButtonStore>,
    permissions: PermissionService,
}

impl ButtonService {
    pub fn new(store: Arc<dyn ButtonStore>, permissions: PermissionService) -> Self {
        Self { store, permissions }
    }

    async fn active_buttons(&self) -> Result<Vec<ButtonDefinition>, AppError> {
        Ok(self
            .store
            .list_button_definitions()
            .await?
            .into_iter()
            .filter(|b| b.is_active)
            .collect())
    }

    async fn require_button(&self, button_key: &str) -> Result<ButtonDefinition, AppError> {
        self.store
            .find_button_definition(button_key)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Botão '{}'", button_key)))
    }

    // Resolve cada tipo de objeto uma única vez por chamada
    async fn capabilities_for(
        &self,
        profile_id: Option<Uuid>,
        buttons: &[ButtonDefinition],
    ) -> Result<HashMap<ObjectType, CapabilitySet>, AppError> {
        let mut caps = HashMap::new();
        for button in buttons {
            if !caps.contains_key(&button.object_type) {
                let resolved = self.permissions.resolve_object_permission(profile_id, button.object_type).await?;
                caps.insert(button.object_type, resolved);
            }
        }
        Ok(caps)
    }

    // =========================================================================
    //  1. SINCRONIZAÇÃO
    // =========================================================================

    /// Recalcula as linhas não-override a partir da permissão de objeto.
    /// Só grava o que mudou, então duas chamadas seguidas devolvem o mesmo conjunto.
    pub async fn sync_button_permissions(&self, profile_id: Uuid) -> Result<Vec<ProfileButtonPermission>, AppError> {
        self.permissions.require_profile(profile_id).await?;

        let buttons = self.active_buttons().await?;
        let caps = self.capabilities_for(Some(profile_id), &buttons).await?;
        let mut existing: HashMap<String, ProfileButtonPermission> = self
            .store
            .list_profile_buttons(profile_id)
            .await?
            .into_iter()
            .map(|row| (row.button_key.clone(), row))
            .collect();

        let mut result = Vec::with_capacity(buttons.len());
        let mut to_write = Vec::new();

        for button in &buttons {
            let object_caps = caps.get(&button.object_type).copied().unwrap_or(CapabilitySet::NONE);
            let expected = object_caps.allows(button.action);

            match existing.remove(&button.key) {
                // Override congela a linha
                Some(row) if row.is_override => result.push(row),
                Some(row) if matches_derived(&row, expected) => result.push(row),
                _ => {
                    let row = derived_row(profile_id, button, &object_caps);
                    to_write.push(row.clone());
                    result.push(row);
                }
            }
        }

        if !to_write.is_empty() {
            self.store.upsert_profile_buttons(&to_write).await?;
            tracing::info!(
                "🔄 {} botão(ões) sincronizado(s) para o perfil {}",
                to_write.len(),
                profile_id
            );
        }

        Ok(result)
    }

    // =========================================================================
    //  2. OVERRIDES
    // =========================================================================

    /// Aplica os campos informados e marca a linha como override (sempre).
    pub async fn set_button_override(
        &self,
        profile_id: Uuid,
        input: &ButtonOverrideInput,
    ) -> Result<ProfileButtonPermission, AppError> {
        let mut rows = self.put_button_permissions(profile_id, std::slice::from_ref(input)).await?;
        rows.pop()
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("override sem linha de retorno")))
    }

    pub async fn put_button_permissions(
        &self,
        profile_id: Uuid,
        inputs: &[ButtonOverrideInput],
    ) -> Result<Vec<ProfileButtonPermission>, AppError> {
        self.permissions.require_profile(profile_id).await?;

        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            let button = self.require_button(&input.button_key).await?;

            let mut row = match self.store.find_profile_button(profile_id, &button.key).await? {
                Some(row) => row,
                None => {
                    let caps = self.permissions.resolve_object_permission(Some(profile_id), button.object_type).await?;
                    derived_row(profile_id, &button, &caps)
                }
            };

            if let Some(is_enabled) = input.is_enabled {
                row.is_enabled = is_enabled;
            }
            if let Some(is_visible) = input.is_visible {
                row.is_visible = is_visible;
            }
            if input.custom_label.is_some() {
                row.custom_label = input.custom_label.clone();
            }
            if input.custom_icon.is_some() {
                row.custom_icon = input.custom_icon.clone();
            }
            row.is_override = true;
            row.updated_at = Utc::now();

            rows.push(row);
        }

        self.store.upsert_profile_buttons(&rows).await?;
        tracing::info!("✏️ {} override(s) de botão gravado(s) no perfil {}", rows.len(), profile_id);

        Ok(rows)
    }

    /// Desfaz o override e devolve a linha ao valor derivado.
    pub async fn reset_button_override(
        &self,
        profile_id: Uuid,
        button_key: &str,
    ) -> Result<ProfileButtonPermission, AppError> {
        self.permissions.require_profile(profile_id).await?;
        let button = self.require_button(button_key).await?;

        let caps = self.permissions.resolve_object_permission(Some(profile_id), button.object_type).await?;
        let row = derived_row(profile_id, &button, &caps);
        self.store.upsert_profile_buttons(std::slice::from_ref(&row)).await?;

        Ok(row)
    }

    // =========================================================================
    //  3. LEITURA
    // =========================================================================

    /// Linhas gravadas (ou derivadas, quando ainda não existem) + retrato da permissão.
    pub async fn get_button_permissions(&self, profile_id: Uuid) -> Result<Vec<ButtonPermissionView>, AppError> {
        self.permissions.require_profile(profile_id).await?;

        let buttons = self.active_buttons().await?;
        let caps = self.capabilities_for(Some(profile_id), &buttons).await?;
        let mut existing: HashMap<String, ProfileButtonPermission> = self
            .store
            .list_profile_buttons(profile_id)
            .await?
            .into_iter()
            .map(|row| (row.button_key.clone(), row))
            .collect();

        let views = buttons
            .into_iter()
            .map(|button| {
                let object_permission = caps.get(&button.object_type).copied().unwrap_or(CapabilitySet::NONE);
                let permission = existing
                    .remove(&button.key)
                    .unwrap_or_else(|| derived_row(profile_id, &button, &object_permission));
                ButtonPermissionView {
                    computed_enabled: object_permission.allows(button.action),
                    button,
                    permission,
                    object_permission,
                }
            })
            .collect();

        Ok(views)
    }

    /// Estado final para a interface: linha do perfil E feature do botão ligada.
    /// Derivado em memória; não grava nada.
    pub async fn effective_buttons(
        &self,
        profile_id: Option<Uuid>,
        enabled_features: &BTreeSet<String>,
    ) -> Result<Vec<EffectiveButton>, AppError> {
        let buttons = self.active_buttons().await?;
        let caps = self.capabilities_for(profile_id, &buttons).await?;

        let mut existing: HashMap<String, ProfileButtonPermission> = match profile_id {
            Some(profile_id) => self
                .store
                .list_profile_buttons(profile_id)
                .await?
                .into_iter()
                .map(|row| (row.button_key.clone(), row))
                .collect(),
            None => HashMap::new(),
        };

        let effective = buttons
            .into_iter()
            .map(|button| {
                let object_caps = caps.get(&button.object_type).copied().unwrap_or(CapabilitySet::NONE);
                let (is_enabled, is_visible, label, icon) = match existing.remove(&button.key) {
                    Some(row) if row.is_override => (
                        row.is_enabled,
                        row.is_visible,
                        row.custom_label.unwrap_or_else(|| button.label.clone()),
                        row.custom_icon.or_else(|| button.icon.clone()),
                    ),
                    // Linha não-override desatualizada não pode divergir da permissão
                    _ => (object_caps.allows(button.action), true, button.label.clone(), button.icon.clone()),
                };

                let feature_on = button
                    .required_feature
                    .as_ref()
                    .map_or(true, |feature| enabled_features.contains(feature));

                EffectiveButton {
                    key: button.key,
                    label,
                    icon,
                    object_type: button.object_type,
                    action: button.action,
                    is_enabled: is_enabled && feature_on,
                    is_visible: is_visible && feature_on,
                }
            })
            .collect();

        Ok(effective)
    }
}
