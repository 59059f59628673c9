// src/models/button.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::permission::{CapabilitySet, ObjectAction, ObjectType};

// --- DEFINIÇÃO (catálogo global de botões) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ButtonDefinition {
    #[schema(example = "tenant.create")]
    pub key: String,

    #[schema(example = "Novo inquilino")]
    pub label: String,

    pub object_type: ObjectType,
    pub action: ObjectAction,

    // Nome da feature exigida (opcional)
    #[schema(example = "tenant_portal")]
    pub required_feature: Option<String>,

    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

// --- ESTADO POR PERFIL ---

// is_override = false: is_enabled/is_visible acompanham a permissão de objeto.
// is_override = true: a linha fica congelada até um reset explícito.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileButtonPermission {
    pub profile_id: Uuid,
    pub button_key: String,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub custom_label: Option<String>,
    pub custom_icon: Option<String>,
    pub is_override: bool,
    pub updated_at: DateTime<Utc>,
}

/// Linha de botão + retrato da permissão de objeto que a originou.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPermissionView {
    pub button: ButtonDefinition,
    pub permission: ProfileButtonPermission,
    pub object_permission: CapabilitySet,

    // O que a sincronização calcularia agora (útil para mostrar divergência)
    pub computed_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ButtonOverrideInput {
    #[validate(length(min = 1, max = 128, message = "required"))]
    #[schema(example = "tenant.create")]
    pub button_key: String,

    pub is_enabled: Option<bool>,
    pub is_visible: Option<bool>,

    #[validate(length(max = 128, message = "too_long"))]
    pub custom_label: Option<String>,

    #[validate(length(max = 64, message = "too_long"))]
    pub custom_icon: Option<String>,
}

/// Estado final de um botão para o usuário da requisição.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveButton {
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    pub object_type: ObjectType,
    pub action: ObjectAction,
    pub is_enabled: bool,
    pub is_visible: bool,
}
