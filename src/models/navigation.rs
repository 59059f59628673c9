// src/models/navigation.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::permission::{ObjectAction, ObjectType};

// Tabela plana (arena) indexada por `key`; o pai é só uma referência de chave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    #[schema(example = "rentals.leases")]
    pub key: String,

    #[schema(example = "Contratos")]
    pub label: String,

    #[schema(example = "/leases")]
    pub path: Option<String>,

    pub icon: Option<String>,

    #[schema(example = "rentals")]
    pub parent_key: Option<String>,

    // Portões (todos opcionais, todos obrigatórios quando presentes)
    pub required_feature: Option<String>,
    pub required_permission: Option<String>,
    pub object_type: Option<ObjectType>,
    pub action: Option<ObjectAction>,

    pub sort_order: i32,
    pub is_active: bool,

    // Padrão do sistema quando não há override
    pub default_visible: bool,
    pub default_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileNavigationItem {
    pub profile_id: Uuid,
    pub navigation_key: String,
    pub is_visible: bool,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationNavigationItem {
    pub organization_id: Uuid,
    pub navigation_key: String,
    pub is_visible: bool,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertNavigationItemPayload {
    #[validate(length(min = 1, max = 128, message = "required"))]
    pub key: String,

    #[validate(length(min = 1, max = 128, message = "required"))]
    pub label: String,

    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_key: Option<String>,
    pub required_feature: Option<String>,
    pub required_permission: Option<String>,

    // Strings para que valores desconhecidos virem erro de validação
    #[schema(example = "Lease")]
    pub object_type: Option<String>,
    #[schema(example = "read")]
    pub action: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub default_visible: bool,
    #[serde(default = "default_true")]
    pub default_enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationOverridePayload {
    pub is_visible: bool,
    pub is_enabled: bool,
}

/// Nó já resolvido para o usuário da requisição.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNavigationItem {
    pub key: String,
    pub label: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub is_enabled: bool,
    #[schema(no_recursion)]
    pub children: Vec<ResolvedNavigationItem>,
}
