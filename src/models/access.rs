// src/models/access.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::button::EffectiveButton;
use crate::models::navigation::ResolvedNavigationItem;
use crate::models::permission::{AccessLevel, CapabilitySet, ObjectType};

// --- QUERIES DO FACADE ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAccessQuery {
    #[param(example = "Tenant")]
    pub object_type: String,
    #[param(example = "edit")]
    pub action: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAccessQuery {
    #[param(example = "reports")]
    pub feature_key: String,
    #[param(example = "reports:export")]
    pub permission_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ActionAccessQuery {
    #[param(example = "reports:export")]
    pub permission_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct QuotaQuery {
    #[serde(default = "default_increment")]
    #[param(example = 1)]
    pub increment: i64,
}

fn default_increment() -> i64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub allowed: bool,
}

// --- MATRIZ DE UI ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPermissionEntry {
    pub object_type: ObjectType,
    pub access_level: AccessLevel,
    #[serde(flatten)]
    pub capabilities: CapabilitySet,
}

/// Tudo que a interface precisa para montar botões e menus de uma vez.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionMatrix {
    pub objects: Vec<ObjectPermissionEntry>,
    pub features: Vec<String>,
    pub buttons: Vec<EffectiveButton>,
    pub navigation: Vec<ResolvedNavigationItem>,
}
