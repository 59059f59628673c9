// src/models/entitlement.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- CATÁLOGO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[schema(example = "reports")]
    pub name: String,

    #[schema(example = "Relatórios avançados")]
    pub display_name: String,

    #[schema(example = "ANALYTICS")]
    pub category: String,

    pub is_premium: bool,
    pub is_beta: bool,

    // Só informativo: qual plano costuma liberar a feature
    pub required_plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,

    #[schema(example = "starter")]
    pub name: String,

    pub display_name: String,

    // Limites: NULL ou -1 = ilimitado
    pub max_properties: Option<i32>,
    pub max_lots: Option<i32>,
    pub max_users: Option<i32>,
    pub max_extranet_tenants: Option<i32>,

    // Mapa JSONB nome-da-feature -> bool (padrões em massa)
    #[schema(value_type = Object, example = json!({"reports": true, "tenant_portal": false}))]
    pub features: Value,

    pub is_active: bool,
}

impl Plan {
    /// Limite para um tipo de recurso; `None` significa ilimitado.
    pub fn limit_for(&self, resource: ResourceKind) -> Option<i64> {
        let raw = match resource {
            ResourceKind::Properties => self.max_properties,
            ResourceKind::Units => self.max_lots,
            ResourceKind::Users => self.max_users,
            ResourceKind::ExtranetTenants => self.max_extranet_tenants,
        };
        raw.filter(|limit| *limit >= 0).map(i64::from)
    }
}

// Linha de override por cima do mapa JSON do plano
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeature {
    pub plan_id: Uuid,
    pub feature_name: String,
    pub is_enabled: bool,
}

// --- ASSINATURA ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Trialing,
}

impl SubscriptionStatus {
    /// Assinaturas que ainda dão direito ao plano.
    pub fn is_current(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing | SubscriptionStatus::PastDue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,

    #[schema(example = "monthly")]
    pub billing_period: String,

    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// --- QUOTA ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Properties,
    Units,
    Users,
    ExtranetTenants,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Properties => "properties",
            ResourceKind::Units => "units",
            ResourceKind::Users => "users",
            ResourceKind::ExtranetTenants => "extranet_tenants",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "properties" | "property" => Ok(ResourceKind::Properties),
            // "lots" é o nome que o plano usa para unidades
            "units" | "unit" | "lots" | "lot" => Ok(ResourceKind::Units),
            "users" | "user" => Ok(ResourceKind::Users),
            "extranet_tenants" | "extranet_tenant" => Ok(ResourceKind::ExtranetTenants),
            _ => Err(AppError::InvalidInput(format!("Tipo de recurso desconhecido: '{}'", s))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resultado de uma verificação de quota. `limit` nulo = ilimitado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaCheck {
    pub resource: ResourceKind,
    pub allowed: bool,
    pub current_count: i64,
    pub limit: Option<i64>,
}
