// src/services/feature_service.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::EntitlementStore,
    models::entitlement::{Feature, Plan, PlanFeature, Subscription},
};

/// Mescla as duas fontes de feature de um plano.
///
/// Regra única: a linha de `plan_features` (quando existe para o par
/// plano+feature) sempre vence o mapa JSON; sem linha vale o JSON; sem
/// nenhum dos dois a feature está desligada.
pub fn merge_feature_sources(plan_features: &Value, overrides: &[PlanFeature]) -> BTreeSet<String> {
    let mut enabled: BTreeSet<String> = match plan_features {
        Value::Object(map) => map
            .iter()
            .filter(|(_, value)| value.as_bool() == Some(true))
            .map(|(name, _)| name.clone())
            .collect(),
        // Planos antigos guardam só a lista de nomes ligados
        Value::Array(names) => names.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => BTreeSet::new(),
    };

    for row in overrides {
        if row.is_enabled {
            enabled.insert(row.feature_name.clone());
        } else {
            enabled.remove(&row.feature_name);
        }
    }

    enabled
}

#[derive(Clone)]
pub struct FeatureService {
    store: Arc<dyn EntitlementStore>,
}

impl FeatureService {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    /// Assinatura corrente + plano. `None` quando a organização não tem assinatura válida.
    pub async fn current_plan(&self, organization_id: Uuid) -> Result<Option<(Subscription, Plan)>, AppError> {
        let Some(subscription) = self.store.find_current_subscription(organization_id).await? else {
            return Ok(None);
        };

        let plan = self
            .store
            .find_plan(subscription.plan_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Plano {}", subscription.plan_id)))?;

        Ok(Some((subscription, plan)))
    }

    pub async fn get_subscription(&self, organization_id: Uuid) -> Result<Subscription, AppError> {
        self.store
            .find_current_subscription(organization_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Assinatura da organização {}", organization_id)))
    }

    pub async fn resolve_enabled_features(&self, organization_id: Uuid) -> Result<BTreeSet<String>, AppError> {
        let Some((_, plan)) = self.current_plan(organization_id).await? else {
            tracing::debug!("Organização {} sem assinatura corrente: nenhuma feature", organization_id);
            return Ok(BTreeSet::new());
        };

        let overrides = self.store.list_plan_features(plan.id).await?;
        Ok(merge_feature_sources(&plan.features, &overrides))
    }

    pub async fn is_feature_enabled(&self, organization_id: Uuid, feature_key: &str) -> Result<bool, AppError> {
        if feature_key.trim().is_empty() {
            return Err(AppError::InvalidInput("featureKey é obrigatório".into()));
        }
        Ok(self.resolve_enabled_features(organization_id).await?.contains(feature_key))
    }

    pub async fn list_features(&self) -> Result<Vec<Feature>, AppError> {
        self.store.list_features().await
    }
}
