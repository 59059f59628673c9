// src/services/quota_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::UsageStore,
    models::entitlement::{QuotaCheck, ResourceKind},
    services::feature_service::FeatureService,
};

/// `limit = None` é ilimitado.
pub fn within_limit(current_count: i64, increment: i64, limit: Option<i64>) -> bool {
    match limit {
        None => true,
        Some(limit) => current_count.saturating_add(increment) <= limit,
    }
}

// Verifica-e-age: não reserva nada. Duas criações simultâneas podem passar
// pela mesma vaga e estourar o limite em até (concorrência - 1).
#[derive(Clone)]
pub struct QuotaService {
    features: FeatureService,
    usage: Arc<dyn UsageStore>,
}

impl QuotaService {
    pub fn new(features: FeatureService, usage: Arc<dyn UsageStore>) -> Self {
        Self { features, usage }
    }

    pub async fn check_quota(
        &self,
        organization_id: Uuid,
        resource: ResourceKind,
        increment: i64,
    ) -> Result<QuotaCheck, AppError> {
        if increment < 1 {
            return Err(AppError::InvalidInput("increment deve ser maior ou igual a 1".into()));
        }

        let (_, plan) = self
            .features
            .current_plan(organization_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Assinatura da organização {}", organization_id)))?;

        let limit = plan.limit_for(resource);
        let current_count = self.usage.count_live(organization_id, resource).await?;
        let allowed = within_limit(current_count, increment, limit);

        tracing::debug!(
            "Quota {} da organização {}: {}+{} / {:?} -> {}",
            resource,
            organization_id,
            current_count,
            increment,
            limit,
            allowed
        );

        Ok(QuotaCheck {
            resource,
            allowed,
            current_count,
            limit,
        })
    }

    /// Igual a `check_quota`, mas a recusa vira `QuotaExceeded` com os números.
    pub async fn enforce_quota(
        &self,
        organization_id: Uuid,
        resource: ResourceKind,
        increment: i64,
    ) -> Result<QuotaCheck, AppError> {
        let check = self.check_quota(organization_id, resource, increment).await?;

        match (check.allowed, check.limit) {
            (false, Some(limit)) => {
                tracing::warn!(
                    "⛔ Quota de {} esgotada na organização {} ({}/{})",
                    resource,
                    organization_id,
                    check.current_count,
                    limit
                );
                Err(AppError::QuotaExceeded {
                    resource,
                    current_count: check.current_count,
                    limit,
                })
            }
            _ => Ok(check),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Fixture;

    #[test]
    fn boundary_rules() {
        assert!(!within_limit(5, 1, Some(5)));
        assert!(within_limit(4, 1, Some(5)));
        assert!(within_limit(1_000_000, 1, None));
        assert!(!within_limit(0, 1, Some(0)));
        assert!(!within_limit(i64::MAX, 1, Some(10)));
    }

    #[tokio::test]
    async fn starter_plan_rejects_the_eleventh_unit() {
        let fx = Fixture::new().await;
        fx.store.set_usage(fx.organization_id, ResourceKind::Units, 10);

        let check = fx.quota_service.check_quota(fx.organization_id, ResourceKind::Units, 1).await.unwrap();
        assert!(!check.allowed);
        assert_eq!(check.current_count, 10);
        assert_eq!(check.limit, Some(10));

        let err = fx
            .quota_service
            .enforce_quota(fx.organization_id, ResourceKind::Units, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::QuotaExceeded { resource: ResourceKind::Units, current_count: 10, limit: 10 }
        ));
    }

    #[tokio::test]
    async fn ninth_unit_still_fits() {
        let fx = Fixture::new().await;
        fx.store.set_usage(fx.organization_id, ResourceKind::Units, 9);
        let check = fx.quota_service.enforce_quota(fx.organization_id, ResourceKind::Units, 1).await.unwrap();
        assert!(check.allowed);
    }

    #[tokio::test]
    async fn unlimited_resources_are_always_allowed() {
        let fx = Fixture::new().await;
        // starter: max_properties = NULL, max_extranet_tenants = -1
        fx.store.set_usage(fx.organization_id, ResourceKind::Properties, 50_000);
        fx.store.set_usage(fx.organization_id, ResourceKind::ExtranetTenants, 9_999);

        let properties = fx.quota_service.check_quota(fx.organization_id, ResourceKind::Properties, 1).await.unwrap();
        assert!(properties.allowed);
        assert_eq!(properties.limit, None);

        let extranet = fx
            .quota_service
            .check_quota(fx.organization_id, ResourceKind::ExtranetTenants, 100)
            .await
            .unwrap();
        assert!(extranet.allowed);
    }

    #[tokio::test]
    async fn invalid_increment_and_missing_subscription() {
        let fx = Fixture::new().await;
        assert!(matches!(
            fx.quota_service.check_quota(fx.organization_id, ResourceKind::Units, 0).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            fx.quota_service.check_quota(Uuid::new_v4(), ResourceKind::Units, 1).await,
            Err(AppError::ResourceNotFound(_))
        ));
    }
}
