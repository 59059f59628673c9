// src/db/entitlement_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{EntitlementStore, UsageStore};
use crate::models::entitlement::{Feature, Plan, PlanFeature, ResourceKind, Subscription};

// Catálogo de planos/features e assinaturas (escritas pertencem ao provedor de cobrança)
#[derive(Clone)]
pub struct EntitlementRepository {
    pool: PgPool,
}

impl EntitlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementStore for EntitlementRepository {
    async fn find_current_subscription(&self, organization_id: Uuid) -> Result<Option<Subscription>, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, organization_id, plan_id, status, billing_period,
                   current_period_start, current_period_end, created_at
            FROM subscriptions
            WHERE organization_id = $1
              AND status IN ('active', 'trialing', 'past_due')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, AppError> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, name, display_name, max_properties, max_lots, max_users,
                   max_extranet_tenants, features, is_active
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn list_plan_features(&self, plan_id: Uuid) -> Result<Vec<PlanFeature>, AppError> {
        let rows = sqlx::query_as::<_, PlanFeature>(
            "SELECT plan_id, feature_name, is_enabled FROM plan_features WHERE plan_id = $1",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_features(&self) -> Result<Vec<Feature>, AppError> {
        let rows = sqlx::query_as::<_, Feature>(
            r#"
            SELECT name, display_name, category, is_premium, is_beta, required_plan
            FROM features
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// Contagem de uso. As tabelas contadas pertencem à aplicação CRUD, não ao motor.
#[derive(Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn count_query(resource: ResourceKind) -> &'static str {
        match resource {
            ResourceKind::Properties => {
                "SELECT COUNT(*) FROM properties WHERE organization_id = $1 AND deleted_at IS NULL"
            }
            ResourceKind::Units => "SELECT COUNT(*) FROM units WHERE organization_id = $1 AND deleted_at IS NULL",
            ResourceKind::Users => {
                "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1 AND is_active = true"
            }
            ResourceKind::ExtranetTenants => {
                "SELECT COUNT(*) FROM extranet_accounts WHERE organization_id = $1 AND deleted_at IS NULL"
            }
        }
    }
}

#[async_trait]
impl UsageStore for UsageRepository {
    async fn count_live(&self, organization_id: Uuid, resource: ResourceKind) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(Self::count_query(resource))
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
