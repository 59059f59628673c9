// src/db/navigation_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::NavigationStore;
use crate::models::navigation::{NavigationItem, OrganizationNavigationItem, ProfileNavigationItem};

const NAVIGATION_COLUMNS: &str = "key, label, path, icon, parent_key, required_feature, required_permission, \
     object_type, action, sort_order, is_active, default_visible, default_enabled";

#[derive(Clone)]
pub struct NavigationRepository {
    pool: PgPool,
}

impl NavigationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NavigationStore for NavigationRepository {
    async fn list_navigation_items(&self) -> Result<Vec<NavigationItem>, AppError> {
        let items = sqlx::query_as::<_, NavigationItem>(&format!(
            "SELECT {} FROM navigation_items ORDER BY sort_order, key",
            NAVIGATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn find_navigation_item(&self, key: &str) -> Result<Option<NavigationItem>, AppError> {
        let item = sqlx::query_as::<_, NavigationItem>(&format!(
            "SELECT {} FROM navigation_items WHERE key = $1",
            NAVIGATION_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn upsert_navigation_item(&self, item: &NavigationItem) -> Result<NavigationItem, AppError> {
        let saved = sqlx::query_as::<_, NavigationItem>(&format!(
            r#"
            INSERT INTO navigation_items
                (key, label, path, icon, parent_key, required_feature, required_permission,
                 object_type, action, sort_order, is_active, default_visible, default_enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (key) DO UPDATE SET
                label               = EXCLUDED.label,
                path                = EXCLUDED.path,
                icon                = EXCLUDED.icon,
                parent_key          = EXCLUDED.parent_key,
                required_feature    = EXCLUDED.required_feature,
                required_permission = EXCLUDED.required_permission,
                object_type         = EXCLUDED.object_type,
                action              = EXCLUDED.action,
                sort_order          = EXCLUDED.sort_order,
                is_active           = EXCLUDED.is_active,
                default_visible     = EXCLUDED.default_visible,
                default_enabled     = EXCLUDED.default_enabled
            RETURNING {}
            "#,
            NAVIGATION_COLUMNS
        ))
        .bind(&item.key)
        .bind(&item.label)
        .bind(&item.path)
        .bind(&item.icon)
        .bind(&item.parent_key)
        .bind(&item.required_feature)
        .bind(&item.required_permission)
        .bind(item.object_type)
        .bind(item.action)
        .bind(item.sort_order)
        .bind(item.is_active)
        .bind(item.default_visible)
        .bind(item.default_enabled)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn list_profile_navigation(&self, profile_id: Uuid) -> Result<Vec<ProfileNavigationItem>, AppError> {
        let rows = sqlx::query_as::<_, ProfileNavigationItem>(
            r#"
            SELECT profile_id, navigation_key, is_visible, is_enabled
            FROM profile_navigation_items
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_organization_navigation(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationNavigationItem>, AppError> {
        let rows = sqlx::query_as::<_, OrganizationNavigationItem>(
            r#"
            SELECT organization_id, navigation_key, is_visible, is_enabled
            FROM organization_navigation_items
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_profile_navigation(&self, row: &ProfileNavigationItem) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profile_navigation_items (profile_id, navigation_key, is_visible, is_enabled)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (profile_id, navigation_key) DO UPDATE SET
                is_visible = EXCLUDED.is_visible,
                is_enabled = EXCLUDED.is_enabled
            "#,
        )
        .bind(row.profile_id)
        .bind(&row.navigation_key)
        .bind(row.is_visible)
        .bind(row.is_enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_organization_navigation(&self, row: &OrganizationNavigationItem) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO organization_navigation_items (organization_id, navigation_key, is_visible, is_enabled)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (organization_id, navigation_key) DO UPDATE SET
                is_visible = EXCLUDED.is_visible,
                is_enabled = EXCLUDED.is_enabled
            "#,
        )
        .bind(row.organization_id)
        .bind(&row.navigation_key)
        .bind(row.is_visible)
        .bind(row.is_enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
