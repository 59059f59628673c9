// src/db/button_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::ButtonStore;
use crate::models::button::{ButtonDefinition, ProfileButtonPermission};

const BUTTON_COLUMNS: &str = "key, label, object_type, action, required_feature, icon, sort_order, is_active";

const PROFILE_BUTTON_COLUMNS: &str =
    "profile_id, button_key, is_enabled, is_visible, custom_label, custom_icon, is_override, updated_at";

#[derive(Clone)]
pub struct ButtonRepository {
    pool: PgPool,
}

impl ButtonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ButtonStore for ButtonRepository {
    async fn list_button_definitions(&self) -> Result<Vec<ButtonDefinition>, AppError> {
        let buttons = sqlx::query_as::<_, ButtonDefinition>(&format!(
            "SELECT {} FROM button_definitions ORDER BY sort_order, key",
            BUTTON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(buttons)
    }

    async fn find_button_definition(&self, key: &str) -> Result<Option<ButtonDefinition>, AppError> {
        let button = sqlx::query_as::<_, ButtonDefinition>(&format!(
            "SELECT {} FROM button_definitions WHERE key = $1",
            BUTTON_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(button)
    }

    async fn list_profile_buttons(&self, profile_id: Uuid) -> Result<Vec<ProfileButtonPermission>, AppError> {
        let rows = sqlx::query_as::<_, ProfileButtonPermission>(&format!(
            "SELECT {} FROM profile_button_permissions WHERE profile_id = $1 ORDER BY button_key",
            PROFILE_BUTTON_COLUMNS
        ))
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_profile_button(
        &self,
        profile_id: Uuid,
        button_key: &str,
    ) -> Result<Option<ProfileButtonPermission>, AppError> {
        let row = sqlx::query_as::<_, ProfileButtonPermission>(&format!(
            "SELECT {} FROM profile_button_permissions WHERE profile_id = $1 AND button_key = $2",
            PROFILE_BUTTON_COLUMNS
        ))
        .bind(profile_id)
        .bind(button_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_profile_buttons(&self, rows: &[ProfileButtonPermission]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO profile_button_permissions
                    (profile_id, button_key, is_enabled, is_visible, custom_label, custom_icon, is_override, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (profile_id, button_key) DO UPDATE SET
                    is_enabled   = EXCLUDED.is_enabled,
                    is_visible   = EXCLUDED.is_visible,
                    custom_label = EXCLUDED.custom_label,
                    custom_icon  = EXCLUDED.custom_icon,
                    is_override  = EXCLUDED.is_override,
                    updated_at   = EXCLUDED.updated_at
                "#,
            )
            .bind(row.profile_id)
            .bind(&row.button_key)
            .bind(row.is_enabled)
            .bind(row.is_visible)
            .bind(&row.custom_label)
            .bind(&row.custom_icon)
            .bind(row.is_override)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
