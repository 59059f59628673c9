// src/db/profile_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::ProfileStore;
use crate::models::permission::{
    ActionPermission, FieldDefinition, FieldPermission, ObjectPermission, ObjectType, ProfileActionPermission,
};
use crate::models::profile::{OrganizationMember, Profile};

const PROFILE_COLUMNS: &str = "id, organization_id, name, display_name, description, is_system_profile, is_active, created_at, updated_at";

const OBJECT_PERMISSION_COLUMNS: &str =
    "profile_id, object_type, access_level, can_create, can_read, can_edit, can_delete, can_view_all, updated_at";

const FIELD_PERMISSION_COLUMNS: &str = "profile_id, object_type, field_name, access_level, can_read, can_edit, updated_at";

// O repositório de perfis e das linhas de permissão que pertencem a eles
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS))
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn list_profiles(&self, organization_id: Uuid) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {}
            FROM profiles
            WHERE organization_id IS NULL OR organization_id = $1
            ORDER BY is_system_profile DESC, name
            "#,
            PROFILE_COLUMNS
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, organization_id, name, display_name, description, is_system_profile, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(profile.id)
        .bind(profile.organization_id)
        .bind(&profile.name)
        .bind(&profile.display_name)
        .bind(&profile.description)
        .bind(profile.is_system_profile)
        .bind(profile.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "Já existe um perfil com o nome '{}'.",
                        profile.name
                    ));
                }
            }
            e.into()
        })
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), AppError> {
        // As FKs com ON DELETE CASCADE levam junto objeto/campo/ação/botão/navegação
        sqlx::query("DELETE FROM profiles WHERE id = $1 AND is_system_profile = false")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_member(&self, user_id: Uuid, organization_id: Uuid) -> Result<Option<OrganizationMember>, AppError> {
        let member = sqlx::query_as::<_, OrganizationMember>(
            r#"
            SELECT user_id, organization_id, profile_id, is_active
            FROM organization_members
            WHERE user_id = $1 AND organization_id = $2 AND is_active = true
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn set_member_profile(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> Result<Option<OrganizationMember>, AppError> {
        let member = sqlx::query_as::<_, OrganizationMember>(
            r#"
            UPDATE organization_members
            SET profile_id = $3
            WHERE organization_id = $1 AND user_id = $2
            RETURNING user_id, organization_id, profile_id, is_active
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn find_object_permission(
        &self,
        profile_id: Uuid,
        object_type: ObjectType,
    ) -> Result<Option<ObjectPermission>, AppError> {
        let row = sqlx::query_as::<_, ObjectPermission>(&format!(
            "SELECT {} FROM object_permissions WHERE profile_id = $1 AND object_type = $2",
            OBJECT_PERMISSION_COLUMNS
        ))
        .bind(profile_id)
        .bind(object_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_object_permissions(&self, profile_id: Uuid) -> Result<Vec<ObjectPermission>, AppError> {
        let rows = sqlx::query_as::<_, ObjectPermission>(&format!(
            "SELECT {} FROM object_permissions WHERE profile_id = $1 ORDER BY object_type",
            OBJECT_PERMISSION_COLUMNS
        ))
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_object_permissions(&self, rows: &[ObjectPermission]) -> Result<(), AppError> {
        // Uma transação por chamada. Entre chamadas concorrentes vale o último a escrever.
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO object_permissions
                    (profile_id, object_type, access_level, can_create, can_read, can_edit, can_delete, can_view_all, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (profile_id, object_type) DO UPDATE SET
                    access_level = EXCLUDED.access_level,
                    can_create   = EXCLUDED.can_create,
                    can_read     = EXCLUDED.can_read,
                    can_edit     = EXCLUDED.can_edit,
                    can_delete   = EXCLUDED.can_delete,
                    can_view_all = EXCLUDED.can_view_all,
                    updated_at   = EXCLUDED.updated_at
                "#,
            )
            .bind(row.profile_id)
            .bind(row.object_type)
            .bind(row.access_level)
            .bind(row.can_create)
            .bind(row.can_read)
            .bind(row.can_edit)
            .bind(row.can_delete)
            .bind(row.can_view_all)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_field_definition(
        &self,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<Option<FieldDefinition>, AppError> {
        let row = sqlx::query_as::<_, FieldDefinition>(
            r#"
            SELECT object_type, field_name, label, is_sensitive
            FROM field_definitions
            WHERE object_type = $1 AND field_name = $2
            "#,
        )
        .bind(object_type)
        .bind(field_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_field_permission(
        &self,
        profile_id: Uuid,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<Option<FieldPermission>, AppError> {
        let row = sqlx::query_as::<_, FieldPermission>(&format!(
            "SELECT {} FROM field_permissions WHERE profile_id = $1 AND object_type = $2 AND field_name = $3",
            FIELD_PERMISSION_COLUMNS
        ))
        .bind(profile_id)
        .bind(object_type)
        .bind(field_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_field_permissions(&self, profile_id: Uuid) -> Result<Vec<FieldPermission>, AppError> {
        let rows = sqlx::query_as::<_, FieldPermission>(&format!(
            "SELECT {} FROM field_permissions WHERE profile_id = $1 ORDER BY object_type, field_name",
            FIELD_PERMISSION_COLUMNS
        ))
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_field_permissions(&self, rows: &[FieldPermission]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO field_permissions
                    (profile_id, object_type, field_name, access_level, can_read, can_edit, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (profile_id, object_type, field_name) DO UPDATE SET
                    access_level = EXCLUDED.access_level,
                    can_read     = EXCLUDED.can_read,
                    can_edit     = EXCLUDED.can_edit,
                    updated_at   = EXCLUDED.updated_at
                "#,
            )
            .bind(row.profile_id)
            .bind(row.object_type)
            .bind(&row.field_name)
            .bind(row.access_level)
            .bind(row.can_read)
            .bind(row.can_edit)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_action_definition(&self, name: &str) -> Result<Option<ActionPermission>, AppError> {
        let row = sqlx::query_as::<_, ActionPermission>(
            "SELECT name, description, module FROM action_permissions WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_profile_action(
        &self,
        profile_id: Uuid,
        name: &str,
    ) -> Result<Option<ProfileActionPermission>, AppError> {
        let row = sqlx::query_as::<_, ProfileActionPermission>(
            r#"
            SELECT profile_id, permission_name, is_granted
            FROM profile_action_permissions
            WHERE profile_id = $1 AND permission_name = $2
            "#,
        )
        .bind(profile_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_profile_actions(&self, profile_id: Uuid) -> Result<Vec<ProfileActionPermission>, AppError> {
        let rows = sqlx::query_as::<_, ProfileActionPermission>(
            r#"
            SELECT profile_id, permission_name, is_granted
            FROM profile_action_permissions
            WHERE profile_id = $1
            ORDER BY permission_name
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_profile_actions(&self, rows: &[ProfileActionPermission]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO profile_action_permissions (profile_id, permission_name, is_granted)
                VALUES ($1, $2, $3)
                ON CONFLICT (profile_id, permission_name) DO UPDATE SET is_granted = EXCLUDED.is_granted
                "#,
            )
            .bind(row.profile_id)
            .bind(&row.permission_name)
            .bind(row.is_granted)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
