// src/db/store.rs
//
// Interfaces estreitas para os dados de permissão e de assinatura.
// Os serviços só enxergam estes traits; o Postgres é uma implementação.

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::button::{ButtonDefinition, ProfileButtonPermission};
use crate::models::entitlement::{Feature, Plan, PlanFeature, ResourceKind, Subscription};
use crate::models::navigation::{NavigationItem, OrganizationNavigationItem, ProfileNavigationItem};
use crate::models::permission::{
    ActionPermission, FieldDefinition, FieldPermission, ObjectPermission, ObjectType, ProfileActionPermission,
};
use crate::models::profile::{OrganizationMember, Profile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    // --- Perfis ---
    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError>;
    /// Perfis de sistema + perfis da organização.
    async fn list_profiles(&self, organization_id: Uuid) -> Result<Vec<Profile>, AppError>;
    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, AppError>;
    /// Remove o perfil e, em cascata, todas as suas linhas de permissão.
    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), AppError>;

    // --- Membros ---
    async fn find_member(&self, user_id: Uuid, organization_id: Uuid) -> Result<Option<OrganizationMember>, AppError>;
    async fn set_member_profile(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> Result<Option<OrganizationMember>, AppError>;

    // --- Objeto ---
    async fn find_object_permission(
        &self,
        profile_id: Uuid,
        object_type: ObjectType,
    ) -> Result<Option<ObjectPermission>, AppError>;
    async fn list_object_permissions(&self, profile_id: Uuid) -> Result<Vec<ObjectPermission>, AppError>;
    async fn upsert_object_permissions(&self, rows: &[ObjectPermission]) -> Result<(), AppError>;

    // --- Campo ---
    async fn find_field_definition(
        &self,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<Option<FieldDefinition>, AppError>;
    async fn find_field_permission(
        &self,
        profile_id: Uuid,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<Option<FieldPermission>, AppError>;
    async fn list_field_permissions(&self, profile_id: Uuid) -> Result<Vec<FieldPermission>, AppError>;
    async fn upsert_field_permissions(&self, rows: &[FieldPermission]) -> Result<(), AppError>;

    // --- Permissões nomeadas ---
    async fn find_action_definition(&self, name: &str) -> Result<Option<ActionPermission>, AppError>;
    async fn find_profile_action(
        &self,
        profile_id: Uuid,
        name: &str,
    ) -> Result<Option<ProfileActionPermission>, AppError>;
    async fn list_profile_actions(&self, profile_id: Uuid) -> Result<Vec<ProfileActionPermission>, AppError>;
    async fn upsert_profile_actions(&self, rows: &[ProfileActionPermission]) -> Result<(), AppError>;
}

#[async_trait]
pub trait ButtonStore: Send + Sync {
    /// Catálogo completo, ordenado por sort_order e key.
    async fn list_button_definitions(&self) -> Result<Vec<ButtonDefinition>, AppError>;
    async fn find_button_definition(&self, key: &str) -> Result<Option<ButtonDefinition>, AppError>;
    async fn list_profile_buttons(&self, profile_id: Uuid) -> Result<Vec<ProfileButtonPermission>, AppError>;
    async fn find_profile_button(
        &self,
        profile_id: Uuid,
        button_key: &str,
    ) -> Result<Option<ProfileButtonPermission>, AppError>;
    async fn upsert_profile_buttons(&self, rows: &[ProfileButtonPermission]) -> Result<(), AppError>;
}

#[async_trait]
pub trait NavigationStore: Send + Sync {
    async fn list_navigation_items(&self) -> Result<Vec<NavigationItem>, AppError>;
    async fn find_navigation_item(&self, key: &str) -> Result<Option<NavigationItem>, AppError>;
    async fn upsert_navigation_item(&self, item: &NavigationItem) -> Result<NavigationItem, AppError>;
    async fn list_profile_navigation(&self, profile_id: Uuid) -> Result<Vec<ProfileNavigationItem>, AppError>;
    async fn list_organization_navigation(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationNavigationItem>, AppError>;
    async fn upsert_profile_navigation(&self, row: &ProfileNavigationItem) -> Result<(), AppError>;
    async fn upsert_organization_navigation(&self, row: &OrganizationNavigationItem) -> Result<(), AppError>;
}

#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Assinatura ativa, em trial ou em atraso (a mais recente).
    async fn find_current_subscription(&self, organization_id: Uuid) -> Result<Option<Subscription>, AppError>;
    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, AppError>;
    async fn list_plan_features(&self, plan_id: Uuid) -> Result<Vec<PlanFeature>, AppError>;
    async fn list_features(&self) -> Result<Vec<Feature>, AppError>;
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Quantidade de linhas vivas (não apagadas) do recurso na organização.
    async fn count_live(&self, organization_id: Uuid, resource: ResourceKind) -> Result<i64, AppError>;
}
