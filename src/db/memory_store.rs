// src/db/memory_store.rs
//
// Implementação em memória de todos os stores. Usada pelos testes dos serviços.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{ButtonStore, EntitlementStore, NavigationStore, ProfileStore, UsageStore};
use crate::models::button::{ButtonDefinition, ProfileButtonPermission};
use crate::models::entitlement::{Feature, Plan, PlanFeature, ResourceKind, Subscription};
use crate::models::navigation::{NavigationItem, OrganizationNavigationItem, ProfileNavigationItem};
use crate::models::permission::{
    ActionPermission, FieldDefinition, FieldPermission, ObjectPermission, ObjectType, ProfileActionPermission,
};
use crate::models::profile::{OrganizationMember, Profile};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    members: HashMap<(Uuid, Uuid), OrganizationMember>,
    object_permissions: BTreeMap<(Uuid, ObjectType), ObjectPermission>,
    field_definitions: HashMap<(ObjectType, String), FieldDefinition>,
    field_permissions: BTreeMap<(Uuid, ObjectType, String), FieldPermission>,
    action_definitions: HashMap<String, ActionPermission>,
    profile_actions: BTreeMap<(Uuid, String), ProfileActionPermission>,
    buttons: BTreeMap<String, ButtonDefinition>,
    profile_buttons: BTreeMap<(Uuid, String), ProfileButtonPermission>,
    navigation: BTreeMap<String, NavigationItem>,
    profile_navigation: HashMap<(Uuid, String), ProfileNavigationItem>,
    organization_navigation: HashMap<(Uuid, String), OrganizationNavigationItem>,
    features: BTreeMap<String, Feature>,
    plans: HashMap<Uuid, Plan>,
    plan_features: HashMap<(Uuid, String), PlanFeature>,
    subscriptions: Vec<Subscription>,
    usage: HashMap<(Uuid, ResourceKind), i64>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("lock envenenado")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("lock envenenado")
    }

    // --- Semeadura (o que em produção vem de migrações ou do faturamento) ---

    pub fn add_member(&self, organization_id: Uuid, user_id: Uuid, profile_id: Option<Uuid>) {
        self.write().members.insert(
            (user_id, organization_id),
            OrganizationMember { user_id, organization_id, profile_id, is_active: true },
        );
    }

    pub fn add_field_definition(&self, definition: FieldDefinition) {
        self.write()
            .field_definitions
            .insert((definition.object_type, definition.field_name.clone()), definition);
    }

    pub fn add_action_definition(&self, name: &str) {
        self.write().action_definitions.insert(
            name.to_string(),
            ActionPermission { name: name.to_string(), description: None, module: "TEST".into() },
        );
    }

    pub fn add_button(&self, button: ButtonDefinition) {
        self.write().buttons.insert(button.key.clone(), button);
    }

    pub fn add_feature(&self, feature: Feature) {
        self.write().features.insert(feature.name.clone(), feature);
    }

    pub fn add_plan(&self, plan: Plan) {
        self.write().plans.insert(plan.id, plan);
    }

    pub fn set_plan_feature(&self, plan_id: Uuid, feature_name: &str, is_enabled: bool) {
        self.write().plan_features.insert(
            (plan_id, feature_name.to_string()),
            PlanFeature { plan_id, feature_name: feature_name.to_string(), is_enabled },
        );
    }

    pub fn add_subscription(&self, subscription: Subscription) {
        self.write().subscriptions.push(subscription);
    }

    pub fn set_usage(&self, organization_id: Uuid, resource: ResourceKind, count: i64) {
        self.write().usage.insert((organization_id, resource), count);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.read().profiles.get(&profile_id).cloned())
    }

    async fn list_profiles(&self, organization_id: Uuid) -> Result<Vec<Profile>, AppError> {
        let mut profiles: Vec<Profile> = self
            .read()
            .profiles
            .values()
            .filter(|p| p.organization_id.is_none() || p.organization_id == Some(organization_id))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| b.is_system_profile.cmp(&a.is_system_profile).then(a.name.cmp(&b.name)));
        Ok(profiles)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        let mut tables = self.write();
        let duplicate = tables
            .profiles
            .values()
            .any(|p| p.organization_id == profile.organization_id && p.name == profile.name);
        if duplicate {
            return Err(AppError::UniqueConstraintViolation(format!(
                "Já existe um perfil com o nome '{}'.",
                profile.name
            )));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<(), AppError> {
        let mut tables = self.write();
        tables.profiles.remove(&profile_id);
        tables.object_permissions.retain(|(p, _), _| *p != profile_id);
        tables.field_permissions.retain(|(p, _, _), _| *p != profile_id);
        tables.profile_actions.retain(|(p, _), _| *p != profile_id);
        tables.profile_buttons.retain(|(p, _), _| *p != profile_id);
        tables.profile_navigation.retain(|(p, _), _| *p != profile_id);
        for member in tables.members.values_mut() {
            if member.profile_id == Some(profile_id) {
                member.profile_id = None;
            }
        }
        Ok(())
    }

    async fn find_member(&self, user_id: Uuid, organization_id: Uuid) -> Result<Option<OrganizationMember>, AppError> {
        Ok(self
            .read()
            .members
            .get(&(user_id, organization_id))
            .filter(|m| m.is_active)
            .cloned())
    }

    async fn set_member_profile(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> Result<Option<OrganizationMember>, AppError> {
        let mut tables = self.write();
        Ok(tables.members.get_mut(&(user_id, organization_id)).map(|member| {
            member.profile_id = profile_id;
            member.clone()
        }))
    }

    async fn find_object_permission(
        &self,
        profile_id: Uuid,
        object_type: ObjectType,
    ) -> Result<Option<ObjectPermission>, AppError> {
        Ok(self.read().object_permissions.get(&(profile_id, object_type)).cloned())
    }

    async fn list_object_permissions(&self, profile_id: Uuid) -> Result<Vec<ObjectPermission>, AppError> {
        Ok(self
            .read()
            .object_permissions
            .values()
            .filter(|row| row.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn upsert_object_permissions(&self, rows: &[ObjectPermission]) -> Result<(), AppError> {
        let mut tables = self.write();
        for row in rows {
            tables.object_permissions.insert((row.profile_id, row.object_type), row.clone());
        }
        Ok(())
    }

    async fn find_field_definition(
        &self,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<Option<FieldDefinition>, AppError> {
        Ok(self.read().field_definitions.get(&(object_type, field_name.to_string())).cloned())
    }

    async fn find_field_permission(
        &self,
        profile_id: Uuid,
        object_type: ObjectType,
        field_name: &str,
    ) -> Result<Option<FieldPermission>, AppError> {
        Ok(self
            .read()
            .field_permissions
            .get(&(profile_id, object_type, field_name.to_string()))
            .cloned())
    }

    async fn list_field_permissions(&self, profile_id: Uuid) -> Result<Vec<FieldPermission>, AppError> {
        Ok(self
            .read()
            .field_permissions
            .values()
            .filter(|row| row.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn upsert_field_permissions(&self, rows: &[FieldPermission]) -> Result<(), AppError> {
        let mut tables = self.write();
        for row in rows {
            tables
                .field_permissions
                .insert((row.profile_id, row.object_type, row.field_name.clone()), row.clone());
        }
        Ok(())
    }

    async fn find_action_definition(&self, name: &str) -> Result<Option<ActionPermission>, AppError> {
        Ok(self.read().action_definitions.get(name).cloned())
    }

    async fn find_profile_action(
        &self,
        profile_id: Uuid,
        name: &str,
    ) -> Result<Option<ProfileActionPermission>, AppError> {
        Ok(self.read().profile_actions.get(&(profile_id, name.to_string())).cloned())
    }

    async fn list_profile_actions(&self, profile_id: Uuid) -> Result<Vec<ProfileActionPermission>, AppError> {
        Ok(self
            .read()
            .profile_actions
            .values()
            .filter(|row| row.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn upsert_profile_actions(&self, rows: &[ProfileActionPermission]) -> Result<(), AppError> {
        let mut tables = self.write();
        for row in rows {
            tables
                .profile_actions
                .insert((row.profile_id, row.permission_name.clone()), row.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ButtonStore for MemoryStore {
    async fn list_button_definitions(&self) -> Result<Vec<ButtonDefinition>, AppError> {
        let mut buttons: Vec<ButtonDefinition> = self.read().buttons.values().cloned().collect();
        buttons.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.key.cmp(&b.key)));
        Ok(buttons)
    }

    async fn find_button_definition(&self, key: &str) -> Result<Option<ButtonDefinition>, AppError> {
        Ok(self.read().buttons.get(key).cloned())
    }

    async fn list_profile_buttons(&self, profile_id: Uuid) -> Result<Vec<ProfileButtonPermission>, AppError> {
        Ok(self
            .read()
            .profile_buttons
            .values()
            .filter(|row| row.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn find_profile_button(
        &self,
        profile_id: Uuid,
        button_key: &str,
    ) -> Result<Option<ProfileButtonPermission>, AppError> {
        Ok(self.read().profile_buttons.get(&(profile_id, button_key.to_string())).cloned())
    }

    async fn upsert_profile_buttons(&self, rows: &[ProfileButtonPermission]) -> Result<(), AppError> {
        let mut tables = self.write();
        for row in rows {
            tables
                .profile_buttons
                .insert((row.profile_id, row.button_key.clone()), row.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl NavigationStore for MemoryStore {
    async fn list_navigation_items(&self) -> Result<Vec<NavigationItem>, AppError> {
        let mut items: Vec<NavigationItem> = self.read().navigation.values().cloned().collect();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.key.cmp(&b.key)));
        Ok(items)
    }

    async fn find_navigation_item(&self, key: &str) -> Result<Option<NavigationItem>, AppError> {
        Ok(self.read().navigation.get(key).cloned())
    }

    async fn upsert_navigation_item(&self, item: &NavigationItem) -> Result<NavigationItem, AppError> {
        self.write().navigation.insert(item.key.clone(), item.clone());
        Ok(item.clone())
    }

    async fn list_profile_navigation(&self, profile_id: Uuid) -> Result<Vec<ProfileNavigationItem>, AppError> {
        Ok(self
            .read()
            .profile_navigation
            .values()
            .filter(|row| row.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn list_organization_navigation(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationNavigationItem>, AppError> {
        Ok(self
            .read()
            .organization_navigation
            .values()
            .filter(|row| row.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn upsert_profile_navigation(&self, row: &ProfileNavigationItem) -> Result<(), AppError> {
        self.write()
            .profile_navigation
            .insert((row.profile_id, row.navigation_key.clone()), row.clone());
        Ok(())
    }

    async fn upsert_organization_navigation(&self, row: &OrganizationNavigationItem) -> Result<(), AppError> {
        self.write()
            .organization_navigation
            .insert((row.organization_id, row.navigation_key.clone()), row.clone());
        Ok(())
    }
}

#[async_trait]
impl EntitlementStore for MemoryStore {
    async fn find_current_subscription(&self, organization_id: Uuid) -> Result<Option<Subscription>, AppError> {
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| s.organization_id == organization_id && s.status.is_current())
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, AppError> {
        Ok(self.read().plans.get(&plan_id).cloned())
    }

    async fn list_plan_features(&self, plan_id: Uuid) -> Result<Vec<PlanFeature>, AppError> {
        Ok(self
            .read()
            .plan_features
            .values()
            .filter(|row| row.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn list_features(&self) -> Result<Vec<Feature>, AppError> {
        Ok(self.read().features.values().cloned().collect())
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn count_live(&self, organization_id: Uuid, resource: ResourceKind) -> Result<i64, AppError> {
        Ok(self.read().usage.get(&(organization_id, resource)).copied().unwrap_or(0))
    }
}
