// src/services/test_support.rs
//
// Fixture compartilhada pelos testes dos serviços: uma organização no plano
// "starter", dois perfis de sistema (admin, viewer) e um perfil próprio vazio.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::NoProfileFallback,
    db::{memory_store::MemoryStore, store::ProfileStore},
    models::{
        auth::AccessContext,
        button::ButtonDefinition,
        entitlement::{Feature, Plan, Subscription, SubscriptionStatus},
        permission::{
            AccessLevel, CapabilitySet, FieldDefinition, ObjectAction, ObjectPermission, ObjectType,
            ProfileActionPermission,
        },
        profile::Profile,
    },
    services::{
        access_service::AccessService, button_service::ButtonService, feature_service::FeatureService,
        navigation_service::NavigationService, permission_service::PermissionService,
        profile_service::ProfileService, quota_service::QuotaService,
    },
};

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub organization_id: Uuid,

    pub admin_user: Uuid,
    pub viewer_user: Uuid,
    pub unassigned_user: Uuid,
    // Membro sem perfil, mas administrador da plataforma
    pub platform_admin_user: Uuid,

    pub admin_profile: Uuid,
    pub viewer_profile: Uuid,
    pub custom_profile: Uuid,

    pub permission_service: PermissionService,
    pub feature_service: FeatureService,
    pub quota_service: QuotaService,
    pub button_service: ButtonService,
    pub navigation_service: NavigationService,
    pub access_service: AccessService,
    pub profile_service: ProfileService,
}

fn profile(organization_id: Option<Uuid>, name: &str, is_system_profile: bool) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        organization_id,
        name: name.into(),
        display_name: name.to_uppercase(),
        description: None,
        is_system_profile,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn button(key: &str, object_type: ObjectType, action: ObjectAction, sort_order: i32) -> ButtonDefinition {
    ButtonDefinition {
        key: key.into(),
        label: key.into(),
        object_type,
        action,
        required_feature: None,
        icon: None,
        sort_order,
        is_active: true,
    }
}

fn feature(name: &str) -> Feature {
    Feature {
        name: name.into(),
        display_name: name.into(),
        category: "CORE".into(),
        is_premium: false,
        is_beta: false,
        required_plan: None,
    }
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_fallback(NoProfileFallback::Deny).await
    }

    pub async fn with_fallback(fallback: NoProfileFallback) -> Self {
        let store = Arc::new(MemoryStore::new());
        let organization_id = Uuid::new_v4();

        // --- Perfis ---
        let admin = store.insert_profile(&profile(None, "admin", true)).await.unwrap();
        let viewer = store.insert_profile(&profile(None, "viewer", true)).await.unwrap();
        let custom = store.insert_profile(&profile(Some(organization_id), "custom", false)).await.unwrap();

        let mut rows: Vec<ObjectPermission> = ObjectType::ALL
            .into_iter()
            .map(|t| ObjectPermission::from_capabilities(admin.id, t, CapabilitySet::from_level(AccessLevel::All)))
            .collect();
        rows.push(ObjectPermission::from_capabilities(viewer.id, ObjectType::Tenant, CapabilitySet::READ_ONLY));
        store.upsert_object_permissions(&rows).await.unwrap();

        store.add_action_definition("reports:export");
        store
            .upsert_profile_actions(&[ProfileActionPermission {
                profile_id: admin.id,
                permission_name: "reports:export".into(),
                is_granted: true,
            }])
            .await
            .unwrap();

        store.add_field_definition(FieldDefinition {
            object_type: ObjectType::Tenant,
            field_name: "bank_account".into(),
            label: Some("Conta bancária".into()),
            is_sensitive: true,
        });

        // --- Membros ---
        let admin_user = Uuid::new_v4();
        let viewer_user = Uuid::new_v4();
        let unassigned_user = Uuid::new_v4();
        store.add_member(organization_id, admin_user, Some(admin.id));
        store.add_member(organization_id, viewer_user, Some(viewer.id));
        store.add_member(organization_id, unassigned_user, None);
        let platform_admin_user = Uuid::new_v4();
        store.add_member(organization_id, platform_admin_user, None);

        // --- Botões ---
        store.add_button(button("tenant.create", ObjectType::Tenant, ObjectAction::Create, 0));
        store.add_button(button("tenant.view", ObjectType::Tenant, ObjectAction::Read, 1));
        store.add_button(button("tenant.edit", ObjectType::Tenant, ObjectAction::Edit, 2));
        store.add_button(button("tenant.delete", ObjectType::Tenant, ObjectAction::Delete, 3));
        store.add_button(ButtonDefinition {
            required_feature: Some("reports".into()),
            ..button("report.export", ObjectType::Report, ObjectAction::Read, 10)
        });
        store.add_button(ButtonDefinition {
            is_active: false,
            ..button("legacy.export", ObjectType::Report, ObjectAction::Read, 99)
        });

        // --- Plano "starter" ---
        store.add_feature(feature("reports"));
        store.add_feature(feature("tenant_portal"));

        let plan_id = Uuid::new_v4();
        store.add_plan(Plan {
            id: plan_id,
            name: "starter".into(),
            display_name: "Starter".into(),
            max_properties: None,
            max_lots: Some(10),
            max_users: Some(5),
            max_extranet_tenants: Some(-1),
            features: json!({ "reports": true, "tenant_portal": true }),
            is_active: true,
        });
        // A linha de plan_features desliga o que o JSON liga
        store.set_plan_feature(plan_id, "reports", false);

        let now = Utc::now();
        store.add_subscription(Subscription {
            id: Uuid::new_v4(),
            organization_id,
            plan_id,
            status: SubscriptionStatus::Active,
            billing_period: "monthly".into(),
            current_period_start: now - Duration::days(3),
            current_period_end: now + Duration::days(27),
            created_at: now - Duration::days(3),
        });

        // --- Serviços ---
        let permission_service = PermissionService::new(store.clone(), fallback);
        let feature_service = FeatureService::new(store.clone());
        let quota_service = QuotaService::new(feature_service.clone(), store.clone());
        let button_service = ButtonService::new(store.clone(), permission_service.clone());
        let navigation_service =
            NavigationService::new(store.clone(), permission_service.clone(), feature_service.clone());
        let access_service = AccessService::new(
            store.clone(),
            permission_service.clone(),
            feature_service.clone(),
            button_service.clone(),
            navigation_service.clone(),
        )
        .with_platform_admins(HashSet::from([platform_admin_user]));
        let profile_service = ProfileService::new(store.clone(), permission_service.clone(), button_service.clone());

        Self {
            store,
            organization_id,
            admin_user,
            viewer_user,
            unassigned_user,
            platform_admin_user,
            admin_profile: admin.id,
            viewer_profile: viewer.id,
            custom_profile: custom.id,
            permission_service,
            feature_service,
            quota_service,
            button_service,
            navigation_service,
            access_service,
            profile_service,
        }
    }

    pub fn context_with_profile(&self, profile_id: Uuid) -> AccessContext {
        AccessContext {
            user_id: Uuid::new_v4(),
            organization_id: self.organization_id,
            profile_id: Some(profile_id),
        }
    }

    pub fn admin_context(&self) -> AccessContext {
        AccessContext {
            user_id: self.admin_user,
            organization_id: self.organization_id,
            profile_id: Some(self.admin_profile),
        }
    }

    pub fn platform_admin_context(&self) -> AccessContext {
        AccessContext {
            user_id: self.platform_admin_user,
            organization_id: self.organization_id,
            profile_id: None,
        }
    }

    pub fn viewer_context(&self) -> AccessContext {
        AccessContext {
            user_id: self.viewer_user,
            organization_id: self.organization_id,
            profile_id: Some(self.viewer_profile),
        }
    }
}
