// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Access ---
        handlers::access::can_access_object,
        handlers::access::can_access_feature,
        handlers::access::can_perform_action,
        handlers::access::get_my_permissions,

        // --- Profiles ---
        handlers::profiles::list_profiles,
        handlers::profiles::create_profile,
        handlers::profiles::delete_profile,
        handlers::profiles::assign_profile,

        // --- Permissions ---
        handlers::permissions::get_object_permissions,
        handlers::permissions::put_object_permissions,
        handlers::permissions::get_field_permissions,
        handlers::permissions::put_field_permissions,
        handlers::permissions::get_action_permissions,
        handlers::permissions::put_action_permissions,

        // --- Buttons ---
        handlers::buttons::get_button_permissions,
        handlers::buttons::put_button_permissions,
        handlers::buttons::sync_buttons,
        handlers::buttons::reset_button_override,

        // --- Navigation ---
        handlers::navigation::list_navigation,
        handlers::navigation::upsert_navigation_item,
        handlers::navigation::set_profile_navigation_override,
        handlers::navigation::set_organization_navigation_override,

        // --- Entitlements ---
        handlers::entitlements::list_features,
        handlers::entitlements::list_enabled_features,
        handlers::entitlements::get_subscription,
        handlers::entitlements::check_quota,
        handlers::entitlements::enforce_quota,
    ),
    components(
        schemas(
            // --- Permission ---
            models::permission::ObjectType,
            models::permission::ObjectAction,
            models::permission::AccessLevel,
            models::permission::FieldAccessLevel,
            models::permission::CapabilitySet,
            models::permission::ObjectPermission,
            models::permission::ObjectPermissionInput,
            models::permission::FieldDefinition,
            models::permission::FieldPermission,
            models::permission::FieldCapability,
            models::permission::FieldPermissionInput,
            models::permission::ActionPermission,
            models::permission::ProfileActionPermission,
            models::permission::ActionPermissionInput,

            // --- Profiles ---
            models::profile::Profile,
            models::profile::OrganizationMember,
            models::profile::CreateProfilePayload,
            models::profile::AssignProfilePayload,

            // --- Buttons ---
            models::button::ButtonDefinition,
            models::button::ProfileButtonPermission,
            models::button::ButtonPermissionView,
            models::button::ButtonOverrideInput,
            models::button::EffectiveButton,

            // --- Navigation ---
            models::navigation::NavigationItem,
            models::navigation::ProfileNavigationItem,
            models::navigation::OrganizationNavigationItem,
            models::navigation::UpsertNavigationItemPayload,
            models::navigation::NavigationOverridePayload,
            models::navigation::ResolvedNavigationItem,

            // --- Entitlements ---
            models::entitlement::Feature,
            models::entitlement::Plan,
            models::entitlement::PlanFeature,
            models::entitlement::SubscriptionStatus,
            models::entitlement::Subscription,
            models::entitlement::ResourceKind,
            models::entitlement::QuotaCheck,

            // --- Access ---
            models::access::AccessDecision,
            models::access::ObjectPermissionEntry,
            models::access::PermissionMatrix,
        )
    ),
    tags(
        (name = "Access", description = "Decisões de acesso (objeto, feature, ação) e matriz da interface"),
        (name = "Profiles", description = "Perfis e vínculo de membros"),
        (name = "Permissions", description = "Permissões de objeto, campo e nomeadas por perfil"),
        (name = "Buttons", description = "Sincronização e overrides de botões"),
        (name = "Navigation", description = "Menu hierárquico e seus overrides"),
        (name = "Entitlements", description = "Plano, features e quotas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
