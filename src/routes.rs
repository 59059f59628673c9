// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::tenant_guard};

pub fn build_router(app_state: AppState) -> Router {
    // --- Perguntas ao motor ---
    let access_routes = Router::new()
        .route("/access/object", get(handlers::access::can_access_object))
        .route("/access/feature", get(handlers::access::can_access_feature))
        .route("/access/action", get(handlers::access::can_perform_action))
        .route("/me/permissions", get(handlers::access::get_my_permissions));

    // --- Perfis e suas permissões ---
    let profile_routes = Router::new()
        .route(
            "/profiles",
            get(handlers::profiles::list_profiles).post(handlers::profiles::create_profile),
        )
        .route("/profiles/{profile_id}", delete(handlers::profiles::delete_profile))
        .route("/members/profile", put(handlers::profiles::assign_profile))
        .route(
            "/profiles/{profile_id}/object-permissions",
            get(handlers::permissions::get_object_permissions).put(handlers::permissions::put_object_permissions),
        )
        .route(
            "/profiles/{profile_id}/field-permissions",
            get(handlers::permissions::get_field_permissions).put(handlers::permissions::put_field_permissions),
        )
        .route(
            "/profiles/{profile_id}/action-permissions",
            get(handlers::permissions::get_action_permissions).put(handlers::permissions::put_action_permissions),
        );

    // --- Botões ---
    let button_routes = Router::new()
        .route(
            "/profiles/{profile_id}/button-permissions",
            get(handlers::buttons::get_button_permissions).put(handlers::buttons::put_button_permissions),
        )
        .route(
            "/profiles/{profile_id}/button-permissions/sync",
            post(handlers::buttons::sync_buttons),
        )
        .route(
            "/profiles/{profile_id}/button-permissions/{button_key}",
            delete(handlers::buttons::reset_button_override),
        );

    // --- Navegação ---
    let navigation_routes = Router::new()
        .route("/navigation", get(handlers::navigation::list_navigation))
        .route("/navigation/items", put(handlers::navigation::upsert_navigation_item))
        .route(
            "/navigation/overrides/{key}",
            put(handlers::navigation::set_organization_navigation_override),
        )
        .route(
            "/profiles/{profile_id}/navigation/{key}",
            put(handlers::navigation::set_profile_navigation_override),
        );

    // --- Plano, features e quotas ---
    let entitlement_routes = Router::new()
        .route("/features", get(handlers::entitlements::list_features))
        .route("/features/enabled", get(handlers::entitlements::list_enabled_features))
        .route("/subscription", get(handlers::entitlements::get_subscription))
        .route("/quota/{resource}", get(handlers::entitlements::check_quota))
        .route("/quota/{resource}/enforce", post(handlers::entitlements::enforce_quota));

    // Tudo abaixo exige token + organização da qual o usuário é membro
    let tenant_routes = Router::new()
        .merge(access_routes)
        .merge(profile_routes)
        .merge(button_routes)
        .merge(navigation_routes)
        .merge(entitlement_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", tenant_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
