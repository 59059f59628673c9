// src/services/navigation_service.rs

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::NavigationStore,
    models::{
        auth::AccessContext,
        navigation::{
            NavigationItem, NavigationOverridePayload, OrganizationNavigationItem, ProfileNavigationItem,
            ResolvedNavigationItem, UpsertNavigationItemPayload,
        },
        permission::{CapabilitySet, ObjectAction, ObjectType},
    },
    services::{feature_service::FeatureService, permission_service::PermissionService},
};

// =============================================================================
//  REGRAS PURAS
// =============================================================================

/// (visível, habilitado) depois das camadas: organização ?? perfil ?? padrão do item.
pub fn layered_state(
    item: &NavigationItem,
    organization: Option<&OrganizationNavigationItem>,
    profile: Option<&ProfileNavigationItem>,
) -> (bool, bool) {
    if let Some(row) = organization {
        return (row.is_visible, row.is_enabled);
    }
    if let Some(row) = profile {
        return (row.is_visible, row.is_enabled);
    }
    (item.default_visible, item.default_enabled)
}

/// Monta a árvore a partir da tabela plana.
///
/// `visible` mapeia as chaves que sobreviveram às camadas e portões para o
/// seu `is_enabled`. Itens fora do mapa somem junto com toda a subárvore,
/// assim como órfãos (pai inexistente) e nós presos em ciclo.
pub fn assemble_tree(items: &[NavigationItem], visible: &HashMap<String, bool>) -> Vec<ResolvedNavigationItem> {
    let mut children_of: HashMap<Option<&str>, Vec<&NavigationItem>> = HashMap::new();
    for item in items.iter().filter(|i| visible.contains_key(&i.key)) {
        children_of.entry(item.parent_key.as_deref()).or_default().push(item);
    }
    for siblings in children_of.values_mut() {
        siblings.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.key.cmp(&b.key)));
    }

    let mut seen = HashSet::new();
    build_level(None, true, &children_of, visible, &mut seen)
}

fn build_level<'a>(
    parent: Option<&'a str>,
    parent_enabled: bool,
    children_of: &HashMap<Option<&'a str>, Vec<&'a NavigationItem>>,
    visible: &HashMap<String, bool>,
    seen: &mut HashSet<&'a str>,
) -> Vec<ResolvedNavigationItem> {
    let Some(siblings) = children_of.get(&parent) else {
        return Vec::new();
    };

    let mut level = Vec::with_capacity(siblings.len());
    for item in siblings {
        if !seen.insert(item.key.as_str()) {
            continue;
        }
        // Seção desabilitada desabilita os filhos
        let is_enabled = parent_enabled && visible.get(&item.key).copied().unwrap_or(false);
        let children = build_level(Some(item.key.as_str()), is_enabled, children_of, visible, seen);

        level.push(ResolvedNavigationItem {
            key: item.key.clone(),
            label: item.label.clone(),
            path: item.path.clone(),
            icon: item.icon.clone(),
            is_enabled,
            children,
        });
    }
    level
}

/// Rejeita um pai que tornaria o item ancestral de si mesmo.
pub fn check_parent_chain(
    key: &str,
    parent_key: &str,
    items: &HashMap<String, NavigationItem>,
) -> Result<(), AppError> {
    if parent_key == key {
        return Err(AppError::InvalidInput(format!("O item '{}' não pode ser pai de si mesmo", key)));
    }
    if !items.contains_key(parent_key) {
        return Err(AppError::ResourceNotFound(format!("Item de navegação '{}'", parent_key)));
    }

    let mut visited = HashSet::new();
    let mut cursor = Some(parent_key);
    while let Some(current) = cursor {
        if current == key {
            return Err(AppError::InvalidInput(format!(
                "Definir '{}' como pai de '{}' cria um ciclo",
                parent_key, key
            )));
        }
        // Ciclo antigo já gravado fora desta cadeia: para de subir
        if !visited.insert(current) {
            break;
        }
        cursor = items.get(current).and_then(|item| item.parent_key.as_deref());
    }
    Ok(())
}

/// Portão textual opcional: aparado, e vazio só como ausência.
pub fn normalize_gate(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Err(AppError::InvalidInput(format!("{} não pode ser vazio", field))),
        Some(trimmed) => Ok(Some(trimmed.to_string())),
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct NavigationService {
    store: Arc<dyn NavigationStore>,
    permissions: PermissionService,
    features: FeatureService,
}

impl NavigationService {
    pub fn new(store: Arc<dyn NavigationStore>, permissions: PermissionService, features: FeatureService) -> Self {
        Self { store, permissions, features }
    }

    async fn require_item(&self, key: &str) -> Result<NavigationItem, AppError> {
        self.store
            .find_navigation_item(key)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Item de navegação '{}'", key)))
    }

    pub async fn upsert_item(&self, payload: &UpsertNavigationItemPayload) -> Result<NavigationItem, AppError> {
        // 1. Portão de objeto: os dois ou nenhum
        let (object_type, action) = match (&payload.object_type, &payload.action) {
            (Some(object_type), Some(action)) => (
                Some(object_type.parse::<ObjectType>()?),
                Some(action.parse::<ObjectAction>()?),
            ),
            (None, None) => (None, None),
            _ => {
                return Err(AppError::InvalidInput(
                    "objectType e action devem ser informados juntos".into(),
                ));
            }
        };

        // 2. Portões nomeados
        let required_feature = normalize_gate("requiredFeature", payload.required_feature.as_deref())?;
        let required_permission = normalize_gate("requiredPermission", payload.required_permission.as_deref())?;
        if let Some(permission) = required_permission.as_deref() {
            if !self.permissions.action_exists(permission).await? {
                return Err(AppError::InvalidInput(format!(
                    "Permissão '{}' não existe no catálogo de ações",
                    permission
                )));
            }
        }

        // 3. Checagem de ciclo
        if let Some(parent_key) = payload.parent_key.as_deref() {
            let items: HashMap<String, NavigationItem> = self
                .store
                .list_navigation_items()
                .await?
                .into_iter()
                .map(|item| (item.key.clone(), item))
                .collect();
            check_parent_chain(&payload.key, parent_key, &items)?;
        }

        let item = NavigationItem {
            key: payload.key.clone(),
            label: payload.label.clone(),
            path: payload.path.clone(),
            icon: payload.icon.clone(),
            parent_key: payload.parent_key.clone(),
            required_feature,
            required_permission,
            object_type,
            action,
            sort_order: payload.sort_order,
            is_active: payload.is_active,
            default_visible: payload.default_visible,
            default_enabled: payload.default_enabled,
        };

        let saved = self.store.upsert_navigation_item(&item).await?;
        tracing::info!("🧭 Item de navegação '{}' gravado", saved.key);
        Ok(saved)
    }

    pub async fn set_profile_override(
        &self,
        profile_id: Uuid,
        key: &str,
        payload: NavigationOverridePayload,
    ) -> Result<ProfileNavigationItem, AppError> {
        self.permissions.require_profile(profile_id).await?;
        self.require_item(key).await?;

        let row = ProfileNavigationItem {
            profile_id,
            navigation_key: key.to_string(),
            is_visible: payload.is_visible,
            is_enabled: payload.is_enabled,
        };
        self.store.upsert_profile_navigation(&row).await?;
        Ok(row)
    }

    pub async fn set_organization_override(
        &self,
        organization_id: Uuid,
        key: &str,
        payload: NavigationOverridePayload,
    ) -> Result<OrganizationNavigationItem, AppError> {
        self.require_item(key).await?;

        let row = OrganizationNavigationItem {
            organization_id,
            navigation_key: key.to_string(),
            is_visible: payload.is_visible,
            is_enabled: payload.is_enabled,
        };
        self.store.upsert_organization_navigation(&row).await?;
        Ok(row)
    }

    /// Árvore do usuário da requisição, com as features já resolvidas.
    pub async fn resolve_navigation_with(
        &self,
        ctx: &AccessContext,
        enabled_features: &BTreeSet<String>,
    ) -> Result<Vec<ResolvedNavigationItem>, AppError> {
        let items: Vec<NavigationItem> = self
            .store
            .list_navigation_items()
            .await?
            .into_iter()
            .filter(|item| item.is_active)
            .collect();

        let organization_rows: HashMap<String, OrganizationNavigationItem> = self
            .store
            .list_organization_navigation(ctx.organization_id)
            .await?
            .into_iter()
            .map(|row| (row.navigation_key.clone(), row))
            .collect();

        let profile_rows: HashMap<String, ProfileNavigationItem> = match ctx.profile_id {
            Some(profile_id) => self
                .store
                .list_profile_navigation(profile_id)
                .await?
                .into_iter()
                .map(|row| (row.navigation_key.clone(), row))
                .collect(),
            None => HashMap::new(),
        };

        let mut object_caps: HashMap<ObjectType, CapabilitySet> = HashMap::new();
        let mut visible = HashMap::new();

        for item in &items {
            let (is_visible, is_enabled) =
                layered_state(item, organization_rows.get(&item.key), profile_rows.get(&item.key));
            if !is_visible {
                continue;
            }

            // Portões: todos obrigatórios
            if let Some(feature) = &item.required_feature {
                if !enabled_features.contains(feature) {
                    continue;
                }
            }
            if let Some(permission) = &item.required_permission {
                match self.permissions.resolve_action_permission(ctx.profile_id, permission).await {
                    Ok(true) => {}
                    Ok(false) => continue,
                    // Portão gravado inválido esconde só este item
                    Err(AppError::InvalidInput(reason)) => {
                        tracing::warn!("⚠️ Item de navegação '{}' ignorado: {}", item.key, reason);
                        continue;
                    }
                    Err(other) => return Err(other),
                }
            }
            if let (Some(object_type), Some(action)) = (item.object_type, item.action) {
                let caps = match object_caps.get(&object_type) {
                    Some(caps) => *caps,
                    None => {
                        let caps = self.permissions.resolve_object_permission(ctx.profile_id, object_type).await?;
                        object_caps.insert(object_type, caps);
                        caps
                    }
                };
                if !caps.allows(action) {
                    continue;
                }
            }

            visible.insert(item.key.clone(), is_enabled);
        }

        Ok(assemble_tree(&items, &visible))
    }

    pub async fn resolve_navigation(&self, ctx: &AccessContext) -> Result<Vec<ResolvedNavigationItem>, AppError> {
        let features = self.features.resolve_enabled_features(ctx.organization_id).await?;
        self.resolve_navigation_with(ctx, &features).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Fixture;

    fn item(key: &str, parent: Option<&str>, sort_order: i32) -> NavigationItem {
        NavigationItem {
            key: key.into(),
            label: key.into(),
            path: None,
            icon: None,
            parent_key: parent.map(str::to_string),
            required_feature: None,
            required_permission: None,
            object_type: None,
            action: None,
            sort_order,
            is_active: true,
            default_visible: true,
            default_enabled: true,
        }
    }

    fn payload(key: &str, parent: Option<&str>) -> UpsertNavigationItemPayload {
        UpsertNavigationItemPayload {
            key: key.into(),
            label: key.into(),
            path: None,
            icon: None,
            parent_key: parent.map(str::to_string),
            required_feature: None,
            required_permission: None,
            object_type: None,
            action: None,
            sort_order: 0,
            is_active: true,
            default_visible: true,
            default_enabled: true,
        }
    }

    fn keys(nodes: &[ResolvedNavigationItem]) -> Vec<&str> {
        nodes.iter().map(|n| n.key.as_str()).collect()
    }

    #[test]
    fn organization_override_wins_over_profile() {
        let nav = item("reports", None, 0);
        let org = OrganizationNavigationItem {
            organization_id: Uuid::new_v4(),
            navigation_key: "reports".into(),
            is_visible: true,
            is_enabled: false,
        };
        let profile = ProfileNavigationItem {
            profile_id: Uuid::new_v4(),
            navigation_key: "reports".into(),
            is_visible: false,
            is_enabled: true,
        };
        assert_eq!(layered_state(&nav, Some(&org), Some(&profile)), (true, false));
        assert_eq!(layered_state(&nav, None, Some(&profile)), (false, true));
        assert_eq!(layered_state(&nav, None, None), (true, true));
    }

    #[test]
    fn tree_orders_siblings_and_drops_hidden_subtrees() {
        let items = vec![
            item("b", None, 1),
            item("a", None, 1),
            item("first", None, 0),
            item("a.child", Some("a"), 0),
            item("b.child", Some("b"), 0),
            item("orphan", Some("missing"), 0),
        ];
        let visible: HashMap<String, bool> = ["b", "a", "first", "a.child", "b.child", "orphan"]
            .iter()
            .map(|k| (k.to_string(), true))
            .filter(|(k, _)| k != "b")
            .collect();

        let tree = assemble_tree(&items, &visible);
        assert_eq!(keys(&tree), vec!["first", "a"]);
        assert_eq!(keys(&tree[1].children), vec!["a.child"]);
    }

    #[test]
    fn disabled_parent_disables_children() {
        let items = vec![item("root", None, 0), item("root.leaf", Some("root"), 0)];
        let visible: HashMap<String, bool> =
            [("root".to_string(), false), ("root.leaf".to_string(), true)].into_iter().collect();
        let tree = assemble_tree(&items, &visible);
        assert!(!tree[0].is_enabled);
        assert!(!tree[0].children[0].is_enabled);
    }

    #[test]
    fn parent_chain_rejects_cycles() {
        let items: HashMap<String, NavigationItem> = [
            item("a", None, 0),
            item("b", Some("a"), 0),
            item("c", Some("b"), 0),
        ]
        .into_iter()
        .map(|i| (i.key.clone(), i))
        .collect();

        assert!(matches!(check_parent_chain("a", "a", &items), Err(AppError::InvalidInput(_))));
        assert!(matches!(check_parent_chain("a", "c", &items), Err(AppError::InvalidInput(_))));
        assert!(matches!(check_parent_chain("x", "nope", &items), Err(AppError::ResourceNotFound(_))));
        assert!(check_parent_chain("d", "c", &items).is_ok());
    }

    #[tokio::test]
    async fn upsert_rejects_reparenting_into_own_subtree() {
        let fx = Fixture::new().await;
        fx.navigation_service.upsert_item(&payload("ops", None)).await.unwrap();
        fx.navigation_service.upsert_item(&payload("ops.tasks", Some("ops"))).await.unwrap();

        let result = fx.navigation_service.upsert_item(&payload("ops", Some("ops.tasks"))).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let mut half_gate = payload("ops.leases", Some("ops"));
        half_gate.object_type = Some("Lease".into());
        assert!(matches!(
            fx.navigation_service.upsert_item(&half_gate).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn viewer_only_sees_items_their_grants_allow() {
        let fx = Fixture::new().await;

        let mut tenants = payload("tenants", None);
        tenants.object_type = Some("Tenant".into());
        tenants.action = Some("read".into());
        fx.navigation_service.upsert_item(&tenants).await.unwrap();

        let mut ledger = payload("ledger", None);
        ledger.object_type = Some("JournalEntry".into());
        ledger.action = Some("read".into());
        fx.navigation_service.upsert_item(&ledger).await.unwrap();

        let mut reports = payload("reports", None);
        reports.required_feature = Some("reports".into());
        fx.navigation_service.upsert_item(&reports).await.unwrap();

        let mut portal = payload("portal", None);
        portal.required_feature = Some("tenant_portal".into());
        fx.navigation_service.upsert_item(&portal).await.unwrap();

        let ctx = fx.viewer_context();
        let tree = fx.navigation_service.resolve_navigation(&ctx).await.unwrap();
        // reports está desligado pela linha de plan_features
        assert_eq!(keys(&tree), vec!["portal", "tenants"]);
    }

    #[tokio::test]
    async fn organization_override_hides_item_for_everyone() {
        let fx = Fixture::new().await;
        fx.navigation_service.upsert_item(&payload("inbox", None)).await.unwrap();
        fx.navigation_service
            .set_profile_override(fx.viewer_profile, "inbox", NavigationOverridePayload { is_visible: true, is_enabled: true })
            .await
            .unwrap();
        fx.navigation_service
            .set_organization_override(
                fx.organization_id,
                "inbox",
                NavigationOverridePayload { is_visible: false, is_enabled: true },
            )
            .await
            .unwrap();

        let tree = fx.navigation_service.resolve_navigation(&fx.viewer_context()).await.unwrap();
        assert!(tree.iter().all(|n| n.key != "inbox"));
    }

    #[test]
    fn gates_are_trimmed_and_blank_is_rejected() {
        assert_eq!(normalize_gate("requiredFeature", None).unwrap(), None);
        assert_eq!(
            normalize_gate("requiredFeature", Some("  reports ")).unwrap(),
            Some("reports".to_string())
        );
        assert!(matches!(
            normalize_gate("requiredPermission", Some(" ")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn upsert_rejects_blank_or_unknown_permission_gates() {
        let fx = Fixture::new().await;

        let mut blank = payload("evil", None);
        blank.required_permission = Some(" ".into());
        assert!(matches!(
            fx.navigation_service.upsert_item(&blank).await,
            Err(AppError::InvalidInput(_))
        ));

        let mut blank_feature = payload("evil", None);
        blank_feature.required_feature = Some("".into());
        assert!(matches!(
            fx.navigation_service.upsert_item(&blank_feature).await,
            Err(AppError::InvalidInput(_))
        ));

        let mut unknown = payload("evil", None);
        unknown.required_permission = Some("reports:shred".into());
        assert!(matches!(
            fx.navigation_service.upsert_item(&unknown).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(fx.store.find_navigation_item("evil").await.unwrap().is_none());

        let mut padded = payload("exports", None);
        padded.required_permission = Some(" reports:export ".into());
        let saved = fx.navigation_service.upsert_item(&padded).await.unwrap();
        assert_eq!(saved.required_permission.as_deref(), Some("reports:export"));
    }

    #[tokio::test]
    async fn stored_blank_permission_gate_hides_only_its_item() {
        let fx = Fixture::new().await;
        fx.navigation_service.upsert_item(&payload("home", None)).await.unwrap();

        // Linha gravada fora do serviço, sem normalização
        let mut evil = item("evil", None, 1);
        evil.required_permission = Some(" ".into());
        fx.store.upsert_navigation_item(&evil).await.unwrap();

        let tree = fx.navigation_service.resolve_navigation(&fx.viewer_context()).await.unwrap();
        assert_eq!(keys(&tree), vec!["home"]);

        let matrix = fx.access_service.permission_matrix(&fx.admin_context()).await.unwrap();
        assert_eq!(keys(&matrix.navigation), vec!["home"]);
    }

    #[tokio::test]
    async fn override_on_unknown_item_is_not_found() {
        let fx = Fixture::new().await;
        let result = fx
            .navigation_service
            .set_organization_override(
                fx.organization_id,
                "ghost",
                NavigationOverridePayload { is_visible: true, is_enabled: true },
            )
            .await;
        assert!(matches!(result, Err(AppError::ResourceNotFound(_))));
    }
}
