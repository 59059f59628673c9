// src/config.rs

use std::{collections::HashSet, env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{
        store::{ButtonStore, EntitlementStore, NavigationStore, ProfileStore, UsageStore},
        ButtonRepository, EntitlementRepository, NavigationRepository, ProfileRepository, UsageRepository,
    },
    models::permission::CapabilitySet,
    services::{
        access_service::AccessService, auth::AuthService, button_service::ButtonService,
        feature_service::FeatureService, navigation_service::NavigationService,
        permission_service::PermissionService, profile_service::ProfileService, quota_service::QuotaService,
    },
};

/// O que fazer quando o usuário é membro da organização mas não tem perfil.
/// Aplicado igualmente em todas as decisões.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoProfileFallback {
    /// Nenhum acesso.
    #[default]
    Deny,
    /// Só leitura de objetos (nunca view-all, ações nomeadas ou campos sensíveis).
    ReadOnly,
}

impl NoProfileFallback {
    pub fn object_capabilities(&self) -> CapabilitySet {
        match self {
            NoProfileFallback::Deny => CapabilitySet::NONE,
            NoProfileFallback::ReadOnly => CapabilitySet::READ_ONLY,
        }
    }
}

impl FromStr for NoProfileFallback {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(NoProfileFallback::Deny),
            "read_only" | "readonly" => Ok(NoProfileFallback::ReadOnly),
            other => Err(AppError::InvalidInput(format!("NO_PROFILE_FALLBACK inválido: '{}'", other))),
        }
    }
}

/// `PLATFORM_ADMIN_IDS`: UUIDs separados por vírgula. Vazio = ninguém.
pub fn parse_platform_admins(raw: &str) -> Result<HashSet<Uuid>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|_| AppError::InvalidInput(format!("PLATFORM_ADMIN_IDS contém um UUID inválido: '{}'", id)))
        })
        .collect()
}

// Configurações lidas do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub no_profile_fallback: NoProfileFallback,
    pub platform_admins: HashSet<Uuid>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };

        let no_profile_fallback = match env::var("NO_PROFILE_FALLBACK") {
            Ok(raw) => raw.parse().map_err(|e: AppError| anyhow::anyhow!(e.to_string()))?,
            Err(_) => NoProfileFallback::default(),
        };

        let platform_admins = match env::var("PLATFORM_ADMIN_IDS") {
            Ok(raw) => parse_platform_admins(&raw).map_err(|e| anyhow::anyhow!(e.to_string()))?,
            Err(_) => HashSet::new(),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            no_profile_fallback,
            platform_admins,
        })
    }
}

/// Os stores por trás dos serviços. Postgres em produção, memória nos testes.
pub struct Stores {
    pub profiles: Arc<dyn ProfileStore>,
    pub buttons: Arc<dyn ButtonStore>,
    pub navigation: Arc<dyn NavigationStore>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub usage: Arc<dyn UsageStore>,
}

impl Stores {
    pub fn postgres(db_pool: &PgPool) -> Self {
        Self {
            profiles: Arc::new(ProfileRepository::new(db_pool.clone())),
            buttons: Arc::new(ButtonRepository::new(db_pool.clone())),
            navigation: Arc::new(NavigationRepository::new(db_pool.clone())),
            entitlements: Arc::new(EntitlementRepository::new(db_pool.clone())),
            usage: Arc::new(UsageRepository::new(db_pool.clone())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub permission_service: PermissionService,
    pub feature_service: FeatureService,
    pub quota_service: QuotaService,
    pub button_service: ButtonService,
    pub navigation_service: NavigationService,
    pub access_service: AccessService,
    pub profile_service: ProfileService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = I18nStore::load()?;
        let stores = Stores::postgres(&db_pool);

        Ok(Self::from_parts(db_pool, settings, i18n_store, stores))
    }

    /// Monta o gráfico de dependências sobre os stores recebidos.
    pub fn from_parts(db_pool: PgPool, settings: Settings, i18n_store: I18nStore, stores: Stores) -> Self {
        let auth_service = AuthService::new(settings.jwt_secret.clone());
        let permission_service = PermissionService::new(stores.profiles.clone(), settings.no_profile_fallback);
        let feature_service = FeatureService::new(stores.entitlements);
        let quota_service = QuotaService::new(feature_service.clone(), stores.usage);
        let button_service = ButtonService::new(stores.buttons, permission_service.clone());
        let navigation_service =
            NavigationService::new(stores.navigation, permission_service.clone(), feature_service.clone());
        let access_service = AccessService::new(
            stores.profiles.clone(),
            permission_service.clone(),
            feature_service.clone(),
            button_service.clone(),
            navigation_service.clone(),
        )
        .with_platform_admins(settings.platform_admins.clone());
        let profile_service =
            ProfileService::new(stores.profiles, permission_service.clone(), button_service.clone());

        tracing::info!("Fallback para membros sem perfil: {:?}", settings.no_profile_fallback);
        tracing::info!("{} administrador(es) de plataforma configurado(s)", settings.platform_admins.len());

        Self {
            db_pool,
            settings,
            i18n_store,
            auth_service,
            permission_service,
            feature_service,
            quota_service,
            button_service,
            navigation_service,
            access_service,
            profile_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_parsing() {
        assert_eq!("deny".parse::<NoProfileFallback>().unwrap(), NoProfileFallback::Deny);
        assert_eq!("READ_ONLY".parse::<NoProfileFallback>().unwrap(), NoProfileFallback::ReadOnly);
        assert!("allow_all".parse::<NoProfileFallback>().is_err());
    }

    #[test]
    fn platform_admin_ids_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(parse_platform_admins(&format!(" {} , ", id)).unwrap(), HashSet::from([id]));
        assert!(parse_platform_admins("").unwrap().is_empty());
        assert!(matches!(parse_platform_admins("admin"), Err(AppError::InvalidInput(_))));
    }
}
