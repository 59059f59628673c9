// src/models/permission.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// =============================================================================
//  ENUMS FECHADOS (mapeiam os CREATE TYPE do banco)
// =============================================================================

/// Tipos de objeto sujeitos a permissão. Conjunto fechado: um tipo novo
/// entra aqui e no `CREATE TYPE object_type` da migração.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "object_type", rename_all = "snake_case")]
pub enum ObjectType {
    Property,
    Unit,
    Tenant,
    Owner,
    Lease,
    Payment,
    Invoice,
    Expense,
    Task,
    Message,
    Document,
    JournalEntry,
    User,
    Organization,
    Report,
    Activity,
    Profile,
}

impl ObjectType {
    pub const ALL: [ObjectType; 17] = [
        ObjectType::Property,
        ObjectType::Unit,
        ObjectType::Tenant,
        ObjectType::Owner,
        ObjectType::Lease,
        ObjectType::Payment,
        ObjectType::Invoice,
        ObjectType::Expense,
        ObjectType::Task,
        ObjectType::Message,
        ObjectType::Document,
        ObjectType::JournalEntry,
        ObjectType::User,
        ObjectType::Organization,
        ObjectType::Report,
        ObjectType::Activity,
        ObjectType::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Property => "property",
            ObjectType::Unit => "unit",
            ObjectType::Tenant => "tenant",
            ObjectType::Owner => "owner",
            ObjectType::Lease => "lease",
            ObjectType::Payment => "payment",
            ObjectType::Invoice => "invoice",
            ObjectType::Expense => "expense",
            ObjectType::Task => "task",
            ObjectType::Message => "message",
            ObjectType::Document => "document",
            ObjectType::JournalEntry => "journal_entry",
            ObjectType::User => "user",
            ObjectType::Organization => "organization",
            ObjectType::Report => "report",
            ObjectType::Activity => "activity",
            ObjectType::Profile => "profile",
        }
    }
}

// Aceita "JournalEntry", "journal_entry" e "journal-entry".
fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-' && *c != ' ')
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for ObjectType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_token(s);
        ObjectType::ALL
            .into_iter()
            .find(|t| normalize_token(t.as_str()) == wanted)
            .ok_or_else(|| AppError::InvalidInput(format!("Tipo de objeto desconhecido: '{}'", s)))
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbo canônico de uma ação sobre um objeto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "object_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ObjectAction {
    Create,
    Read,
    Edit,
    Delete,
    ViewAll,
}

impl ObjectAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAction::Create => "create",
            ObjectAction::Read => "read",
            ObjectAction::Edit => "edit",
            ObjectAction::Delete => "delete",
            ObjectAction::ViewAll => "view_all",
        }
    }
}

impl FromStr for ObjectAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "create" => Ok(ObjectAction::Create),
            "read" | "view" => Ok(ObjectAction::Read),
            "edit" | "update" => Ok(ObjectAction::Edit),
            "delete" => Ok(ObjectAction::Delete),
            "viewall" => Ok(ObjectAction::ViewAll),
            _ => Err(AppError::InvalidInput(format!("Ação desconhecida: '{}'", s))),
        }
    }
}

impl fmt::Display for ObjectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rótulo derivado de um conjunto de capacidades. Nunca é a fonte da verdade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "access_level", rename_all = "snake_case")]
pub enum AccessLevel {
    None,
    Read,
    ReadWrite,
    All,
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "none" => Ok(AccessLevel::None),
            "read" => Ok(AccessLevel::Read),
            "readwrite" => Ok(AccessLevel::ReadWrite),
            "all" => Ok(AccessLevel::All),
            _ => Err(AppError::InvalidInput(format!("Nível de acesso desconhecido: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "field_access_level", rename_all = "snake_case")]
pub enum FieldAccessLevel {
    None,
    Read,
    ReadWrite,
}

// =============================================================================
//  CONJUNTO DE CAPACIDADES
// =============================================================================

/// Os cinco booleanos que decidem o acesso a um tipo de objeto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    pub can_create: bool,
    pub can_read: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_all: bool,
}

impl CapabilitySet {
    pub const NONE: CapabilitySet = CapabilitySet {
        can_create: false,
        can_read: false,
        can_edit: false,
        can_delete: false,
        can_view_all: false,
    };

    pub const READ_ONLY: CapabilitySet = CapabilitySet {
        can_create: false,
        can_read: true,
        can_edit: false,
        can_delete: false,
        can_view_all: false,
    };

    /// Expande um rótulo para os booleanos que ele representa.
    pub fn from_level(level: AccessLevel) -> Self {
        match level {
            AccessLevel::None => Self::NONE,
            AccessLevel::Read => Self::READ_ONLY,
            AccessLevel::ReadWrite => CapabilitySet {
                can_create: true,
                can_read: true,
                can_edit: true,
                can_delete: false,
                can_view_all: false,
            },
            AccessLevel::All => CapabilitySet {
                can_create: true,
                can_read: true,
                can_edit: true,
                can_delete: true,
                can_view_all: true,
            },
        }
    }

    pub fn allows(&self, action: ObjectAction) -> bool {
        match action {
            ObjectAction::Create => self.can_create,
            ObjectAction::Read => self.can_read,
            ObjectAction::Edit => self.can_edit,
            ObjectAction::Delete => self.can_delete,
            ObjectAction::ViewAll => self.can_view_all,
        }
    }

    /// Derivação do rótulo. Pura e total: chamada a cada alteração de booleano.
    pub fn access_level(&self) -> AccessLevel {
        let CapabilitySet { can_create, can_read, can_edit, can_delete, can_view_all } = *self;

        match (can_create, can_read, can_edit, can_delete) {
            (false, false, false, false) => AccessLevel::None,
            (false, true, false, false) => AccessLevel::Read,
            (true, true, true, false) if !can_view_all => AccessLevel::ReadWrite,
            (true, true, true, true) if can_view_all => AccessLevel::All,
            // Combinação "personalizada"
            _ => AccessLevel::ReadWrite,
        }
    }

    /// `canViewAll` e `canDelete` não fazem sentido sem `canRead`.
    pub fn validate_combination(&self) -> Result<(), AppError> {
        if !self.can_read && self.can_view_all {
            return Err(AppError::InvalidInput("canViewAll exige canRead".into()));
        }
        if !self.can_read && self.can_delete {
            return Err(AppError::InvalidInput("canDelete exige canRead".into()));
        }
        Ok(())
    }
}

// =============================================================================
//  PERMISSÃO DE OBJETO
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPermission {
    pub profile_id: Uuid,
    pub object_type: ObjectType,
    pub access_level: AccessLevel,
    pub can_create: bool,
    pub can_read: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_all: bool,
    pub updated_at: DateTime<Utc>,
}

impl ObjectPermission {
    /// Monta a linha já com o rótulo coerente com os booleanos.
    pub fn from_capabilities(profile_id: Uuid, object_type: ObjectType, caps: CapabilitySet) -> Self {
        Self {
            profile_id,
            object_type,
            access_level: caps.access_level(),
            can_create: caps.can_create,
            can_read: caps.can_read,
            can_edit: caps.can_edit,
            can_delete: caps.can_delete,
            can_view_all: caps.can_view_all,
            updated_at: Utc::now(),
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet {
            can_create: self.can_create,
            can_read: self.can_read,
            can_edit: self.can_edit,
            can_delete: self.can_delete,
            can_view_all: self.can_view_all,
        }
    }
}

/// Payload de escrita. Aceita os booleanos ou apenas o `accessLevel`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPermissionInput {
    #[schema(example = "Tenant")]
    pub object_type: String,

    #[schema(example = "ReadWrite")]
    pub access_level: Option<String>,

    pub can_create: Option<bool>,
    pub can_read: Option<bool>,
    pub can_edit: Option<bool>,
    pub can_delete: Option<bool>,
    pub can_view_all: Option<bool>,
}

impl ObjectPermissionInput {
    fn has_booleans(&self) -> bool {
        self.can_create.is_some()
            || self.can_read.is_some()
            || self.can_edit.is_some()
            || self.can_delete.is_some()
            || self.can_view_all.is_some()
    }

    /// Converte o payload em (tipo, capacidades) validando a combinação.
    pub fn resolve(&self) -> Result<(ObjectType, CapabilitySet), AppError> {
        let object_type: ObjectType = self.object_type.parse()?;
        let level = self.access_level.as_deref().map(str::parse::<AccessLevel>).transpose()?;

        let caps = if self.has_booleans() {
            let caps = CapabilitySet {
                can_create: self.can_create.unwrap_or(false),
                can_read: self.can_read.unwrap_or(false),
                can_edit: self.can_edit.unwrap_or(false),
                can_delete: self.can_delete.unwrap_or(false),
                can_view_all: self.can_view_all.unwrap_or(false),
            };
            if let Some(level) = level {
                if caps.access_level() != level {
                    return Err(AppError::InvalidInput(format!(
                        "accessLevel {:?} não corresponde às permissões informadas para {}",
                        level, object_type
                    )));
                }
            }
            caps
        } else {
            let level = level.ok_or_else(|| {
                AppError::InvalidInput(format!("Informe accessLevel ou as permissões para {}", object_type))
            })?;
            CapabilitySet::from_level(level)
        };

        caps.validate_combination()?;
        Ok((object_type, caps))
    }
}

// =============================================================================
//  PERMISSÃO DE CAMPO
// =============================================================================

/// Catálogo de campos. `is_sensitive` define o padrão quando não há linha.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub object_type: ObjectType,
    pub field_name: String,
    pub label: Option<String>,
    pub is_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldPermission {
    pub profile_id: Uuid,
    pub object_type: ObjectType,
    pub field_name: String,
    pub access_level: FieldAccessLevel,
    pub can_read: bool,
    pub can_edit: bool,
    pub updated_at: DateTime<Utc>,
}

/// Resultado da resolução de um campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldCapability {
    pub access_level: FieldAccessLevel,
    pub can_read: bool,
    pub can_edit: bool,
}

impl FieldCapability {
    pub const NONE: FieldCapability = FieldCapability {
        access_level: FieldAccessLevel::None,
        can_read: false,
        can_edit: false,
    };

    pub const READ: FieldCapability = FieldCapability {
        access_level: FieldAccessLevel::Read,
        can_read: true,
        can_edit: false,
    };

    pub fn new(can_read: bool, can_edit: bool) -> Result<Self, AppError> {
        let access_level = match (can_read, can_edit) {
            (false, false) => FieldAccessLevel::None,
            (true, false) => FieldAccessLevel::Read,
            (true, true) => FieldAccessLevel::ReadWrite,
            (false, true) => return Err(AppError::InvalidInput("canEdit exige canRead no campo".into())),
        };
        Ok(Self { access_level, can_read, can_edit })
    }
}

impl From<&FieldPermission> for FieldCapability {
    fn from(row: &FieldPermission) -> Self {
        Self {
            access_level: row.access_level,
            can_read: row.can_read,
            can_edit: row.can_edit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldPermissionInput {
    #[schema(example = "Tenant")]
    pub object_type: String,

    #[validate(length(min = 1, max = 128, message = "required"))]
    #[schema(example = "bank_account")]
    pub field_name: String,

    #[serde(default)]
    pub can_read: bool,

    #[serde(default)]
    pub can_edit: bool,
}

// =============================================================================
//  PERMISSÕES NOMEADAS ("ação livre", fora do CRUD de objeto)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionPermission {
    #[schema(example = "reports:export")]
    pub name: String,

    // Coluna anulável no catálogo
    #[schema(example = "Exportar relatórios")]
    pub description: Option<String>,

    #[schema(example = "REPORTS")]
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileActionPermission {
    pub profile_id: Uuid,
    pub permission_name: String,
    pub is_granted: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionPermissionInput {
    #[validate(length(min = 1, max = 128, message = "required"))]
    #[schema(example = "reports:export")]
    pub permission_name: String,

    pub is_granted: bool,
}
