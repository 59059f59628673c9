// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O que sai do banco (Tabela profiles)
// Perfis de sistema são globais (organization_id nulo) e não podem ser apagados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub organization_id: Option<Uuid>,

    #[schema(example = "viewer")]
    pub name: String,

    #[schema(example = "Visualizador")]
    pub display_name: String,

    pub description: Option<String>,

    pub is_system_profile: bool,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Liga um usuário (do provedor de identidade) a uma organização.
// profile_id nulo = membro sem perfil (cai na política de fallback).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfilePayload {
    #[validate(length(min = 2, max = 64, message = "O nome deve ter entre 2 e 64 caracteres"))]
    #[schema(example = "accountant")]
    pub name: String,

    #[validate(length(min = 1, max = 128, message = "required"))]
    #[schema(example = "Contador")]
    pub display_name: String,

    #[schema(example = "Acesso aos lançamentos e relatórios financeiros")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignProfilePayload {
    pub user_id: Uuid,

    // None remove o perfil do membro
    pub profile_id: Option<Uuid>,
}
