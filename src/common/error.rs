use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::models::entitlement::ResourceKind;

// Erro interno único. Decisões de acesso negadas NÃO viram erro (são `false`);
// só escritas e entradas estruturalmente inválidas chegam aqui.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Quota excedida para {resource}: {current_count}/{limit}")]
    QuotaExceeded {
        resource: ResourceKind,
        current_count: i64,
        limit: i64,
    },

    #[error("Token inválido")]
    InvalidToken,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que de fato sai pela API (status + mensagem traduzida + detalhes)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Converte para a resposta HTTP, com a mensagem no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(lang, "errors.validation"),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::InvalidInput(reason) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: i18n.translate(lang, "errors.invalid_input"),
                details: Some(json!({ "reason": reason })),
            },
            AppError::ResourceNotFound(what) => ApiError {
                status: StatusCode::NOT_FOUND,
                error: i18n.translate_with(lang, "errors.not_found", &[("entity", what.clone())]),
                details: Some(json!({ "resource": what })),
            },
            AppError::Forbidden(reason) => ApiError {
                status: StatusCode::FORBIDDEN,
                error: i18n.translate(lang, "errors.forbidden"),
                details: Some(json!({ "reason": reason })),
            },
            AppError::QuotaExceeded { resource, current_count, limit } => ApiError {
                status: StatusCode::FORBIDDEN,
                error: i18n.translate_with(
                    lang,
                    "errors.quota_exceeded",
                    &[
                        ("resource", resource.to_string()),
                        ("current", current_count.to_string()),
                        ("limit", limit.to_string()),
                    ],
                ),
                details: Some(json!({
                    "resource": resource,
                    "currentCount": current_count,
                    "limit": limit,
                })),
            },
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                i18n.translate(lang, "errors.invalid_token"),
            ),
            AppError::UniqueConstraintViolation(what) => ApiError {
                status: StatusCode::CONFLICT,
                error: i18n.translate(lang, "errors.conflict"),
                details: Some(json!({ "reason": what })),
            },

            // Todos os outros erros (DatabaseError, InternalServerError, JwtError) viram 500.
            // O detalhe vai só para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    i18n.translate(lang, "errors.internal"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().expect("locales embutidos")
    }

    #[test]
    fn quota_exceeded_carries_counts() {
        let err = AppError::QuotaExceeded {
            resource: ResourceKind::Units,
            current_count: 10,
            limit: 10,
        };
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        let details = api.details.expect("detalhes");
        assert_eq!(details["currentCount"], 10);
        assert_eq!(details["limit"], 10);
        assert_eq!(details["resource"], "units");
        assert!(api.error.contains("10"));
    }

    #[test]
    fn status_mapping() {
        let s = store();
        let en = Locale("en".into());
        assert_eq!(AppError::ResourceNotFound("x".into()).to_api_error(&en, &s).status, StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("x".into()).to_api_error(&en, &s).status, StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidInput("x".into()).to_api_error(&en, &s).status, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.to_api_error(&en, &s).status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).to_api_error(&en, &s).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
