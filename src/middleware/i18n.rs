// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

pub const DEFAULT_LANG: &str = "en";

// Extrator de idioma (Accept-Language -> "pt", "en", ...)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

/// "pt-BR,pt;q=0.9,en;q=0.8" -> "pt". Sem cabeçalho -> "en".
pub fn primary_language(header_value: Option<&str>) -> String {
    header_value
        .and_then(|header_str| {
            accept_language::parse(header_str)
                .first() // O idioma de maior peso (ex: "pt-BR")
                .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
        })
        .unwrap_or_else(|| DEFAULT_LANG.to_string())
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale(primary_language(header_value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_heaviest_language() {
        assert_eq!(primary_language(Some("pt-BR,pt;q=0.9,en;q=0.8")), "pt");
        assert_eq!(primary_language(Some("en;q=0.5, pt;q=0.9")), "pt");
        assert_eq!(primary_language(None), "en");
        assert_eq!(primary_language(Some("")), "en");
    }
}
