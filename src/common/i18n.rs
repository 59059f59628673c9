// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário (não dependem do diretório de execução)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas, indexadas por idioma e chave.
#[derive(Clone, Debug)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Idioma pedido -> inglês -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|messages| messages.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        args.iter().fold(self.translate(lang, key), |message, (name, value)| {
            message.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("pt", "errors.forbidden"), "Você não tem permissão para realizar esta ação.");
        assert_eq!(store.translate("fr", "errors.forbidden"), "You do not have permission to perform this action.");
        assert_eq!(store.translate("en", "errors.unknown_key"), "errors.unknown_key");
    }

    #[test]
    fn interpolates_arguments() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate_with(
            "en",
            "errors.quota_exceeded",
            &[("limit", "10".into()), ("resource", "units".into()), ("current", "10".into())],
        );
        assert_eq!(msg, "Your plan allows 10 units; you already have 10.");
    }

    #[test]
    fn every_language_has_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let en = &store.catalogs["en"];
        for (lang, messages) in store.catalogs.iter() {
            for key in en.keys() {
                assert!(messages.contains_key(key), "'{}' sem a chave {}", lang, key);
            }
        }
    }
}
