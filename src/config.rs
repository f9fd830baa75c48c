use crate::llm::gemini::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Runtime configuration, read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: API_KEY_VARS.iter().find_map(|key| non_empty(*key)),
            model: non_empty("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_gemini_key_wins_over_generic_key() {
        let config = AppConfig::from_lookup(lookup(&[
            ("API_KEY", "generic"),
            ("GEMINI_API_KEY", "specific"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("specific"));

        let config = AppConfig::from_lookup(lookup(&[("API_KEY", "generic"), ("GEMINI_API_KEY", " ")]));
        assert_eq!(config.api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_BASE_URL", "http://localhost:8080"),
        ]));
        let gemini = config.gemini();
        assert_eq!(gemini.model, "gemini-2.5-pro");
        assert_eq!(gemini.base_url, "http://localhost:8080");
    }
}
