use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::coach::gemini::GeminiConfig;
use crate::locale::Language;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub language: Language,
    pub gemini:   Option<GeminiConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = config_dir().join("config.toml");
        let mut cfg: AppConfig = if path.exists() {
            toml::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    /// `GEMINI_API_KEY` (or `API_KEY`) enables the coach without a config file.
    fn apply_env(&mut self) {
        let key = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")).ok();
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.gemini.get_or_insert_with(GeminiConfig::default).api_key = key;
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("habit-inception")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
            language = "fa"

            [gemini]
            api_key = "k"
            model   = "gemini-2.0-flash"
            "#,
        ).unwrap();
        assert_eq!(cfg.language, Language::Fa);
        let g = cfg.gemini.unwrap();
        assert_eq!(g.api_key, "k");
        assert_eq!(g.model, "gemini-2.0-flash");
        assert_eq!(g.timeout_seconds, 30);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.language, Language::En);
        assert!(cfg.gemini.is_none());
    }
}
