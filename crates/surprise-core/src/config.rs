use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::provider::Provider;
use crate::state::{Recipient, MAX_AGE, MIN_AGE};

pub const DEFAULT_NAME: &str = "Muskaan";
pub const DEFAULT_AGE: u32 = 24;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_age")]
    pub age: u32,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_age() -> u32 {
    DEFAULT_AGE
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            name: default_name(),
            age: default_age(),
            provider: Some(Provider::Gemini.as_str().to_string()),
            model: None,
            gemini_api_key: None,
            claude_api_key: None,
            openai_api_key: None,
            ollama_url: None,
        }
    }

    /// Load from the user config dir, then let environment API keys win.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_or_init(&Self::get_config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Like [`Config::load_from`], but on first run writes the defaults to
    /// `path` so there is something to edit. A failed write is only logged.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            match Self::new().save_to(path) {
                Ok(()) => tracing::info!(path = %path.display(), "wrote default config"),
                Err(e) => tracing::warn!(error = %e, "could not write default config"),
            }
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&config_content)?;
        config.check_age();
        Ok(config)
    }

    /// An age outside `MIN_AGE..=MAX_AGE` is replaced by the default.
    fn check_age(&mut self) {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            tracing::warn!(
                age = self.age,
                default = DEFAULT_AGE,
                "age out of range, using default"
            );
            self.age = DEFAULT_AGE;
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Override API keys from the environment. `API_KEY` is accepted for
    /// Gemini when `GEMINI_API_KEY` is unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.claude_api_key = Some(key);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
    }

    /// Configured provider, falling back to Gemini for unknown names.
    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or(Provider::Gemini)
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider().default_model().to_string())
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    pub fn recipient(&self) -> Recipient {
        Recipient::new(&self.name, self.age)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("surprise").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.recipient(), Recipient::new(DEFAULT_NAME, DEFAULT_AGE));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            name: "Asha".to_string(),
            age: 30,
            provider: Some("ollama".to_string()),
            model: Some("llama3.2:latest".to_string()),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider(), Provider::Ollama);
        assert_eq!(loaded.model(), "llama3.2:latest");
    }

    #[test]
    fn test_partial_file_fills_recipient_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider":"claude"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.age, DEFAULT_AGE);
        assert_eq!(config.provider(), Provider::Claude);
        assert_eq!(config.model(), Provider::Claude.default_model());
    }

    #[test]
    fn test_out_of_range_age_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        for age in ["0", "151", "4000000000"] {
            fs::write(&path, format!(r#"{{"name":"Asha","age":{}}}"#, age)).unwrap();
            let config = Config::load_from(&path).unwrap();
            assert_eq!(config.age, DEFAULT_AGE, "age {} was accepted", age);
            assert_eq!(config.name, "Asha");
        }

        fs::write(&path, r#"{"age":150}"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().age, 150);
        fs::write(&path, r#"{"age":1}"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().age, 1);
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surprise").join("config.json");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::new());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), Config::new());
    }

    #[test]
    fn test_first_run_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"name":"Asha","age":30}"#).unwrap();

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.recipient(), Recipient::new("Asha", 30));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"name":"Asha","age":30}"#);
    }

    #[test]
    fn test_first_run_write_failure_still_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the config directory should be.
        let blocker = dir.path().join("surprise");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("config.json");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::new());
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_keys_override_file() {
        let env: HashMap<&str, &str> = [
            ("API_KEY", "gemini-from-env"),
            ("ANTHROPIC_API_KEY", "claude-from-env"),
            ("OPENAI_API_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            openai_api_key: Some("openai-from-file".to_string()),
            ..Config::new()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.gemini_api_key.as_deref(), Some("gemini-from-env"));
        assert_eq!(config.claude_api_key.as_deref(), Some("claude-from-env"));
        assert_eq!(config.openai_api_key.as_deref(), Some("openai-from-file"));
    }

    #[test]
    fn test_unknown_provider_falls_back_to_gemini() {
        let config = Config {
            provider: Some("mistral".to_string()),
            ..Config::new()
        };
        assert_eq!(config.provider(), Provider::Gemini);
        assert_eq!(config.ollama_url(), DEFAULT_OLLAMA_URL);
    }
}
