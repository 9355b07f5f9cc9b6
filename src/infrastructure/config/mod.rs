//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Environment variables with this prefix become settings
const SETTINGS_ENV_PREFIX: &str = "SM_";

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub logging: LoggingConfig,
    pub plugins: PluginConfig,
    pub settings: Settings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    /// Names of plugins that should not be loaded
    pub disabled: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "machine".to_string(),
            id: "UMACHINE".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Plugin settings. Keys are case-insensitive and stored upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(key.as_ref().to_uppercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_uppercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
        let mut settings = Settings::new();
        for (key, value) in raw {
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Null => String::new(),
                other => serde_yaml::to_string(&other)
                    .map_err(serde::de::Error::custom)?
                    .trim_end()
                    .to_string(),
            };
            settings.insert(key, value);
        }
        Ok(settings)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Settings::new();
        for (key, value) in iter {
            settings.insert(key, value);
        }
        settings
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env(std::env::vars());
        config
    }

    /// Apply overrides from `vars`: `BOT_NAME`, `BOT_ID`, `LOGLEVEL`, and
    /// `SM_<NAME>` for setting `<NAME>`
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "BOT_NAME" => self.bot.name = value,
                "BOT_ID" => self.bot.id = value,
                "LOGLEVEL" => self.logging.level = value.to_lowercase(),
                _ => {
                    if let Some(name) = key.strip_prefix(SETTINGS_ENV_PREFIX) {
                        if !name.is_empty() {
                            self.settings.insert(name, value);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bot.name, "machine");
        assert_eq!(config.logging.level, "info");
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("bot:\n  name: robbie\n").unwrap();
        assert_eq!(config.bot.name, "robbie");
        assert_eq!(config.bot.id, "UMACHINE");
        assert!(config.plugins.disabled.is_empty());
    }

    #[test]
    fn test_settings_case_insensitive() {
        let yaml = "settings:\n  echo_prefix: \">> \"\n  RETRIES: 3\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.settings.get("ECHO_PREFIX"), Some(">> "));
        assert_eq!(config.settings.get("Echo_Prefix"), Some(">> "));
        assert_eq!(config.settings.get("retries"), Some("3"));
        assert!(!config.settings.contains("missing"));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config.apply_env(vec![
            ("BOT_NAME".to_string(), "robbie".to_string()),
            ("LOGLEVEL".to_string(), "DEBUG".to_string()),
            ("SM_API_TOKEN".to_string(), "secret".to_string()),
            ("SM_".to_string(), "ignored".to_string()),
            ("PATH".to_string(), "/bin".to_string()),
        ]);
        assert_eq!(config.bot.name, "robbie");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.settings.get("api_token"), Some("secret"));
        assert_eq!(config.settings.len(), 1);
    }

    #[test]
    fn test_disabled_plugins() {
        let config = Config::from_yaml("plugins:\n  disabled: [EchoPlugin]\n").unwrap();
        assert_eq!(config.plugins.disabled, vec!["EchoPlugin"]);
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = Config::default().to_yaml().unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.bot.name, "machine");
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(Config::from_yaml("bot: [unclosed"), Err(ConfigError::Parse(_))));
    }
}
