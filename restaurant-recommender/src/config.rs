use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RecommendError, Result};
use crate::gateway::{DEFAULT_API_KEY_VAR, GatewayConfig};

pub const DEFAULT_DATASET_PATH: &str = "data/sample_restaurants.csv";
pub const DEFAULT_PORT: u16 = 3000;

/// Runtime settings shared by the service and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    pub gateway: GatewayConfig,
    pub dataset_path: PathBuf,
    pub api_key: Option<String>,
    pub port: u16,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            api_key: None,
            port: DEFAULT_PORT,
        }
    }
}

impl RecommenderConfig {
    /// Read `GROQ_API_KEY`, `GROQ_MODEL`, `GROQ_BASE_URL`, `GROQ_TEMPERATURE`,
    /// `LLM_TIMEOUT_SECS`, `DATASET_PATH` and `PORT`; unset or blank variables
    /// keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(model) = get("GROQ_MODEL") {
            config.gateway.model = model;
        }
        if let Some(base_url) = get("GROQ_BASE_URL") {
            config.gateway.base_url = base_url;
        }
        if let Some(temperature) = get("GROQ_TEMPERATURE") {
            let temperature: f32 = parse_number("GROQ_TEMPERATURE", &temperature)?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(RecommendError::Config(format!(
                    "GROQ_TEMPERATURE must be between 0 and 2, got {temperature}"
                )));
            }
            config.gateway.temperature = temperature;
        }
        if let Some(timeout) = get("LLM_TIMEOUT_SECS") {
            let secs: u64 = parse_number("LLM_TIMEOUT_SECS", &timeout)?;
            if secs == 0 {
                return Err(RecommendError::Config(
                    "LLM_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.gateway.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get("DATASET_PATH") {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(port) = get("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        config.api_key = get(DEFAULT_API_KEY_VAR);

        Ok(config)
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RecommendError::Config(format!("Invalid {name} value '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<RecommenderConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RecommenderConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, RecommenderConfig::default());
        assert_eq!(config.gateway.model, "llama-3.1-8b-instant");
        assert_eq!(config.gateway.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GROQ_API_KEY", "secret"),
            ("GROQ_MODEL", "llama-3.3-70b-versatile"),
            ("GROQ_BASE_URL", "http://localhost:9999/v1"),
            ("GROQ_TEMPERATURE", "0.2"),
            ("LLM_TIMEOUT_SECS", "5"),
            ("DATASET_PATH", "/tmp/zomato.csv"),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.gateway.model, "llama-3.3-70b-versatile");
        assert_eq!(
            config.gateway.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
        assert_eq!(config.gateway.temperature, 0.2);
        assert_eq!(config.gateway.timeout, Duration::from_secs(5));
        assert_eq!(config.dataset_path, PathBuf::from("/tmp/zomato.csv"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = config_from(&[("GROQ_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        for vars in [
            [("PORT", "eighty")],
            [("LLM_TIMEOUT_SECS", "0")],
            [("GROQ_TEMPERATURE", "hot")],
            [("GROQ_TEMPERATURE", "7.5")],
        ] {
            let err = config_from(&vars).unwrap_err();
            assert!(matches!(err, RecommendError::Config(_)), "{vars:?}");
        }
    }
}
