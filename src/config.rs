use crate::error::{OutreachError, Result};
use crate::structs::TemperatureUnit;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/forecast";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the forecast provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    /// Provider city query, e.g. "Minneapolis,us"
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub units: TemperatureUnit,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ProviderConfig {
    pub fn new(api_key: String, city: String) -> Self {
        Self {
            api_key,
            city,
            units: TemperatureUnit::default(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Checks that the settings are usable for a request
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(OutreachError::Config("provider api_key is missing".to_string()));
        }
        if self.city.trim().is_empty() {
            return Err(OutreachError::Config("provider city is missing".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(OutreachError::Config(
                "provider timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * `config_path` - path to the TOML configuration file
pub fn load_config(config_path: &Path) -> Result<Config> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses configuration from TOML text
pub fn parse_config(toml: &str) -> Result<Config> {
    let config: Config = toml::from_str(toml)?;
    Ok(config)
}

/// Combines an optional configuration file with command line overrides.
///
/// Overrides win over file values. Without a file, both `api_key` and `city`
/// must be given. The combined settings are validated before returning.
///
/// # Arguments
///
/// * `file` - configuration loaded from disk, if any
/// * `api_key` - API key override
/// * `city` - city override
/// * `units` - unit override
pub fn resolve_provider(
    file: Option<Config>,
    api_key: Option<String>,
    city: Option<String>,
    units: Option<TemperatureUnit>,
) -> Result<ProviderConfig> {
    let mut provider = match file {
        Some(config) => config.provider,
        None => ProviderConfig::new(String::new(), String::new()),
    };

    if let Some(key) = api_key {
        provider.api_key = key;
    }
    if let Some(city) = city {
        provider.city = city;
    }
    if let Some(units) = units {
        provider.units = units;
    }

    provider.validate()?;
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [provider]
        api_key = "secret"
        city = "Minneapolis,us"
        units = "imperial"
        base_url = "http://localhost:8080/forecast"
        timeout_secs = 5
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.provider.api_key, "secret");
        assert_eq!(config.provider.city, "Minneapolis,us");
        assert_eq!(config.provider.units, TemperatureUnit::Fahrenheit);
        assert_eq!(config.provider.base_url, "http://localhost:8080/forecast");
        assert_eq!(config.provider.timeout_secs, 5);
    }

    #[test]
    fn test_defaults_apply() {
        let config = parse_config("[provider]\napi_key = \"k\"\ncity = \"Duluth,us\"\n").unwrap();
        assert_eq!(config.provider.units, TemperatureUnit::Fahrenheit);
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_unit_names() {
        let config =
            parse_config("[provider]\napi_key = \"k\"\ncity = \"c\"\nunits = \"celsius\"\n").unwrap();
        assert_eq!(config.provider.units, TemperatureUnit::Celsius);
        let config =
            parse_config("[provider]\napi_key = \"k\"\ncity = \"c\"\nunits = \"standard\"\n").unwrap();
        assert_eq!(config.provider.units, TemperatureUnit::Kelvin);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_config("[provider\n").unwrap_err();
        assert!(matches!(err, OutreachError::Config(_)));
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let config = parse_config("[provider]\ncity = \"Minneapolis,us\"\n").unwrap();
        let err = resolve_provider(Some(config), None, None, None).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_overrides_win() {
        let config = parse_config(FULL).unwrap();
        let provider = resolve_provider(
            Some(config),
            Some("other".to_string()),
            Some("St Paul,us".to_string()),
            Some(TemperatureUnit::Celsius),
        )
        .unwrap();
        assert_eq!(provider.api_key, "other");
        assert_eq!(provider.city, "St Paul,us");
        assert_eq!(provider.units, TemperatureUnit::Celsius);
        assert_eq!(provider.timeout_secs, 5);
    }

    #[test]
    fn test_flags_alone_are_enough() {
        let provider = resolve_provider(
            None,
            Some("k".to_string()),
            Some("Minneapolis,us".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert!(resolve_provider(None, Some("k".to_string()), None, None).is_err());
    }
}
