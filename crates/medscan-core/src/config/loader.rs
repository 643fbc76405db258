//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.medscan.toml` in the working directory or the
//! user config directory.

use super::types::MedscanConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("No API key configured; set GOOGLE_API_KEY or llm.api_key")]
    MissingApiKey,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.medscan.toml`
/// 2. User-level `~/.config/medscan/config.toml`
/// 3. Default configuration
///
/// Environment overrides are applied on top of whichever source wins.
pub fn load_config(project_dir: &Path) -> Result<MedscanConfig, ConfigError> {
    let project_config = project_dir.join(".medscan.toml");
    if project_config.exists() {
        return load_config_from(&project_config);
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return load_config_from(&user_config);
        }
    }

    apply_env_overrides(MedscanConfig::default(), env_lookup)
}

/// User config file location
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("medscan").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_config_from(path: &Path) -> Result<MedscanConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: MedscanConfig = toml::from_str(&content)?;

    expand_env_vars(&mut config);

    apply_env_overrides(config, env_lookup)
}

/// Reject configurations the server cannot start with
pub fn validate(config: &MedscanConfig) -> Result<(), ConfigError> {
    if !config.has_api_key() {
        return Err(ConfigError::MissingApiKey);
    }
    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::InvalidValue {
            key: "server.max_upload_bytes".to_string(),
            value: "0".to_string(),
        });
    }
    Ok(())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_regex() -> &'static Regex {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

/// Expand ${VAR} patterns in string values
fn expand_env_vars(config: &mut MedscanConfig) {
    let regex = env_regex();

    if let Some(ref api_key) = config.llm.api_key {
        config.llm.api_key = Some(expand_string(api_key, regex));
    }
    config.llm.base_url = expand_string(&config.llm.base_url, regex);
    if let Some(ref url) = config.alerts.webhook_url {
        config.alerts.webhook_url = Some(expand_string(url, regex));
    }
}

/// Expand environment variables in a single string
fn expand_string(s: &str, regex: &Regex) -> String {
    regex
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

/// Apply environment variable overrides
///
/// - GOOGLE_API_KEY / GEMINI_API_KEY -> llm.api_key
/// - MEDSCAN_PORT -> server.port
/// - MEDSCAN_ALERT_WEBHOOK -> alerts.webhook_url
fn apply_env_overrides(
    mut config: MedscanConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<MedscanConfig, ConfigError> {
    for env_var in ["GOOGLE_API_KEY", "GEMINI_API_KEY"] {
        if let Some(key) = lookup(env_var) {
            config.llm.api_key = Some(key);
            break;
        }
    }

    if let Some(port) = lookup("MEDSCAN_PORT") {
        config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
            key: "MEDSCAN_PORT".to_string(),
            value: port.clone(),
        })?;
    }

    if let Some(url) = lookup("MEDSCAN_ALERT_WEBHOOK") {
        config.alerts.webhook_url = Some(url);
    }

    Ok(config)
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# medscan configuration
# Place this file in the working directory as .medscan.toml
# or in ~/.config/medscan/config.toml for global settings

[server]
host = "0.0.0.0"
port = 8000
# Largest accepted upload in bytes
max_upload_bytes = 10485760

[llm]
api_key = "${GOOGLE_API_KEY}"
base_url = "https://generativelanguage.googleapis.com"
extraction_model = "gemini-2.5-flash"
chat_model = "gemini-2.5-flash"
# Request timeout in seconds
timeout = 120

[alerts]
# POSTs {"to": ..., "message": ...}; leave unset to log alerts only
# webhook_url = "https://sms-gateway.example/send"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_expand_env_var() {
        std::env::set_var("MEDSCAN_TEST_EXPAND_VAR", "test_value");
        let result = expand_string("prefix_${MEDSCAN_TEST_EXPAND_VAR}_suffix", env_regex());
        assert_eq!(result, "prefix_test_value_suffix");
        std::env::remove_var("MEDSCAN_TEST_EXPAND_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let result = expand_string("${MEDSCAN_NONEXISTENT_VAR}", env_regex());
        assert_eq!(result, "${MEDSCAN_NONEXISTENT_VAR}");
    }

    #[test]
    fn test_google_key_wins_over_gemini_key() {
        let config = apply_env_overrides(
            MedscanConfig::default(),
            lookup_from(&[("GOOGLE_API_KEY", "g"), ("GEMINI_API_KEY", "m")]),
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("g"));
    }

    #[test]
    fn test_gemini_key_fallback() {
        let config = apply_env_overrides(
            MedscanConfig::default(),
            lookup_from(&[("GEMINI_API_KEY", "m")]),
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("m"));
    }

    #[test]
    fn test_port_override() {
        let config = apply_env_overrides(
            MedscanConfig::default(),
            lookup_from(&[("MEDSCAN_PORT", "9001")]),
        )
        .unwrap();
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn test_bad_port_override() {
        let result = apply_env_overrides(
            MedscanConfig::default(),
            lookup_from(&[("MEDSCAN_PORT", "eighty")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_requires_key() {
        let config = MedscanConfig::default();
        assert!(matches!(validate(&config), Err(ConfigError::MissingApiKey)));

        let mut config = MedscanConfig::default();
        config.llm.api_key = Some("k".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".medscan.toml");
        std::fs::write(
            &path,
            r#"
[llm]
api_key = "from-file"
chat_model = "gemini-2.0-flash"

[alerts]
webhook_url = "http://localhost:7000/sms"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.llm.chat_model, "gemini-2.0-flash");
        assert_eq!(config.llm.extraction_model, "gemini-2.5-flash");
        assert_eq!(
            config.alerts.webhook_url.as_deref(),
            Some("http://localhost:7000/sms")
        );
        assert!(config.has_api_key());
    }

    #[test]
    fn test_sample_config_parses() {
        let config: MedscanConfig = toml::from_str(sample_config()).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.api_key.as_deref(), Some("${GOOGLE_API_KEY}"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
