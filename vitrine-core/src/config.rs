//! Configuration management
//!
//! Settings live in `settings.json` inside the Vitrine directory:
//! ```json
//! {
//!   "apiUrl": "http://localhost:8080/api",
//!   "adminEmail": "admin@vitrine.local",
//!   "timeoutSecs": 30,
//!   "telemetry": { "serviceName": "vitrine-frontend", "console": false, "zipkinUrl": null }
//! }
//! ```
//! Keys the client does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@vitrine.local";
pub const DEFAULT_SERVICE_NAME: &str = "vitrine-frontend";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(default)]
    telemetry: TelemetrySettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TelemetrySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_name: Option<String>,
    #[serde(default)]
    console: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zipkin_url: Option<String>,
}

/// Span export settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Print finished spans on stderr
    pub console: bool,
    /// Zipkin v2 collector endpoint, e.g. `http://localhost:9411/api/v2/spans`
    pub zipkin_url: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            console: false,
            zipkin_url: None,
        }
    }
}

/// Vitrine configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Login with this address lands on the admin dashboard
    pub admin_email: String,
    pub timeout_secs: u64,
    pub telemetry: TelemetryConfig,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            telemetry: TelemetryConfig::default(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok().as_deref() {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load config from the Vitrine directory
    ///
    /// Environment overrides (for CI/testing):
    /// `VITRINE_API_URL`, `VITRINE_ADMIN_EMAIL`, `VITRINE_ZIPKIN_URL`,
    /// `VITRINE_CONSOLE_SPANS`.
    pub fn load(vitrine_dir: &Path) -> Result<Self> {
        let settings_path = vitrine_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Invalid {}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        let config = Self {
            api_url: env_string("VITRINE_API_URL")
                .or_else(|| raw.api_url.clone())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            admin_email: env_string("VITRINE_ADMIN_EMAIL")
                .or_else(|| raw.admin_email.clone())
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            timeout_secs: raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            telemetry: TelemetryConfig {
                service_name: raw
                    .telemetry
                    .service_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
                console: env_flag("VITRINE_CONSOLE_SPANS").unwrap_or(raw.telemetry.console),
                zipkin_url: env_string("VITRINE_ZIPKIN_URL")
                    .or_else(|| raw.telemetry.zipkin_url.clone()),
            },
            _raw_settings: raw,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to the Vitrine directory
    /// Preserves other settings that the client doesn't manage
    pub fn save(&self, vitrine_dir: &Path) -> Result<()> {
        let settings_path = vitrine_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.api_url = Some(self.api_url.clone());
        settings.admin_email = Some(self.admin_email.clone());
        settings.timeout_secs = Some(self.timeout_secs);
        settings.telemetry.service_name = Some(self.telemetry.service_name.clone());
        settings.telemetry.console = self.telemetry.console;
        settings.telemetry.zipkin_url = self.telemetry.zipkin_url.clone();

        std::fs::create_dir_all(vitrine_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API URL must use http or https: {}",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeoutSecs must be greater than zero".to_string()));
        }
        if self.telemetry.service_name.trim().is_empty() {
            return Err(Error::Config("telemetry.serviceName cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Env overrides are process-global; these tests only use settings files
    // and never set VITRINE_* variables.

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        if std::env::var("VITRINE_API_URL").is_err() {
            assert_eq!(config.api_url, DEFAULT_API_URL);
        }
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.telemetry.service_name, DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn test_reads_camel_case_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"timeoutSecs": 5, "telemetry": {"serviceName": "shop-ui"}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.telemetry.service_name, "shop-ui");
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme": "dark", "timeoutSecs": 10}"#).unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.timeout_secs = 12;
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["timeoutSecs"], 12);
    }

    #[test]
    fn test_invalid_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"timeoutSecs": 0}"#).unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));

        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_api_url() {
        let mut config = Config::default();
        config.api_url = "ftp://example.com/api".to_string();
        assert!(config.validate().is_err());

        config.api_url = "https://shop.example.com/api".to_string();
        assert!(config.validate().is_ok());
    }
}
