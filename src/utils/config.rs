use crate::utils::errors::{Result, SheetTranslatorError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub translation: TranslationDefaults,
    pub api: ApiConfig,
    pub term_base: TermBaseConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationDefaults {
    pub unknown_language: UnknownLanguagePolicy,
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub backend: Backend,
    /// Overrides the vendor's public endpoint (tests, proxies).
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermBaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// What to do with text that is neither Chinese nor English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLanguagePolicy {
    /// Send it with automatic source detection, targeting English.
    #[default]
    TranslateToEnglish,
    /// Leave the cell untouched.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Baidu,
    Youdao,
}

impl Backend {
    pub fn app_id_var(&self) -> &'static str {
        match self {
            Backend::Baidu => "BAIDU_APP_ID",
            Backend::Youdao => "YOUDAO_APP_KEY",
        }
    }

    pub fn secret_var(&self) -> &'static str {
        match self {
            Backend::Baidu => "BAIDU_SECRET_KEY",
            Backend::Youdao => "YOUDAO_APP_SECRET",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Baidu => write!(f, "baidu"),
            Backend::Youdao => write!(f, "youdao"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "sheet-translator".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            translation: TranslationDefaults {
                unknown_language: UnknownLanguagePolicy::TranslateToEnglish,
                request_delay_ms: 1000,
            },
            api: ApiConfig {
                backend: Backend::Baidu,
                endpoint: None,
                timeout_seconds: 10,
            },
            term_base: TermBaseConfig {
                path: PathBuf::from("term_base.json"),
            },
            output: OutputConfig {
                directory: PathBuf::from("./uploads"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SheetTranslatorError::ConfigError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| SheetTranslatorError::ConfigError(e.to_string()))
    }

    pub fn load_or_default(path: Option<&str>) -> Self {
        let Some(p) = path else {
            return Self::default();
        };

        match Self::load_from_file(p) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %p, error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.translation.request_delay_ms)
    }
}

/// Vendor credentials, read from the environment once per process.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret: secret.into(),
        }
    }

    /// `None` when either variable is unset or blank.
    pub fn from_env(backend: Backend) -> Option<Self> {
        let app_id = std::env::var(backend.app_id_var()).ok()?;
        let secret = std::env::var(backend.secret_var()).ok()?;

        if app_id.trim().is_empty() || secret.trim().is_empty() {
            return None;
        }

        Some(Self::new(app_id.trim(), secret.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml_config() {
        let raw = r#"
            [server]
            name = "sheet-translator"
            version = "0.1.0"

            [translation]
            unknown_language = "skip"
            request_delay_ms = 250

            [api]
            backend = "youdao"
            timeout_seconds = 5

            [term_base]
            path = "data/terms.json"

            [output]
            directory = "out"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.translation.unknown_language, UnknownLanguagePolicy::Skip);
        assert_eq!(config.api.backend, Backend::Youdao);
        assert_eq!(config.api.endpoint, None);
        assert_eq!(config.request_delay(), Duration::from_millis(250));
        assert_eq!(config.term_base.path, PathBuf::from("data/terms.json"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            AppConfig::load_from_file("/nonexistent/sheet-translator.toml"),
            Err(SheetTranslatorError::ConfigError(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default(Some("/nonexistent/sheet-translator.toml"));
        assert_eq!(config.api.backend, Backend::Baidu);
        assert_eq!(config.translation.request_delay_ms, 1000);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config: AppConfig = toml::from_str("[logging]\nlevel = \"debug\"\nformat = \"text\"\n").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.api.backend, Backend::Baidu);
        assert_eq!(config.translation.request_delay_ms, 1000);
        assert_eq!(
            config.translation.unknown_language,
            UnknownLanguagePolicy::TranslateToEnglish
        );
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let creds = Credentials::new("2015063000000001", "12345678");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("2015063000000001"));
        assert!(!shown.contains("12345678"));
    }
}
