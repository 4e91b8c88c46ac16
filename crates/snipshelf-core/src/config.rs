//! Configuration management for snipshelf.
//!
//! Configuration is loaded from multiple sources and merged:
//! 1. Global config: `~/.config/snipshelf/config.json` (or `.jsonc`)
//! 2. Environment variable: `SNIPSHELF_CONFIG_CONTENT`
//! 3. Project config: `snipshelf.json` or `snipshelf.jsonc` in the working directory
//!
//! Supports JSONC (JSON with comments) and `{env:VAR_NAME}` substitution.

use crate::error::{ConfigError, CoreResult};
use crate::theme::ThemeMode;
use serde::{Deserialize, Serialize};
use snipshelf_util::log::LogLevel;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_SIGNIN_PATH: &str = "/auth/signin";
pub const DEFAULT_CALLBACK_URL: &str = "/dashboard";

static VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn var_regex() -> &'static regex::Regex {
    VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\{env:([^}]+)\}")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Main configuration structure. Every field is optional; accessors supply
/// the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Initial theme for the code preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Public URL the OAuth providers redirect back to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ServerConfig {
    pub fn merge(self, other: Self) -> Self {
        Self {
            address: merge_option(self.address, other.address),
            base_url: merge_option(self.base_url, other.base_url),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<StorageBackend>,

    /// Root directory for the JSON backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Write sample records into an empty store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<bool>,
}

impl StorageConfig {
    pub fn merge(self, other: Self) -> Self {
        Self {
            backend: merge_option(self.backend, other.backend),
            path: merge_option(self.path, other.path),
            seed: merge_option(self.seed, other.seed),
        }
    }
}

/// OAuth client credentials for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Credentials keyed by provider id (`google`, `github`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<HashMap<String, ProviderCredentials>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signin_path: Option<String>,

    /// Where to land after sign-in when the request names no callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Let every request through the gate. Development only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl AuthConfig {
    pub fn merge(self, other: Self) -> Self {
        Self {
            providers: merge_hashmap(self.providers, other.providers),
            signin_path: merge_option(self.signin_path, other.signin_path),
            callback_url: merge_option(self.callback_url, other.callback_url),
            disabled: merge_option(self.disabled, other.disabled),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Returns the merged config and the files that contributed to it.
    pub async fn load(project_dir: Option<&Path>) -> CoreResult<(Self, Vec<PathBuf>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        if let Some(global_dir) = Self::global_config_dir() {
            for name in &["config.json", "config.jsonc"] {
                let path = global_dir.join(name);
                if path.exists() {
                    config = config.merge(Self::load_file(&path).await?);
                    sources.push(path);
                    break;
                }
            }
        }

        if let Ok(content) = std::env::var("SNIPSHELF_CONFIG_CONTENT") {
            let content = Self::substitute_variables(&content)?;
            config = config.merge(Self::parse_jsonc(&content, "<env>")?);
        }

        if let Some(dir) = project_dir {
            for name in &["snipshelf.jsonc", "snipshelf.json"] {
                let path = dir.join(name);
                if path.exists() {
                    config = config.merge(Self::load_file(&path).await?);
                    sources.push(path);
                    break;
                }
            }
        }

        tracing::debug!(sources = sources.len(), "Configuration loaded");
        Ok((config, sources))
    }

    /// Get the global config directory.
    ///
    /// On Unix, prefers `~/.config/snipshelf` over the platform directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            if let Some(home) = dirs::home_dir() {
                let xdg_config = home.join(".config").join("snipshelf");
                if xdg_config.exists() {
                    return Some(xdg_config);
                }
            }
        }

        dirs::config_dir().map(|d| d.join("snipshelf"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("snipshelf"))
    }

    pub async fn load_file(path: &Path) -> CoreResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let content = Self::substitute_variables(&content)?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    fn parse_jsonc(content: &str, source: &str) -> CoreResult<Self> {
        let stripped = Self::strip_comments(content);

        serde_json::from_str(&stripped).map_err(|e| {
            ConfigError::InvalidJson {
                path: source.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Strip `//` and `/* */` comments outside of strings.
    fn strip_comments(input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(c) = chars.next() {
            if escape_next {
                result.push(c);
                escape_next = false;
                continue;
            }

            if in_string {
                match c {
                    '\\' => escape_next = true,
                    '"' => in_string = false,
                    _ => {}
                }
                result.push(c);
                continue;
            }

            match (c, chars.peek()) {
                ('"', _) => {
                    in_string = true;
                    result.push(c);
                }
                ('/', Some('/')) => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                ('/', Some('*')) => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        // Keep line numbers stable for parse errors.
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                }
                _ => result.push(c),
            }
        }

        result
    }

    /// Replace every `{env:NAME}` with the variable's value.
    fn substitute_variables(content: &str) -> CoreResult<String> {
        let mut missing = None;
        let result = var_regex().replace_all(content, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            std::env::var(name).unwrap_or_else(|_| {
                missing = Some(name.to_string());
                String::new()
            })
        });

        if let Some(name) = missing {
            return Err(ConfigError::EnvVarNotFound { name }.into());
        }
        Ok(result.into_owned())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(mut self, other: Self) -> Self {
        self.schema = merge_option(self.schema, other.schema);
        self.theme = merge_option(self.theme, other.theme);
        self.log_level = merge_option(self.log_level, other.log_level);

        self.server = merge_nested(self.server, other.server, ServerConfig::merge);
        self.storage = merge_nested(self.storage, other.storage, StorageConfig::merge);
        self.auth = merge_nested(self.auth, other.auth, AuthConfig::merge);

        self
    }

    pub fn server_address(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.address.clone())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string())
    }

    /// Base URL for OAuth redirect URIs, derived from the bind address when unset.
    pub fn base_url(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.base_url.clone())
            .unwrap_or_else(|| format!("http://{}", self.server_address()))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage
            .as_ref()
            .and_then(|s| s.backend)
            .unwrap_or_default()
    }

    /// Root of the JSON store. `None` only if no data directory can be found.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage
            .as_ref()
            .and_then(|s| s.path.clone())
            .or_else(|| Self::data_dir().map(|d| d.join("data")))
    }

    pub fn seed_enabled(&self) -> bool {
        self.storage.as_ref().and_then(|s| s.seed).unwrap_or(true)
    }

    pub fn signin_path(&self) -> String {
        self.auth
            .as_ref()
            .and_then(|a| a.signin_path.clone())
            .unwrap_or_else(|| DEFAULT_SIGNIN_PATH.to_string())
    }

    pub fn callback_url(&self) -> String {
        self.auth
            .as_ref()
            .and_then(|a| a.callback_url.clone())
            .unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string())
    }

    pub fn auth_disabled(&self) -> bool {
        self.auth.as_ref().and_then(|a| a.disabled).unwrap_or(false)
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme.unwrap_or_default()
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Credentials for a provider: the config file first, then
    /// `AUTH_<PROVIDER>_ID` / `AUTH_<PROVIDER>_SECRET`.
    pub fn provider_credentials(&self, provider: &str) -> Option<ProviderCredentials> {
        let configured = self
            .auth
            .as_ref()
            .and_then(|a| a.providers.as_ref())
            .and_then(|p| p.get(provider))
            .filter(|c| !c.client_id.is_empty())
            .cloned();
        if configured.is_some() {
            return configured;
        }

        let upper = provider.to_ascii_uppercase();
        let client_id = std::env::var(format!("AUTH_{upper}_ID")).ok()?;
        let client_secret = std::env::var(format!("AUTH_{upper}_SECRET")).unwrap_or_default();
        Some(ProviderCredentials {
            client_id,
            client_secret,
        })
    }
}

fn merge_option<T>(base: Option<T>, other: Option<T>) -> Option<T> {
    match (base, other) {
        (_, Some(o)) => Some(o),
        (b, None) => b,
    }
}

fn merge_nested<T>(base: Option<T>, other: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (base, other) {
        (Some(b), Some(o)) => Some(merge(b, o)),
        (b, None) => b,
        (None, o) => o,
    }
}

fn merge_hashmap<K: std::hash::Hash + Eq, V>(
    base: Option<HashMap<K, V>>,
    other: Option<HashMap<K, V>>,
) -> Option<HashMap<K, V>> {
    match (base, other) {
        (Some(mut b), Some(o)) => {
            b.extend(o);
            Some(b)
        }
        (b, None) => b,
        (None, o) => o,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let input = r#"{
            // Line comment
            "theme": "dark", // trailing comment
            /* block comment */
            "log_level": "de/*not a comment*/bug"
        }"#;

        let result = Config::strip_comments(input);
        assert!(!result.contains("Line comment"));
        assert!(!result.contains("trailing comment"));
        assert!(!result.contains("block comment"));
        assert!(result.contains("de/*not a comment*/bug"));
    }

    #[test]
    fn test_parse_jsonc() {
        let input = r#"{
            // local dev
            "theme": "dark",
            "server": { "address": "0.0.0.0:8080" },
            "storage": { "backend": "memory", "seed": false }
        }"#;

        let config = Config::parse_jsonc(input, "test").unwrap();
        assert_eq!(config.theme(), ThemeMode::Dark);
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.storage_backend(), StorageBackend::Memory);
        assert!(!config.seed_enabled());
    }

    #[test]
    fn test_invalid_json_names_source() {
        let err = Config::parse_jsonc("{ nope", "snipshelf.json").unwrap_err();
        assert!(err.to_string().contains("snipshelf.json"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_address(), DEFAULT_ADDRESS);
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
        assert_eq!(config.signin_path(), "/auth/signin");
        assert_eq!(config.callback_url(), "/dashboard");
        assert_eq!(config.storage_backend(), StorageBackend::Json);
        assert!(config.seed_enabled());
        assert!(!config.auth_disabled());
    }

    #[test]
    fn test_merge_nested_field_by_field() {
        let base = Config {
            server: Some(ServerConfig {
                address: Some("127.0.0.1:4000".to_string()),
                base_url: Some("https://snips.example.com".to_string()),
            }),
            theme: Some(ThemeMode::Dark),
            ..Default::default()
        };
        let other = Config {
            server: Some(ServerConfig {
                address: Some("0.0.0.0:80".to_string()),
                base_url: None,
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.server_address(), "0.0.0.0:80");
        assert_eq!(merged.base_url(), "https://snips.example.com");
        assert_eq!(merged.theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_merge_provider_maps() {
        let creds = |id: &str| ProviderCredentials {
            client_id: id.to_string(),
            client_secret: "s".to_string(),
        };
        let base = Config {
            auth: Some(AuthConfig {
                providers: Some(HashMap::from([("google".to_string(), creds("g"))])),
                ..Default::default()
            }),
            ..Default::default()
        };
        let other = Config {
            auth: Some(AuthConfig {
                providers: Some(HashMap::from([("github".to_string(), creds("h"))])),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.provider_credentials("google").unwrap().client_id, "g");
        assert_eq!(merged.provider_credentials("github").unwrap().client_id, "h");
    }

    #[test]
    fn test_substitute_env() {
        std::env::set_var("SNIPSHELF_TEST_ADDR", "10.0.0.1:9000");
        let content = r#"{"server": {"address": "{env:SNIPSHELF_TEST_ADDR}"}}"#;
        let substituted = Config::substitute_variables(content).unwrap();
        let config = Config::parse_jsonc(&substituted, "test").unwrap();
        assert_eq!(config.server_address(), "10.0.0.1:9000");
    }

    #[test]
    fn test_missing_env_var_is_error() {
        let err =
            Config::substitute_variables("{env:SNIPSHELF_TEST_NOT_SET_ANYWHERE}").unwrap_err();
        assert!(err.to_string().contains("SNIPSHELF_TEST_NOT_SET_ANYWHERE"));
    }

    #[tokio::test]
    async fn test_load_project_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("snipshelf.jsonc"),
            "{\n  // project\n  \"auth\": { \"disabled\": true }\n}",
        )
        .await
        .unwrap();

        let (config, sources) = Config::load(Some(dir.path())).await.unwrap();
        assert!(config.auth_disabled());
        assert!(sources.contains(&dir.path().join("snipshelf.jsonc")));
    }
}
