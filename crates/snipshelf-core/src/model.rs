//! Snippet and tool config records.
//!
//! Both serialize with camelCase field names, which is the JSON shape the
//! dashboard pages consume.

use serde::{Deserialize, Serialize};
use snipshelf_util::Error;
use std::fmt;
use std::str::FromStr;

/// A reusable code fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub title: String,
    /// Open tag, e.g. `tsx`, `python`, `TypeScript`. Not normalized.
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    /// Display timestamp; never parsed.
    pub updated_at: String,
}

/// A configuration file for one editor or tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub id: String,
    pub name: String,
    pub tool: ToolKind,
    pub file_path: String,
    pub language: ConfigLanguage,
    /// Cosmetic only, nothing is hidden based on it.
    pub is_public: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub updated_at: String,
}

/// The tool a config targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Vscode,
    Neovim,
    Zed,
    Other,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Vscode,
        ToolKind::Neovim,
        ToolKind::Zed,
        ToolKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Vscode => "vscode",
            ToolKind::Neovim => "neovim",
            ToolKind::Zed => "zed",
            ToolKind::Other => "other",
        }
    }

    /// Human readable name shown in lists and pickers.
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Vscode => "VS Code",
            ToolKind::Neovim => "Neovim",
            ToolKind::Zed => "Zed",
            ToolKind::Other => "Other",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::unknown_variant("tool", s, &["vscode", "neovim", "zed", "other"])
            })
    }
}

/// Syntax of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLanguage {
    #[default]
    Json,
    Yaml,
    Toml,
    Lua,
    Vim,
}

impl ConfigLanguage {
    pub const ALL: [ConfigLanguage; 5] = [
        ConfigLanguage::Json,
        ConfigLanguage::Yaml,
        ConfigLanguage::Toml,
        ConfigLanguage::Lua,
        ConfigLanguage::Vim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLanguage::Json => "json",
            ConfigLanguage::Yaml => "yaml",
            ConfigLanguage::Toml => "toml",
            ConfigLanguage::Lua => "lua",
            ConfigLanguage::Vim => "vim",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfigLanguage::Json => "JSON",
            ConfigLanguage::Yaml => "YAML",
            ConfigLanguage::Toml => "TOML",
            ConfigLanguage::Lua => "Lua",
            ConfigLanguage::Vim => "Vimscript",
        }
    }
}

impl fmt::Display for ConfigLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::unknown_variant("language", s, &["json", "yaml", "toml", "lua", "vim"])
            })
    }
}

/// Current time as the display timestamp stored in `updatedAt`.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_parse_is_case_insensitive() {
        assert_eq!("VSCode".parse::<ToolKind>().unwrap(), ToolKind::Vscode);
        assert_eq!("neovim".parse::<ToolKind>().unwrap(), ToolKind::Neovim);
        assert!("emacs".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_config_language_parse() {
        assert_eq!("YAML".parse::<ConfigLanguage>().unwrap(), ConfigLanguage::Yaml);
        assert!("python".parse::<ConfigLanguage>().is_err());
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = ToolConfig {
            id: "a".to_string(),
            name: "User Settings".to_string(),
            tool: ToolKind::Vscode,
            file_path: "settings.json".to_string(),
            language: ConfigLanguage::Json,
            is_public: true,
            description: String::new(),
            content: "{}".to_string(),
            updated_at: "2025-08-31T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["filePath"], "settings.json");
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["tool"], "vscode");
        assert_eq!(json["updatedAt"], "2025-08-31T00:00:00Z");
    }

    #[test]
    fn test_snippet_missing_optional_fields_default() {
        let snippet: Snippet = serde_json::from_str(
            r#"{"id":"1","title":"Debounce function","language":"TypeScript","updatedAt":"2d"}"#,
        )
        .unwrap();
        assert!(snippet.tags.is_empty());
        assert!(snippet.code.is_empty());
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = timestamp_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
