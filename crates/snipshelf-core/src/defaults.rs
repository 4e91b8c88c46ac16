//! Tool-dependent defaults for config files.
//!
//! | tool        | file path       | language |
//! |-------------|-----------------|----------|
//! | vscode      | `settings.json` | json     |
//! | neovim      | `init.lua`      | lua      |
//! | zed, other  | `config`        | json     |

use crate::model::{ConfigLanguage, ToolKind};
use serde::{Deserialize, Serialize};

/// The values a tool selection implies for its dependent fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefaults {
    pub file_path: String,
    pub language: ConfigLanguage,
}

/// Caller-supplied values that take precedence over the tool defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overrides {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub language: Option<ConfigLanguage>,
}

pub fn default_file_path(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Vscode => "settings.json",
        ToolKind::Neovim => "init.lua",
        ToolKind::Zed | ToolKind::Other => "config",
    }
}

pub fn default_language(tool: ToolKind) -> ConfigLanguage {
    match tool {
        ToolKind::Neovim => ConfigLanguage::Lua,
        ToolKind::Vscode | ToolKind::Zed | ToolKind::Other => ConfigLanguage::Json,
    }
}

/// Starter content offered for a fresh config of this tool.
pub fn default_content(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Vscode => {
            "{\n  \"editor.fontSize\": 14,\n  \"files.exclude\": { \"**/.DS_Store\": true }\n}"
        }
        ToolKind::Neovim => "-- init.lua\nvim.o.number = true\nvim.o.tabstop = 2\n",
        ToolKind::Zed | ToolKind::Other => "# config here\n",
    }
}

/// Derive file path and language for `tool`.
///
/// A present, non-empty override is returned verbatim; anything else falls
/// back to the tool's default.
pub fn derive_defaults(tool: ToolKind, overrides: &Overrides) -> ToolDefaults {
    let file_path = overrides
        .file_path
        .as_deref()
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| default_file_path(tool))
        .to_string();

    ToolDefaults {
        file_path,
        language: overrides.language.unwrap_or_else(|| default_language(tool)),
    }
}
