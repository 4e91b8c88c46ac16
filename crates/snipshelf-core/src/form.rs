//! Editor form state for configs and snippets.
//!
//! The config form keeps a [`FieldOrigin`] next to every tool-dependent
//! field. Fields the user has typed into are pinned; everything else follows
//! the currently selected tool, so switching vscode → neovim → vscode lands
//! back on the vscode defaults.

use crate::defaults::{
    default_content, default_file_path, default_language, derive_defaults, Overrides,
};
use crate::error::CoreResult;
use crate::model::{timestamp_now, ConfigLanguage, Snippet, ToolConfig, ToolKind};
use serde::{Deserialize, Serialize};
use snipshelf_util::Error;

/// Where the current value of a dependent field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrigin {
    /// Never written.
    #[default]
    Unset,
    /// Filled from the selected tool.
    Defaulted,
    /// Typed by the user. Tool changes leave it alone.
    Explicit,
}

impl FieldOrigin {
    pub fn is_explicit(self) -> bool {
        self == FieldOrigin::Explicit
    }
}

/// A form value plus its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field<T> {
    pub value: T,
    pub origin: FieldOrigin,
}

impl<T> Field<T> {
    fn defaulted(value: T) -> Self {
        Self {
            value,
            origin: FieldOrigin::Defaulted,
        }
    }

    fn explicit(value: T) -> Self {
        Self {
            value,
            origin: FieldOrigin::Explicit,
        }
    }

    /// Replace the value unless the user pinned it.
    fn follow(&mut self, value: T) {
        if !self.origin.is_explicit() {
            *self = Self::defaulted(value);
        }
    }
}

/// Partial config input, as posted by the create and edit pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tool: Option<ToolKind>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub language: Option<ConfigLanguage>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// State of the config editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigForm {
    pub name: String,
    tool: ToolKind,
    file_path: Field<String>,
    language: Field<ConfigLanguage>,
    content: Field<String>,
    pub is_public: bool,
    pub description: String,
}

impl Default for ConfigForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigForm {
    /// A blank "new config" form: "User Settings" for VS Code, public.
    pub fn new() -> Self {
        let tool = ToolKind::default();
        Self {
            name: "User Settings".to_string(),
            tool,
            file_path: Field::defaulted(default_file_path(tool).to_string()),
            language: Field::defaulted(default_language(tool)),
            content: Field::defaulted(default_content(tool).to_string()),
            is_public: true,
            description: String::new(),
        }
    }

    /// A new form with `draft` applied on top of the blank defaults.
    pub fn from_draft(draft: ConfigDraft) -> Self {
        let mut form = Self::new();
        form.apply(draft);
        form
    }

    /// Load a stored config for editing.
    ///
    /// Stored records carry no origins, so a field that still equals its
    /// tool's default is treated as defaulted and anything else as pinned.
    pub fn from_record(config: &ToolConfig) -> Self {
        let tool = config.tool;
        let file_path = if config.file_path == default_file_path(tool) {
            Field::defaulted(config.file_path.clone())
        } else {
            Field::explicit(config.file_path.clone())
        };
        let language = if config.language == default_language(tool) {
            Field::defaulted(config.language)
        } else {
            Field::explicit(config.language)
        };
        let content = if config.content == default_content(tool) {
            Field::defaulted(config.content.clone())
        } else {
            Field::explicit(config.content.clone())
        };

        Self {
            name: config.name.clone(),
            tool,
            file_path,
            language,
            content,
            is_public: config.is_public,
            description: config.description.clone(),
        }
    }

    /// Apply a partial edit. The tool switch happens first so explicit
    /// values in the same draft win over the new tool's defaults.
    pub fn apply(&mut self, draft: ConfigDraft) {
        if let Some(name) = draft.name {
            self.name = name;
        }
        if let Some(is_public) = draft.is_public {
            self.is_public = is_public;
        }
        if let Some(description) = draft.description {
            self.description = description;
        }
        if let Some(tool) = draft.tool {
            self.set_tool(tool);
        }
        if let Some(file_path) = draft.file_path {
            self.set_file_path(file_path);
        }
        if let Some(language) = draft.language {
            self.set_language(language);
        }
        if let Some(content) = draft.content {
            self.set_content(content);
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn file_path(&self) -> &Field<String> {
        &self.file_path
    }

    pub fn language(&self) -> &Field<ConfigLanguage> {
        &self.language
    }

    pub fn content(&self) -> &Field<String> {
        &self.content
    }

    /// Select a tool and re-derive every field the user has not pinned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        let derived = derive_defaults(tool, &self.overrides());
        self.file_path.follow(derived.file_path);
        self.language.follow(derived.language);
        self.content.follow(default_content(tool).to_string());
    }

    /// An empty path hands the field back to the tool default.
    pub fn set_file_path(&mut self, file_path: String) {
        if file_path.is_empty() {
            self.file_path = Field::defaulted(default_file_path(self.tool).to_string());
        } else {
            self.file_path = Field::explicit(file_path);
        }
    }

    pub fn set_language(&mut self, language: ConfigLanguage) {
        self.language = Field::explicit(language);
    }

    pub fn set_content(&mut self, content: String) {
        if content.is_empty() {
            self.content = Field::defaulted(default_content(self.tool).to_string());
        } else {
            self.content = Field::explicit(content);
        }
    }

    /// The pinned values, in the shape [`derive_defaults`] takes.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            file_path: self
                .file_path
                .origin
                .is_explicit()
                .then(|| self.file_path.value.clone()),
            language: self
                .language
                .origin
                .is_explicit()
                .then_some(self.language.value),
        }
    }

    /// Build the record to save, stamped with the current time.
    pub fn payload(&self, id: impl Into<String>) -> CoreResult<ToolConfig> {
        if self.name.trim().is_empty() {
            return Err(Error::missing_field("name").into());
        }

        Ok(ToolConfig {
            id: id.into(),
            name: self.name.clone(),
            tool: self.tool,
            file_path: self.file_path.value.clone(),
            language: self.language.value,
            is_public: self.is_public,
            description: self.description.clone(),
            content: self.content.value.clone(),
            updated_at: timestamp_now(),
        })
    }
}

/// Tags as posted: either a list or the comma separated text box value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagsInput::Text(text) => parse_tags(&text),
        }
    }
}

/// Partial snippet input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// State of the snippet editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetForm {
    pub title: String,
    pub language: String,
    pub tags: Vec<String>,
    pub code: String,
    pub description: String,
}

impl Default for SnippetForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            language: "tsx".to_string(),
            tags: Vec::new(),
            code: String::new(),
            description: String::new(),
        }
    }
}

impl SnippetForm {
    pub fn from_draft(draft: SnippetDraft) -> Self {
        let mut form = Self::default();
        form.apply(draft);
        form
    }

    pub fn from_record(snippet: &Snippet) -> Self {
        Self {
            title: snippet.title.clone(),
            language: snippet.language.clone(),
            tags: snippet.tags.clone(),
            code: snippet.code.clone(),
            description: snippet.description.clone(),
        }
    }

    pub fn apply(&mut self, draft: SnippetDraft) {
        if let Some(title) = draft.title {
            self.title = title;
        }
        if let Some(language) = draft.language {
            self.language = language;
        }
        if let Some(tags) = draft.tags {
            self.tags = tags.into_tags();
        }
        if let Some(code) = draft.code {
            self.code = code;
        }
        if let Some(description) = draft.description {
            self.description = description;
        }
    }

    pub fn payload(&self, id: impl Into<String>) -> CoreResult<Snippet> {
        if self.title.trim().is_empty() {
            return Err(Error::missing_field("title").into());
        }

        Ok(Snippet {
            id: id.into(),
            title: self.title.clone(),
            language: self.language.clone(),
            tags: self.tags.clone(),
            code: self.code.clone(),
            description: self.description.clone(),
            updated_at: timestamp_now(),
        })
    }
}

/// Split the tag text box on commas, trimming and dropping empty entries.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
