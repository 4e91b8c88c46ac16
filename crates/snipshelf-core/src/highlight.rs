//! Syntax highlighting for the code preview.
//!
//! Uses syntect's bundled grammars and themes. Output is a list of lines,
//! each a list of colored tokens, so any client can paint it.

use crate::theme::ThemeMode;
use once_cell::sync::Lazy;
use serde::Serialize;
use syntect::{
    easy::HighlightLines,
    highlighting::{FontStyle, Style, Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const LIGHT_THEME: &str = "InspiredGitHub";
const DARK_THEME: &str = "base16-ocean.dark";

/// Foreground used when no theme could be loaded.
const PLAIN_LIGHT: &str = "#24292e";
const PLAIN_DARK: &str = "#c0c5ce";

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledToken {
    pub text: String,
    /// `#rrggbb`
    pub color: String,
    pub bold: bool,
    pub italic: bool,
}

pub type HighlightedLine = Vec<StyledToken>;

/// A rendered preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlighted {
    /// Grammar that was used, e.g. `JavaScript` or `Plain Text`.
    pub syntax: String,
    pub theme: ThemeMode,
    pub lines: Vec<HighlightedLine>,
}

/// Find a grammar for a language tag, falling back to plain text.
fn find_syntax(language: &str) -> &'static SyntaxReference {
    let lang_lower = language.to_lowercase();
    let alias = match lang_lower.as_str() {
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        // No TypeScript grammar in the defaults.
        "ts" | "tsx" | "typescript" | "mts" | "cts" => "JavaScript",
        "py" | "python3" => "Python",
        "rs" => "Rust",
        "sh" | "bash" | "shell" | "zsh" => "Bourne Again Shell (bash)",
        "yml" | "yaml" => "YAML",
        "md" | "markdown" => "Markdown",
        "json5" | "jsonc" => "JSON",
        "scss" | "sass" => "CSS",
        "vim" | "vimscript" => "Plain Text",
        _ => language,
    };

    SYNTAX_SET
        .find_syntax_by_name(alias)
        .or_else(|| SYNTAX_SET.find_syntax_by_token(&lang_lower))
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(&lang_lower))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

fn theme_for(mode: ThemeMode) -> Option<&'static Theme> {
    let name = if mode.is_dark() { DARK_THEME } else { LIGHT_THEME };
    THEME_SET.themes.get(name)
}

fn hex(color: syntect::highlighting::Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn token(style: Style, text: &str) -> StyledToken {
    StyledToken {
        text: text.trim_end_matches(['\n', '\r']).to_string(),
        color: hex(style.foreground),
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
    }
}

fn plain_line(line: &str, mode: ThemeMode) -> HighlightedLine {
    vec![StyledToken {
        text: line.trim_end_matches(['\n', '\r']).to_string(),
        color: if mode.is_dark() { PLAIN_DARK } else { PLAIN_LIGHT }.to_string(),
        bold: false,
        italic: false,
    }]
}

/// Highlight `code` for display with the given theme.
///
/// Never fails: unknown languages render as plain text, and a line the
/// grammar chokes on is emitted unstyled.
pub fn highlight(code: &str, language: &str, mode: ThemeMode) -> Highlighted {
    let syntax = find_syntax(language);

    let Some(theme) = theme_for(mode) else {
        return Highlighted {
            syntax: syntax.name.clone(),
            theme: mode,
            lines: code.lines().map(|line| plain_line(line, mode)).collect(),
        };
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let lines = LinesWithEndings::from(code)
        .map(|line| match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| token(style, text))
                .filter(|t| !t.text.is_empty())
                .collect(),
            Err(_) => plain_line(line, mode),
        })
        .collect();

    Highlighted {
        syntax: syntax.name.clone(),
        theme: mode,
        lines,
    }
}
