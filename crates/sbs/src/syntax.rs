//! Syntax highlighting helpers (syntect-backed)
//!
//! Panes name their syntax by content type (`text/x-rustsrc`). The engine
//! resolves content types to syntect syntaxes when the view injects them
//! and hands the syntax name back as the pane's mode.

use crate::color::Theme as UiTheme;
use ratatui::style::{Color as TuiColor, Modifier, Style};
use rustc_hash::FxHashMap;
use sbs_core::{ModeError, ModeInjector};
use std::path::Path;
use std::str::FromStr;
use syntect::{
    easy::HighlightLines,
    highlighting::{
        Color, FontStyle, ScopeSelectors, Style as SynStyle, StyleModifier, Theme, ThemeItem,
        ThemeSettings,
    },
    parsing::{SyntaxReference, SyntaxSet},
};

/// Content types the producer emits, with the extension syntect knows
/// them by
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("text/x-rustsrc", "rs"),
    ("text/x-python", "py"),
    ("text/javascript", "js"),
    ("text/typescript", "ts"),
    ("text/x-go", "go"),
    ("text/x-csrc", "c"),
    ("text/x-chdr", "h"),
    ("text/x-c++src", "cpp"),
    ("text/x-java", "java"),
    ("text/x-sh", "sh"),
    ("text/x-yaml", "yaml"),
    ("text/x-toml", "toml"),
    ("text/x-markdown", "md"),
    ("text/html", "html"),
    ("text/css", "css"),
    ("application/json", "json"),
    ("text/x-ruby", "rb"),
];

/// Content type for a file name, `text/plain` when unknown
pub fn content_type_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let ext = match ext.as_str() {
        "yml" => "yaml",
        "hpp" | "cc" | "cxx" => "cpp",
        "bash" | "zsh" => "sh",
        "markdown" => "md",
        "jsx" | "mjs" => "js",
        "tsx" => "ts",
        other => other,
    };
    CONTENT_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(ct, _)| ct.to_string())
        .unwrap_or_else(|| "text/plain".to_string())
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxSpan {
    pub text: String,
    pub style: Style,
}

pub struct SyntaxEngine {
    syntax_set: SyntaxSet,
    theme: Theme,
    plain: TuiColor,
    /// Content type to syntax name, filled by `inject`
    loaded: FxHashMap<String, String>,
}

impl SyntaxEngine {
    pub fn new(theme: &UiTheme) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: build_theme(theme),
            plain: theme.text.into(),
            loaded: FxHashMap::default(),
        }
    }

    fn resolve(&self, content_type: &str) -> Result<&SyntaxReference, ModeError> {
        let Some((_, subtype)) = content_type.split_once('/') else {
            return Err(ModeError::Unknown(content_type.to_string()));
        };
        let by_table = CONTENT_TYPES
            .iter()
            .find(|(ct, _)| *ct == content_type)
            .and_then(|(_, ext)| self.syntax_set.find_syntax_by_extension(ext));
        let token = subtype.trim_start_matches("x-").trim_end_matches("src");
        let syntax = by_table
            .or_else(|| self.syntax_set.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        Ok(syntax)
    }

    /// Highlight the lines of one pane with syntax `mode`
    pub fn highlight(&self, lines: &[String], mode: &str) -> Vec<Vec<SyntaxSpan>> {
        let syntax = self
            .syntax_set
            .find_syntax_by_name(mode)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut out = Vec::with_capacity(lines.len());

        for line in lines {
            let with_ending = format!("{line}\n");
            let ranges = highlighter
                .highlight_line(&with_ending, &self.syntax_set)
                .unwrap_or_default();
            let mut spans = Vec::new();
            for (style, text) in ranges {
                let text = text.strip_suffix('\n').unwrap_or(text);
                let text = text.strip_suffix('\r').unwrap_or(text);
                if text.is_empty() {
                    continue;
                }
                spans.push(SyntaxSpan {
                    text: text.to_string(),
                    style: syntect_style_to_tui(style),
                });
            }
            if spans.is_empty() {
                spans.push(SyntaxSpan {
                    text: String::new(),
                    style: Style::default().fg(self.plain),
                });
            }
            out.push(spans);
        }
        out
    }
}

impl ModeInjector for SyntaxEngine {
    fn inject(&mut self, content_types: &[&str]) -> Result<(), ModeError> {
        for &content_type in content_types {
            let name = self.resolve(content_type)?.name.clone();
            log::debug!("syntax mode {name} for {content_type}");
            self.loaded.insert(content_type.to_string(), name);
        }
        Ok(())
    }

    fn mode_for(&self, content_type: &str) -> Option<String> {
        self.loaded.get(content_type).cloned()
    }
}

fn build_theme(theme: &UiTheme) -> Theme {
    let mut t = Theme {
        settings: ThemeSettings {
            foreground: Some(to_syntect(theme.text.into())),
            ..ThemeSettings::default()
        },
        ..Theme::default()
    };

    t.scopes = vec![
        theme_item("comment, punctuation.definition.comment", theme.muted.into()),
        theme_item("string", theme.insert.into()),
        theme_item(
            "keyword, keyword.control, keyword.other, storage.modifier, storage.type",
            theme.accent.into(),
        ),
        theme_item("constant.numeric, constant.language", theme.comment.into()),
        theme_item(
            "entity.name.type, entity.name.namespace, support.type",
            theme.comment.into(),
        ),
        theme_item("entity.name.function, support.function", theme.accent.into()),
    ];
    t
}

fn theme_item(selector: &str, color: TuiColor) -> ThemeItem {
    ThemeItem {
        scope: ScopeSelectors::from_str(selector).unwrap_or_default(),
        style: StyleModifier {
            foreground: Some(to_syntect(color)),
            background: None,
            font_style: None,
        },
    }
}

fn syntect_style_to_tui(style: SynStyle) -> Style {
    let mut out = Style::default().fg(to_tui(style.foreground));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn to_syntect(color: TuiColor) -> Color {
    match color {
        TuiColor::Rgb(r, g, b) => Color { r, g, b, a: 0xFF },
        _ => Color::WHITE,
    }
}

fn to_tui(color: Color) -> TuiColor {
    TuiColor::Rgb(color.r, color.g, color.b)
}
