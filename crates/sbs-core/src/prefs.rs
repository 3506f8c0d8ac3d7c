//! Display preferences read by the view

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Context radius choices, in the order `c` cycles through them
pub const CONTEXT_STEPS: [usize; 6] = [3, 10, 25, 50, 75, 100];

/// How many common lines stay visible around changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContext", into = "RawContext")]
pub enum Context {
    Lines(usize),
    /// Never collapse anything
    WholeFile,
}

impl Default for Context {
    fn default() -> Self {
        Context::Lines(10)
    }
}

impl Context {
    /// Next step of [`CONTEXT_STEPS`], then whole file, then back to the
    /// smallest radius
    pub fn cycle(self) -> Self {
        match self {
            Context::WholeFile => Context::Lines(CONTEXT_STEPS[0]),
            Context::Lines(n) => CONTEXT_STEPS
                .iter()
                .find(|&&step| step > n)
                .map(|&step| Context::Lines(step))
                .unwrap_or(Context::WholeFile),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Lines(n) => write!(f, "{n}"),
            Context::WholeFile => f.write_str("all"),
        }
    }
}

impl FromStr for Context {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "whole" | "whole_file" => Ok(Context::WholeFile),
            n => n.parse().map(Context::Lines),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawContext {
    Lines(usize),
    Name(String),
}

impl TryFrom<RawContext> for Context {
    type Error = String;

    fn try_from(raw: RawContext) -> Result<Self, Self::Error> {
        match raw {
            RawContext::Lines(n) => Ok(Context::Lines(n)),
            RawContext::Name(name) => name
                .parse()
                .map_err(|_| format!("invalid context `{name}`, expected a number or \"all\"")),
        }
    }
}

impl From<Context> for RawContext {
    fn from(context: Context) -> Self {
        match context {
            Context::Lines(n) => RawContext::Lines(n),
            Context::WholeFile => RawContext::Name("all".to_string()),
        }
    }
}

/// Snapshot of the user's diff preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffPreferences {
    pub tab_size: usize,
    pub show_line_numbers: bool,
    pub show_tabs: bool,
    pub intraline_difference: bool,
    pub ignore_whitespace: bool,
    pub show_whitespace_errors: bool,
    pub context: Context,
    pub syntax_highlighting: bool,
    pub expand_all_comments: bool,
}

impl Default for DiffPreferences {
    fn default() -> Self {
        Self {
            tab_size: 8,
            show_line_numbers: true,
            show_tabs: true,
            intraline_difference: true,
            ignore_whitespace: false,
            show_whitespace_errors: true,
            context: Context::default(),
            syntax_highlighting: true,
            expand_all_comments: false,
        }
    }
}
