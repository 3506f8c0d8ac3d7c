//! Syntax mode loading seam

use crate::error::ModeError;

/// Loads syntax modes for content types before panes use them.
///
/// The view asks for both sides at once. An error switches syntax
/// highlighting off for the rest of the session.
pub trait ModeInjector {
    fn inject(&mut self, content_types: &[&str]) -> Result<(), ModeError>;

    /// Mode name a pane should use for `content_type`
    fn mode_for(&self, content_type: &str) -> Option<String> {
        Some(content_type.to_string())
    }
}

/// Injector for hosts without syntax support; panes stay plain
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainText;

impl ModeInjector for PlainText {
    fn inject(&mut self, _content_types: &[&str]) -> Result<(), ModeError> {
        Ok(())
    }

    fn mode_for(&self, _content_type: &str) -> Option<String> {
        None
    }
}
