//! Application state and logic

use crate::color::Theme;
use crate::producer::{DiffOptions, DiffSource};
use crate::syntax::{SyntaxEngine, SyntaxSpan};
use crate::worker::ReloadWorker;
use sbs_core::{
    CommentInfo, DiffPreferences, DisplaySide, IntraLineStatus, ReloadRequest, ReloadToken,
    SideBySide,
};
use std::sync::Arc;

mod navigation;

/// The main application state
pub struct App {
    /// The aligned two-pane view
    pub view: SideBySide,
    source: Arc<DiffSource>,
    syntax: SyntaxEngine,
    /// Highlighted lines per side, present while the pane has a mode
    highlights: [Option<Vec<Vec<SyntaxSpan>>>; 2],
    worker: Option<ReloadWorker>,
    /// Reload the view is waiting for
    pending_reload: Option<ReloadToken>,
    /// Rows the panes were last laid out with
    viewport_rows: u16,
    pub theme: Theme,
    /// Gutter marker of the focused cursor line
    pub cursor_marker: String,
    /// One-shot status message
    pub message: Option<String>,
    pub show_help: bool,
    /// Pending count for vim-style commands (e.g., 10j)
    pub pending_count: Option<usize>,
    pub should_quit: bool,
}

impl App {
    /// Compute the first diff and lay it out. The first diff is produced on
    /// the calling thread; later reloads go to the worker.
    pub fn new(
        source: DiffSource,
        prefs: DiffPreferences,
        comments: Vec<CommentInfo>,
        theme: Theme,
        viewport_rows: u16,
    ) -> Self {
        let source = Arc::new(source);
        let mut view = SideBySide::new(prefs.clone());
        view.set_viewport_height(viewport_rows as f64);
        let mut syntax = SyntaxEngine::new(&theme);

        let diff = source.produce(DiffOptions {
            intraline: prefs.intraline_difference,
            ignore_whitespace: prefs.ignore_whitespace,
        });
        let reload = view.display(diff, comments, &mut syntax);

        let mut app = Self {
            view,
            source,
            syntax,
            highlights: [None, None],
            worker: None,
            pending_reload: None,
            viewport_rows,
            theme,
            cursor_marker: "▶".to_string(),
            message: None,
            show_help: false,
            pending_count: None,
            should_quit: false,
        };
        if let Some(request) = reload {
            app.request_reload(request);
        }
        app.refresh_highlights();
        app
    }

    /// Place the cursor for the first time (1-based line)
    pub fn show(&mut self, side: Option<DisplaySide>, line: Option<usize>) {
        let start = match (side, line) {
            (None, None) => None,
            (side, line) => Some((
                side.unwrap_or(DisplaySide::B),
                line.unwrap_or(1).saturating_sub(1),
            )),
        };
        self.view.show_view(start);
    }

    pub fn file_name(&self) -> Option<&str> {
        self.source.name()
    }

    pub fn highlight(&self, side: DisplaySide, line: usize) -> Option<&[SyntaxSpan]> {
        self.highlights[side.index()]
            .as_ref()
            .and_then(|lines| lines.get(line))
            .map(Vec::as_slice)
    }

    fn refresh_highlights(&mut self) {
        for side in DisplaySide::BOTH {
            let pane = self.view.pane(side);
            self.highlights[side.index()] = pane
                .mode()
                .map(|mode| self.syntax.highlight(pane.lines(), mode));
        }
    }

    /// Resize the panes when the drawable area changed
    pub fn set_viewport_rows(&mut self, rows: u16) {
        if rows != self.viewport_rows {
            self.viewport_rows = rows;
            self.view.set_viewport_height(rows as f64);
        }
    }

    pub fn viewport_rows(&self) -> u16 {
        self.viewport_rows
    }

    // ==================== Reloads ====================

    fn ensure_worker(&mut self) -> &ReloadWorker {
        self.worker
            .get_or_insert_with(|| ReloadWorker::spawn(Arc::clone(&self.source)))
    }

    fn request_reload(&mut self, request: ReloadRequest) {
        self.ensure_worker().request(request);
        self.pending_reload = Some(request.token);
        self.message = Some("reloading…".to_string());
    }

    pub fn is_reloading(&self) -> bool {
        self.pending_reload.is_some()
    }

    /// Apply finished reloads; stale ones are dropped by the view
    pub fn poll_reloads(&mut self) {
        let mut applied = false;
        while let Some(response) = self.worker.as_ref().and_then(ReloadWorker::try_recv) {
            if self.view.apply_reload(response.token, response.diff) {
                applied = true;
            }
        }
        if applied {
            self.pending_reload = None;
            self.message = None;
            self.refresh_highlights();
        }
    }

    // ==================== Preference toggles ====================

    pub fn toggle_intraline(&mut self) {
        if self.view.intraline_status() == IntraLineStatus::Timeout {
            self.message = Some("intraline differences unavailable for this diff".to_string());
            return;
        }
        if let Some(request) = self.view.toggle_show_intraline() {
            self.request_reload(request);
        }
    }

    pub fn toggle_ignore_whitespace(&mut self) {
        let ignore = !self.view.prefs().ignore_whitespace;
        let request = self.view.set_ignore_whitespace(ignore);
        self.request_reload(request);
    }

    pub fn toggle_syntax(&mut self) {
        let enabled = !self.view.prefs().syntax_highlighting;
        self.set_syntax(enabled);
    }

    pub fn set_syntax(&mut self, enabled: bool) {
        if enabled && self.view.is_large_file() {
            self.message = Some("file too large for syntax highlighting".to_string());
            return;
        }
        self.view.set_syntax_highlighting(enabled, &mut self.syntax);
        if enabled && !self.view.prefs().syntax_highlighting {
            self.message = Some("syntax highlighting failed".to_string());
        }
        self.refresh_highlights();
    }

    pub fn cycle_context(&mut self) {
        let context = self.view.prefs().context.cycle();
        self.view.set_context(context);
        self.message = Some(format!("context: {context}"));
    }

    pub fn toggle_line_numbers(&mut self) {
        let show = !self.view.prefs().show_line_numbers;
        self.view.set_show_line_numbers(show);
    }

    pub fn toggle_tabs(&mut self) {
        let show = !self.view.prefs().show_tabs;
        self.view.set_show_tabs(show);
    }

    pub fn toggle_whitespace_errors(&mut self) {
        let show = !self.view.prefs().show_whitespace_errors;
        self.view.set_show_whitespace_errors(show);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
