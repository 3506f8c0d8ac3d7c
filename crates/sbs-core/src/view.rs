//! The side-by-side screen controller
//!
//! [`SideBySide`] owns both panes and every piece of derived state (line
//! mapper, chunk index, padding, skips, comments) and wires pane events to
//! handlers. Hosts call an operation, then [`SideBySide::pump`] to let the
//! panes settle before drawing.

use crate::chunk::{ChunkIndex, DiffChunkInfo, Direction};
use crate::comments::{CommentInfo, CommentManager};
use crate::diff::{DiffInfo, IntraLineStatus};
use crate::events::{EventTable, PaneEventKind};
use crate::mapper::{LineMapper, LineOnOther};
use crate::mode::ModeInjector;
use crate::padding::PaddingCoordinator;
use crate::pane::{Pane, PaneEvent, PaneOptions, PanePair};
use crate::prefs::{Context, DiffPreferences};
use crate::render::DiffRenderer;
use crate::sched::{DeferredQueue, ReloadToken, ReloadTracker};
use crate::scroll::ScrollSynchronizer;
use crate::side::DisplaySide;
use crate::skip::{Expand, SkipManager};

/// Event/flush rounds before [`SideBySide::pump`] gives up
const MAX_PUMP_ROUNDS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    UpdateActiveLine(DisplaySide),
    ResizePadding(DisplaySide, usize),
}

/// What the host has to fetch for a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequest {
    pub token: ReloadToken,
    pub intraline: bool,
    pub ignore_whitespace: bool,
}

pub struct SideBySide {
    prefs: DiffPreferences,
    diff: DiffInfo,
    panes: PanePair,
    mapper: LineMapper,
    chunks: ChunkIndex,
    padding: PaddingCoordinator,
    skips: SkipManager,
    comments: CommentManager,
    scroll: ScrollSynchronizer,
    events: EventTable<SideBySide>,
    deferred: DeferredQueue<Deferred>,
    reloads: ReloadTracker,
    focus: DisplaySide,
    large_file: bool,
    intraline_visible: bool,
}

impl SideBySide {
    pub fn new(prefs: DiffPreferences) -> Self {
        let mut events = EventTable::new();
        events.on_both(PaneEventKind::CursorActivity, Self::on_cursor_activity);
        events.on_both(PaneEventKind::Focus, Self::on_cursor_activity);
        events.on_both(PaneEventKind::RenderLine, Self::on_render_line);
        events.on_both(PaneEventKind::Scroll, Self::on_scroll);

        let diff = DiffInfo::default();
        let panes = Self::new_panes(&diff, &prefs);
        Self {
            intraline_visible: prefs.intraline_difference,
            prefs,
            diff,
            panes,
            mapper: LineMapper::new(),
            chunks: ChunkIndex::default(),
            padding: PaddingCoordinator::new(),
            skips: SkipManager::new(),
            comments: CommentManager::new(),
            scroll: ScrollSynchronizer::new(),
            events,
            deferred: DeferredQueue::new(),
            reloads: ReloadTracker::new(),
            focus: DisplaySide::B,
            large_file: false,
        }
    }

    fn pane_options(prefs: &DiffPreferences) -> PaneOptions {
        PaneOptions {
            show_line_numbers: prefs.show_line_numbers,
            tab_size: prefs.tab_size,
            show_tabs: prefs.show_tabs,
            show_trailing_space: prefs.show_whitespace_errors,
        }
    }

    fn new_panes(diff: &DiffInfo, prefs: &DiffPreferences) -> PanePair {
        let [a, b] = DisplaySide::BOTH.map(|side| {
            let mut pane = Pane::new(side, diff.lines(side), diff.meta(side).is_some());
            pane.set_options(Self::pane_options(prefs));
            pane
        });
        PanePair::new(a, b)
    }

    // ==================== Accessors ====================

    pub fn prefs(&self) -> &DiffPreferences {
        &self.prefs
    }

    pub fn diff(&self) -> &DiffInfo {
        &self.diff
    }

    pub fn panes(&self) -> &PanePair {
        &self.panes
    }

    pub fn pane(&self, side: DisplaySide) -> &Pane {
        self.panes.get(side)
    }

    pub fn mapper(&self) -> &LineMapper {
        &self.mapper
    }

    pub fn chunks(&self) -> &ChunkIndex {
        &self.chunks
    }

    pub fn comments(&self) -> &CommentManager {
        &self.comments
    }

    pub fn skips(&self) -> &SkipManager {
        &self.skips
    }

    pub fn focused(&self) -> DisplaySide {
        self.focus
    }

    pub fn is_large_file(&self) -> bool {
        self.large_file
    }

    pub fn is_no_diff(&self) -> bool {
        self.diff.is_no_diff()
    }

    pub fn intraline_status(&self) -> IntraLineStatus {
        self.diff.intraline_status
    }

    /// Whether intraline marks should be drawn
    pub fn intraline_visible(&self) -> bool {
        self.intraline_visible
    }

    // ==================== Lifecycle ====================

    /// First display of a file. Returns a reload request when intraline
    /// spans are wanted but the diff came without them.
    pub fn display(
        &mut self,
        diff: DiffInfo,
        comments: Vec<CommentInfo>,
        injector: &mut dyn ModeInjector,
    ) -> Option<ReloadRequest> {
        self.large_file = diff.is_large_file();
        self.diff = diff;
        let viewport = self.panes.get(DisplaySide::A).viewport_height();
        self.panes = Self::new_panes(&self.diff, &self.prefs);
        self.set_viewport_height(viewport);

        let reload = self.set_show_intraline(self.prefs.intraline_difference);
        self.render_current();
        self.comments.load(comments);
        self.comments.render(&mut self.panes);
        if self.prefs.expand_all_comments {
            self.comments.set_expand_all(&mut self.panes, true);
        }
        self.render_skips();

        if self.prefs.syntax_highlighting {
            if self.large_file {
                log::info!("large file, syntax highlighting left off");
            } else {
                self.set_syntax_highlighting(true, injector);
            }
        }
        self.pump();
        reload
    }

    /// Place the cursor for the first time: the requested line, else the
    /// first chunk, else the top of B (or A when B is absent).
    pub fn show_view(&mut self, start: Option<(DisplaySide, usize)>) {
        let (side, line) = start
            .or_else(|| self.chunks.first().map(|c| (c.side, c.start)))
            .unwrap_or_else(|| {
                if self.panes.get(DisplaySide::B).is_present() || !self.panes.get(DisplaySide::A).is_present() {
                    (DisplaySide::B, 0)
                } else {
                    (DisplaySide::A, 0)
                }
            });
        self.focus_side(side);
        let line = self.nearest_visible(side, line);
        let pane = self.panes.get_mut(side);
        pane.set_cursor(line);
        pane.scroll_to_center(line);
        self.pump();
    }

    /// Replace the diff and rebuild everything derived from it
    pub fn render(&mut self, diff: DiffInfo) {
        self.skips.remove_all(&mut self.panes);
        let text_changed = DisplaySide::BOTH.iter().any(|&side| {
            self.diff.meta(side).is_some() != diff.meta(side).is_some()
                || self.diff.lines(side) != diff.lines(side)
        });
        self.large_file = diff.is_large_file();
        self.diff = diff;
        if text_changed {
            self.rebuild_panes();
        }
        self.render_current();
        self.render_skips();
        self.pump();
    }

    fn rebuild_panes(&mut self) {
        self.comments.clear(&mut self.panes);
        let mut panes = Self::new_panes(&self.diff, &self.prefs);
        for side in DisplaySide::BOTH {
            let old = self.panes.get(side);
            let pane = panes.get_mut(side);
            pane.set_mode(old.mode().map(str::to_string));
            pane.set_viewport_height(old.viewport_height());
            pane.set_cursor(old.cursor());
        }
        self.panes = panes;
        self.comments.render(&mut self.panes);
    }

    fn render_current(&mut self) {
        self.padding.clear(&mut self.panes);
        for pane in self.panes.iter_mut() {
            pane.clear_markers();
            pane.clear_gutters();
        }
        let rendered = DiffRenderer::new(&mut self.panes, &mut self.padding).render(&self.diff);
        self.chunks = ChunkIndex::new(rendered.chunks, &rendered.mapper);
        self.mapper = rendered.mapper;

        for (side, line) in self.padding.keys() {
            self.panes.get_mut(side).notify_render(line);
        }
        for (side, line) in self.comments.anchors() {
            self.panes.get_mut(side).notify_render(line);
        }
    }

    fn render_skips(&mut self) {
        let anchors = self.comments.anchors();
        self.skips
            .render(self.prefs.context, &self.diff, &anchors, &mut self.panes);
        for side in DisplaySide::BOTH {
            let cursor = self.panes.get(side).cursor();
            let visible = self.nearest_visible(side, cursor);
            if visible != cursor {
                self.panes.get_mut(side).set_cursor(visible);
            }
        }
    }

    // ==================== Reload ====================

    /// Issue a new reload token. Responses to older tokens are ignored.
    pub fn reload_diff_info(&mut self) -> ReloadRequest {
        let token = self.reloads.issue();
        log::debug!("requesting diff reload {}", token.version());
        ReloadRequest {
            token,
            intraline: self.prefs.intraline_difference,
            ignore_whitespace: self.prefs.ignore_whitespace,
        }
    }

    /// Apply a reload response. Returns false when `token` is stale.
    pub fn apply_reload(&mut self, token: ReloadToken, diff: DiffInfo) -> bool {
        if !self.reloads.is_current(token) {
            log::debug!(
                "discarding stale diff reload {} (latest {})",
                token.version(),
                self.reloads.latest().version()
            );
            return false;
        }
        self.intraline_visible = self.prefs.intraline_difference;
        self.render(diff);
        true
    }

    // ==================== Preferences ====================

    pub fn set_context(&mut self, context: Context) {
        self.prefs.context = context;
        self.skips.remove_all(&mut self.panes);
        self.render_skips();
        self.pump();
        let side = self.focus;
        let cursor = self.panes.get(side).cursor();
        self.panes.get_mut(side).scroll_into_view(cursor);
        self.pump();
    }

    /// Show or hide intraline marks. Turning them on when the diff was
    /// fetched without them needs a reload, which is returned.
    pub fn set_show_intraline(&mut self, show: bool) -> Option<ReloadRequest> {
        self.prefs.intraline_difference = show;
        self.intraline_visible = show;
        (show && self.diff.intraline_status == IntraLineStatus::Off).then(|| self.reload_diff_info())
    }

    /// Flip intraline marks; not possible after the producer timed out
    pub fn toggle_show_intraline(&mut self) -> Option<ReloadRequest> {
        match self.diff.intraline_status {
            IntraLineStatus::Off | IntraLineStatus::Ok => {
                self.set_show_intraline(!self.prefs.intraline_difference)
            }
            IntraLineStatus::Timeout => {
                log::debug!("intraline toggle unavailable: producer timed out");
                None
            }
        }
    }

    pub fn set_ignore_whitespace(&mut self, ignore: bool) -> ReloadRequest {
        self.prefs.ignore_whitespace = ignore;
        self.reload_diff_info()
    }

    pub fn set_syntax_highlighting(&mut self, enabled: bool, injector: &mut dyn ModeInjector) {
        self.prefs.syntax_highlighting = enabled;
        if !enabled {
            self.clear_modes();
            return;
        }
        let types: Vec<&str> = DisplaySide::BOTH
            .iter()
            .filter_map(|&side| self.diff.content_type(side))
            .collect();
        match injector.inject(&types) {
            Ok(()) => {
                for side in DisplaySide::BOTH {
                    let mode = self.diff.content_type(side).and_then(|ct| injector.mode_for(ct));
                    self.panes.get_mut(side).set_mode(mode);
                }
            }
            Err(err) => {
                log::warn!("syntax highlighting disabled: {err}");
                self.prefs.syntax_highlighting = false;
                self.clear_modes();
            }
        }
    }

    fn clear_modes(&mut self) {
        for pane in self.panes.iter_mut() {
            pane.set_mode(None);
        }
    }

    fn apply_pane_options(&mut self) {
        let options = Self::pane_options(&self.prefs);
        for pane in self.panes.iter_mut() {
            pane.set_options(options.clone());
        }
    }

    pub fn set_show_line_numbers(&mut self, show: bool) {
        self.prefs.show_line_numbers = show;
        self.apply_pane_options();
    }

    pub fn set_show_tabs(&mut self, show: bool) {
        self.prefs.show_tabs = show;
        self.apply_pane_options();
    }

    pub fn set_show_whitespace_errors(&mut self, show: bool) {
        self.prefs.show_whitespace_errors = show;
        self.apply_pane_options();
    }

    // ==================== Queries ====================

    pub fn line_on_other(&self, side: DisplaySide, line: usize) -> LineOnOther {
        self.mapper.line_on_other(side, line)
    }

    pub fn get_diff_chunk(&self, side: DisplaySide, line: usize) -> Option<DiffChunkInfo> {
        self.chunks.chunk_at(side, line).copied()
    }

    // ==================== Navigation ====================

    pub fn set_viewport_height(&mut self, height: f64) {
        for pane in self.panes.iter_mut() {
            pane.set_viewport_height(height);
        }
        self.pump();
    }

    fn focus_side(&mut self, side: DisplaySide) {
        self.focus = side;
        self.panes.get_mut(side).focus();
    }

    fn current_line(&self, side: DisplaySide) -> usize {
        let pane = self.panes.get(side);
        pane.active_line().unwrap_or(pane.cursor())
    }

    /// Jump to the next or previous chunk. Returns false at either end.
    pub fn diff_chunk_nav(&mut self, dir: Direction) -> bool {
        let side = self.focus;
        let line = self.current_line(side);
        let Some(target) = self.chunks.navigate(side, line, dir).copied() else {
            log::debug!("no {dir:?} chunk from {side:?}:{line}");
            return false;
        };
        self.focus_side(target.side);
        let pane = self.panes.get_mut(target.side);
        pane.set_cursor(target.start);
        pane.scroll_to_center(target.start);
        self.pump();
        true
    }

    /// Move focus to `dst`, carrying the cursor over when its line has a
    /// counterpart there
    pub fn move_cursor_to_side(&mut self, dst: DisplaySide) {
        let src = self.focus;
        if src == dst {
            return;
        }
        let line = self.current_line(src);
        let info = self.mapper.line_on_other(src, line);
        if info.aligned && line < self.mapper.line(src) {
            self.panes.get_mut(dst).set_cursor(info.line);
        }
        self.focus_side(dst);
        let cursor = self.panes.get(dst).cursor();
        self.panes.get_mut(dst).scroll_into_view(cursor);
        self.pump();
    }

    pub fn set_cursor(&mut self, side: DisplaySide, line: usize) {
        self.focus_side(side);
        let line = self.nearest_visible(side, line);
        let pane = self.panes.get_mut(side);
        pane.set_cursor(line);
        pane.scroll_into_view(line);
        self.pump();
    }

    /// Move the focused cursor by `delta` visible lines
    pub fn move_cursor(&mut self, delta: isize) {
        let side = self.focus;
        let pane = self.panes.get(side);
        let mut line = pane.cursor();
        let mut last_visible = line;
        let mut remaining = delta.unsigned_abs();
        while remaining > 0 {
            let next = if delta > 0 {
                Some(line + 1).filter(|&n| n < pane.line_count())
            } else {
                line.checked_sub(1)
            };
            let Some(next) = next else {
                break;
            };
            line = next;
            if !pane.is_hidden(line) {
                last_visible = line;
                remaining -= 1;
            }
        }
        let pane = self.panes.get_mut(side);
        pane.set_cursor(last_visible);
        pane.scroll_into_view(last_visible);
        self.pump();
    }

    fn nearest_visible(&self, side: DisplaySide, line: usize) -> usize {
        let pane = self.panes.get(side);
        let line = line.min(pane.line_count() - 1);
        (line..pane.line_count())
            .chain((0..line).rev())
            .find(|&l| !pane.is_hidden(l))
            .unwrap_or(line)
    }

    pub fn scroll_to(&mut self, side: DisplaySide, y: f64) {
        self.panes.get_mut(side).scroll_to(y);
        self.pump();
    }

    /// Scroll the focused pane by `dy`
    pub fn scroll_by(&mut self, dy: f64) {
        let side = self.focus;
        let top = self.panes.get(side).scroll_top();
        self.scroll_to(side, top + dy);
    }

    // ==================== Comments and skips ====================

    pub fn toggle_open_box(&mut self) -> bool {
        let side = self.focus;
        let line = self.panes.get(side).cursor();
        let toggled = self.comments.toggle_open_box(&mut self.panes, side, line);
        self.pump();
        toggled
    }

    pub fn open_close_all(&mut self) -> bool {
        let side = self.focus;
        let line = self.panes.get(side).cursor();
        let toggled = self.comments.open_close_all(&mut self.panes, side, line);
        self.pump();
        toggled
    }

    pub fn set_expand_all_comments(&mut self, expand: bool) {
        self.prefs.expand_all_comments = expand;
        self.comments.set_expand_all(&mut self.panes, expand);
        self.pump();
    }

    pub fn expand_skip(&mut self, idx: usize, how: Expand) -> bool {
        let expanded = self.skips.expand(idx, how, &mut self.panes);
        self.pump();
        expanded
    }

    /// Expand the skip at or next to the focused cursor
    pub fn expand_skip_at_cursor(&mut self, how: Expand) -> bool {
        let side = self.focus;
        let line = self.panes.get(side).cursor();
        match self.skips.skip_near(side, line) {
            Some(idx) => self.expand_skip(idx, how),
            None => false,
        }
    }

    // ==================== Event plumbing ====================

    /// Dispatch pane events and run deferred work until nothing is left
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut busy = false;
            for side in DisplaySide::BOTH {
                let events = self.panes.get_mut(side).take_events();
                busy |= !events.is_empty();
                for event in events {
                    self.dispatch(side, &event);
                }
            }
            if self.deferred.is_scheduled() {
                busy = true;
                self.flush_deferred();
            }
            if !busy {
                return;
            }
        }
        log::warn!("view did not settle after {MAX_PUMP_ROUNDS} rounds");
    }

    fn dispatch(&mut self, side: DisplaySide, event: &PaneEvent) {
        for handler in self.events.handlers(side, event.kind()) {
            handler(self, side, event);
        }
    }

    /// Run the current batch of deferred work
    pub fn flush_deferred(&mut self) {
        for task in self.deferred.take_batch() {
            match task {
                Deferred::UpdateActiveLine(side) => self.update_active_line(side),
                Deferred::ResizePadding(side, line) => {
                    self.padding
                        .resize_padding_on_other_side(&mut self.panes, side, line)
                }
            }
        }
    }

    fn on_cursor_activity(&mut self, side: DisplaySide, _event: &PaneEvent) {
        self.deferred.defer(Deferred::UpdateActiveLine(side));
    }

    fn on_scroll(&mut self, side: DisplaySide, _event: &PaneEvent) {
        self.scroll.on_scroll(side, &mut self.panes, &self.mapper);
    }

    fn on_render_line(&mut self, side: DisplaySide, event: &PaneEvent) {
        let PaneEvent::RenderLine(line) = *event else {
            return;
        };
        if self.padding.contains(side, line) {
            self.deferred.defer(Deferred::ResizePadding(side, line));
            return;
        }
        if let Some(chunk) = self.chunks.chunk_at(side, line).copied() {
            if self.padding.contains(side, chunk.end) {
                self.deferred.defer(Deferred::ResizePadding(side, chunk.end));
            }
            return;
        }
        self.resize_comment_padding(side, line);
    }

    fn resize_comment_padding(&mut self, side: DisplaySide, line: usize) {
        if line >= self.mapper.line(side) {
            return;
        }
        let info = self.mapper.line_on_other(side, line);
        let other = side.other();
        if !info.aligned || info.line >= self.panes.get(other).line_count() {
            return;
        }
        let involved = !self.comments.boxes_at(side, line).is_empty()
            || !self.comments.boxes_at(other, info.line).is_empty()
            || self.padding.has_comment_padding(side, line)
            || self.padding.has_comment_padding(other, info.line);
        if involved {
            self.padding
                .resize_comment_padding(&mut self.panes, side, line, info.line);
        }
    }

    fn update_active_line(&mut self, side: DisplaySide) {
        let cursor = self.panes.get(side).cursor();
        if self.panes.get(side).active_line() == Some(cursor) {
            return;
        }
        for pane in self.panes.iter_mut() {
            pane.set_active_line(None);
        }
        self.panes.get_mut(side).set_active_line(Some(cursor));
        let info = self.mapper.line_on_other(side, cursor);
        if info.aligned && cursor < self.mapper.line(side) {
            self.panes.get_mut(side.other()).set_active_line(Some(info.line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeRegion, FileMeta, Region, Span};
    use crate::error::ModeError;
    use crate::mode::PlainText;
    use crate::pane::WidgetKind;

    fn common(start: usize, n: usize) -> Region {
        Region::Common((start..start + n).map(|i| format!("same {i}")).collect())
    }

    fn change(a: &[&str], b: &[&str]) -> Region {
        Region::Change(ChangeRegion {
            a: a.iter().map(|s| s.to_string()).collect(),
            b: b.iter().map(|s| s.to_string()).collect(),
            edit_a: None,
            edit_b: None,
        })
    }

    fn meta(lines: usize) -> Option<FileMeta> {
        Some(FileMeta {
            name: "lib.rs".to_string(),
            content_type: Some("text/x-rustsrc".to_string()),
            lines,
        })
    }

    /// A: 0-2 same, 3-4 edit, 5-14 same, 15-17 same, 18 deleted, 19-20 same
    /// B: 0-2 same, 3-5 edit, 6-15 same, 16-17 inserted, 18-20 same, 21-22 same
    fn sample() -> DiffInfo {
        DiffInfo {
            meta_a: meta(21),
            meta_b: meta(23),
            intraline_status: IntraLineStatus::Ok,
            content: vec![
                common(0, 3),
                change(&["a3", "a4"], &["b3", "b4", "b5"]),
                common(10, 10),
                change(&[], &["b16", "b17"]),
                common(30, 3),
                change(&["a18"], &[]),
                common(40, 2),
            ],
        }
    }

    fn view(prefs: DiffPreferences, diff: DiffInfo, comments: Vec<CommentInfo>) -> SideBySide {
        let mut view = SideBySide::new(prefs);
        view.set_viewport_height(8.0);
        let reload = view.display(diff, comments, &mut PlainText);
        assert!(reload.is_none());
        view
    }

    fn whole_file() -> DiffPreferences {
        DiffPreferences {
            context: Context::WholeFile,
            ..Default::default()
        }
    }

    /// Every line outside a chunk starts at the same height as its
    /// counterpart
    fn assert_aligned(view: &SideBySide) {
        let a = view.pane(DisplaySide::A);
        let b = view.pane(DisplaySide::B);
        for line in 0..view.mapper().line_a() {
            if a.is_hidden(line) || view.get_diff_chunk(DisplaySide::A, line).is_some() {
                continue;
            }
            let other = view.line_on_other(DisplaySide::A, line);
            assert!(other.aligned);
            let (ya, yb) = (a.text_top(line), b.text_top(other.line));
            assert!((ya - yb).abs() <= 1.0, "A{line}@{ya} vs B{}@{yb}", other.line);
        }
    }

    #[test]
    fn test_display_aligns_panes() {
        let view = view(whole_file(), sample(), Vec::new());
        assert_eq!(view.chunks().len(), 4);
        assert_aligned(&view);
        assert_eq!(
            view.pane(DisplaySide::A).total_height(),
            view.pane(DisplaySide::B).total_height()
        );
    }

    #[test]
    fn test_comments_keep_alignment() {
        let comments = CommentInfo::list_from_json(
            r#"[
                { "side": "B", "line": 9, "message": "one\ntwo\nthree" },
                { "side": "A", "line": 4, "message": "in the edit" },
                { "side": "B", "line": 17, "message": "in the insertion" }
            ]"#,
        )
        .unwrap();
        let prefs = DiffPreferences {
            expand_all_comments: true,
            ..whole_file()
        };
        let mut view = view(prefs, sample(), comments);
        assert_aligned(&view);

        view.set_cursor(DisplaySide::B, 8);
        assert!(view.toggle_open_box());
        assert_aligned(&view);
        assert_eq!(
            view.pane(DisplaySide::A).widget_heights_at(7, WidgetKind::CommentPadding),
            1.0
        );
    }

    #[test]
    fn test_chunk_navigation_lands_on_insertion_half() {
        let mut view = view(whole_file(), sample(), Vec::new());
        view.show_view(None);
        assert_eq!(view.focused(), DisplaySide::A);
        assert_eq!(view.pane(DisplaySide::A).cursor(), 3);

        assert!(view.diff_chunk_nav(Direction::Next));
        assert_eq!(view.focused(), DisplaySide::B);
        assert_eq!(view.pane(DisplaySide::B).cursor(), 3);

        assert!(view.diff_chunk_nav(Direction::Next));
        assert_eq!(view.pane(DisplaySide::B).cursor(), 16);
        assert!(view.diff_chunk_nav(Direction::Next));
        assert_eq!((view.focused(), view.pane(DisplaySide::A).cursor()), (DisplaySide::A, 18));
        assert!(!view.diff_chunk_nav(Direction::Next));

        assert!(view.diff_chunk_nav(Direction::Prev));
        assert_eq!((view.focused(), view.pane(DisplaySide::B).cursor()), (DisplaySide::B, 16));
    }

    #[test]
    fn test_active_line_only_marks_aligned_counterpart() {
        let mut view = view(whole_file(), sample(), Vec::new());
        view.set_cursor(DisplaySide::B, 10);
        assert_eq!(view.pane(DisplaySide::B).active_line(), Some(10));
        assert_eq!(view.pane(DisplaySide::A).active_line(), Some(9));

        view.set_cursor(DisplaySide::B, 16);
        assert_eq!(view.pane(DisplaySide::B).active_line(), Some(16));
        assert_eq!(view.pane(DisplaySide::A).active_line(), None);
    }

    #[test]
    fn test_move_cursor_to_side() {
        let mut view = view(whole_file(), sample(), Vec::new());
        view.set_cursor(DisplaySide::B, 20);
        view.move_cursor_to_side(DisplaySide::A);
        assert_eq!(view.focused(), DisplaySide::A);
        assert_eq!(view.pane(DisplaySide::A).cursor(), 17);

        view.set_cursor(DisplaySide::A, 18);
        view.set_cursor(DisplaySide::B, 2);
        view.set_cursor(DisplaySide::A, 18);
        view.move_cursor_to_side(DisplaySide::B);
        assert_eq!(view.pane(DisplaySide::B).cursor(), 2);
    }

    #[test]
    fn test_stale_reload_is_discarded() {
        let mut view = view(whole_file(), sample(), Vec::new());
        for _ in 0..6 {
            view.reload_diff_info();
        }
        let seven = view.reload_diff_info();
        let eight = view.reload_diff_info();
        assert_eq!((seven.token.version(), eight.token.version()), (7, 8));

        let mut newer = sample();
        newer.content = vec![common(0, 3), change(&["x"], &["y"]), common(10, 10)];
        newer.meta_a = meta(14);
        newer.meta_b = meta(14);
        assert!(view.apply_reload(eight.token, newer.clone()));
        let chunks = view.chunks().chunks().to_vec();

        assert!(!view.apply_reload(seven.token, sample()));
        assert_eq!(view.diff(), &newer);
        assert_eq!(view.chunks().chunks(), chunks.as_slice());
        assert_aligned(&view);
    }

    #[test]
    fn test_intraline_toggle_requests_reload_when_missing() {
        let mut diff = sample();
        diff.intraline_status = IntraLineStatus::Off;
        let mut view = SideBySide::new(whole_file());
        let reload = view.display(diff, Vec::new(), &mut PlainText).unwrap();
        assert!(reload.intraline);

        let mut view = view_with_status(IntraLineStatus::Ok);
        assert!(view.toggle_show_intraline().is_none());
        assert!(!view.intraline_visible());
        assert!(view.toggle_show_intraline().is_none());
        assert!(view.intraline_visible());

        let mut view = view_with_status(IntraLineStatus::Timeout);
        assert!(view.toggle_show_intraline().is_none());
        assert!(view.intraline_visible());
    }

    fn view_with_status(status: IntraLineStatus) -> SideBySide {
        let mut diff = sample();
        diff.intraline_status = status;
        view(whole_file(), diff, Vec::new())
    }

    #[test]
    fn test_reload_keeps_intraline_marks() {
        let mut view = view(whole_file(), sample(), Vec::new());
        let request = view.set_ignore_whitespace(true);
        assert!(request.ignore_whitespace);
        let mut diff = sample();
        if let Region::Change(change) = &mut diff.content[1] {
            change.edit_b = Some(vec![Span(1, 1)]);
        }
        assert!(view.apply_reload(request.token, diff));
        assert_eq!(view.pane(DisplaySide::B).marks_on_line(3).count(), 2);
    }

    struct FailingModes;

    impl ModeInjector for FailingModes {
        fn inject(&mut self, content_types: &[&str]) -> Result<(), ModeError> {
            Err(ModeError::Unknown(content_types.join(",")))
        }
    }

    struct RecordingModes(Vec<String>);

    impl ModeInjector for RecordingModes {
        fn inject(&mut self, content_types: &[&str]) -> Result<(), ModeError> {
            self.0.extend(content_types.iter().map(|s| s.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_syntax_injection() {
        let mut view = SideBySide::new(whole_file());
        let mut modes = RecordingModes(Vec::new());
        view.display(sample(), Vec::new(), &mut modes);
        assert_eq!(modes.0, vec!["text/x-rustsrc", "text/x-rustsrc"]);
        assert_eq!(view.pane(DisplaySide::B).mode(), Some("text/x-rustsrc"));

        view.set_syntax_highlighting(true, &mut FailingModes);
        assert!(!view.prefs().syntax_highlighting);
        assert_eq!(view.pane(DisplaySide::A).mode(), None);
    }

    #[test]
    fn test_large_file_skips_modes() {
        let mut diff = sample();
        diff.meta_b = meta(600);
        let mut view = SideBySide::new(whole_file());
        let mut modes = RecordingModes(Vec::new());
        view.display(diff, Vec::new(), &mut modes);
        assert!(view.is_large_file());
        assert!(modes.0.is_empty());
        assert_eq!(view.pane(DisplaySide::B).mode(), None);
    }

    #[test]
    fn test_context_collapse_and_expand() {
        let prefs = DiffPreferences {
            context: Context::Lines(2),
            ..Default::default()
        };
        let mut view = view(prefs, sample(), Vec::new());
        // Middle run A 5..=14 keeps two lines each side.
        assert_eq!(view.skips().len(), 1);
        assert!(view.pane(DisplaySide::A).is_hidden(7));
        assert!(view.pane(DisplaySide::B).is_hidden(8));
        assert_aligned(&view);

        view.set_cursor(DisplaySide::B, 7);
        assert!(view.expand_skip_at_cursor(Expand::All));
        assert!(view.skips().is_empty());

        // With one line of context the three leading lines collapse too.
        view.set_context(Context::Lines(1));
        assert_eq!(view.skips().len(), 2);
        assert!(!view.pane(DisplaySide::B).is_hidden(view.pane(DisplaySide::B).cursor()));
        view.set_context(Context::WholeFile);
        assert!(view.skips().is_empty());
        assert!(view.pane(DisplaySide::A).collapsed().is_empty());
    }

    #[test]
    fn test_move_cursor_skips_hidden_lines() {
        let prefs = DiffPreferences {
            context: Context::Lines(2),
            ..Default::default()
        };
        let mut view = view(prefs, sample(), Vec::new());
        view.set_cursor(DisplaySide::A, 6);
        view.move_cursor(1);
        assert_eq!(view.pane(DisplaySide::A).cursor(), 13);
        view.move_cursor(-1);
        assert_eq!(view.pane(DisplaySide::A).cursor(), 6);
        view.move_cursor(-100);
        assert_eq!(view.pane(DisplaySide::A).cursor(), 0);
    }

    #[test]
    fn test_scroll_sync_through_events() {
        let mut view = view(whole_file(), sample(), Vec::new());
        view.scroll_to(DisplaySide::B, 12.0);
        let a = view.pane(DisplaySide::A);
        let b = view.pane(DisplaySide::B);
        assert_eq!(b.scroll_top(), 12.0);
        assert_eq!(a.scroll_top(), 12.0);
        assert_eq!(a.line_at_height(12.0), 11);
        assert_eq!(b.line_at_height(12.0), 12);
    }

    #[test]
    fn test_no_diff_flag() {
        let diff = DiffInfo {
            meta_a: meta(3),
            meta_b: meta(3),
            content: vec![common(0, 3)],
            intraline_status: IntraLineStatus::Ok,
            ..Default::default()
        };
        let mut view = view(whole_file(), diff, Vec::new());
        assert!(view.is_no_diff());
        view.show_view(None);
        assert_eq!(view.focused(), DisplaySide::B);
        assert!(!view.diff_chunk_nav(Direction::Next));
    }
}
