//! Read-only text pane: the editor-component surface the view drives
//!
//! A pane holds the lines of one side plus everything layered on top of
//! them: line classes, character marks, gutter markers, line widgets
//! (padding, comment boxes, skip bars), collapsed ranges, the cursor and the
//! scroll position. Mutations that would make a real editor re-measure or
//! notify listeners queue a [`PaneEvent`] which the view drains.
//!
//! Heights use abstract units. A visible text line is `line_height` tall
//! (1.0 by default, one terminal row). The *block* of a line is its widgets
//! above, its text and its widgets below. `height_at_line(n)` is the top of
//! block `n`.

use crate::side::DisplaySide;
use std::ops::Range;

/// Class attached to a whole line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    /// Strong background of inserted/deleted content
    Diff,
    /// Weak background of edited content
    IntralineBg,
    ActiveLine,
}

/// Layer a line class is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClassWhere {
    /// The whole line including gutter
    Wrap,
    /// Text background only
    Background,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDecor {
    pub wrap: Vec<LineClass>,
    pub background: Vec<LineClass>,
}

impl LineDecor {
    fn layer_mut(&mut self, place: LineClassWhere) -> &mut Vec<LineClass> {
        match place {
            LineClassWhere::Wrap => &mut self.wrap,
            LineClassWhere::Background => &mut self.background,
        }
    }

    pub fn has(&self, place: LineClassWhere, class: LineClass) -> bool {
        match place {
            LineClassWhere::Wrap => self.wrap.contains(&class),
            LineClassWhere::Background => self.background.contains(&class),
        }
    }
}

/// Line/character position, `ch` counted in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Pos {
    pub line: usize,
    pub ch: usize,
}

impl Pos {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Character range highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMarker {
    pub from: Pos,
    pub to: Pos,
    pub class: LineClass,
}

/// Change marker shown in the side gutter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GutterType {
    Insert,
    Delete,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Blank space balancing a chunk against the other side
    Padding,
    /// Blank space balancing a comment box on the other side
    CommentPadding,
    Comment,
    /// Collapsed run of common lines, with the number hidden
    SkipBar(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineWidget {
    pub id: WidgetId,
    pub line: usize,
    pub above: bool,
    pub height: f64,
    pub kind: WidgetKind,
}

/// Notifications a pane raises for the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneEvent {
    CursorActivity,
    /// The block of this line changed height or was (re)drawn
    RenderLine(usize),
    Scroll,
    Focus,
}

/// Display options mirrored from the preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneOptions {
    pub show_line_numbers: bool,
    pub tab_size: usize,
    pub show_tabs: bool,
    pub show_trailing_space: bool,
}

impl Default for PaneOptions {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            tab_size: 8,
            show_tabs: true,
            show_trailing_space: true,
        }
    }
}

/// Height differences below this are treated as equal
pub const HEIGHT_EPSILON: f64 = 0.5;

pub(crate) fn heights_differ(a: f64, b: f64) -> bool {
    (a - b).abs() >= HEIGHT_EPSILON
}

#[derive(Debug, Clone)]
pub struct Pane {
    side: DisplaySide,
    lines: Vec<String>,
    /// False when the file does not exist on this side
    present: bool,
    decor: Vec<LineDecor>,
    marks: Vec<TextMarker>,
    gutters: Vec<(usize, GutterType)>,
    widgets: Vec<LineWidget>,
    next_widget: u64,
    collapsed: Vec<Range<usize>>,
    cursor: usize,
    active_line: Option<usize>,
    scroll_top: f64,
    viewport_height: f64,
    line_height: f64,
    mode: Option<String>,
    options: PaneOptions,
    events: Vec<PaneEvent>,
}

impl Pane {
    /// A pane always has at least one (possibly empty) line, like an
    /// editor holding an empty document.
    pub fn new(side: DisplaySide, lines: Vec<String>, present: bool) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        let decor = vec![LineDecor::default(); lines.len()];
        Self {
            side,
            lines,
            present,
            decor,
            marks: Vec::new(),
            gutters: Vec::new(),
            widgets: Vec::new(),
            next_widget: 0,
            collapsed: Vec::new(),
            cursor: 0,
            active_line: None,
            scroll_top: 0.0,
            viewport_height: 0.0,
            line_height: 1.0,
            mode: None,
            options: PaneOptions::default(),
            events: Vec::new(),
        }
    }

    pub fn side(&self) -> DisplaySide {
        self.side
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn options(&self) -> &PaneOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PaneOptions) {
        self.options = options;
    }

    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub fn set_mode(&mut self, mode: Option<String>) {
        self.mode = mode;
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn set_line_height(&mut self, height: f64) {
        self.line_height = height;
        for line in 0..self.lines.len() {
            self.events.push(PaneEvent::RenderLine(line));
        }
    }

    // ==================== Decorations ====================

    pub fn add_line_class(&mut self, line: usize, place: LineClassWhere, class: LineClass) {
        if let Some(decor) = self.decor.get_mut(line) {
            let layer = decor.layer_mut(place);
            if !layer.contains(&class) {
                layer.push(class);
            }
        }
    }

    pub fn remove_line_class(&mut self, line: usize, place: LineClassWhere, class: LineClass) {
        if let Some(decor) = self.decor.get_mut(line) {
            decor.layer_mut(place).retain(|c| *c != class);
        }
    }

    pub fn line_decor(&self, line: usize) -> Option<&LineDecor> {
        self.decor.get(line)
    }

    pub fn mark_text(&mut self, from: Pos, to: Pos, class: LineClass) {
        if from < to {
            self.marks.push(TextMarker { from, to, class });
        }
    }

    pub fn marks(&self) -> &[TextMarker] {
        &self.marks
    }

    /// Char ranges of `line` covered by marks, in insertion order.
    ///
    /// `usize::MAX` as an end means "to the end of the line".
    pub fn marks_on_line(&self, line: usize) -> impl Iterator<Item = (Range<usize>, LineClass)> + '_ {
        self.marks.iter().filter_map(move |m| {
            if m.from.line > line || m.to.line < line {
                return None;
            }
            let start = if m.from.line == line { m.from.ch } else { 0 };
            let end = if m.to.line == line { m.to.ch } else { usize::MAX };
            (start < end).then_some((start..end, m.class))
        })
    }

    pub fn add_gutter(&mut self, line: usize, kind: GutterType) {
        self.gutters.push((line, kind));
    }

    pub fn gutter_at(&self, line: usize) -> Option<GutterType> {
        self.gutters
            .iter()
            .rev()
            .find(|(l, _)| *l == line)
            .map(|(_, kind)| *kind)
    }

    pub fn gutters(&self) -> &[(usize, GutterType)] {
        &self.gutters
    }

    pub fn clear_gutters(&mut self) {
        self.gutters.clear();
    }

    /// Drop diff colouring and character marks; the active line survives
    pub fn clear_markers(&mut self) {
        self.marks.clear();
        for decor in &mut self.decor {
            decor.wrap.retain(|c| *c == LineClass::ActiveLine);
            decor.background.retain(|c| *c == LineClass::ActiveLine);
        }
    }

    // ==================== Widgets ====================

    pub fn add_widget(&mut self, line: usize, above: bool, height: f64, kind: WidgetKind) -> WidgetId {
        let id = WidgetId(self.next_widget);
        self.next_widget += 1;
        let line = line.min(self.last_line());
        self.widgets.push(LineWidget {
            id,
            line,
            above,
            height,
            kind,
        });
        self.events.push(PaneEvent::RenderLine(line));
        id
    }

    pub fn widget(&self, id: WidgetId) -> Option<&LineWidget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn widget_height(&self, id: WidgetId) -> f64 {
        self.widget(id).map(|w| w.height).unwrap_or(0.0)
    }

    /// Resize a widget. Returns false (and stays quiet) when the height is
    /// unchanged, which is what stops measure/resize feedback loops.
    pub fn set_widget_height(&mut self, id: WidgetId, height: f64) -> bool {
        let Some(widget) = self.widgets.iter_mut().find(|w| w.id == id) else {
            return false;
        };
        if !heights_differ(widget.height, height) {
            return false;
        }
        widget.height = height;
        let line = widget.line;
        self.events.push(PaneEvent::RenderLine(line));
        true
    }

    pub fn set_widget_kind(&mut self, id: WidgetId, kind: WidgetKind) {
        if let Some(widget) = self.widgets.iter_mut().find(|w| w.id == id) {
            widget.kind = kind;
        }
    }

    pub fn remove_widget(&mut self, id: WidgetId) {
        if let Some(pos) = self.widgets.iter().position(|w| w.id == id) {
            let widget = self.widgets.remove(pos);
            self.events.push(PaneEvent::RenderLine(widget.line));
        }
    }

    pub fn remove_widgets_where(&mut self, mut pred: impl FnMut(&LineWidget) -> bool) {
        let mut touched = Vec::new();
        self.widgets.retain(|w| {
            if pred(w) {
                touched.push(w.line);
                false
            } else {
                true
            }
        });
        for line in touched {
            self.events.push(PaneEvent::RenderLine(line));
        }
    }

    /// Widgets of `line` in display order: above first, then below; within
    /// each group comments come before padding.
    pub fn widgets_at(&self, line: usize) -> Vec<&LineWidget> {
        let mut out: Vec<&LineWidget> = self.widgets.iter().filter(|w| w.line == line).collect();
        out.sort_by_key(|w| (!w.above, Self::kind_rank(w.kind), w.id));
        out
    }

    fn kind_rank(kind: WidgetKind) -> u8 {
        match kind {
            WidgetKind::SkipBar(_) => 0,
            WidgetKind::Comment => 1,
            WidgetKind::CommentPadding => 2,
            WidgetKind::Padding => 3,
        }
    }

    /// Total height of `kind` widgets attached to `line`
    pub fn widget_heights_at(&self, line: usize, kind: WidgetKind) -> f64 {
        self.widgets
            .iter()
            .filter(|w| w.line == line && w.kind == kind)
            .map(|w| w.height)
            .sum()
    }

    // ==================== Collapsed ranges ====================

    pub fn collapse(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let start = range.start;
        self.collapsed.push(range);
        self.events.push(PaneEvent::RenderLine(start));
    }

    pub fn expand(&mut self, range: &Range<usize>) {
        self.collapsed.retain(|r| r != range);
        self.events.push(PaneEvent::RenderLine(range.start));
    }

    pub fn is_hidden(&self, line: usize) -> bool {
        self.collapsed.iter().any(|r| r.contains(&line))
    }

    pub fn collapsed(&self) -> &[Range<usize>] {
        &self.collapsed
    }

    // ==================== Geometry ====================

    /// Height of every line block
    pub fn block_heights(&self) -> Vec<f64> {
        let mut blocks: Vec<f64> = (0..self.lines.len())
            .map(|line| if self.is_hidden(line) { 0.0 } else { self.line_height })
            .collect();
        for widget in &self.widgets {
            if let Some(block) = blocks.get_mut(widget.line) {
                *block += widget.height;
            }
        }
        blocks
    }

    /// Top of the block of `line`; `line_count()` gives the total height
    pub fn height_at_line(&self, line: usize) -> f64 {
        let blocks = self.block_heights();
        blocks[..line.min(blocks.len())].iter().sum()
    }

    pub fn total_height(&self) -> f64 {
        self.block_heights().iter().sum()
    }

    /// Line whose block covers height `y`, clamped to the document
    pub fn line_at_height(&self, y: f64) -> usize {
        let mut top = 0.0;
        for (line, block) in self.block_heights().into_iter().enumerate() {
            if y < top + block {
                return line;
            }
            top += block;
        }
        self.last_line()
    }

    /// Top of the text row of `line`, after its above-widgets
    pub fn text_top(&self, line: usize) -> f64 {
        let above: f64 = self
            .widgets
            .iter()
            .filter(|w| w.line == line && w.above)
            .map(|w| w.height)
            .sum();
        self.height_at_line(line) + above
    }

    // ==================== Cursor / active line ====================

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, line: usize) {
        self.cursor = line.min(self.last_line());
        self.events.push(PaneEvent::CursorActivity);
    }

    pub fn active_line(&self) -> Option<usize> {
        self.active_line
    }

    pub fn set_active_line(&mut self, line: Option<usize>) {
        if let Some(old) = self.active_line.take() {
            self.remove_line_class(old, LineClassWhere::Wrap, LineClass::ActiveLine);
        }
        if let Some(line) = line.filter(|&l| l < self.lines.len()) {
            self.add_line_class(line, LineClassWhere::Wrap, LineClass::ActiveLine);
            self.active_line = Some(line);
        }
    }

    pub fn focus(&mut self) {
        self.events.push(PaneEvent::Focus);
    }

    // ==================== Scrolling ====================

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        let clamped = self.clamp_scroll(self.scroll_top);
        self.scroll_to(clamped);
    }

    fn clamp_scroll(&self, y: f64) -> f64 {
        let max = (self.total_height() - self.viewport_height).max(0.0);
        y.clamp(0.0, max)
    }

    /// Scroll so `y` is at the top. Returns true when the offset moved, in
    /// which case a [`PaneEvent::Scroll`] is queued.
    pub fn scroll_to(&mut self, y: f64) -> bool {
        let y = self.clamp_scroll(y);
        if self.scroll_top == y {
            return false;
        }
        self.scroll_top = y;
        self.events.push(PaneEvent::Scroll);
        true
    }

    /// Scroll the minimum needed to show the text row of `line`
    pub fn scroll_into_view(&mut self, line: usize) -> bool {
        let top = self.text_top(line);
        let bottom = top + self.line_height;
        if top < self.scroll_top {
            self.scroll_to(top)
        } else if bottom > self.scroll_top + self.viewport_height && self.viewport_height > 0.0 {
            self.scroll_to(bottom - self.viewport_height)
        } else {
            false
        }
    }

    /// Put `line` roughly in the middle of the viewport
    pub fn scroll_to_center(&mut self, line: usize) -> bool {
        let y = self.text_top(line) - 0.5 * self.viewport_height;
        self.scroll_to(y)
    }

    // ==================== Events ====================

    /// Queue a redraw notification for `line`
    pub fn notify_render(&mut self, line: usize) {
        self.events.push(PaneEvent::RenderLine(line));
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn take_events(&mut self) -> Vec<PaneEvent> {
        std::mem::take(&mut self.events)
    }
}

/// The A and B panes, addressable by side
#[derive(Debug, Clone)]
pub struct PanePair {
    panes: [Pane; 2],
}

impl PanePair {
    pub fn new(a: Pane, b: Pane) -> Self {
        Self { panes: [a, b] }
    }

    pub fn get(&self, side: DisplaySide) -> &Pane {
        &self.panes[side.index()]
    }

    pub fn get_mut(&mut self, side: DisplaySide) -> &mut Pane {
        &mut self.panes[side.index()]
    }

    /// `(mine, other)` borrowed mutably at once
    pub fn split_mut(&mut self, mine: DisplaySide) -> (&mut Pane, &mut Pane) {
        let [a, b] = &mut self.panes;
        match mine {
            DisplaySide::A => (a, b),
            DisplaySide::B => (b, a),
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pane> {
        self.panes.iter_mut()
    }
}
