use super::App;
use sbs_core::{Direction, DisplaySide, Expand};

/// Lines revealed by a partial skip expansion
pub const EXPAND_STEP: usize = 10;

impl App {
    pub fn push_count_digit(&mut self, digit: u8) {
        let count = self.pending_count.unwrap_or(0);
        self.pending_count = Some(count.saturating_mul(10).saturating_add(digit as usize));
    }

    /// Take the pending count, defaulting to 1
    pub fn take_count(&mut self) -> usize {
        self.pending_count.take().unwrap_or(1).max(1)
    }

    pub fn reset_count(&mut self) {
        self.pending_count = None;
    }

    pub fn focused(&self) -> DisplaySide {
        self.view.focused()
    }

    pub fn cursor_down(&mut self, count: usize) {
        self.view.move_cursor(count as isize);
    }

    pub fn cursor_up(&mut self, count: usize) {
        self.view.move_cursor(-(count as isize));
    }

    pub fn page_down(&mut self) {
        let rows = self.viewport_rows().max(1) as usize;
        self.cursor_down(rows);
    }

    pub fn page_up(&mut self) {
        let rows = self.viewport_rows().max(1) as usize;
        self.cursor_up(rows);
    }

    pub fn half_page_down(&mut self) {
        let rows = (self.viewport_rows() as f64 / 2.0).ceil();
        self.view.scroll_by(rows);
    }

    pub fn half_page_up(&mut self) {
        let rows = (self.viewport_rows() as f64 / 2.0).ceil();
        self.view.scroll_by(-rows);
    }

    pub fn goto_start(&mut self) {
        let side = self.focused();
        self.view.set_cursor(side, 0);
    }

    pub fn goto_end(&mut self) {
        let side = self.focused();
        let last = self.view.pane(side).line_count().saturating_sub(1);
        self.view.set_cursor(side, last);
    }

    pub fn next_chunk(&mut self, count: usize) {
        self.chunk_nav(Direction::Next, count);
    }

    pub fn prev_chunk(&mut self, count: usize) {
        self.chunk_nav(Direction::Prev, count);
    }

    fn chunk_nav(&mut self, dir: Direction, count: usize) {
        for _ in 0..count {
            if !self.view.diff_chunk_nav(dir) {
                self.message = Some(match dir {
                    Direction::Next => "no more changes below".to_string(),
                    Direction::Prev => "no more changes above".to_string(),
                });
                break;
            }
        }
    }

    pub fn focus_side(&mut self, side: DisplaySide) {
        self.view.move_cursor_to_side(side);
    }

    pub fn switch_side(&mut self) {
        let side = self.focused().other();
        self.focus_side(side);
    }

    /// 1-based position of the chunk under the cursor, and the chunk count
    pub fn chunk_position(&self) -> (Option<usize>, usize) {
        let side = self.focused();
        let cursor = self.view.pane(side).cursor();
        let chunks = self.view.chunks().chunks();
        let current = self
            .view
            .get_diff_chunk(side, cursor)
            .and_then(|chunk| chunks.iter().position(|c| *c == chunk))
            .map(|idx| idx + 1);
        (current, chunks.len())
    }

    pub fn toggle_comment(&mut self) {
        if !self.view.toggle_open_box() {
            self.message = Some("no comment on this line".to_string());
        }
    }

    pub fn toggle_line_comments(&mut self) {
        if !self.view.open_close_all() {
            self.message = Some("no comment on this line".to_string());
        }
    }

    pub fn toggle_expand_all_comments(&mut self) {
        let expand = !self.view.prefs().expand_all_comments;
        self.view.set_expand_all_comments(expand);
    }

    pub fn expand_skip(&mut self, how: Expand) {
        if !self.view.expand_skip_at_cursor(how) {
            self.message = Some("no collapsed lines here".to_string());
        }
    }

    pub fn expand_skip_before(&mut self) {
        self.expand_skip(Expand::Before(EXPAND_STEP));
    }

    pub fn expand_skip_after(&mut self) {
        self.expand_skip(Expand::After(EXPAND_STEP));
    }
}
