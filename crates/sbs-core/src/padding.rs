//! Blank-space widgets that keep the two columns vertically aligned
//!
//! Every chunk gets a padding widget on the *other* side, just below the
//! line where the chunk's gap sits. Records are keyed by the chunk's last
//! line on its own side, so a height change of that line can find the
//! padding it has to resize.
//!
//! Comment boxes on lines outside any chunk are balanced by a separate set
//! of comment paddings on the counterpart line.

use crate::pane::{heights_differ, PanePair, WidgetId, WidgetKind};
use crate::side::DisplaySide;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddingRecord {
    pub widget: WidgetId,
    /// Side the widget lives on
    pub side: DisplaySide,
    /// Line the widget hangs below; `None` puts it above the first line
    pub line: Option<usize>,
    /// Length of the chunk this padding balances
    pub chunk_len: usize,
}

#[derive(Debug, Default)]
pub struct PaddingCoordinator {
    records: FxHashMap<(DisplaySide, usize), PaddingRecord>,
    comment_pads: FxHashMap<(DisplaySide, usize), WidgetId>,
}

impl PaddingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a zero-height padding on `pad_side` below `pad_line` and key
    /// it by `other_line`, the last line of the chunk on the opposite side.
    pub fn add_chunk_padding(
        &mut self,
        panes: &mut PanePair,
        pad_side: DisplaySide,
        pad_line: Option<usize>,
        other_line: usize,
        chunk_len: usize,
    ) -> WidgetId {
        let pane = panes.get_mut(pad_side);
        let widget = match pad_line {
            Some(line) => pane.add_widget(line, false, 0.0, WidgetKind::Padding),
            None => pane.add_widget(0, true, 0.0, WidgetKind::Padding),
        };
        self.records.insert(
            (pad_side.other(), other_line),
            PaddingRecord {
                widget,
                side: pad_side,
                line: pad_line,
                chunk_len,
            },
        );
        widget
    }

    pub fn record(&self, side: DisplaySide, line: usize) -> Option<&PaddingRecord> {
        self.records.get(&(side, line))
    }

    pub fn contains(&self, side: DisplaySide, line: usize) -> bool {
        self.records.contains_key(&(side, line))
    }

    /// Keys of all chunk records, sorted
    pub fn keys(&self) -> Vec<(DisplaySide, usize)> {
        let mut keys: Vec<_> = self.records.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove every padding widget and forget all records
    pub fn clear(&mut self, panes: &mut PanePair) {
        for pane in panes.iter_mut() {
            pane.remove_widgets_where(|w| {
                matches!(w.kind, WidgetKind::Padding | WidgetKind::CommentPadding)
            });
        }
        self.records.clear();
        self.comment_pads.clear();
    }

    /// Rebalance the padding of the chunk ending at `line` on `my_side`.
    ///
    /// When the other side also holds a chunk ending at the padding's line
    /// (the two halves of an edit), both paddings are set in this one call:
    /// the shorter half gets the difference, the taller half gets zero.
    pub fn resize_padding_on_other_side(&self, panes: &mut PanePair, my_side: DisplaySide, line: usize) {
        let Some(other_rec) = self.records.get(&(my_side, line)).copied() else {
            return;
        };
        let other_side = my_side.other();
        let (mine, other) = panes.split_mut(my_side);

        let block_end = line + 1;
        let mut my_chunk_height =
            mine.height_at_line(block_end) - mine.height_at_line(block_end - other_rec.chunk_len);
        let other_pad_height = other.widget_height(other_rec.widget);

        let paired = other_rec
            .line
            .and_then(|ol| self.records.get(&(other_side, ol)).map(|rec| (ol, *rec)));

        match paired {
            Some((other_line, my_rec)) => {
                let my_pad_height = mine.widget_height(my_rec.widget);
                my_chunk_height -= my_pad_height;
                let other_end = other_line + 1;
                let other_chunk_height = other.height_at_line(other_end)
                    - other.height_at_line(other_end - my_rec.chunk_len)
                    - other_pad_height;
                let delta = my_chunk_height - other_chunk_height;
                if delta > 0.0 {
                    mine.set_widget_height(my_rec.widget, 0.0);
                    other.set_widget_height(other_rec.widget, delta);
                } else {
                    mine.set_widget_height(my_rec.widget, -delta);
                    other.set_widget_height(other_rec.widget, 0.0);
                }
            }
            None => {
                other.set_widget_height(other_rec.widget, my_chunk_height);
            }
        }
    }

    /// Balance comment boxes on `line` of `side` against its aligned
    /// counterpart `other_line`. Returns true when a padding changed.
    pub fn resize_comment_padding(
        &mut self,
        panes: &mut PanePair,
        side: DisplaySide,
        line: usize,
        other_line: usize,
    ) -> bool {
        let other_side = side.other();
        let mine = panes.get(side).widget_heights_at(line, WidgetKind::Comment);
        let theirs = panes.get(other_side).widget_heights_at(other_line, WidgetKind::Comment);
        let delta = mine - theirs;

        let mut changed = false;
        changed |= self.set_comment_pad(panes, side, line, (-delta).max(0.0));
        changed |= self.set_comment_pad(panes, other_side, other_line, delta.max(0.0));
        changed
    }

    fn set_comment_pad(&mut self, panes: &mut PanePair, side: DisplaySide, line: usize, height: f64) -> bool {
        let pane = panes.get_mut(side);
        match self.comment_pads.get(&(side, line)) {
            Some(&widget) => pane.set_widget_height(widget, height),
            None if heights_differ(height, 0.0) => {
                let widget = pane.add_widget(line, false, height, WidgetKind::CommentPadding);
                self.comment_pads.insert((side, line), widget);
                true
            }
            None => false,
        }
    }

    pub fn has_comment_padding(&self, side: DisplaySide, line: usize) -> bool {
        self.comment_pads.contains_key(&(side, line))
    }
}
