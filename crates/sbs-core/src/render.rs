//! Turns diff regions into line mapping, chunks, decorations and padding

use crate::chunk::DiffChunkInfo;
use crate::diff::{DiffInfo, Region, Span};
use crate::mapper::LineMapper;
use crate::padding::PaddingCoordinator;
use crate::pane::{GutterType, LineClass, LineClassWhere, PanePair, Pos};
use crate::side::DisplaySide;

/// Walks a region's lines by character count, treating each line end as
/// one extra character.
pub struct EditIterator<'a> {
    lines: &'a [String],
    start_line: usize,
    index: usize,
    offset: usize,
}

impl<'a> EditIterator<'a> {
    pub fn new(lines: &'a [String], start_line: usize) -> Self {
        Self {
            lines,
            start_line,
            index: 0,
            offset: 0,
        }
    }

    /// Move forward `chars` characters and return the position reached.
    ///
    /// Running off the end of the region stops at column 0 of the line after
    /// it.
    pub fn advance(&mut self, mut chars: usize) -> Pos {
        while let Some(line) = self.lines.get(self.index) {
            let remaining = line.chars().count() - self.offset + 1;
            if chars < remaining {
                let at = Pos::new(self.start_line + self.index, self.offset + chars);
                self.offset += chars;
                return at;
            }
            chars -= remaining;
            self.index += 1;
            self.offset = 0;
            if chars == 0 {
                return Pos::new(self.start_line + self.index, 0);
            }
        }
        Pos::new(self.start_line + self.lines.len(), 0)
    }
}

/// Output of one render pass
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub mapper: LineMapper,
    /// Chunks in region order
    pub chunks: Vec<DiffChunkInfo>,
}

pub struct DiffRenderer<'a> {
    panes: &'a mut PanePair,
    padding: &'a mut PaddingCoordinator,
    mapper: LineMapper,
    chunks: Vec<DiffChunkInfo>,
}

impl<'a> DiffRenderer<'a> {
    pub fn new(panes: &'a mut PanePair, padding: &'a mut PaddingCoordinator) -> Self {
        Self {
            panes,
            padding,
            mapper: LineMapper::new(),
            chunks: Vec::new(),
        }
    }

    pub fn render(mut self, diff: &DiffInfo) -> Rendered {
        // A file present on one side only is all insert or all delete;
        // painting it in the strong colour would be noise.
        let diff_color = if diff.meta_a.is_none() || diff.meta_b.is_none() {
            LineClass::IntralineBg
        } else {
            LineClass::Diff
        };

        for region in &diff.content {
            let orig_a = self.mapper.line_a();
            let orig_b = self.mapper.line_b();
            let change = match region {
                Region::Common(lines) => {
                    self.mapper.append_common(lines.len());
                    continue;
                }
                Region::Change(change) => change,
            };

            let a_len = change.a.len();
            let b_len = change.b.len();
            let color = if a_len == 0 || b_len == 0 {
                diff_color
            } else {
                LineClass::IntralineBg
            };
            self.color_lines(DisplaySide::A, LineClassWhere::Wrap, color, orig_a, orig_a + a_len);
            self.color_lines(DisplaySide::B, LineClassWhere::Wrap, color, orig_b, orig_b + b_len);

            self.mapper.append_common(a_len.min(b_len));
            if a_len < b_len {
                self.mapper.append_insert(b_len - a_len);
            } else if a_len > b_len {
                self.mapper.append_delete(a_len - b_len);
            }

            let end_a = self.mapper.line_a().checked_sub(1);
            let end_b = self.mapper.line_b().checked_sub(1);
            if let (true, Some(end_a)) = (a_len > 0, end_a) {
                self.add_chunk_and_padding(DisplaySide::B, end_b, end_a, a_len, b_len > 0);
            }
            if let (true, Some(end_b)) = (b_len > 0, end_b) {
                self.add_chunk_and_padding(DisplaySide::A, end_a, end_b, b_len, a_len > 0);
            }

            self.mark_edit(DisplaySide::A, &change.a, change.edit_a.as_deref(), orig_a);
            self.mark_edit(DisplaySide::B, &change.b, change.edit_b.as_deref(), orig_b);

            if a_len == 0 {
                self.panes.get_mut(DisplaySide::B).add_gutter(orig_b, GutterType::Insert);
            } else if b_len == 0 {
                self.panes.get_mut(DisplaySide::A).add_gutter(orig_a, GutterType::Delete);
            } else {
                self.panes.get_mut(DisplaySide::B).add_gutter(orig_b, GutterType::Edit);
            }
        }

        log::debug!(
            "rendered {} regions: {} chunks, {}/{} lines",
            diff.content.len(),
            self.chunks.len(),
            self.mapper.line_a(),
            self.mapper.line_b()
        );
        Rendered {
            mapper: self.mapper,
            chunks: self.chunks,
        }
    }

    fn color_lines(&mut self, side: DisplaySide, place: LineClassWhere, class: LineClass, start: usize, end: usize) {
        let pane = self.panes.get_mut(side);
        for line in start..end {
            pane.add_line_class(line, place, class);
        }
    }

    /// Pad `pad_side` below `pad_line` for the chunk ending at `other_end`
    /// on the opposite side, and record that chunk.
    fn add_chunk_and_padding(
        &mut self,
        pad_side: DisplaySide,
        pad_line: Option<usize>,
        other_end: usize,
        chunk_len: usize,
        edit: bool,
    ) {
        self.padding
            .add_chunk_padding(self.panes, pad_side, pad_line, other_end, chunk_len);
        self.chunks.push(DiffChunkInfo::new(
            pad_side.other(),
            other_end + 1 - chunk_len,
            other_end,
            edit,
        ));
    }

    fn mark_edit(&mut self, side: DisplaySide, lines: &[String], edits: Option<&[Span]>, start_line: usize) {
        let Some(edits) = edits else {
            return;
        };
        let mut iter = EditIterator::new(lines, start_line);
        let mut last = Pos::new(0, 0);
        for span in edits {
            let from = iter.advance(span.skip());
            let to = iter.advance(span.mark());
            let pane = self.panes.get_mut(side);
            if last.line == from.line {
                pane.mark_text(last, from, LineClass::IntralineBg);
            } else {
                pane.mark_text(Pos::new(from.line, 0), from, LineClass::IntralineBg);
            }
            pane.mark_text(from, to, LineClass::Diff);
            last = to;
            self.color_lines(side, LineClassWhere::Background, LineClass::Diff, from.line, to.line);
        }
    }
}
