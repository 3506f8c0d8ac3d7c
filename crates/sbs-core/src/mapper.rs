//! Line correspondence between the two panes

use crate::side::DisplaySide;

/// Kind of run a segment describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Lines present on both sides
    Common,
    /// Lines present only on B
    InsertOnB,
    /// Lines present only on A
    DeleteOnA,
}

/// A contiguous run of lines starting at `start_a` / `start_b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub len: usize,
    pub start_a: usize,
    pub start_b: usize,
}

impl Segment {
    pub fn start(&self, side: DisplaySide) -> usize {
        match side {
            DisplaySide::A => self.start_a,
            DisplaySide::B => self.start_b,
        }
    }

    /// Number of lines this segment spans on `side`
    pub fn len_on(&self, side: DisplaySide) -> usize {
        match (self.kind, side) {
            (SegmentKind::Common, _) => self.len,
            (SegmentKind::InsertOnB, DisplaySide::B) => self.len,
            (SegmentKind::DeleteOnA, DisplaySide::A) => self.len,
            _ => 0,
        }
    }

    pub fn end(&self, side: DisplaySide) -> usize {
        self.start(side) + self.len_on(side)
    }
}

/// Result of [`LineMapper::line_on_other`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOnOther {
    pub line: usize,
    /// False when the queried line only exists on its own side
    pub aligned: bool,
}

/// Maps line numbers between side A and side B.
///
/// Built once per render pass by appending runs in region order, read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct LineMapper {
    line_a: usize,
    line_b: usize,
    segments: Vec<Segment>,
}

impl LineMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unassigned line on A
    pub fn line_a(&self) -> usize {
        self.line_a
    }

    /// Next unassigned line on B
    pub fn line_b(&self) -> usize {
        self.line_b
    }

    pub fn line(&self, side: DisplaySide) -> usize {
        match side {
            DisplaySide::A => self.line_a,
            DisplaySide::B => self.line_b,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn append_common(&mut self, n: usize) {
        self.push(SegmentKind::Common, n);
        self.line_a += n;
        self.line_b += n;
    }

    pub fn append_insert(&mut self, n: usize) {
        self.push(SegmentKind::InsertOnB, n);
        self.line_b += n;
    }

    pub fn append_delete(&mut self, n: usize) {
        self.push(SegmentKind::DeleteOnA, n);
        self.line_a += n;
    }

    fn push(&mut self, kind: SegmentKind, n: usize) {
        if n == 0 {
            return;
        }
        if let Some(last) = self.segments.last_mut() {
            if last.kind == kind {
                last.len += n;
                return;
            }
        }
        self.segments.push(Segment {
            kind,
            len: n,
            start_a: self.line_a,
            start_b: self.line_b,
        });
    }

    /// The segment containing `line` on `side`, if any
    pub fn segment_at(&self, side: DisplaySide, line: usize) -> Option<&Segment> {
        // Segment ends are non-decreasing on either side, so the first segment
        // ending past `line` is the one that contains it.
        let idx = self.segments.partition_point(|s| s.end(side) <= line);
        self.segments.get(idx)
    }

    /// Line on the other side corresponding to `line` on `side`.
    ///
    /// Lines inside an insertion or deletion have no counterpart. For those
    /// the line on the other side where the gap sits is returned with
    /// `aligned == false`, clamped to the last line of the other side.
    pub fn line_on_other(&self, side: DisplaySide, line: usize) -> LineOnOther {
        let other = side.other();
        match self.segment_at(side, line) {
            Some(seg) if seg.kind == SegmentKind::Common => LineOnOther {
                line: seg.start(other) + (line - seg.start(side)),
                aligned: true,
            },
            Some(seg) => {
                let last_other = self.line(other).saturating_sub(1);
                LineOnOther {
                    line: seg.start(other).min(last_other),
                    aligned: false,
                }
            }
            None => {
                // Past the end: carry the final delta forward.
                let mine = self.line(side);
                let theirs = self.line(other);
                LineOnOther {
                    line: (line + theirs).saturating_sub(mine),
                    aligned: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(ops: &[(char, usize)]) -> LineMapper {
        let mut mapper = LineMapper::new();
        for &(op, n) in ops {
            match op {
                'c' => mapper.append_common(n),
                'i' => mapper.append_insert(n),
                'd' => mapper.append_delete(n),
                _ => unreachable!(),
            }
        }
        mapper
    }

    #[test]
    fn test_single_deletion_scenario() {
        // [Common(5), Change(a=["x"], b=[]), Common(3)]
        let mapper = build(&[('c', 5), ('d', 1), ('c', 3)]);
        assert_eq!(mapper.line_a(), 9);
        assert_eq!(mapper.line_b(), 8);

        let deleted = mapper.line_on_other(DisplaySide::A, 5);
        assert!(!deleted.aligned);
        assert_eq!(deleted.line, 5);

        let after = mapper.line_on_other(DisplaySide::B, 5);
        assert!(after.aligned);
        assert_eq!(after.line, 6);

        assert_eq!(
            mapper.line_on_other(DisplaySide::A, 4),
            LineOnOther { line: 4, aligned: true }
        );
    }

    #[test]
    fn test_insertion_at_end_clamps_to_last_line() {
        let mapper = build(&[('c', 2), ('i', 3)]);
        let info = mapper.line_on_other(DisplaySide::B, 3);
        assert!(!info.aligned);
        assert_eq!(info.line, 1);
    }

    #[test]
    fn test_adjacent_runs_merge() {
        let mut mapper = LineMapper::new();
        mapper.append_common(2);
        mapper.append_common(0);
        mapper.append_common(3);
        mapper.append_insert(0);
        assert_eq!(mapper.segments().len(), 1);
        assert_eq!(mapper.segments()[0].len, 5);
    }

    #[test]
    fn test_empty_mapper_is_identity() {
        let mapper = LineMapper::new();
        assert_eq!(
            mapper.line_on_other(DisplaySide::A, 0),
            LineOnOther { line: 0, aligned: true }
        );
    }

    #[test]
    fn test_aligned_lines_share_a_common_segment() {
        let patterns: &[&[(char, usize)]] = &[
            &[('c', 3), ('d', 2), ('c', 1), ('i', 4), ('c', 2)],
            &[('i', 1), ('c', 1), ('d', 1), ('i', 2), ('c', 5)],
            &[('d', 3), ('i', 3)],
            &[('c', 1), ('c', 1), ('i', 1), ('c', 1), ('d', 1), ('d', 1)],
        ];
        for ops in patterns {
            let mapper = build(ops);
            for side in DisplaySide::BOTH {
                for line in 0..mapper.line(side) {
                    let info = mapper.line_on_other(side, line);
                    let mine = mapper.segment_at(side, line).unwrap();
                    if info.aligned {
                        let theirs = mapper.segment_at(side.other(), info.line).unwrap();
                        assert_eq!(mine, theirs, "{ops:?} {side:?}:{line}");
                        assert_eq!(mine.kind, SegmentKind::Common);
                        let back = mapper.line_on_other(side.other(), info.line);
                        assert_eq!(back, LineOnOther { line, aligned: true });
                    } else {
                        assert_ne!(mine.kind, SegmentKind::Common);
                    }
                }
            }
        }
    }
}
