//! Keeps the two panes scrolled to corresponding positions

use crate::mapper::{LineMapper, SegmentKind};
use crate::pane::PanePair;
use crate::side::DisplaySide;

#[derive(Debug, Default)]
pub struct ScrollSynchronizer {
    /// Set on a pane we scrolled ourselves; its next scroll event is the
    /// echo and is swallowed
    auto_scroll: [bool; 2],
}

impl ScrollSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self, side: DisplaySide) -> bool {
        self.auto_scroll[side.index()]
    }

    /// Handle a scroll of `side`. Returns true when the other pane moved.
    pub fn on_scroll(&mut self, side: DisplaySide, panes: &mut PanePair, mapper: &LineMapper) -> bool {
        if std::mem::take(&mut self.auto_scroll[side.index()]) {
            return false;
        }
        let target = Self::target_top(side, panes, mapper);
        let dst = side.other();
        let moved = panes.get_mut(dst).scroll_to(target);
        if moved {
            self.auto_scroll[dst.index()] = true;
        }
        moved
    }

    /// Scroll offset on the other pane matching the top of `side`
    pub fn target_top(side: DisplaySide, panes: &PanePair, mapper: &LineMapper) -> f64 {
        let src = panes.get(side);
        let dst = panes.get(side.other());
        let top = src.scroll_top();
        let line = src.line_at_height(top);
        let offset = top - src.height_at_line(line);

        let info = mapper.line_on_other(side, line);
        if info.aligned {
            let other = info.line.min(dst.line_count() - 1);
            return dst.height_at_line(other) + offset;
        }

        // Inside an insertion or deletion: the gap is padded to the same
        // height on the other side, so keep the distance to the gap's end.
        let Some(segment) = mapper.segment_at(side, line) else {
            return top;
        };
        debug_assert_ne!(segment.kind, SegmentKind::Common);
        let to_gap_end = src.height_at_line(segment.end(side)) - top;
        let gap_end_other = segment.start(side.other());
        let anchor = if gap_end_other < dst.line_count() {
            dst.height_at_line(gap_end_other)
        } else {
            dst.total_height()
        };
        anchor - to_gap_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padding::PaddingCoordinator;
    use crate::pane::{Pane, PaneEvent};

    /// A: 0..10 common, B inserts 4 lines after A line 4
    fn setup() -> (PanePair, LineMapper) {
        let lines = |n: usize| (0..n).map(|i| i.to_string()).collect();
        let mut panes = PanePair::new(
            Pane::new(DisplaySide::A, lines(10), true),
            Pane::new(DisplaySide::B, lines(14), true),
        );
        let mut mapper = LineMapper::new();
        mapper.append_common(5);
        mapper.append_insert(4);
        mapper.append_common(5);
        let mut padding = PaddingCoordinator::new();
        padding.add_chunk_padding(&mut panes, DisplaySide::A, Some(4), 8, 4);
        padding.resize_padding_on_other_side(&mut panes, DisplaySide::B, 8);
        for side in DisplaySide::BOTH {
            panes.get_mut(side).set_viewport_height(3.0);
            panes.get_mut(side).take_events();
        }
        (panes, mapper)
    }

    #[test]
    fn test_aligned_scroll_follows() {
        let (mut panes, mapper) = setup();
        let mut sync = ScrollSynchronizer::new();
        panes.get_mut(DisplaySide::B).scroll_to(10.0);
        assert!(sync.on_scroll(DisplaySide::B, &mut panes, &mapper));
        // B line 10 is A line 6, which sits at 6 + 4 rows of padding.
        assert_eq!(panes.get(DisplaySide::A).scroll_top(), 10.0);
    }

    #[test]
    fn test_echo_is_swallowed() {
        let (mut panes, mapper) = setup();
        let mut sync = ScrollSynchronizer::new();
        panes.get_mut(DisplaySide::A).scroll_to(2.0);
        assert!(sync.on_scroll(DisplaySide::A, &mut panes, &mapper));
        assert!(sync.is_suppressed(DisplaySide::B));
        assert_eq!(panes.get_mut(DisplaySide::B).take_events(), vec![PaneEvent::Scroll]);
        assert!(!sync.on_scroll(DisplaySide::B, &mut panes, &mapper));
        assert!(!sync.is_suppressed(DisplaySide::B));
        assert_eq!(panes.get(DisplaySide::B).scroll_top(), 2.0);
    }

    #[test]
    fn test_unaligned_scroll_lands_in_padding() {
        let (mut panes, mapper) = setup();
        let mut sync = ScrollSynchronizer::new();
        panes.get_mut(DisplaySide::B).scroll_to(6.0);
        sync.on_scroll(DisplaySide::B, &mut panes, &mapper);
        // Two rows above the end of the insertion: A shows its padding.
        assert_eq!(panes.get(DisplaySide::A).scroll_top(), 6.0);
    }

    #[test]
    fn test_no_echo_flag_without_movement() {
        let (mut panes, mapper) = setup();
        let mut sync = ScrollSynchronizer::new();
        assert!(!sync.on_scroll(DisplaySide::A, &mut panes, &mapper));
        assert!(!sync.is_suppressed(DisplaySide::B));
    }
}
