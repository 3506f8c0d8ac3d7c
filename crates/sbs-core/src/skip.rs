//! Collapsing long runs of common lines behind skip bars

use crate::diff::{DiffInfo, Region};
use crate::pane::{PanePair, WidgetId, WidgetKind};
use crate::prefs::Context;
use crate::side::DisplaySide;
use std::ops::Range;

/// A run of common lines hidden on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedLines {
    pub start_a: usize,
    pub start_b: usize,
    pub size: usize,
}

impl SkippedLines {
    pub fn start(&self, side: DisplaySide) -> usize {
        match side {
            DisplaySide::A => self.start_a,
            DisplaySide::B => self.start_b,
        }
    }

    pub fn range(&self, side: DisplaySide) -> Range<usize> {
        let start = self.start(side);
        start..start + self.size
    }

    fn sub(&self, offset: usize, size: usize) -> Self {
        Self {
            start_a: self.start_a + offset,
            start_b: self.start_b + offset,
            size,
        }
    }
}

/// How much of a skip to reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expand {
    All,
    /// The first `n` hidden lines, continuing the context above the bar
    Before(usize),
    /// The last `n` hidden lines, continuing the context below the bar
    After(usize),
}

#[derive(Debug, Clone)]
struct Skip {
    lines: SkippedLines,
    bars: [WidgetId; 2],
}

#[derive(Debug, Default)]
pub struct SkipManager {
    skips: Vec<Skip>,
}

impl SkipManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs to hide for `context`, split around `anchors` (commented lines)
    pub fn compute(context: Context, diff: &DiffInfo, anchors: &[(DisplaySide, usize)]) -> Vec<SkippedLines> {
        let Context::Lines(n) = context else {
            return Vec::new();
        };
        let mut skips = Vec::new();
        let (mut line_a, mut line_b) = (0, 0);
        let last = diff.content.len().saturating_sub(1);
        for (i, region) in diff.content.iter().enumerate() {
            if let Region::Common(lines) = region {
                let len = lines.len();
                let run = |offset: usize, size: usize| SkippedLines {
                    start_a: line_a + offset,
                    start_b: line_b + offset,
                    size,
                };
                if i == 0 && len > n + 1 {
                    skips.push(run(0, len - n));
                } else if i == last && len > n + 1 {
                    skips.push(run(n, len - n));
                } else if len > 2 * n + 1 {
                    skips.push(run(n, len - 2 * n));
                }
            }
            line_a += region.len(DisplaySide::A);
            line_b += region.len(DisplaySide::B);
        }
        skips
            .into_iter()
            .flat_map(|skip| Self::split(skip, anchors, n))
            .collect()
    }

    fn split(skip: SkippedLines, anchors: &[(DisplaySide, usize)], context: usize) -> Vec<SkippedLines> {
        let mut offsets: Vec<usize> = anchors
            .iter()
            .filter(|(side, line)| skip.range(*side).contains(line))
            .map(|(side, line)| line - skip.start(*side))
            .collect();
        offsets.sort_unstable();
        offsets.dedup();

        let mut out = Vec::new();
        let mut cur = 0;
        for offset in offsets {
            let end = offset.saturating_sub(context);
            if end > cur + 1 {
                out.push(skip.sub(cur, end - cur));
            }
            cur = cur.max(offset + context + 1);
        }
        if skip.size > cur + 1 {
            out.push(skip.sub(cur, skip.size - cur));
        }
        out
    }

    pub fn render(
        &mut self,
        context: Context,
        diff: &DiffInfo,
        anchors: &[(DisplaySide, usize)],
        panes: &mut PanePair,
    ) {
        for lines in Self::compute(context, diff, anchors) {
            let skip = Self::apply(lines, panes);
            self.skips.push(skip);
        }
        log::debug!("collapsed {} skips at context {context}", self.skips.len());
    }

    fn apply(lines: SkippedLines, panes: &mut PanePair) -> Skip {
        let bars = DisplaySide::BOTH.map(|side| {
            let pane = panes.get_mut(side);
            pane.collapse(lines.range(side));
            pane.add_widget(lines.start(side), true, 1.0, WidgetKind::SkipBar(lines.size))
        });
        Skip { lines, bars }
    }

    fn unapply(skip: &Skip, panes: &mut PanePair) {
        for side in DisplaySide::BOTH {
            let pane = panes.get_mut(side);
            pane.expand(&skip.lines.range(side));
            pane.remove_widget(skip.bars[side.index()]);
        }
    }

    pub fn remove_all(&mut self, panes: &mut PanePair) {
        for skip in self.skips.drain(..) {
            Self::unapply(&skip, panes);
        }
    }

    pub fn skips(&self) -> impl Iterator<Item = &SkippedLines> {
        self.skips.iter().map(|s| &s.lines)
    }

    pub fn len(&self) -> usize {
        self.skips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skips.is_empty()
    }

    /// Skip hiding `line`, or whose bar sits directly next to it
    pub fn skip_near(&self, side: DisplaySide, line: usize) -> Option<usize> {
        self.skips.iter().position(|s| {
            let range = s.lines.range(side);
            range.contains(&line) || range.start == line + 1 || range.end == line
        })
    }

    /// Reveal part or all of skip `idx`. A skip left with fewer than two
    /// hidden lines is removed entirely.
    pub fn expand(&mut self, idx: usize, how: Expand, panes: &mut PanePair) -> bool {
        let Some(skip) = self.skips.get(idx).cloned() else {
            return false;
        };
        let lines = skip.lines;
        let remaining = match how {
            Expand::All => None,
            Expand::Before(n) => lines.size.checked_sub(n).map(|size| lines.sub(n, size)),
            Expand::After(n) => lines.size.checked_sub(n).map(|size| lines.sub(0, size)),
        }
        .filter(|rest| rest.size >= 2);

        Self::unapply(&skip, panes);
        match remaining {
            Some(rest) => self.skips[idx] = Self::apply(rest, panes),
            None => {
                self.skips.remove(idx);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeRegion, FileMeta};
    use crate::pane::Pane;

    fn common(n: usize) -> Region {
        Region::Common((0..n).map(|i| i.to_string()).collect())
    }

    fn edit() -> Region {
        Region::Change(ChangeRegion {
            a: vec!["old".into()],
            b: vec!["new".into()],
            edit_a: None,
            edit_b: None,
        })
    }

    fn diff(content: Vec<Region>) -> DiffInfo {
        let meta = Some(FileMeta {
            name: "f.txt".to_string(),
            content_type: None,
            lines: 0,
        });
        DiffInfo {
            meta_a: meta.clone(),
            meta_b: meta,
            content,
            ..Default::default()
        }
    }

    fn run(start: usize, size: usize) -> SkippedLines {
        SkippedLines {
            start_a: start,
            start_b: start,
            size,
        }
    }

    #[test]
    fn test_first_middle_last_regions() {
        let diff = diff(vec![common(20), edit(), common(30), edit(), common(20)]);
        let skips = SkipManager::compute(Context::Lines(3), &diff, &[]);
        assert_eq!(skips, vec![run(0, 17), run(24, 24), run(55, 17)]);
    }

    #[test]
    fn test_short_runs_stay_visible() {
        let short = diff(vec![common(4), edit(), common(7), edit(), common(4)]);
        assert!(SkipManager::compute(Context::Lines(3), &short, &[]).is_empty());
        let long = diff(vec![common(5), edit(), common(8), edit(), common(5)]);
        assert_eq!(
            SkipManager::compute(Context::Lines(3), &long, &[]),
            vec![run(0, 2), run(9, 2), run(18, 2)]
        );
    }

    #[test]
    fn test_whole_file_never_skips() {
        let diff = diff(vec![common(200)]);
        assert!(SkipManager::compute(Context::WholeFile, &diff, &[]).is_empty());
    }

    #[test]
    fn test_split_around_comment() {
        let diff = diff(vec![edit(), common(40), edit()]);
        let skips = SkipManager::compute(Context::Lines(3), &diff, &[(DisplaySide::B, 20)]);
        // Middle run hides 4..=37; the comment at 20 keeps 17..=23 visible.
        assert_eq!(skips, vec![run(4, 13), run(24, 14)]);
    }

    #[test]
    fn test_render_and_expand() {
        let diff = diff(vec![common(30), edit()]);
        let mut panes = PanePair::new(
            Pane::new(DisplaySide::A, diff.lines(DisplaySide::A), true),
            Pane::new(DisplaySide::B, diff.lines(DisplaySide::B), true),
        );
        let mut skips = SkipManager::new();
        skips.render(Context::Lines(10), &diff, &[], &mut panes);
        assert_eq!(skips.len(), 1);
        assert!(panes.get(DisplaySide::A).is_hidden(0));
        assert_eq!(panes.get(DisplaySide::B).total_height(), 1.0 + 10.0 + 1.0);

        assert_eq!(skips.skip_near(DisplaySide::B, 20), Some(0));
        assert!(skips.expand(0, Expand::After(5), &mut panes));
        assert_eq!(skips.skips().next(), Some(&run(0, 15)));
        assert!(!panes.get(DisplaySide::A).is_hidden(16));

        assert!(skips.expand(0, Expand::Before(14), &mut panes));
        assert!(skips.is_empty());
        assert_eq!(panes.get(DisplaySide::A).total_height(), 31.0);
        assert!(panes.get(DisplaySide::A).collapsed().is_empty());
    }

    #[test]
    fn test_remove_all_restores_panes() {
        let diff = diff(vec![common(50)]);
        let mut panes = PanePair::new(
            Pane::new(DisplaySide::A, diff.lines(DisplaySide::A), true),
            Pane::new(DisplaySide::B, diff.lines(DisplaySide::B), true),
        );
        let mut skips = SkipManager::new();
        skips.render(Context::Lines(3), &diff, &[], &mut panes);
        skips.remove_all(&mut panes);
        assert_eq!(panes.get(DisplaySide::B).total_height(), 50.0);
    }
}
