//! Published comments shown as boxes under their lines

use crate::error::DiffError;
use crate::pane::{PanePair, WidgetId, WidgetKind};
use crate::side::DisplaySide;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_side() -> DisplaySide {
    DisplaySide::B
}

/// One comment as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInfo {
    #[serde(default = "default_side")]
    pub side: DisplaySide,
    /// 1-based line number; 0 is a file-level comment and has no box
    pub line: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl CommentInfo {
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, DiffError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone)]
pub struct CommentBox {
    pub comment: CommentInfo,
    pub open: bool,
    widget: Option<WidgetId>,
}

impl CommentBox {
    /// Rows taken by the box: border, optional author row and the message
    /// when open, a single summary row when closed
    pub fn height(&self) -> f64 {
        if !self.open {
            return 1.0;
        }
        let body = self.comment.message.lines().count().max(1);
        let author = usize::from(self.comment.author.is_some());
        (body + author + 2) as f64
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.comment.message.lines().next().unwrap_or("")
    }

    pub fn widget(&self) -> Option<WidgetId> {
        self.widget
    }
}

#[derive(Debug, Default)]
pub struct CommentManager {
    boxes: BTreeMap<(DisplaySide, usize), Vec<CommentBox>>,
    expand_all: bool,
}

impl CommentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the comment set. Boxes start closed.
    pub fn load(&mut self, comments: Vec<CommentInfo>) {
        self.boxes.clear();
        for comment in comments {
            let Some(line) = comment.line.checked_sub(1) else {
                log::debug!("skipping file-level comment on {:?}", comment.side);
                continue;
            };
            self.boxes
                .entry((comment.side, line))
                .or_default()
                .push(CommentBox {
                    comment,
                    open: self.expand_all,
                    widget: None,
                });
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Commented `(side, line)` pairs, 0-based
    pub fn anchors(&self) -> Vec<(DisplaySide, usize)> {
        self.boxes.keys().copied().collect()
    }

    pub fn boxes_at(&self, side: DisplaySide, line: usize) -> &[CommentBox] {
        self.boxes.get(&(side, line)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn box_for_widget(&self, side: DisplaySide, widget: WidgetId) -> Option<&CommentBox> {
        self.boxes
            .iter()
            .filter(|((s, _), _)| *s == side)
            .flat_map(|(_, boxes)| boxes.iter())
            .find(|b| b.widget == Some(widget))
    }

    /// Attach a widget for every box whose line exists in its pane
    pub fn render(&mut self, panes: &mut PanePair) {
        for ((side, line), boxes) in &mut self.boxes {
            let pane = panes.get_mut(*side);
            if *line >= pane.line_count() {
                log::warn!("comment on {side:?} line {} is past the end of the file", line + 1);
                continue;
            }
            for comment_box in boxes.iter_mut() {
                if comment_box.widget.is_none() {
                    let height = comment_box.height();
                    comment_box.widget = Some(pane.add_widget(*line, false, height, WidgetKind::Comment));
                }
            }
        }
    }

    pub fn clear(&mut self, panes: &mut PanePair) {
        for pane in panes.iter_mut() {
            pane.remove_widgets_where(|w| w.kind == WidgetKind::Comment);
        }
        for comment_box in self.boxes.values_mut().flatten() {
            comment_box.widget = None;
        }
    }

    fn resize(panes: &mut PanePair, side: DisplaySide, comment_box: &CommentBox) {
        if let Some(widget) = comment_box.widget {
            panes.get_mut(side).set_widget_height(widget, comment_box.height());
        }
    }

    /// Open or close the last box on a line
    pub fn toggle_open_box(&mut self, panes: &mut PanePair, side: DisplaySide, line: usize) -> bool {
        let Some(comment_box) = self.boxes.get_mut(&(side, line)).and_then(|b| b.last_mut()) else {
            return false;
        };
        comment_box.open = !comment_box.open;
        Self::resize(panes, side, comment_box);
        true
    }

    /// Open every box on a line, or close them all when all are open
    pub fn open_close_all(&mut self, panes: &mut PanePair, side: DisplaySide, line: usize) -> bool {
        let Some(boxes) = self.boxes.get_mut(&(side, line)) else {
            return false;
        };
        let open = boxes.iter().any(|b| !b.open);
        for comment_box in boxes.iter_mut() {
            comment_box.open = open;
            Self::resize(panes, side, comment_box);
        }
        true
    }

    pub fn set_expand_all(&mut self, panes: &mut PanePair, expand: bool) {
        self.expand_all = expand;
        for ((side, _), boxes) in &mut self.boxes {
            for comment_box in boxes.iter_mut() {
                comment_box.open = expand;
                Self::resize(panes, *side, comment_box);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::Pane;

    fn panes() -> PanePair {
        let lines = |n: usize| (0..n).map(|i| i.to_string()).collect();
        PanePair::new(
            Pane::new(DisplaySide::A, lines(5), true),
            Pane::new(DisplaySide::B, lines(5), true),
        )
    }

    fn comments() -> Vec<CommentInfo> {
        CommentInfo::list_from_json(
            r#"[
                { "line": 2, "message": "first\nsecond", "author": "kim" },
                { "side": "PARENT", "line": 4, "message": "why?" },
                { "line": 0, "message": "file comment" },
                { "line": 2, "message": "+1" }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_load_groups_by_line() {
        let mut manager = CommentManager::new();
        manager.load(comments());
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.anchors(), vec![(DisplaySide::A, 3), (DisplaySide::B, 1)]);
        assert_eq!(manager.boxes_at(DisplaySide::B, 1).len(), 2);
    }

    #[test]
    fn test_box_heights() {
        let mut manager = CommentManager::new();
        manager.load(comments());
        let mut panes = panes();
        manager.render(&mut panes);
        assert_eq!(panes.get(DisplaySide::B).widget_heights_at(1, WidgetKind::Comment), 2.0);

        assert!(manager.open_close_all(&mut panes, DisplaySide::B, 1));
        // "first\nsecond" with author: 2 + 1 + 2, "+1": 1 + 2
        assert_eq!(panes.get(DisplaySide::B).widget_heights_at(1, WidgetKind::Comment), 8.0);

        assert!(manager.toggle_open_box(&mut panes, DisplaySide::B, 1));
        assert_eq!(panes.get(DisplaySide::B).widget_heights_at(1, WidgetKind::Comment), 6.0);
        assert!(!manager.toggle_open_box(&mut panes, DisplaySide::B, 0));
    }

    #[test]
    fn test_expand_all_and_widget_lookup() {
        let mut manager = CommentManager::new();
        manager.load(comments());
        let mut panes = panes();
        manager.render(&mut panes);
        manager.set_expand_all(&mut panes, true);
        let widget = panes.get(DisplaySide::A).widgets_at(3)[0].id;
        let comment_box = manager.box_for_widget(DisplaySide::A, widget).unwrap();
        assert!(comment_box.open);
        assert_eq!(comment_box.summary(), "why?");

        manager.clear(&mut panes);
        assert!(panes.get(DisplaySide::A).widgets_at(3).is_empty());
    }
}
