use super::render_split;
use crate::app::App;
use crate::color::Theme;
use crate::producer::{DiffSource, SourceFile};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use sbs_core::{CommentInfo, Context, DiffPreferences, DisplaySide, Expand};

fn test_prefs() -> DiffPreferences {
    DiffPreferences {
        syntax_highlighting: false,
        context: Context::WholeFile,
        ..DiffPreferences::default()
    }
}

fn make_app(old: &str, new: &str, prefs: DiffPreferences, comments: Vec<CommentInfo>, rows: u16) -> App {
    let source = DiffSource::Files {
        old: Some(SourceFile::new("test.txt", old)),
        new: Some(SourceFile::new("test.txt", new)),
    };
    let mut app = App::new(source, prefs, comments, Theme::default(), rows);
    app.show(None, None);
    app
}

fn render_buffer(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal
        .draw(|frame| {
            let area = frame.area();
            render_split(frame, app, area);
        })
        .expect("draw");
    terminal.backend().buffer().clone()
}

fn buffer_text(buf: &Buffer) -> Vec<String> {
    let mut lines = Vec::new();
    for y in 0..buf.area.height {
        let mut line = String::new();
        for x in 0..buf.area.width {
            line.push_str(buf[(x, y)].symbol());
        }
        lines.push(line);
    }
    lines
}

/// Rows of one half of the split
fn half_text(buf: &Buffer, side: DisplaySide) -> Vec<String> {
    let half = buf.area.width / 2;
    let xs = match side {
        DisplaySide::A => 0..half,
        DisplaySide::B => half..buf.area.width,
    };
    (0..buf.area.height)
        .map(|y| xs.clone().map(|x| buf[(x, y)].symbol()).collect())
        .collect()
}

fn row_of(rows: &[String], needle: &str) -> Option<usize> {
    rows.iter().position(|row| row.contains(needle))
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.match_indices(needle).count()
}

#[test]
fn test_split_aligns_common_lines_after_insertion() {
    let old = "keep1\nkeep2\ntail\n";
    let new = "keep1\nkeep2\nNEW1\nNEW2\ntail\n";
    let mut app = make_app(old, new, test_prefs(), Vec::new(), 10);

    let buf = render_buffer(&mut app, 80, 10);
    let left = half_text(&buf, DisplaySide::A);
    let right = half_text(&buf, DisplaySide::B);

    assert_eq!(row_of(&left, "tail"), Some(4));
    assert_eq!(row_of(&right, "tail"), Some(4));
    assert_eq!(row_of(&right, "NEW1"), Some(2));
    assert!(row_of(&left, "NEW1").is_none());
}

#[test]
fn test_split_pads_right_pane_for_deletion() {
    let old = "head\nGONE1\nGONE2\nGONE3\ntail\n";
    let new = "head\ntail\n";
    let mut app = make_app(old, new, test_prefs(), Vec::new(), 10);

    let buf = render_buffer(&mut app, 80, 10);
    let left = half_text(&buf, DisplaySide::A);
    let right = half_text(&buf, DisplaySide::B);

    assert_eq!(row_of(&left, "tail"), row_of(&right, "tail"));
    assert_eq!(row_of(&right, "tail"), Some(4));
    let all = buffer_text(&buf).join("\n");
    assert_eq!(count_occurrences(&all, "GONE"), 3);
}

#[test]
fn test_split_gutter_marks_changes() {
    let old = "same\nold line\n";
    let new = "same\nnew line\nadded\n";
    let mut app = make_app(old, new, test_prefs(), Vec::new(), 10);

    let buf = render_buffer(&mut app, 80, 10);
    let right = half_text(&buf, DisplaySide::B);
    // The mark sits on the first line of the edit only
    let edited = right.iter().find(|row| row.contains("new line")).expect("edited row");
    assert!(edited.contains("   2 ~ new line"));
    let added = right.iter().find(|row| row.contains("added")).expect("added row");
    assert!(added.contains("   3   added"));
    let same = right.iter().find(|row| row.contains("same")).expect("same row");
    assert!(same.contains("   1   same"));

    let left = half_text(&buf, DisplaySide::A);
    let old_row = left.iter().find(|row| row.contains("old line")).expect("old row");
    assert!(old_row.contains("   2   old line"));
}

#[test]
fn test_split_gutter_marks_pure_insert_and_delete() {
    let old = "keep
gone
middle
end
";
    let new = "keep
middle
fresh
end
";
    let mut app = make_app(old, new, test_prefs(), Vec::new(), 10);

    let buf = render_buffer(&mut app, 80, 10);
    let left = half_text(&buf, DisplaySide::A);
    let gone = left.iter().find(|row| row.contains("gone")).expect("deleted row");
    assert!(gone.contains("   2 - gone"));
    let right = half_text(&buf, DisplaySide::B);
    let fresh = right.iter().find(|row| row.contains("fresh")).expect("inserted row");
    assert!(fresh.contains("   3 + fresh"));
}

#[test]
fn test_skip_bars_collapse_common_runs() {
    let old: String = (0..60).map(|i| format!("line {i}\n")).collect();
    let new = old.replace("line 30\n", "line thirty\n");
    let prefs = DiffPreferences {
        context: Context::Lines(3),
        ..test_prefs()
    };
    let mut app = make_app(&old, &new, prefs, Vec::new(), 20);

    let buf = render_buffer(&mut app, 100, 20);
    let all = buffer_text(&buf).join("\n");
    assert_eq!(count_occurrences(&all, "27 common lines"), 2);
    assert_eq!(count_occurrences(&all, "26 common lines"), 2);
    assert!(!all.contains("line 5 "));
    assert!(all.contains("line 27"));

    let left = half_text(&buf, DisplaySide::A);
    let right = half_text(&buf, DisplaySide::B);
    assert_eq!(row_of(&left, "line 33"), row_of(&right, "line 33"));

    app.view.set_cursor(DisplaySide::A, 27);
    app.expand_skip(Expand::All);
    let after = buffer_text(&render_buffer(&mut app, 100, 20)).join("\n");
    assert!(!after.contains("27 common lines"));
    assert!(!app.view.pane(DisplaySide::A).is_hidden(5));
    assert_eq!(app.view.skips().len(), 1);
}

#[test]
fn test_comment_box_is_balanced_by_padding() {
    let old = "one\ntwo\nthree\nfour\n";
    let new = "one\ntwo\nthree\nFOUR\n";
    let comments = vec![CommentInfo {
        side: DisplaySide::B,
        line: 2,
        message: "looks good".to_string(),
        author: Some("kim".to_string()),
    }];
    let prefs = DiffPreferences {
        expand_all_comments: true,
        ..test_prefs()
    };
    let mut app = make_app(old, new, prefs, comments, 12);

    let buf = render_buffer(&mut app, 80, 12);
    let left = half_text(&buf, DisplaySide::A);
    let right = half_text(&buf, DisplaySide::B);
    assert!(row_of(&right, "│ looks good").is_some());
    assert!(row_of(&right, "│ kim").is_some());
    assert!(row_of(&left, "looks good").is_none());
    assert_eq!(row_of(&left, "three"), row_of(&right, "three"));
    assert_eq!(row_of(&right, "three"), Some(6));

    app.view.set_cursor(DisplaySide::B, 1);
    app.toggle_comment();
    let buf = render_buffer(&mut app, 80, 12);
    let left = half_text(&buf, DisplaySide::A);
    let right = half_text(&buf, DisplaySide::B);
    assert!(row_of(&right, "▸ kim: looks good").is_some());
    assert_eq!(row_of(&left, "three"), row_of(&right, "three"));
    assert_eq!(row_of(&right, "three"), Some(3));
}

#[test]
fn test_tabs_expand_to_tab_stops() {
    let old = "a\tb\n";
    let new = "a\tc\n";
    let prefs = DiffPreferences {
        tab_size: 4,
        ..test_prefs()
    };
    let mut app = make_app(old, new, prefs, Vec::new(), 5);

    let shown = buffer_text(&render_buffer(&mut app, 80, 5)).join("\n");
    assert!(shown.contains("a»  c"));

    app.toggle_tabs();
    let plain = buffer_text(&render_buffer(&mut app, 80, 5)).join("\n");
    assert!(plain.contains("a   c"));
    assert!(!plain.contains('»'));
}

#[test]
fn test_cursor_marker_follows_focus() {
    let old = "alpha\nbeta\n";
    let new = "alpha\nBETA\n";
    let mut app = make_app(old, new, test_prefs(), Vec::new(), 5);
    app.cursor_marker = "@".to_string();

    app.view.set_cursor(DisplaySide::B, 0);
    let buf = render_buffer(&mut app, 80, 5);
    let left = half_text(&buf, DisplaySide::A);
    let right = half_text(&buf, DisplaySide::B);
    assert!(right[0].starts_with('@'));
    assert!(!left.iter().any(|row| row.contains('@')));

    app.switch_side();
    let buf = render_buffer(&mut app, 80, 5);
    let left = half_text(&buf, DisplaySide::A);
    assert!(left[0].starts_with('@'));
}

#[test]
fn test_header_flags_identical_files() {
    let text = "same\nlines\n";
    let mut app = make_app(text, text, test_prefs(), Vec::new(), 8);

    let backend = TestBackend::new(80, 10);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal
        .draw(|frame| crate::ui::draw(frame, &mut app))
        .expect("draw");
    let all = buffer_text(terminal.backend().buffer()).join("\n");
    assert!(all.contains("no differences"));
    assert!(all.contains("test.txt"));
}
