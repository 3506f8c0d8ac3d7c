//! Split view: both panes with their padding, comment boxes and skip bars

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sbs_core::{
    CommentBox, DisplaySide, GutterType, LineClass, LineClassWhere, LineWidget, Pane, WidgetId,
    WidgetKind,
};
use unicode_width::UnicodeWidthChar;

/// Width of the line number column: "1234 "
const NUMBER_WIDTH: usize = 5;

/// One terminal row of a pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Row {
    Text(usize),
    /// Padding balancing the other pane
    Blank,
    Comment { widget: WidgetId, row: usize },
    Skip(usize),
}

/// Every row of a pane from the top of the document
pub(crate) fn pane_rows(pane: &Pane) -> Vec<Row> {
    let mut rows = Vec::with_capacity(pane.line_count());
    for line in 0..pane.line_count() {
        let widgets = pane.widgets_at(line);
        for widget in widgets.iter().filter(|w| w.above) {
            push_widget_rows(&mut rows, widget);
        }
        if !pane.is_hidden(line) {
            rows.push(Row::Text(line));
        }
        for widget in widgets.iter().filter(|w| !w.above) {
            push_widget_rows(&mut rows, widget);
        }
    }
    rows
}

fn push_widget_rows(rows: &mut Vec<Row>, widget: &LineWidget) {
    let height = widget.height.round().max(0.0) as usize;
    for row in 0..height {
        rows.push(match widget.kind {
            WidgetKind::Padding | WidgetKind::CommentPadding => Row::Blank,
            WidgetKind::Comment => Row::Comment {
                widget: widget.id,
                row,
            },
            WidgetKind::SkipBar(hidden) => Row::Skip(hidden),
        });
    }
}

/// Text of each row of a comment box
pub(crate) fn comment_rows(comment_box: &CommentBox) -> Vec<String> {
    let author = comment_box.comment.author.as_deref();
    if !comment_box.open {
        return vec![match author {
            Some(author) => format!("▸ {author}: {}", comment_box.summary()),
            None => format!("▸ {}", comment_box.summary()),
        }];
    }
    let mut rows = vec!["┌──".to_string()];
    if let Some(author) = author {
        rows.push(format!("│ {author}"));
    }
    let body: Vec<&str> = comment_box.comment.message.lines().collect();
    if body.is_empty() {
        rows.push("│".to_string());
    }
    rows.extend(body.iter().map(|line| format!("│ {line}")));
    rows.push("└──".to_string());
    rows
}

/// Render the split view
pub fn render_split(frame: &mut Frame, app: &mut App, area: Rect) {
    app.set_viewport_rows(area.height);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_pane(frame, app, DisplaySide::A, chunks[0]);
    render_pane(frame, app, DisplaySide::B, chunks[1]);
}

fn render_pane(frame: &mut Frame, app: &App, side: DisplaySide, area: Rect) {
    let pane = app.view.pane(side);
    let top = pane.scroll_top().round().max(0.0) as usize;
    let lines: Vec<Line> = pane_rows(pane)
        .into_iter()
        .skip(top)
        .take(area.height as usize)
        .map(|row| render_row(app, pane, side, row))
        .collect();

    let mut paragraph = Paragraph::new(lines);
    if side == DisplaySide::A {
        paragraph = paragraph.block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(app.theme.muted.into())),
        );
    }
    frame.render_widget(paragraph, area);
}

fn render_row(app: &App, pane: &Pane, side: DisplaySide, row: Row) -> Line<'static> {
    let muted = Style::default().fg(app.theme.muted.into());
    match row {
        Row::Text(line) => {
            let mut spans = text_gutter(app, pane, side, line);
            let (content, line_style) = content_spans(app, pane, side, line);
            spans.extend(content);
            Line::from(spans).style(line_style)
        }
        Row::Blank => Line::from(blank_gutter(pane)),
        Row::Skip(hidden) => {
            let mut spans = blank_gutter(pane);
            spans.push(Span::styled(
                format!("⋯ {hidden} common lines ⋯"),
                muted.add_modifier(Modifier::ITALIC),
            ));
            Line::from(spans)
        }
        Row::Comment { widget, row } => {
            let mut spans = blank_gutter(pane);
            let text = app
                .view
                .comments()
                .box_for_widget(side, widget)
                .and_then(|comment_box| comment_rows(comment_box).into_iter().nth(row))
                .unwrap_or_default();
            spans.push(Span::styled(text, Style::default().fg(app.theme.comment.into())));
            Line::from(spans)
        }
    }
}

fn blank_gutter(pane: &Pane) -> Vec<Span<'static>> {
    let width = if pane.options().show_line_numbers {
        NUMBER_WIDTH
    } else {
        0
    };
    vec![Span::raw(" ".repeat(width + 3))]
}

fn text_gutter(app: &App, pane: &Pane, side: DisplaySide, line: usize) -> Vec<Span<'static>> {
    let theme = &app.theme;
    let mut spans = Vec::with_capacity(3);

    let marker = if app.focused() == side && pane.cursor() == line {
        Span::styled(
            app.cursor_marker.clone(),
            Style::default()
                .fg(theme.accent.into())
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw(" ")
    };
    spans.push(marker);

    if pane.options().show_line_numbers {
        let active = pane
            .line_decor(line)
            .is_some_and(|d| d.has(LineClassWhere::Wrap, LineClass::ActiveLine));
        let style = if active {
            Style::default()
                .fg(theme.text.into())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted.into())
        };
        spans.push(Span::styled(format!("{:>4} ", line + 1), style));
    }

    let change = match pane.gutter_at(line) {
        Some(GutterType::Insert) => Span::styled("+ ", Style::default().fg(theme.insert.into())),
        Some(GutterType::Delete) => Span::styled("- ", Style::default().fg(theme.delete.into())),
        Some(GutterType::Edit) => Span::styled("~ ", Style::default().fg(theme.accent.into())),
        None => Span::raw("  "),
    };
    spans.push(change);
    spans
}

/// Styled text of a line plus the style of the whole row
fn content_spans(app: &App, pane: &Pane, side: DisplaySide, line: usize) -> (Vec<Span<'static>>, Style) {
    let theme = &app.theme;
    let chars: Vec<char> = pane.line(line).unwrap_or("").chars().collect();
    let mut styles = vec![Style::default().fg(theme.text.into()); chars.len()];

    if let Some(syntax) = app.highlight(side, line) {
        let mut at = 0;
        for span in syntax {
            let len = span.text.chars().count();
            for style in styles.iter_mut().skip(at).take(len) {
                *style = style.patch(span.style);
            }
            at += len;
        }
    }

    let insert = side == DisplaySide::B;
    let has = |class: LineClass| {
        pane.line_decor(line)
            .is_some_and(|d| d.has(LineClassWhere::Wrap, class))
    };
    let intraline = app.view.intraline_visible();
    // Without intraline marks an edited line is painted like any other change
    let weak_as_strong = !intraline && app.view.pane(side.other()).is_present();
    let line_bg = if has(LineClass::Diff) || (weak_as_strong && has(LineClass::IntralineBg)) {
        Some(theme.diff_bg(insert))
    } else if has(LineClass::IntralineBg) {
        Some(theme.intraline_bg(insert))
    } else if has(LineClass::ActiveLine) {
        Some(theme.active_bg())
    } else {
        None
    };

    if intraline {
        for (range, class) in pane.marks_on_line(line) {
            let bg = match class {
                LineClass::Diff => theme.diff_bg(insert),
                LineClass::IntralineBg => theme.intraline_bg(insert),
                LineClass::ActiveLine => continue,
            };
            let end = range.end.min(chars.len());
            for style in styles.iter_mut().take(end).skip(range.start) {
                *style = style.bg(bg);
            }
        }
    }

    let options = pane.options();
    let changed = has(LineClass::Diff) || has(LineClass::IntralineBg);
    if options.show_trailing_space && insert && changed {
        let trailing = chars.iter().rev().take_while(|c| c.is_whitespace()).count();
        for style in styles.iter_mut().skip(chars.len() - trailing) {
            *style = style.bg(theme.delete.into());
        }
    }

    let tab_size = options.tab_size.max(1);
    let mut spans = Vec::new();
    let mut buf = String::new();
    let mut buf_style = Style::default();
    let mut col = 0;
    for (&c, style) in chars.iter().zip(styles) {
        let (piece, style) = if c == '\t' {
            let width = tab_size - col % tab_size;
            col += width;
            if options.show_tabs {
                (
                    format!("»{}", " ".repeat(width - 1)),
                    style.fg(theme.muted.into()),
                )
            } else {
                (" ".repeat(width), style)
            }
        } else {
            col += c.width().unwrap_or(0);
            (c.to_string(), style)
        };
        if style != buf_style && !buf.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut buf), buf_style));
        }
        buf_style = style;
        buf.push_str(&piece);
    }
    if !buf.is_empty() {
        spans.push(Span::styled(buf, buf_style));
    }

    let line_style = line_bg.map(|bg| Style::default().bg(bg)).unwrap_or_default();
    (spans, line_style)
}
