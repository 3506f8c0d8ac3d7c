//! UI rendering for the TUI

use crate::app::App;
use crate::views::render_split;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use sbs_core::{DisplaySide, IntraLineStatus};
use unicode_width::UnicodeWidthStr;

/// Truncate a path to fit a given width, using /.../ for middle sections
fn truncate_path(path: &str, max_width: usize) -> String {
    if path.width() <= max_width {
        return path.to_string();
    }

    let parts: Vec<&str> = path.split('/').collect();
    let last = parts.last().copied().unwrap_or(path);
    if parts.len() > 2 {
        let simple = format!("{}/.../{}", parts[0], last);
        if simple.width() <= max_width {
            return simple;
        }
    }

    let keep = max_width.saturating_sub(1);
    let tail: String = {
        let chars: Vec<char> = last.chars().collect();
        chars[chars.len().saturating_sub(keep)..].iter().collect()
    };
    format!("…{tail}")
}

/// Main drawing function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // File names
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    render_split(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if app.show_help {
        draw_help_popover(frame, app);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (side, half) in DisplaySide::BOTH.into_iter().zip(halves.iter()) {
        let focused = app.focused() == side;
        let name_style = if focused {
            Style::default()
                .fg(app.theme.text.into())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted.into())
        };
        let label = match side {
            DisplaySide::A => " a ",
            DisplaySide::B => " b ",
        };

        let mut flag = String::new();
        if side == DisplaySide::B && app.view.is_no_diff() {
            flag.push_str(" [no differences]");
        }
        let budget = (half.width as usize)
            .saturating_sub(label.width() + flag.width() + 1);
        let name = match app.view.diff().meta(side) {
            Some(meta) => truncate_path(&meta.name, budget),
            None => "(no file)".to_string(),
        };

        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(app.theme.accent.into())),
            Span::styled(name, name_style),
            Span::styled(flag, Style::default().fg(app.theme.comment.into())),
        ]);
        frame.render_widget(Paragraph::new(line), *half);
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let muted = Style::default().fg(theme.muted.into());
    let text = Style::default().fg(theme.text.into());

    let mut left_spans = vec![
        Span::styled(
            " SBS ",
            Style::default()
                .fg(theme.background.into())
                .bg(theme.accent.into())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    let (current, total) = app.chunk_position();
    if total > 0 {
        let current = current.map_or("-".to_string(), |n| n.to_string());
        left_spans.push(Span::styled("chunk ", muted));
        left_spans.push(Span::styled(format!("{current}/{total}"), text));
        left_spans.push(Span::raw("  "));
    }

    let prefs = app.view.prefs();
    left_spans.push(Span::styled("ctx ", muted));
    left_spans.push(Span::styled(prefs.context.to_string(), text));
    left_spans.push(Span::raw("  "));

    let intraline = match app.view.intraline_status() {
        IntraLineStatus::Timeout => Span::styled("timeout", Style::default().fg(theme.delete.into())),
        _ if app.view.intraline_visible() => Span::styled("on", text),
        _ => Span::styled("off", muted),
    };
    left_spans.push(Span::styled("intraline ", muted));
    left_spans.push(intraline);

    if prefs.ignore_whitespace {
        left_spans.push(Span::raw("  "));
        left_spans.push(Span::styled("ws ignored", Style::default().fg(theme.accent.into())));
    }

    if let Some(count) = app.pending_count {
        left_spans.push(Span::raw("  "));
        left_spans.push(Span::styled(count.to_string(), Style::default().fg(theme.accent.into())));
    }

    if let Some(message) = &app.message {
        left_spans.push(Span::raw("  "));
        left_spans.push(Span::styled(message.clone(), Style::default().fg(theme.comment.into())));
    }

    let right_spans = vec![
        Span::styled("?", Style::default().fg(theme.accent.into())),
        Span::styled(" help ", muted),
    ];

    let left_width: usize = left_spans.iter().map(|s| s.content.width()).sum();
    let right_width: usize = right_spans.iter().map(|s| s.content.width()).sum();
    let gap = (area.width as usize).saturating_sub(left_width + right_width);

    let mut spans = left_spans;
    spans.push(Span::raw(" ".repeat(gap)));
    spans.extend(right_spans);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help_popover(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let popup_width = 46u16.min(area.width.saturating_sub(4));
    let popup_height = 32u16.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let key_style = Style::default().fg(app.theme.accent.into());
    let label_style = Style::default().fg(app.theme.text.into());
    let dim_style = Style::default().fg(app.theme.muted.into());
    let section_style = Style::default()
        .fg(app.theme.comment.into())
        .add_modifier(Modifier::BOLD);

    let help_line = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::styled(format!("  {:<12}", key), key_style),
            Span::styled(desc.to_string(), label_style),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(" Navigation", section_style)),
        help_line("j / k / ↑↓", "Cursor down/up"),
        help_line("n / p", "Next/prev chunk"),
        help_line("h / l / ←→", "Focus old/new side"),
        help_line("Tab", "Switch side"),
        help_line("Space / b", "Page down/up"),
        help_line("^D / ^U", "Scroll half-page"),
        help_line("g / G", "Go to start/end"),
        Line::from(""),
        Line::from(Span::styled(" Context", section_style)),
        help_line("c", "Cycle context lines"),
        help_line("e", "Expand collapsed lines"),
        help_line("{ / }", "Expand above/below"),
        Line::from(""),
        Line::from(Span::styled(" Comments", section_style)),
        help_line("o / Enter", "Open/close comment"),
        help_line("O", "Toggle comments on line"),
        help_line("C", "Expand all comments"),
        Line::from(""),
        Line::from(Span::styled(" Display", section_style)),
        help_line("i", "Toggle intraline"),
        help_line("w", "Toggle ignore whitespace"),
        help_line("s", "Toggle syntax highlight"),
        help_line("#", "Toggle line numbers"),
        help_line("t", "Toggle tab markers"),
        help_line("W", "Toggle whitespace errors"),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {:<12}", "?"), key_style),
            Span::styled("Close help", dim_style),
        ]),
        Line::from(vec![
            Span::styled(format!("  {:<12}", "q / Esc"), key_style),
            Span::styled("Quit", label_style),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(app.theme.accent.into()))
        .style(Style::default().bg(Color::from(app.theme.background)));

    let help_block = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(help_block, popup_area);
}
