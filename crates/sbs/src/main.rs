//! sbs CLI - side-by-side diff viewer TUI

mod app;
mod color;
mod config;
mod producer;
mod syntax;
mod ui;
mod views;
mod worker;

use anyhow::{Context as _, Result};
use app::App;
use clap::Parser;
use color::Theme;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use producer::{DiffSource, SourceFile};
use ratatui::prelude::*;
use sbs_core::{CommentInfo, Context, DiffInfo, DisplaySide};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lines scrolled per mouse wheel notch
const WHEEL_STEP: f64 = 3.0;

#[derive(Parser, Debug)]
#[command(name = "sbs")]
#[command(author, version, about = "A side-by-side diff viewer")]
struct Args {
    /// Files to compare: old_file new_file
    /// Also works as a git external diff tool (git config diff.external sbs)
    #[arg(num_args = 0..)]
    paths: Vec<PathBuf>,

    /// Read a precomputed diff (JSON) from FILE, or stdin with "-"
    #[arg(long, value_name = "FILE", conflicts_with = "paths")]
    json: Option<PathBuf>,

    /// Comments to show inline (JSON list)
    #[arg(long, value_name = "FILE")]
    comments: Option<PathBuf>,

    /// Side to place the cursor on
    #[arg(long, value_enum)]
    side: Option<CliSide>,

    /// Line (1-based) to place the cursor on
    #[arg(long)]
    line: Option<usize>,

    /// Common lines kept around changes: a number or "all"
    #[arg(short = 'U', long)]
    context: Option<Context>,

    /// Start with intraline differences off
    #[arg(long)]
    no_intraline: bool,

    /// Ignore whitespace when comparing lines
    #[arg(short = 'w', long)]
    ignore_whitespace: bool,

    /// Disable syntax highlighting
    #[arg(long)]
    no_syntax: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliSide {
    /// The old file
    #[value(alias = "a")]
    Old,
    /// The new file
    #[value(alias = "b")]
    New,
}

impl From<CliSide> for DisplaySide {
    fn from(side: CliSide) -> Self {
        match side {
            CliSide::Old => DisplaySide::A,
            CliSide::New => DisplaySide::B,
        }
    }
}

/// Represents input mode detected from arguments
enum InputMode {
    /// Git external diff: path old-file old-hex old-mode new-file new-hex new-mode
    GitExternal {
        display_path: PathBuf,
        old_file: PathBuf,
        new_file: PathBuf,
    },
    /// Two files to compare
    TwoPaths { old_path: PathBuf, new_path: PathBuf },
    /// Precomputed diff
    Json(PathBuf),
    /// No valid input
    None,
}

/// Detect if we're being called as a git external diff tool
/// Git calls: sbs path old-file old-hex old-mode new-file new-hex new-mode
fn detect_input_mode(args: &Args) -> InputMode {
    let paths = &args.paths;
    if let Some(json) = &args.json {
        InputMode::Json(json.clone())
    } else if paths.len() == 7 {
        InputMode::GitExternal {
            display_path: paths[0].clone(),
            old_file: paths[1].clone(),
            new_file: paths[4].clone(),
        }
    } else if paths.len() == 2 {
        InputMode::TwoPaths {
            old_path: paths[0].clone(),
            new_path: paths[1].clone(),
        }
    } else {
        InputMode::None
    }
}

/// Read one side; `/dev/null` means the file does not exist on that side
fn read_side(path: &Path, display_name: &str) -> Result<Option<SourceFile>> {
    if path.to_string_lossy() == "/dev/null" {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .context(format!("Failed to read: {}", path.display()))?;
    Ok(Some(SourceFile::new(display_name, text)))
}

fn load_source(mode: InputMode) -> Result<DiffSource> {
    match mode {
        InputMode::GitExternal {
            display_path,
            old_file,
            new_file,
        } => {
            let name = display_path.to_string_lossy();
            Ok(DiffSource::Files {
                old: read_side(&old_file, &name)?,
                new: read_side(&new_file, &name)?,
            })
        }
        InputMode::TwoPaths { old_path, new_path } => Ok(DiffSource::Files {
            old: read_side(&old_path, &old_path.to_string_lossy())?,
            new: read_side(&new_path, &new_path.to_string_lossy())?,
        }),
        InputMode::Json(path) => {
            let diff = if path.as_os_str() == "-" {
                let mut json = String::new();
                io::stdin()
                    .read_to_string(&mut json)
                    .context("Failed to read diff from stdin")?;
                DiffInfo::from_json(&json).context("Invalid diff JSON on stdin")?
            } else {
                let json = std::fs::read_to_string(&path)
                    .context(format!("Failed to read: {}", path.display()))?;
                DiffInfo::from_json(&json)
                    .context(format!("Invalid diff JSON: {}", path.display()))?
            };
            Ok(DiffSource::Json(diff))
        }
        InputMode::None => {
            anyhow::bail!(
                "Usage: sbs <old_file> <new_file>\n\
                 \n\
                 Or: sbs --json <diff.json>"
            );
        }
    }
}

fn load_comments(path: Option<&Path>) -> Result<Vec<CommentInfo>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read comments: {}", path.display()))?;
    CommentInfo::list_from_json(&json).context(format!("Invalid comments JSON: {}", path.display()))
}

/// Log to the file named by `SBS_LOG`; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = std::env::var_os("SBS_LOG") else {
        return;
    };
    match std::fs::File::create(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(err) => eprintln!(
            "Warning: Failed to open log file {}: {}",
            Path::new(&path).display(),
            err
        ),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    let config = config::Config::load();

    let source = load_source(detect_input_mode(&args))?;
    let comments = load_comments(args.comments.as_deref())?;

    // CLI flags override config
    let mut prefs = config.diff.clone();
    if let Some(context) = args.context {
        prefs.context = context;
    }
    if args.no_intraline {
        prefs.intraline_difference = false;
    }
    if args.ignore_whitespace {
        prefs.ignore_whitespace = true;
    }
    let syntax = config.syntax_enabled() && !args.no_syntax;
    prefs.syntax_highlighting = syntax;

    let theme = Theme::resolve(&config.ui.colors);
    // Header and status bar take a row each
    let rows = crossterm::terminal::size()
        .map(|(_, height)| height.saturating_sub(2))
        .unwrap_or(24);

    let mut app = App::new(source, prefs, comments, theme, rows);
    app.cursor_marker = config.ui.cursor_marker.clone();
    app.show(args.side.map(DisplaySide::from), args.line);
    log::info!(
        "showing {} ({} chunks)",
        app.file_name().unwrap_or("(no file)"),
        app.view.chunks().chunks().len()
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(16);

    loop {
        app.poll_reloads();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Mouse(me) => {
                    if app.show_help {
                        continue;
                    }
                    app.reset_count();
                    match me.kind {
                        MouseEventKind::ScrollUp => app.view.scroll_by(-WHEEL_STEP),
                        MouseEventKind::ScrollDown => app.view.scroll_by(WHEEL_STEP),
                        _ => {}
                    }
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.show_help {
                        if matches!(key.code, KeyCode::Char('q' | '?') | KeyCode::Esc) {
                            app.show_help = false;
                        }
                        continue;
                    }
                    app.message = None;
                    handle_key(app, key.code, key.modifiers);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        // Digit keys for vim-style counts (e.g., 10j, 3n)
        KeyCode::Char(c @ '1'..='9') => app.push_count_digit(c as u8 - b'0'),
        KeyCode::Char('0') if app.pending_count.is_some() => app.push_count_digit(0),
        KeyCode::Char('q') | KeyCode::Esc => {
            app.reset_count();
            app.should_quit = true;
        }
        KeyCode::Char('d') if ctrl => {
            app.reset_count();
            app.half_page_down();
        }
        KeyCode::Char('u') if ctrl => {
            app.reset_count();
            app.half_page_up();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let count = app.take_count();
            app.cursor_down(count);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let count = app.take_count();
            app.cursor_up(count);
        }
        KeyCode::Char('n') => {
            let count = app.take_count();
            app.next_chunk(count);
        }
        KeyCode::Char('p') | KeyCode::Char('N') => {
            let count = app.take_count();
            app.prev_chunk(count);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.reset_count();
            app.focus_side(DisplaySide::A);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.reset_count();
            app.focus_side(DisplaySide::B);
        }
        KeyCode::Tab => {
            app.reset_count();
            app.switch_side();
        }
        KeyCode::Char(' ') | KeyCode::PageDown => {
            app.reset_count();
            app.page_down();
        }
        KeyCode::Char('b') | KeyCode::PageUp => {
            app.reset_count();
            app.page_up();
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.reset_count();
            app.goto_start();
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.reset_count();
            app.goto_end();
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            app.reset_count();
            app.toggle_comment();
        }
        KeyCode::Char('O') => {
            app.reset_count();
            app.toggle_line_comments();
        }
        KeyCode::Char('C') => {
            app.reset_count();
            app.toggle_expand_all_comments();
        }
        KeyCode::Char('e') => {
            app.reset_count();
            app.expand_skip(sbs_core::Expand::All);
        }
        KeyCode::Char('{') => {
            app.reset_count();
            app.expand_skip_before();
        }
        KeyCode::Char('}') => {
            app.reset_count();
            app.expand_skip_after();
        }
        KeyCode::Char('c') => {
            app.reset_count();
            app.cycle_context();
        }
        KeyCode::Char('i') => {
            app.reset_count();
            app.toggle_intraline();
        }
        KeyCode::Char('w') => {
            app.reset_count();
            app.toggle_ignore_whitespace();
        }
        KeyCode::Char('s') => {
            app.reset_count();
            app.toggle_syntax();
        }
        KeyCode::Char('#') => {
            app.reset_count();
            app.toggle_line_numbers();
        }
        KeyCode::Char('t') => {
            app.reset_count();
            app.toggle_tabs();
        }
        KeyCode::Char('W') => {
            app.reset_count();
            app.toggle_whitespace_errors();
        }
        KeyCode::Char('?') => {
            app.reset_count();
            app.toggle_help();
        }
        _ => app.reset_count(),
    }
}
