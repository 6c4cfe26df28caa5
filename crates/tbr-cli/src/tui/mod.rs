//! tbr TUI
//!
//! Terminal user interface for tbr - a reading list.
//!
//! ## Layout
//!
//! A single book list with a one-line status bar at the bottom.
//! Add/edit forms, delete confirmation and help render as centered
//! overlays.
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - q: Quit
//!
//! ## Commands
//!
//! - a: Add book
//! - e: Edit book
//! - Space or t: Cycle status
//! - d: Delete book (with confirmation)
//! - /: Search titles
//! - f: Cycle status filter
//! - r: Reload from the database
//! - i: Import from the remote endpoint
//! - ?: Help

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tbr_core::{Config, Library};

use app::{App, InputMode};

/// Run the TUI application
pub async fn run() -> Result<()> {
    let config = Config::load()?;

    // Initialize TUI logging (file-based, only if TBR_LOG is set)
    init_tui_logging(&config);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create app and paint the loading state before touching the database
    let mut app = App::new(Library::open_with_config(&config));
    terminal.draw(|frame| ui::draw(frame, &app))?;
    app.load().await;

    // Run app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Let queued async work run, then check for terminal events
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        if event::poll(std::time::Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // If help is showing, any key dismisses it
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                // Handle based on input mode
                match app.input_mode {
                    InputMode::Normal => {
                        handle_normal_mode(terminal, app, key.code, key.modifiers).await?;
                    }
                    InputMode::Search => handle_search_mode(app, key.code),
                    InputMode::Form => handle_form_mode(app, key.code).await,
                    InputMode::Confirm => handle_confirm_mode(app, key.code).await,
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
async fn handle_normal_mode<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    // Clear status message on navigation keys
    match code {
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down => {
            app.status_message = None;
        }
        _ => {}
    }

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Navigation
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
        }

        // Book commands
        KeyCode::Char('a') => {
            app.open_add_form();
        }
        KeyCode::Char('e') => {
            app.open_edit_form();
        }
        KeyCode::Char(' ') | KeyCode::Char('t') => {
            app.cycle_selected().await;
        }
        KeyCode::Char('d') => {
            app.request_delete();
        }

        // View commands
        KeyCode::Char('/') => {
            app.enter_search();
        }
        KeyCode::Char('f') => {
            app.cycle_filter();
        }
        KeyCode::Char('r') => {
            app.reload().await;
        }
        KeyCode::Char('i') => {
            // Repaint first so the importing state shows during the fetch
            app.set_status("Importing...");
            terminal.draw(|frame| ui::draw(frame, app))?;
            app.import().await;
        }

        // Help
        KeyCode::Char('?') => {
            app.toggle_help();
        }

        _ => {}
    }

    Ok(())
}

/// Handle key events in search mode
fn handle_search_mode(app: &mut App, code: KeyCode) {
    match code {
        // Keep the query
        KeyCode::Enter => {
            app.accept_search();
        }
        // Drop the query
        KeyCode::Esc => {
            app.cancel_search();
        }
        KeyCode::Char(c) => {
            app.push_search_char(c);
        }
        KeyCode::Backspace => {
            app.pop_search_char();
        }
        _ => {}
    }
}

/// Handle key events while the add/edit form is open
async fn handle_form_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.close_form();
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_form_focus();
        }
        KeyCode::Enter => {
            app.submit_form().await;
        }
        KeyCode::Char(c) => {
            app.push_form_char(c);
        }
        KeyCode::Backspace => {
            app.pop_form_char();
        }
        _ => {}
    }
}

/// Handle key events in the delete confirmation overlay
async fn handle_confirm_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.confirm_delete().await;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.cancel_delete();
        }
        _ => {}
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if the TBR_LOG environment variable is set.
/// Logs to a file so nothing writes over the terminal UI.
fn init_tui_logging(config: &Config) {
    // Only log if TBR_LOG is set
    let Ok(log_level) = std::env::var("TBR_LOG") else {
        return;
    };

    // The log lives in the data directory, which may not exist yet
    let _ = config.ensure_data_dir();
    let log_path = config.log_path();

    // Create log file
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("tbr_core={},tbr={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
