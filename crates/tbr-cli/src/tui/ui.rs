//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use tbr_core::{BookStatus, StatusFilter};

use super::app::{App, BookForm, FormField, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Vertical layout with a one-line status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    // A failed load replaces the list until the next reload
    if let Some(error) = app.library.error() {
        draw_error_pane(frame, error, outer_chunks[0]);
    } else {
        draw_list_pane(frame, app, outer_chunks[0]);
    }

    // Draw status bar or search input
    match app.input_mode {
        InputMode::Search => draw_search_input(frame, app, outer_chunks[1]),
        _ => draw_status_bar(frame, app, outer_chunks[1]),
    }

    // Overlays
    if let Some(form) = &app.form {
        draw_form_overlay(frame, form);
    }
    if app.input_mode == InputMode::Confirm {
        draw_confirm_overlay(frame, app);
    }
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// One-character marker for each status
fn status_glyph(status: BookStatus) -> &'static str {
    match status {
        BookStatus::Planning => "○",
        BookStatus::Reading => "◐",
        BookStatus::Done => "●",
    }
}

/// Draw the book list
fn draw_list_pane(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.library.visible_books();

    let items: Vec<ListItem> = visible
        .iter()
        .map(|book| {
            let date = book.created_at.format("%Y-%m-%d").to_string();
            let byline = match &book.author {
                Some(author) => format!("  {}  {}", author, date),
                None => format!("  {}", date),
            };

            let line = Line::from(vec![
                Span::raw(format!("{} ", status_glyph(book.status))),
                Span::raw(book.title.clone()),
                Span::styled(byline, Style::default().add_modifier(Modifier::DIM)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let block = Block::default()
        .title(list_title(app))
        .borders(Borders::ALL);

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Title for the list block: counts, active filter, busy state
fn list_title(app: &App) -> String {
    let total = app.library.books().len();
    let shown = app.library.visible_books().len();

    let mut title = if shown == total {
        format!(" Books ({}) ", total)
    } else {
        format!(" Books ({}/{}) ", shown, total)
    };

    if let StatusFilter::Only(status) = app.library.status_filter() {
        title.push_str(&format!("- {} ", status));
    }

    if app.library.is_loading() {
        title.push_str("- loading ");
    } else if app.library.is_refreshing() {
        title.push_str("- refreshing ");
    } else if app.library.is_importing() {
        title.push_str("- importing ");
    }

    title
}

/// Draw the error state where the list would be
fn draw_error_pane(frame: &mut Frame, error: &str, area: Rect) {
    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to reload",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        "a:add  e:edit  Space:status  d:del  /:search  f:filter  r:reload  i:import  ?:help  q:quit"
            .to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw search input at the bottom
fn draw_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "/";
    let input = &app.search_input;

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(input.as_str()),
        Span::styled(
            format!("  ({} matches)", app.library.visible_books().len()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    let paragraph = Paragraph::new(line);
    frame.render_widget(paragraph, area);

    // Position cursor at the end of the input, in display cells
    let cursor_x = area.x + (display_width(prefix) + display_width(input)) as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Width of rendered text in terminal cells (wide characters take two)
fn display_width(s: &str) -> usize {
    Span::raw(s).width()
}

/// Draw the add/edit form overlay
fn draw_form_overlay(frame: &mut Frame, form: &BookForm) {
    let mut height = 8;
    if form.error.is_some() {
        height += 2;
    }
    let area = centered_rect(frame.area(), 50, height);
    frame.render_widget(Clear, area);

    let title = if form.is_edit() {
        " Edit Book "
    } else {
        " Add Book "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let focused = Style::default().add_modifier(Modifier::BOLD);
    let blurred = Style::default().add_modifier(Modifier::DIM);
    let (title_style, author_style) = match form.focus {
        FormField::Title => (focused, blurred),
        FormField::Author => (blurred, focused),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Title:  ", title_style),
            Span::raw(form.title.as_str()),
            cursor_marker(form.focus == FormField::Title),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Author: ", author_style),
            Span::raw(form.author.as_str()),
            cursor_marker(form.focus == FormField::Author),
        ]),
        Line::from(""),
    ];

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Enter: save  Tab: switch field  Esc: cancel",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn cursor_marker(focused: bool) -> Span<'static> {
    if focused {
        Span::styled("_", Style::default().add_modifier(Modifier::DIM))
    } else {
        Span::raw("")
    }
}

/// Draw the delete confirmation overlay
fn draw_confirm_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(frame.area(), 40, 5);
    frame.render_widget(Clear, area);

    let title = app.pending_delete_title().unwrap_or_default();
    let lines = vec![
        Line::from(format!("Remove '{}'?", title)),
        Line::from(""),
        Line::from(Span::styled(
            "y: remove  n: keep",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 46, 20);
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from(""),
        Line::from("Books:"),
        Line::from("  a           Add book"),
        Line::from("  e           Edit book"),
        Line::from("  Space, t    Cycle status"),
        Line::from("  d           Delete book"),
        Line::from(""),
        Line::from("View:"),
        Line::from("  /           Search titles"),
        Line::from("  f           Cycle status filter"),
        Line::from("  r           Reload"),
        Line::from("  i           Import from remote"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

/// Centered popup area clamped to the frame
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}
