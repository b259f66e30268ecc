use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use quizdeck_core::Route;

use crate::app::{App, AppState, LoginFocus};

use super::styles;
use super::views::{quiz_detail, quiz_list};

/// Visible width of the login form inputs
const FIELD_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  Quizdeck  {}", app.route.path());
    let help_hint = "[?] Help";
    let title_len = title.chars().count();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            usize::from(area.width).saturating_sub(title_len + help_hint.len() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match &app.route {
        Route::Home => quiz_list::render(frame, app, area),
        Route::Login => render_login(frame, app, area),
        Route::QuizDetail(_) => quiz_detail::render(frame, app, area),
        route @ (Route::EditQuiz(_) | Route::AddQuiz | Route::Upload) => {
            render_web_only(frame, app, route, area)
        }
    }
}

/// Views served only by the web front-end: show where to find them
fn render_web_only(frame: &mut Frame, app: &App, route: &Route, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", route.title()), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Open in a browser: ", styles::muted_style()),
            Span::styled(app.config.route_url(route), styles::list_item_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to return to the quiz list", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", route.path()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Show the tail of `value` that fits in the field, padded to its width
fn field_display(value: &str, focused: bool) -> String {
    let count = value.chars().count();
    let visible: String = value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect();
    let cursor = if focused { "▌" } else { "" };
    format!("{:<width$}{}", visible, cursor, width = FIELD_WIDTH)
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.login_error.is_some() { 12 } else { 10 };
    let form = centered_rect_fixed(48, height, area);

    let field_style = |focused: bool| {
        if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        }
    };

    let username_focused = app.login_focus == LoginFocus::Username;
    let password_focused = app.login_focus == LoginFocus::Password;
    let button_focused = app.login_focus == LoginFocus::Button;
    let masked = "*".repeat(app.login_password.chars().count());

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("   "),
            Span::styled("Username: [", styles::muted_style()),
            Span::styled(
                field_display(&app.login_username, username_focused),
                field_style(username_focused),
            ),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(vec![
            Span::raw("   "),
            Span::styled("Password: [", styles::muted_style()),
            Span::styled(
                field_display(&masked, password_focused),
                field_style(password_focused),
            ),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(""),
    ];

    let button_label = if app.login_pending {
        " Signing in... "
    } else if button_focused {
        "  ▶ Sign in ◀  "
    } else {
        "    Sign in    "
    };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(button_label, field_style(button_focused)),
        Span::raw("]"),
    ]));

    // Error message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Đăng nhập ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), form);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.route {
        Route::Home => "[r]eload | [q]uit",
        Route::Login => "[Enter] sign in | [Esc] back",
        _ => "[Esc] back | [q]uit",
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Updated {} ", app.last_loaded())
    };

    let right_text = format!(" {} ", shortcuts);

    let width = usize::from(area.width);
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_entry(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Quizdeck", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Quiz list", styles::highlight_style())),
        help_entry("←↑↓→/hjkl", "Move between cards"),
        help_entry("Tab", "Cycle card controls"),
        help_entry("Enter", "Activate focused control"),
        help_entry("o / d / e", "Open / delete / edit quiz"),
        help_entry("a", "Add quiz"),
        help_entry("U", "Upload PDF"),
        help_entry("r", "Reload the list"),
        Line::from(""),
        Line::from(Span::styled(" Session", styles::highlight_style())),
        help_entry("i", "Sign in"),
        help_entry("L", "Sign out"),
        Line::from(""),
        Line::from(Span::styled(" Other views", styles::highlight_style())),
        help_entry("j / k", "Scroll quiz detail"),
        help_entry("Esc", "Back to the list"),
        help_entry("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
