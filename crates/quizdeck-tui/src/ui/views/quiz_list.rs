use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use quizdeck_core::models::QuizSummary;
use quizdeck_core::{CardTarget, ListView};

use crate::app::{App, GRID_COLUMNS};
use crate::ui::styles;
use crate::utils::truncate_string;

/// Card height including borders: name, detail line, controls
const CARD_HEIGHT: u16 = 5;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(67), Constraint::Percentage(33)])
        .split(area);

    render_quiz_panel(frame, app, chunks[0]);
    render_actions_panel(frame, app, chunks[1]);
}

fn render_quiz_panel(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.page.view();

    let title = match view {
        ListView::Cards(cards) => format!(" Danh sách Quiz ({}) ", cards.len()),
        _ => " Danh sách Quiz ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match view {
        ListView::Loading => render_message(frame, inner, "Đang tải...", styles::muted_style()),
        ListView::Error(message) => render_message(frame, inner, message, styles::error_style()),
        ListView::Empty => render_message(frame, inner, "Không có quiz nào.", styles::muted_style()),
        ListView::Cards(cards) => render_cards(frame, app, cards, inner),
    }
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, style: Style) {
    let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", message), style)));
    frame.render_widget(paragraph, area);
}

/// First grid row to draw so that `selected_row` stays on screen
fn first_visible_row(selected_row: usize, visible_rows: usize) -> usize {
    selected_row.saturating_sub(visible_rows.saturating_sub(1))
}

fn render_cards(frame: &mut Frame, app: &App, cards: &[QuizSummary], area: Rect) {
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let total_rows = cards.len().div_ceil(GRID_COLUMNS);
    let first_row = first_visible_row(app.selection / GRID_COLUMNS, visible_rows);
    let last_row = total_rows.min(first_row + visible_rows);

    let mut constraints = vec![Constraint::Length(CARD_HEIGHT); visible_rows];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, row) in (first_row..last_row).enumerate() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(rows[slot]);

        for (column, cell) in columns.iter().enumerate() {
            let index = row * GRID_COLUMNS + column;
            if let Some(quiz) = cards.get(index) {
                let focus = (index == app.selection).then_some(app.card_target);
                render_card(frame, quiz, focus, *cell);
            }
        }
    }
}

/// Draw one card. `focus` is the focused control when the card is selected.
fn render_card(frame: &mut Frame, quiz: &QuizSummary, focus: Option<CardTarget>, area: Rect) {
    let selected = focus.is_some();
    let name_width = usize::from(area.width.saturating_sub(4));

    let marker = if focus == Some(CardTarget::Body) { "▶ " } else { "" };
    let name_style = if selected {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    let detail = match quiz.question_count() {
        Some(count) => format!("{} câu hỏi", count),
        None => String::new(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(marker, styles::highlight_style()),
            Span::styled(truncate_string(&quiz.quiz_name, name_width), name_style),
        ]),
        Line::from(Span::styled(detail, styles::muted_style())),
        Line::from(vec![
            Span::styled(
                format!("[ {} ]", CardTarget::Delete.label()),
                styles::delete_button_style(focus == Some(CardTarget::Delete)),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[ {} ]", CardTarget::Edit.label()),
                styles::edit_button_style(focus == Some(CardTarget::Edit)),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(selected));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_actions_panel(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" [a] ", styles::help_key_style()),
            Span::styled("Thêm Quiz", styles::success_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Tải lên PDF", styles::highlight_style())),
        Line::from(Span::styled(
            " Chọn để tải lên PDF và tạo câu hỏi.",
            styles::muted_style(),
        )),
        Line::from(vec![
            Span::styled(" [U] ", styles::help_key_style()),
            Span::styled("Tải lên", styles::help_desc_style()),
        ]),
        Line::from(""),
    ];

    if app.session.is_authenticated() {
        lines.push(Line::from(vec![
            Span::styled(" [L] ", styles::help_key_style()),
            Span::styled("Đăng xuất", styles::error_style()),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::styled(" [i] ", styles::help_key_style()),
            Span::styled("Đăng nhập", styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .title(" Thao tác ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
