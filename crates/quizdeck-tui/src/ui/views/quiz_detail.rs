use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use quizdeck_core::models::{Attempt, Quiz};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(67), Constraint::Percentage(33)])
        .split(area);

    render_questions(frame, app, chunks[0]);
    render_history(frame, app, chunks[1]);
}

fn render_questions(frame: &mut Frame, app: &App, area: Rect) {
    let detail = &app.detail;

    let lines = if detail.loading {
        vec![Line::from(Span::styled(" Đang tải...", styles::muted_style()))]
    } else if let Some(ref error) = detail.error {
        vec![Line::from(Span::styled(format!(" {}", error), styles::error_style()))]
    } else if let Some(ref quiz) = detail.quiz {
        question_lines(quiz)
    } else {
        Vec::new()
    };

    let block = Block::default()
        .title(format!(" {} ", detail.quiz_name))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let scroll = u16::try_from(detail.scroll).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Option label for the nth choice: A, B, C, ...
fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
        .unwrap_or('?')
}

fn question_lines(quiz: &Quiz) -> Vec<Line<'static>> {
    if quiz.questions.is_empty() {
        return vec![Line::from(Span::styled(" Chưa có câu hỏi.", styles::muted_style()))];
    }

    let mut lines = Vec::new();
    for (i, question) in quiz.questions.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!(" {}. {}", i + 1, question.question_text),
            styles::highlight_style(),
        )));

        let correct = question.correct();
        for (j, option) in question.options.iter().enumerate() {
            let is_correct = correct == Some(option.as_str());
            let style = if is_correct {
                styles::success_style()
            } else {
                styles::list_item_style()
            };
            let mark = if is_correct { " ✓" } else { "" };
            lines.push(Line::styled(
                format!("    {}. {}{}", option_label(j), option, mark),
                style,
            ));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn history_lines(history: &[Attempt], total: usize) -> Vec<Line<'static>> {
    if history.is_empty() {
        return vec![Line::from(Span::styled(" Chưa có lượt làm bài.", styles::muted_style()))];
    }

    history
        .iter()
        .enumerate()
        .map(|(i, attempt)| {
            Line::from(vec![
                Span::styled(format!(" #{:<3}", i + 1), styles::muted_style()),
                Span::styled(attempt.score_display(total), styles::list_item_style()),
            ])
        })
        .collect()
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let total = app
        .detail
        .quiz
        .as_ref()
        .map(|q| q.questions.len())
        .unwrap_or(0);

    let lines = if app.detail.loading {
        Vec::new()
    } else {
        history_lines(&app.detail.history, total)
    };

    let block = Block::default()
        .title(" Lịch sử ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdeck_core::models::Question;

    #[test]
    fn test_option_label() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
        assert_eq!(option_label(25), 'Z');
        assert_eq!(option_label(26), '?');
    }

    #[test]
    fn test_question_lines_layout() {
        let quiz = Quiz {
            quiz_name: "math-101".to_string(),
            questions: vec![Question {
                question_text: "1 + 1 = ?".to_string(),
                options: vec!["1".to_string(), "2".to_string()],
                correct_answer: Some("2".to_string()),
                answer: None,
            }],
            extra: Default::default(),
        };

        let lines = question_lines(&quiz);
        // Question, two options, spacer
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2].to_string(), "    B. 2 ✓");
    }

    #[test]
    fn test_history_lines_empty() {
        assert_eq!(history_lines(&[], 3).len(), 1);
    }
}
