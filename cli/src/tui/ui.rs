use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputMode};

const PLACEHOLDER: &str = "Add new task";

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // List
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let header = Paragraph::new("TO-DO LIST")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, chunks[0]);

    draw_todo_list(f, app, chunks[1]);
    draw_input(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

fn draw_todo_list(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .list
        .todos()
        .iter()
        .map(|todo| {
            let (icon, text_style) = if todo.done {
                (
                    "✔",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("☐", Style::default().add_modifier(Modifier::BOLD))
            };
            Row::new(vec![
                Span::raw(icon),
                Span::styled(todo.text.clone(), text_style),
            ])
        })
        .collect();

    let title = format!(" Tasks ({}/{}) ", app.list.remaining(), app.list.len());
    let table = Table::new(rows, [Constraint::Length(3), Constraint::Min(10)])
        .block(Block::default().title(title).borders(Borders::ALL).border_type(BorderType::Rounded))
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let draft = app.list.draft();
    let editing = app.input_mode == InputMode::Editing;

    let paragraph = if draft.is_empty() && !editing {
        Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(draft)
    };
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let paragraph = paragraph.block(
        Block::default()
            .title(" New ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style),
    );
    f.render_widget(paragraph, area);

    if editing {
        let before_cursor: String = draft.chars().take(app.cursor_position).collect();
        let offset = u16::try_from(before_cursor.width()).unwrap_or(u16::MAX);
        let max_x = area.x + area.width.saturating_sub(2);
        f.set_cursor_position((area.x.saturating_add(1).saturating_add(offset).min(max_x), area.y + 1));
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let notice = app.save_error.as_ref().or(app.status.as_ref());
    let (text, style) = if let Some(status) = notice {
        (status.clone(), Style::default().fg(Color::Red))
    } else {
        let help = match app.input_mode {
            InputMode::Normal => "j/k: Navigate | space: Toggle | d: Delete | a: Add | q: Quit",
            InputMode::Editing => "enter: Add | esc: Cancel",
        };
        let text = if app.saving() {
            format!("{} | saving...", help)
        } else {
            help.to_string()
        };
        (text, Style::default().fg(Color::DarkGray))
    };

    let footer = Paragraph::new(text).style(style).alignment(Alignment::Center);
    f.render_widget(footer, area);
}
