use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, InputMode};
use crate::layout::{char_width, message_rows, Cell};
use crate::state::{Message, Role};
use crate::widgets::InputField;

fn role_style(role: Role) -> Style {
    let color = match role {
        Role::User => Color::Cyan,
        Role::Bot => Color::Yellow,
        Role::Error => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Group consecutive cells with the same weight into spans.
fn body_line(cells: &[Cell], base: Style) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut bold = false;

    for cell in cells {
        if cell.bold != bold && !run.is_empty() {
            spans.push(styled_run(std::mem::take(&mut run), bold, base));
        }
        bold = cell.bold;
        run.push(cell.ch);
    }
    if !run.is_empty() {
        spans.push(styled_run(run, bold, base));
    }

    Line::from(spans)
}

fn styled_run(text: String, bold: bool, base: Style) -> Span<'static> {
    if bold {
        Span::styled(text, base.add_modifier(Modifier::BOLD))
    } else {
        Span::styled(text, base)
    }
}

/// Label, body already wrapped to `width`, then a blank separator.
fn message_lines(msg: &Message, width: u16) -> Vec<Line<'static>> {
    let base = match msg.role {
        Role::Error => Style::default().fg(Color::Red),
        Role::User | Role::Bot => Style::default(),
    };

    let mut lines = vec![Line::from(Span::styled(msg.role.label(), role_style(msg.role)))];
    lines.extend(message_rows(msg, width).iter().map(|row| body_line(row, base)));
    lines.push(Line::default());
    lines
}

/// Visible slice of the input and the cursor column inside the box, both
/// measured in terminal columns.
fn input_window(value: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = value.chars().collect();
    let cursor = cursor.min(chars.len());

    // Keep one column free for the cursor itself
    let mut start = cursor;
    let mut before = 0;
    while start > 0 {
        let w = char_width(chars[start - 1]);
        if before + w > width - 1 {
            break;
        }
        before += w;
        start -= 1;
    }

    let mut used = 0;
    let visible = chars[start..]
        .iter()
        .take_while(|&&c| {
            used += char_width(c);
            used <= width
        })
        .collect();

    (visible, before as u16)
}

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, log_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_log(app, frame, log_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Ecofin Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.server_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_log(app: &App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    let width = area.width.saturating_sub(2);
    app.log.set_viewport(width, area.height.saturating_sub(2));
    let snapshot = app.log.snapshot();

    let title = if app.is_sending() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!(" Messages - sending{} ", dots)
    } else {
        " Messages ".to_string()
    };
    let border_color = if app.input_mode == InputMode::Normal { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let text = if snapshot.messages.is_empty() {
        Text::from(Span::styled(
            "Posez une question sur l'actualité africaine...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(
            snapshot
                .messages
                .iter()
                .flat_map(|m| message_lines(m, width))
                .collect::<Vec<_>>(),
        )
    };

    // Rows are pre-wrapped so the scroll bound matches what is drawn
    let log = Paragraph::new(text)
        .block(block)
        .scroll((snapshot.scroll, 0));

    frame.render_widget(log, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Message ");

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_x) = input_window(&app.input.value(), app.input.cursor(), inner_width);

    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style, hints) = match app.input_mode {
        InputMode::Editing => (
            " INSERT ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
            " Enter send | Esc/Tab scroll log | Ctrl-C quit ",
        ),
        InputMode::Normal => (
            " NORMAL ",
            Style::default().bg(Color::Blue).fg(Color::White),
            " i/Enter type | j/k PgUp/PgDn scroll | g/G top/bottom | q quit ",
        ),
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
