use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use oracles_core::ChatRole;
use crate::app::App;

/// Composer rows available for the draft before it scrolls
const MAX_DRAFT_ROWS: u16 = 5;

const EMPTY_STATE: &str = "Start a single chat session. Nothing is saved.";

/// Render `**bold**` spans in a reply line; an unmatched `**` stays literal.
fn styled_reply_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    let all_closed = parts.len() % 2 == 1;
    let last = parts.len() - 1;

    let spans: Vec<Span<'static>> = parts
        .iter()
        .enumerate()
        .filter_map(|(i, part)| {
            if !all_closed && i == last {
                Some(Span::raw(format!("**{}", part)))
            } else if part.is_empty() {
                None
            } else if i % 2 == 1 {
                Some(Span::styled(
                    part.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Some(Span::raw(part.to_string()))
            }
        })
        .collect();

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let draft_rows = (app.session.draft().split('\n').count() as u16).clamp(1, MAX_DRAFT_ROWS);
    let error_rows = if app.session.error().is_some() { 2 } else { 0 };

    let [header_area, chat_area, composer_area, error_area, endpoint_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(draft_rows + 2),
            Constraint::Length(error_rows),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_composer(app, frame, composer_area);
    render_error(app, frame, error_area);
    render_endpoint(app, frame, endpoint_area);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.session.is_loading() {
        Span::styled(" Thinking ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        Span::styled(" Ready ", Style::default().bg(Color::Green).fg(Color::Black))
    };

    let title = Line::from(vec![
        Span::styled(" Oracles LLM ", Style::default().fg(Color::Cyan).bold()),
        status,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let inner_width = area.width.saturating_sub(2);
    let thread = Paragraph::new(thread_text(app)).wrap(Wrap { trim: false });

    // Scroll limits come from the wrapped height ratatui will actually draw
    app.chat_height = area.height.saturating_sub(2);
    app.chat_lines = thread.line_count(inner_width).min(u16::MAX as usize) as u16;
    app.follow_latest();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat = thread.block(chat_block).scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn thread_text(app: &App) -> Text<'static> {
    let turns = app.session.turns();
    if turns.is_empty() && !app.session.is_loading() {
        return Text::from(Span::styled(EMPTY_STATE, Style::default().fg(Color::DarkGray)));
    }

    let mut lines: Vec<Line<'static>> = Vec::new();

    for turn in turns {
        match turn.role {
            ChatRole::User => {
                lines.push(role_label(ChatRole::User));
                lines.extend(turn.content.lines().map(|line| Line::from(line.to_string())));
            }
            ChatRole::Assistant => {
                lines.push(role_label(ChatRole::Assistant));
                lines.extend(turn.content.lines().map(styled_reply_line));
            }
        }
        lines.push(Line::default());
    }

    if app.session.is_loading() {
        lines.push(role_label(ChatRole::Assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn role_label(role: ChatRole) -> Line<'static> {
    let (label, color) = match role {
        ChatRole::User => ("You", Color::Cyan),
        ChatRole::Assistant => ("Oracles", Color::Yellow),
    };
    Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn render_composer(app: &App, frame: &mut Frame, area: Rect) {
    let send_style = if app.session.can_submit() {
        Style::default().bg(Color::Green).fg(Color::Black).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Ask anything ")
        .title_top(Line::from(Span::styled(" Send ", send_style)).right_aligned());

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    // Cursor position as (row, column) within the draft
    let draft = app.session.draft();
    let before_cursor: String = draft.chars().take(app.cursor).collect();
    let cursor_row = before_cursor.matches('\n').count();
    let cursor_col = before_cursor
        .rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0);

    // Scroll offsets that keep the cursor visible
    let col_offset = if inner_width > 0 && cursor_col >= inner_width {
        cursor_col - inner_width + 1
    } else {
        0
    };
    let row_offset = if inner_height > 0 && cursor_row >= inner_height {
        cursor_row - inner_height + 1
    } else {
        0
    };

    let input_text = if draft.is_empty() {
        Text::from(Span::styled("Ask anything", Style::default().fg(Color::DarkGray)))
    } else {
        let visible: Vec<Line> = draft
            .split('\n')
            .skip(row_offset)
            .take(inner_height)
            .map(|line| {
                Line::from(line.chars().skip(col_offset).take(inner_width).collect::<String>())
            })
            .collect();
        Text::from(visible)
    };

    let input = Paragraph::new(input_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    frame.set_cursor_position((
        area.x + 1 + (cursor_col - col_offset) as u16,
        area.y + 1 + (cursor_row - row_offset) as u16,
    ));
}

fn render_error(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(error) = app.session.error() {
        let error = Paragraph::new(error.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(error, area);
    }
}

fn render_endpoint(app: &App, frame: &mut Frame, area: Rect) {
    let endpoint = Paragraph::new(format!("Endpoint: {}", app.client.endpoint()))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(endpoint, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = Line::from(vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Shift+Enter ", key_style),
        Span::styled(" newline ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(hints).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracles_core::{ChatClient, ChatError, ChatResponse};
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(ChatClient::new("http://localhost:8000"))
    }

    fn draw(app: &mut App) -> String {
        draw_sized(app, 80, 24)
    }

    #[test]
    fn test_empty_state_and_endpoint() {
        let screen = draw(&mut app());

        assert!(screen.contains(EMPTY_STATE));
        assert!(screen.contains("Endpoint: http://localhost:8000/api/v1/chat"));
        assert!(screen.contains("Oracles LLM"));
    }

    #[test]
    fn test_turns_render_with_role_labels() {
        let mut app = app();
        app.session.set_draft("What is a borrow?");
        app.session.begin_submit();
        app.session.settle(Ok(ChatResponse {
            response: Some("A **reference** to a value".to_string()),
        }));

        let screen = draw(&mut app);

        assert!(screen.contains("You"));
        assert!(screen.contains("What is a borrow?"));
        assert!(screen.contains("Oracles"));
        assert!(screen.contains("A reference to a value"));
        assert!(!screen.contains(EMPTY_STATE));
    }

    #[test]
    fn test_typing_indicator_while_loading() {
        let mut app = app();
        app.session.set_draft("hi");
        app.session.begin_submit();

        let screen = draw(&mut app);
        assert!(screen.contains("typing."));
        assert!(screen.contains("Thinking"));
    }

    #[test]
    fn test_error_line_is_shown() {
        let mut app = app();
        app.session.set_draft("hi");
        app.session.begin_submit();
        app.session.settle(Err(ChatError::Http {
            status: 500,
            body: "boom".to_string(),
        }));

        let screen = draw(&mut app);
        assert!(screen.contains("boom"));
        assert!(!screen.contains("typing"));
    }

    fn draw_sized(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_wrapped_reply_scrolls_into_view() {
        let mut app = app();
        app.session.set_draft("tell me a story");
        app.session.begin_submit();
        app.session.settle(Ok(ChatResponse {
            response: Some(
                "aaaa bbbbbb cccccc dddd eeee ffffff gggg hhhhhh iiii jjjj kkkkkk ZZZZ"
                    .to_string(),
            ),
        }));

        let screen = draw_sized(&mut app, 12, 14);

        assert!(screen.contains("ZZZZ"));
        assert!(app.chat_scroll > 0);
    }

    #[test]
    fn test_typing_indicator_visible_below_wrapped_question() {
        let mut app = app();
        app.session.set_draft("why does the borrow checker reject my code when I hold two references");
        app.session.begin_submit();

        let screen = draw_sized(&mut app, 12, 14);

        assert!(screen.contains("typing."));
    }

    #[test]
    fn test_bold_markup_in_replies() {
        let line = styled_reply_line("a **b** c");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "b");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));

        let line = styled_reply_line("2 ** 3");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "2 ** 3");
    }
}
