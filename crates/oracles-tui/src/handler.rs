use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => insert_text(app, &text.replace("\r\n", "\n").replace('\r', "\n")),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,

        // Shift+Enter is not reported by every terminal, so Alt+Enter also
        // inserts a newline
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            insert_text(app, "\n");
        }
        KeyCode::Enter => {
            app.submit();
        }

        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let draft = app.session.draft_mut();
                let byte_pos = char_to_byte_index(draft, app.cursor);
                draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let draft = app.session.draft_mut();
            if app.cursor < draft.chars().count() {
                let byte_pos = char_to_byte_index(draft, app.cursor);
                draft.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.draft().chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.session.draft().chars().count();
        }

        // Thread scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),

        KeyCode::Char(c) if !ctrl => {
            let mut buf = [0u8; 4];
            insert_text(app, c.encode_utf8(&mut buf));
        }
        _ => {}
    }
}

fn insert_text(app: &mut App, text: &str) {
    let draft = app.session.draft_mut();
    let byte_pos = char_to_byte_index(draft, app.cursor);
    draft.insert_str(byte_pos, text);
    app.cursor += text.chars().count();
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use oracles_core::{ChatClient, ChatTurn};

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:9"))
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyModifiers::NONE)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_submits_draft() {
        let mut app = app();
        type_str(&mut app, "hello");

        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();

        assert_eq!(app.session.turns(), &[ChatTurn::user("hello")]);
        assert!(app.session.is_loading());
        assert!(app.pending.is_some());
        assert_eq!(app.session.draft(), "");
    }

    #[tokio::test]
    async fn test_shift_enter_inserts_newline() {
        let mut app = app();
        type_str(&mut app, "line one");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::SHIFT)).unwrap();
        type_str(&mut app, "line two");

        assert_eq!(app.session.draft(), "line one\nline two");
        assert!(app.session.turns().is_empty());
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_enter_on_blank_draft_does_nothing() {
        let mut app = app();
        type_str(&mut app, "   ");

        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();

        assert!(app.session.turns().is_empty());
        assert!(!app.session.is_loading());
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_enter_while_loading_is_ignored() {
        let mut app = app();
        type_str(&mut app, "first");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();

        // Typing is still allowed while the reply is pending
        type_str(&mut app, "second");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();

        assert_eq!(app.session.turns().len(), 1);
        assert_eq!(app.session.draft(), "second");
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let mut app = app();
        type_str(&mut app, "héllo");
        handle_event(&mut app, key(KeyCode::Left, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, key(KeyCode::Left, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace, KeyModifiers::NONE)).unwrap();
        assert_eq!(app.session.draft(), "hélo");

        handle_event(&mut app, key(KeyCode::Home, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, key(KeyCode::Delete, KeyModifiers::NONE)).unwrap();
        assert_eq!(app.session.draft(), "élo");

        handle_event(&mut app, key(KeyCode::End, KeyModifiers::NONE)).unwrap();
        type_str(&mut app, "!");
        assert_eq!(app.session.draft(), "élo!");
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Paste("a\r\nb".to_string())).unwrap();

        assert_eq!(app.session.draft(), "a\nb");
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(app.should_quit);
        assert_eq!(app.session.draft(), "");

        let mut app = self::app();
        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE)).unwrap();
        assert!(app.should_quit);
    }
}
