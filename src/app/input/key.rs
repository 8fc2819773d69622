use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return Ok(());
        }

        if self.editing.is_some() {
            self.handle_edit_key(key);
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => self.cancel_drag(),
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('n') => self.add_column(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Left => self.scroll_board(-1),
            KeyCode::Right => self.scroll_board(1),
            _ => {}
        }
        Ok(())
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_edit(),
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Backspace => self.edit_pop(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_push(ch)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::app::{App, InlineEdit, Message};
    use crate::board::Board;
    use crate::persistence::{MemoryStore, PersistenceGateway};
    use crate::settings::Settings;
    use crate::theme::ThemeMode;

    fn app() -> App {
        App::new(
            PersistenceGateway::new(MemoryStore::new()),
            Settings::default(),
            None,
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(Message::Key(KeyEvent::new(code, KeyModifiers::empty())))
            .expect("key handling should not fail");
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    #[test]
    fn test_board_shortcuts() {
        let mut app = app();

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.board().columns().len(), 4);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme_mode(), ThemeMode::Dark);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let mut app = app();
        app.begin_new_card("col-1");
        app.update(Message::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .expect("key handling should not fail");
        assert!(app.should_quit());
    }

    #[test]
    fn test_typing_goes_to_editor_not_shortcuts() {
        let mut app = app();
        app.begin_new_card("col-3");

        type_text(&mut app, "nqt");

        assert!(!app.should_quit());
        assert_eq!(app.board().columns().len(), 3);
        assert_eq!(app.editing().map(InlineEdit::buffer), Some("nqt"));

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        let contents: Vec<&str> = app
            .board()
            .column("col-3")
            .map(|c| c.tasks.iter().map(|t| t.content.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(contents, vec!["nq"]);
    }

    #[test]
    fn test_enter_on_blank_card_keeps_editor() {
        let mut app = app();
        app.begin_new_card("col-3");
        type_text(&mut app, "  ");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.board(), &Board::seeded());
        assert_eq!(app.editing().map(InlineEdit::buffer), Some("  "));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.editing(), None);
    }

    #[test]
    fn test_rename_via_keys() {
        let mut app = app();
        app.begin_rename("col-2");
        for _ in 0.."In Progress".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "Doing");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.board().column("col-2").map(|c| c.title.as_str()), Some("Doing"));
        assert_eq!(app.editing(), None);
    }

    #[test]
    fn test_escape_discards_rename() {
        let mut app = app();
        app.begin_rename("col-2");
        type_text(&mut app, "!!!");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.board(), &Board::seeded());
    }
}
