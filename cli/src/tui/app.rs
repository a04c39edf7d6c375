use pocketdo_core::{SaveTicket, TodoList};
use ratatui::widgets::TableState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub list: TodoList,
    pub state: TableState,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// Short-lived notice, cleared on the next key press.
    pub status: Option<String>,
    /// Latest save failure; kept until a later save succeeds.
    pub save_error: Option<String>,
    pending: Vec<SaveTicket>,
}

impl App {
    pub fn new(list: TodoList) -> App {
        let mut state = TableState::default();
        if !list.is_empty() {
            state.select(Some(0));
        }
        App {
            list,
            state,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            status: None,
            save_error: None,
            pending: Vec::new(),
        }
    }

    pub fn next(&mut self) {
        if self.list.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i + 1 < self.list.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.list.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.list.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        if let Some(i) = self.state.selected() {
            match self.list.toggle_at(i) {
                Ok(ticket) => self.pending.push(ticket),
                Err(e) => self.status = Some(e.to_string()),
            }
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        match self.list.delete_at(i) {
            Ok(ticket) => self.pending.push(ticket),
            Err(e) => self.status = Some(e.to_string()),
        }

        if self.list.is_empty() {
            self.state.select(None);
        } else if i >= self.list.len() {
            self.state.select(Some(self.list.len() - 1));
        }
    }

    pub fn enter_input_mode(&mut self) {
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.list.draft().chars().count();
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.list
            .draft()
            .chars()
            .take(chars)
            .map(char::len_utf8)
            .sum()
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.list.draft_mut().insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.list.draft_mut().remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.list.draft().chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_input(&mut self) {
        if let Some(ticket) = self.list.submit_draft() {
            self.pending.push(ticket);
            self.cursor_position = 0;
            self.state.select(Some(self.list.len() - 1));
        }
        self.exit_input_mode();
    }

    pub fn clear_notice(&mut self) {
        self.status = None;
    }

    /// Collects finished saves. Tickets finish in issue order, so the last
    /// one collected decides whether a failure is still shown.
    pub fn poll_saves(&mut self) {
        let mut latest = None;
        self.pending.retain(|ticket| match ticket.try_result() {
            None => true,
            Some(Ok(())) => {
                latest = Some(None);
                false
            }
            Some(Err(e)) => {
                latest = Some(Some(format!("Save failed: {:#}", anyhow::Error::new(e))));
                false
            }
        });
        if let Some(outcome) = latest {
            self.save_error = outcome;
        }
    }

    pub fn saving(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Waits for every outstanding save and returns how many failed.
    pub fn finish(self) -> usize {
        let App { list, pending, .. } = self;
        let failed = pending
            .into_iter()
            .map(SaveTicket::wait)
            .filter(Result::is_err)
            .count();
        drop(list);
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketdo_core::{KeyedTodoStore, MemoryKeyValueStore, TODOS_KEY};

    fn app_with(items: &[&str]) -> (App, MemoryKeyValueStore) {
        let medium = MemoryKeyValueStore::new();
        let mut list = TodoList::initialize(KeyedTodoStore::new(medium.clone())).unwrap();
        for item in items {
            list.add(item);
        }
        (App::new(list), medium)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.input_char(c);
        }
    }

    #[test]
    fn test_navigation_wraps() {
        let (mut app, _) = app_with(&["a", "b", "c"]);
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_typed_input_is_added_and_selected() {
        let (mut app, medium) = app_with(&["a"]);
        app.enter_input_mode();
        type_text(&mut app, "  Buy mlk ");
        app.move_cursor_left();
        app.move_cursor_left();
        app.move_cursor_left();
        app.input_char('i');
        app.submit_input();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.list.todos()[1].text, "Buy milk");
        assert_eq!(app.state.selected(), Some(1));
        assert_eq!(app.list.draft(), "");
        assert_eq!(app.finish(), 0);
        assert_eq!(
            medium.raw(TODOS_KEY).as_deref(),
            Some(r#"[{"text":"a","done":false},{"text":"Buy milk","done":false}]"#)
        );
    }

    #[test]
    fn test_blank_input_keeps_list() {
        let (mut app, _) = app_with(&[]);
        app.enter_input_mode();
        type_text(&mut app, "   ");
        app.submit_input();
        assert!(app.list.is_empty());
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_delete_char_handles_multibyte() {
        let (mut app, _) = app_with(&[]);
        app.enter_input_mode();
        type_text(&mut app, "café");
        app.delete_char();
        assert_eq!(app.list.draft(), "caf");
        assert_eq!(app.cursor_position, 3);
    }

    #[test]
    fn test_delete_last_moves_selection_up() {
        let (mut app, _) = app_with(&["a", "b"]);
        app.next();
        app.delete_selected();
        assert_eq!(app.state.selected(), Some(0));
        app.delete_selected();
        assert_eq!(app.state.selected(), None);
        assert!(app.list.is_empty());
    }

    fn settle(app: &mut App) {
        while app.saving() {
            app.poll_saves();
            std::thread::yield_now();
        }
    }

    #[test]
    fn test_failed_save_is_reported() {
        let (mut app, medium) = app_with(&["a"]);
        medium.set_reject_writes(true);
        app.toggle_selected();
        settle(&mut app);
        let shown = app.save_error.as_deref().unwrap_or("");
        assert!(shown.starts_with("Save failed"));
        assert!(shown.contains("storage quota exceeded"));
        assert!(app.list.todos()[0].done);
    }

    #[test]
    fn test_save_failure_outlives_key_presses_until_next_success() {
        let (mut app, medium) = app_with(&["a"]);
        medium.set_reject_writes(true);
        app.toggle_selected();
        settle(&mut app);

        app.clear_notice();
        app.enter_input_mode();
        app.clear_notice();
        type_text(&mut app, "b");
        app.clear_notice();
        assert!(app.save_error.is_some());

        medium.set_reject_writes(false);
        app.submit_input();
        settle(&mut app);
        assert_eq!(app.save_error, None);
    }

    #[test]
    fn test_clear_notice_drops_status() {
        let (mut app, _) = app_with(&[]);
        app.state.select(Some(3));
        app.toggle_selected();
        assert!(app.status.is_some());
        app.clear_notice();
        assert_eq!(app.status, None);
    }
}
