use compareflow::tui::Event;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

pub struct EventBuilder {
    events: Vec<Event>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn push(mut self, code: KeyCode, modifiers: KeyModifiers) -> Self {
        self.events.push(Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }));
        self
    }

    pub fn key(self, key: char) -> Self {
        self.push(KeyCode::Char(key), KeyModifiers::empty())
    }

    pub fn ctrl(self, key: char) -> Self {
        self.push(KeyCode::Char(key), KeyModifiers::CONTROL)
    }

    pub fn keys(mut self, keys: &str) -> Self {
        for ch in keys.chars() {
            self = self.key(ch);
        }
        self
    }

    pub fn enter(self) -> Self {
        self.push(KeyCode::Enter, KeyModifiers::empty())
    }

    pub fn esc(self) -> Self {
        self.push(KeyCode::Esc, KeyModifiers::empty())
    }

    pub fn up(self) -> Self {
        self.push(KeyCode::Up, KeyModifiers::empty())
    }

    pub fn down(self) -> Self {
        self.push(KeyCode::Down, KeyModifiers::empty())
    }

    pub fn right(self) -> Self {
        self.push(KeyCode::Right, KeyModifiers::empty())
    }

    pub fn tab(self) -> Self {
        self.push(KeyCode::Tab, KeyModifiers::empty())
    }

    pub fn paste(mut self, text: &str) -> Self {
        self.events.push(Event::Paste(text.to_string()));
        self
    }

    pub fn build(self) -> Vec<Event> {
        self.events
    }

    /// Key events only, for driving a component directly.
    pub fn key_events(self) -> Vec<KeyEvent> {
        self.events
            .into_iter()
            .filter_map(|event| match event {
                Event::Key(key) => Some(key),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let events = EventBuilder::new().keys("pg1").ctrl('s').enter().build();

        assert_eq!(events.len(), 5); // 3 chars + ctrl+s + enter

        if let Event::Key(key) = &events[0] {
            assert_eq!(key.code, KeyCode::Char('p'));
        }
    }

    #[test]
    fn test_key_events_skip_paste() {
        let keys = EventBuilder::new().key('n').paste("ignored").tab().key_events();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].code, KeyCode::Tab);
    }
}
