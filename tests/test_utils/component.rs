use color_eyre::Result;
use compareflow::{
    action::Action,
    components::Component,
    config::Config,
    store::{Store, StoreEvent},
    tui::Event,
};
use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{TEST_TERMINAL_HEIGHT, TEST_TERMINAL_WIDTH};

/// Drives one page in isolation: owns the store it reads and the channel it writes to.
pub struct ComponentTestHarness<C: Component> {
    pub component: C,
    pub store: Store,
    pub terminal: Terminal<TestBackend>,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
}

impl<C: Component> ComponentTestHarness<C> {
    pub fn new(mut component: C) -> Result<Self> {
        let backend = TestBackend::new(TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        let terminal = Terminal::new(backend)?;
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        // Register action handler
        component.register_action_handler(action_tx.clone())?;

        // Initialize component with terminal area
        let area = Rect::new(0, 0, TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        component.init(area)?;

        Ok(Self { component, store: Store::new(), terminal, action_tx, action_rx })
    }

    pub fn with_config(mut self, config: Config) -> Result<Self> {
        self.component.register_config_handler(config)?;
        Ok(self)
    }

    /// Feeds events to the page and returns the actions it answered with.
    pub fn send_events(&mut self, events: Vec<Event>) -> Result<Vec<Action>> {
        let mut actions = Vec::new();
        for event in events {
            if let Some(action) = self.component.handle_events(Some(event), &self.store)? {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    pub fn update(&mut self, action: Action) -> Result<Option<Action>> {
        self.component.update(action, &self.store)
    }

    /// Applies a store event the way the event loop does: reduce first, then notify the page.
    pub fn settle(&mut self, event: impl Into<StoreEvent>) -> Result<Option<Action>> {
        let event = event.into();
        self.store.reduce(event.clone());
        self.component.update(Action::Store(event), &self.store)
    }

    /// Actions the page pushed onto its channel rather than returning.
    pub fn sent_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.action_rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    pub fn render(&mut self) -> Result<Vec<String>> {
        let Self { component, store, terminal, .. } = self;
        terminal.draw(|f| {
            component.draw(f, f.area(), store).unwrap();
        })?;
        Ok(buffer_lines(terminal.backend()))
    }
}

pub fn buffer_lines(backend: &TestBackend) -> Vec<String> {
    let buffer = backend.buffer();
    let mut lines = Vec::new();

    for y in 0..buffer.area.height {
        let mut line = String::new();
        for x in 0..buffer.area.width {
            let cell = &buffer[(x, y)];
            line.push_str(cell.symbol());
        }
        lines.push(line.trim_end().to_string());
    }

    lines
}
