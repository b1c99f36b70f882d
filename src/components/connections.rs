use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use compareflow_theme as theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;

use super::{centered_rect, render_confirm, Component, Frame};
use crate::{
  action::Action,
  mode::Mode,
  models::{Connection, ConnectionId, ConnectionKind, ConnectionSettings},
  router::Route,
  store::{ConnectionEvent, Phase, Store, StoreEvent},
};

const TEST_RESULT_TTL: Duration = Duration::from_secs(6);

enum Overlay {
  None,
  ConfirmDelete(ConnectionId),
  Schema { id: ConnectionId, name: String, tables: ListState, open_table: Option<String> },
}

/// Connection list with test, delete and a read-only schema browser.
pub struct Connections {
  command_tx: Option<UnboundedSender<Action>>,
  table: TableState,
  overlay: Overlay,
  testing: Option<ConnectionId>,
  test_shown_at: Option<Instant>,
  test_result_ttl: Duration,
}

impl Default for Connections {
  fn default() -> Self {
    Self::new()
  }
}

impl Connections {
  pub fn new() -> Self {
    Self {
      command_tx: None,
      table: TableState::default().with_selected(Some(0)),
      overlay: Overlay::None,
      testing: None,
      test_shown_at: None,
      test_result_ttl: TEST_RESULT_TTL,
    }
  }

  fn send(&self, action: Action) -> Result<()> {
    if let Some(tx) = &self.command_tx {
      tx.send(action)?;
    }
    Ok(())
  }

  fn selected<'a>(&self, store: &'a Store) -> Option<&'a Connection> {
    let connections = store.connections().all();
    self.table.selected().and_then(|i| connections.get(i.min(connections.len().saturating_sub(1))))
  }

  fn move_selection(&mut self, store: &Store, forward: bool) {
    let len = store.connections().all().len();
    if len == 0 {
      return;
    }
    let current = self.table.selected().unwrap_or(0).min(len - 1);
    let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
    self.table.select(Some(next));
  }

  fn handle_list_key(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>> {
    if self.test_shown_at.is_some() && key.code == KeyCode::Esc {
      self.test_shown_at = None;
      return Ok(Some(Action::ClearTestResult));
    }
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(store, true),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(store, false),
      KeyCode::Char('n') => return Ok(Some(Action::Navigate(Route::NewConnection))),
      _ => {},
    }
    let Some(connection) = self.selected(store) else {
      return Ok(None);
    };
    let id = connection.id;
    Ok(match key.code {
      KeyCode::Char('e') | KeyCode::Enter => Some(Action::Navigate(Route::EditConnection(id))),
      KeyCode::Char('d') => {
        self.overlay = Overlay::ConfirmDelete(id);
        None
      },
      KeyCode::Char('t') if self.testing.is_none() => Some(Action::TestConnection(id)),
      KeyCode::Char('b') => {
        self.overlay =
          Overlay::Schema { id, name: connection.name.clone(), tables: ListState::default(), open_table: None };
        if store.connections().tables(id).is_none() {
          self.send(Action::FetchTables(id))?;
        }
        None
      },
      _ => None,
    })
  }

  fn handle_schema_key(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>> {
    let Overlay::Schema { id, tables, open_table, .. } = &mut self.overlay else {
      return Ok(None);
    };
    let names = store.connections().tables(*id).unwrap_or_default();
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        if open_table.take().is_none() {
          self.overlay = Overlay::None;
        }
      },
      KeyCode::Char('j') | KeyCode::Down if !names.is_empty() => {
        let next = tables.selected().map_or(0, |i| (i + 1) % names.len());
        tables.select(Some(next));
      },
      KeyCode::Char('k') | KeyCode::Up if !names.is_empty() => {
        let next = tables.selected().map_or(0, |i| (i + names.len() - 1) % names.len());
        tables.select(Some(next));
      },
      KeyCode::Enter => {
        if let Some(table) = tables.selected().and_then(|i| names.get(i)) {
          *open_table = Some(table.clone());
          if store.connections().columns(*id, table).is_none() {
            return Ok(Some(Action::FetchColumns(*id, table.clone())));
          }
        }
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw_schema(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) {
    let Overlay::Schema { id, name, tables, open_table } = &mut self.overlay else {
      return;
    };
    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
      .title(format!(" Schema: {name} "))
      .title_style(theme::title())
      .title_bottom(Line::from(" [Enter] columns  [Esc] back ").right_aligned())
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_focused())
      .style(theme::bg_primary());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let panes = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(inner);

    let connections = store.connections();
    match connections.tables(*id) {
      Some(names) if !names.is_empty() => {
        let items: Vec<ListItem> = names.iter().map(|t| ListItem::new(t.as_str())).collect();
        let list = List::new(items)
          .block(Block::default().borders(Borders::RIGHT).border_style(theme::border_normal()))
          .highlight_style(theme::selection_active());
        f.render_stateful_widget(list, panes[0], tables);
      },
      Some(_) => f.render_widget(Paragraph::new(Span::styled("No tables", theme::muted())), panes[0]),
      None if connections.is_schema_loading() => {
        f.render_widget(Paragraph::new(Span::styled("Loading tables...", theme::info())), panes[0])
      },
      None => f.render_widget(Paragraph::new(Span::styled("Tables unavailable", theme::muted())), panes[0]),
    }

    let Some(table) = open_table.as_deref() else {
      return;
    };
    match connections.columns(*id, table) {
      Some(columns) => {
        let rows = columns.iter().map(|c| {
          Row::new(vec![c.name.clone(), c.data_type.clone(), if c.nullable { "NULL".into() } else { "NOT NULL".into() }])
        });
        let widget = Table::new(rows, [Constraint::Percentage(45), Constraint::Percentage(35), Constraint::Percentage(20)])
          .header(Row::new(vec!["Column", "Type", "Null"]).style(theme::header()))
          .block(Block::default().title(format!(" {table} ")).title_style(theme::title()));
        f.render_widget(widget, panes[1]);
      },
      None => f.render_widget(Paragraph::new(Span::styled("Loading columns...", theme::info())), panes[1]),
    }
  }

  fn test_banner(&self, store: &Store) -> Option<Line<'static>> {
    if self.testing.is_some() {
      return Some(Line::from(Span::styled(" Testing connection... ", theme::info())));
    }
    let result = store.connections().test_result().filter(|_| self.test_shown_at.is_some())?;
    let style = if result.success { theme::chip(theme::SUCCESS) } else { theme::chip(theme::ERROR) };
    Some(Line::from(vec![Span::styled(format!(" {} ", result.message), style), Span::styled("  [Esc] dismiss", theme::muted())]))
  }
}

fn kind_chip(settings: &ConnectionSettings) -> Span<'static> {
  let color = match settings.kind() {
    Some(ConnectionKind::SqlServer) => theme::ACCENT_BLUE,
    Some(ConnectionKind::Databricks) => theme::ACCENT_PURPLE,
    None => theme::ACCENT_CYAN,
  };
  Span::styled(format!(" {} ", settings.type_name()), theme::chip(color))
}

fn or_dash(value: &str) -> String {
  if value.is_empty() {
    "-".into()
  } else {
    value.to_string()
  }
}

impl Component for Connections {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn mode(&self) -> Mode {
    Mode::Connections
  }

  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    match self.overlay {
      Overlay::None => vec![("n", "new"), ("e", "edit"), ("d", "delete"), ("t", "test"), ("b", "browse"), ("F5", "refresh")],
      Overlay::ConfirmDelete(_) => vec![("y", "delete"), ("n", "cancel")],
      Overlay::Schema { .. } => vec![("Enter", "columns"), ("Esc", "back")],
    }
  }

  fn captures_keys(&self) -> bool {
    !matches!(self.overlay, Overlay::None)
  }

  fn handle_key_events(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>> {
    match self.overlay {
      Overlay::None => self.handle_list_key(key, store),
      Overlay::ConfirmDelete(id) => {
        let action = match key.code {
          KeyCode::Char('y') | KeyCode::Enter => Some(Action::DeleteConnection(id)),
          KeyCode::Char('n') | KeyCode::Esc => None,
          _ => return Ok(None),
        };
        self.overlay = Overlay::None;
        Ok(action)
      },
      Overlay::Schema { .. } => self.handle_schema_key(key, store),
    }
  }

  fn update(&mut self, action: Action, store: &Store) -> Result<Option<Action>> {
    match action {
      Action::Navigate(Route::Connections) => {
        self.overlay = Overlay::None;
        self.send(Action::FetchConnections)?;
      },
      Action::Store(StoreEvent::Connections(ConnectionEvent::Test(id, phase))) => {
        if phase.is_pending() {
          self.testing = Some(id);
          self.test_shown_at = None;
        } else {
          self.testing = None;
          if matches!(phase, Phase::Fulfilled(_)) {
            self.test_shown_at = Some(Instant::now());
          }
        }
      },
      Action::Tick => {
        if self.test_shown_at.is_some_and(|at| at.elapsed() >= self.test_result_ttl) {
          self.test_shown_at = None;
          return Ok(Some(Action::ClearTestResult));
        }
      },
      Action::Store(StoreEvent::Connections(ConnectionEvent::FetchAll(Phase::Fulfilled(_)))) => {
        let len = store.connections().all().len();
        if self.table.selected().is_some_and(|i| i >= len) {
          self.table.select(Some(len.saturating_sub(1)));
        }
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) -> Result<()> {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(area);

    let block = Block::default()
      .title(" Connections ")
      .title_style(theme::title())
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_normal());

    let connections = store.connections();
    if connections.all().is_empty() {
      let message = if connections.is_loading() {
        Span::styled("Loading connections...", theme::info())
      } else {
        Span::styled("No connections yet. Press n to add one.", theme::muted())
      };
      f.render_widget(Paragraph::new(message).block(block), chunks[0]);
    } else {
      let rows = connections.all().iter().map(|c| {
        Row::new(vec![
          Cell::from(c.name.clone()),
          Cell::from(kind_chip(&c.settings)),
          Cell::from(or_dash(c.settings.endpoint())),
          Cell::from(c.settings.database().unwrap_or("-").to_string()),
        ])
      });
      let widths = [Constraint::Percentage(30), Constraint::Length(14), Constraint::Percentage(40), Constraint::Percentage(20)];
      let table = Table::new(rows, widths)
        .header(Row::new(vec!["Name", "Type", "Server/Workspace", "Database"]).style(theme::header()))
        .row_highlight_style(theme::selection_active())
        .block(block);
      f.render_stateful_widget(table, chunks[0], &mut self.table);
    }

    if let Some(banner) = self.test_banner(store) {
      f.render_widget(Paragraph::new(banner).alignment(Alignment::Center), chunks[1]);
    }

    match self.overlay {
      Overlay::ConfirmDelete(_) => render_confirm(
        f,
        area,
        "Delete Connection",
        "Are you sure you want to delete this connection? This action cannot be undone.",
      ),
      Overlay::Schema { .. } => self.draw_schema(f, area, store),
      Overlay::None => {},
    }
    Ok(())
  }
}
