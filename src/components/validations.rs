use color_eyre::eyre::Result;
use compareflow_theme as theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;

use super::{
  format_rate, render_confirm,
  report::{render_report, ReportOptions},
  status_chip, Component, Frame,
};
use crate::{
  action::Action,
  config::Config,
  mode::Mode,
  models::{Validation, ValidationId, ValidationStatus},
  router::Route,
  store::{Phase, Store, StoreEvent, ValidationEvent},
};

enum Overlay {
  None,
  ConfirmDelete(ValidationId),
  Report { id: ValidationId, scroll: u16 },
}

/// Validation list. Owns the run marker and the execution report popup.
pub struct Validations {
  command_tx: Option<UnboundedSender<Action>>,
  table: TableState,
  overlay: Overlay,
  running: Option<ValidationId>,
  report_options: ReportOptions,
  tick: usize,
}

impl Default for Validations {
  fn default() -> Self {
    Self::new()
  }
}

impl Validations {
  pub fn new() -> Self {
    Self {
      command_tx: None,
      table: TableState::default().with_selected(Some(0)),
      overlay: Overlay::None,
      running: None,
      report_options: ReportOptions { format_queries: true },
      tick: 0,
    }
  }

  pub fn running(&self) -> Option<ValidationId> {
    self.running
  }

  fn send(&self, action: Action) -> Result<()> {
    if let Some(tx) = &self.command_tx {
      tx.send(action)?;
    }
    Ok(())
  }

  fn selected<'a>(&self, store: &'a Store) -> Option<&'a Validation> {
    let validations = store.validations().all();
    self.table.selected().and_then(|i| validations.get(i.min(validations.len().saturating_sub(1))))
  }

  fn move_selection(&mut self, store: &Store, forward: bool) {
    let len = store.validations().all().len();
    if len == 0 {
      return;
    }
    let current = self.table.selected().unwrap_or(0).min(len - 1);
    let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
    self.table.select(Some(next));
  }

  fn can_run(&self, validation: &Validation) -> bool {
    validation.status != ValidationStatus::Running && self.running != Some(validation.id)
  }

  /// The fetched detail when it matches, otherwise the list row.
  fn report_subject<'a>(store: &'a Store, id: ValidationId) -> Option<&'a Validation> {
    let validations = store.validations();
    validations.current().filter(|v| v.id == id).or_else(|| validations.get(id))
  }

  fn handle_list_key(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(store, true),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(store, false),
      KeyCode::Char('n') => return Ok(Some(Action::Navigate(Route::NewValidation))),
      _ => {},
    }
    let Some(validation) = self.selected(store) else {
      return Ok(None);
    };
    let id = validation.id;
    Ok(match key.code {
      KeyCode::Char('e') | KeyCode::Enter => Some(Action::Navigate(Route::EditValidation(id))),
      KeyCode::Char('d') => {
        self.overlay = Overlay::ConfirmDelete(id);
        None
      },
      KeyCode::Char('r') if self.can_run(validation) => {
        self.running = Some(id);
        self.overlay = Overlay::Report { id, scroll: 0 };
        Some(Action::RunValidation(id))
      },
      KeyCode::Char('v') if validation.status != ValidationStatus::Pending => {
        self.send(Action::FetchValidation(id))?;
        self.overlay = Overlay::Report { id, scroll: 0 };
        None
      },
      KeyCode::Char('s') => Some(Action::RefreshStatus(id)),
      _ => None,
    })
  }
}

impl Component for Validations {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.report_options = ReportOptions { format_queries: config.report.format_queries };
    Ok(())
  }

  fn mode(&self) -> Mode {
    Mode::Validations
  }

  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    match self.overlay {
      Overlay::None => vec![
        ("n", "new"),
        ("e", "edit"),
        ("d", "delete"),
        ("r", "run"),
        ("v", "report"),
        ("s", "status"),
        ("F5", "refresh"),
      ],
      Overlay::ConfirmDelete(_) => vec![("y", "delete"), ("n", "cancel")],
      Overlay::Report { .. } => vec![("Up/Down", "scroll"), ("Esc", "close")],
    }
  }

  fn captures_keys(&self) -> bool {
    !matches!(self.overlay, Overlay::None)
  }

  fn handle_key_events(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>> {
    match &mut self.overlay {
      Overlay::None => self.handle_list_key(key, store),
      Overlay::ConfirmDelete(id) => {
        let id = *id;
        let action = match key.code {
          KeyCode::Char('y') | KeyCode::Enter => Some(Action::DeleteValidation(id)),
          KeyCode::Char('n') | KeyCode::Esc => None,
          _ => return Ok(None),
        };
        self.overlay = Overlay::None;
        Ok(action)
      },
      Overlay::Report { scroll, .. } => {
        match key.code {
          KeyCode::Esc | KeyCode::Char('q') => self.overlay = Overlay::None,
          KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
          KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
          KeyCode::PageDown => *scroll = scroll.saturating_add(10),
          KeyCode::PageUp => *scroll = scroll.saturating_sub(10),
          KeyCode::Home => *scroll = 0,
          _ => {},
        }
        Ok(None)
      },
    }
  }

  fn update(&mut self, action: Action, store: &Store) -> Result<Option<Action>> {
    match action {
      Action::Navigate(Route::Validations) => {
        self.overlay = Overlay::None;
        self.send(Action::FetchValidations)?;
      },
      Action::Tick => self.tick = self.tick.wrapping_add(1),
      Action::RunFinished(id) => {
        if self.running == Some(id) {
          self.running = None;
        }
      },
      Action::Store(StoreEvent::Validations(ValidationEvent::Delete(id, Phase::Fulfilled(())))) => {
        if matches!(self.overlay, Overlay::Report { id: open, .. } if open == id) {
          self.overlay = Overlay::None;
        }
      },
      Action::Store(StoreEvent::Validations(ValidationEvent::FetchAll(Phase::Fulfilled(_)))) => {
        let len = store.validations().all().len();
        if self.table.selected().is_some_and(|i| i >= len) {
          self.table.select(Some(len.saturating_sub(1)));
        }
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) -> Result<()> {
    let block = Block::default()
      .title(" Validations ")
      .title_style(theme::title())
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_normal());

    let validations = store.validations();
    if validations.all().is_empty() {
      let message = if validations.is_loading() {
        Span::styled("Loading validations...", theme::info())
      } else {
        Span::styled("No validations yet. Press n to create one.", theme::muted())
      };
      f.render_widget(Paragraph::new(message).block(block), area);
    } else {
      let running = self.running;
      let rows = validations.all().iter().map(|v| {
        let name = if running == Some(v.id) { format!("{} (running)", v.name) } else { v.name.clone() };
        Row::new(vec![
          Cell::from(name),
          Cell::from(v.source_name().unwrap_or("N/A").to_string()),
          Cell::from(v.target_name().unwrap_or("N/A").to_string()),
          Cell::from(status_chip(v.status)),
          Cell::from(format_rate(v.success_rate())),
        ])
      });
      let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(22),
        Constraint::Percentage(22),
        Constraint::Length(12),
        Constraint::Length(10),
      ];
      let table = Table::new(rows, widths)
        .header(
          Row::new(vec!["Name", "Source Connection", "Target Connection", "Status", "Success Rate"]).style(theme::header()),
        )
        .row_highlight_style(theme::selection_active())
        .block(block);
      f.render_stateful_widget(table, area, &mut self.table);
    }

    match self.overlay {
      Overlay::ConfirmDelete(_) => render_confirm(
        f,
        area,
        "Delete Validation",
        "Are you sure you want to delete this validation? This action cannot be undone.",
      ),
      Overlay::Report { id, scroll } => {
        if let Some(validation) = Self::report_subject(store, id) {
          render_report(f, area, validation, self.running == Some(id), self.report_options, scroll, self.tick);
        }
      },
      Overlay::None => {},
    }
    Ok(())
  }
}
