use color_eyre::eyre::Result;
use compareflow_theme as theme;
use crossterm::event::KeyEvent;
use ratatui::{prelude::*, widgets::*};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;

use super::{
  form::{Form, FormEvent, FormField},
  Component, Frame,
};
use crate::{
  action::Action,
  mode::Mode,
  models::{ComparisonType, ConnectionId, Validation, ValidationConfig, ValidationDraft, ValidationId},
  router::Route,
  store::{ConnectionEvent, Phase, Store, StoreEvent, ValidationEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Name,
  Source,
  Target,
  Comparison,
  SourceQuery,
  TargetQuery,
  KeyColumns,
}

fn comparison_types() -> Vec<ComparisonType> {
  ComparisonType::iter().collect()
}

fn blank_form() -> Form<Field> {
  Form::new(vec![
    (Field::Name, FormField::text("Validation Name").required()),
    (Field::Source, FormField::select("Source Connection", Vec::new())),
    (Field::Target, FormField::select("Target Connection", Vec::new())),
    (Field::Comparison, FormField::select("Comparison Type", comparison_types().iter().map(|t| t.label().into()).collect())),
    (Field::SourceQuery, FormField::multiline("Source Query", 4).required()),
    (Field::TargetQuery, FormField::multiline("Target Query", 4).required()),
    (Field::KeyColumns, FormField::text("Key Columns (comma separated)")),
  ])
}

fn split_columns(value: &str) -> Vec<String> {
  value.split(',').map(str::trim).filter(|c| !c.is_empty()).map(String::from).collect()
}

/// Create or edit a validation definition.
pub struct ValidationForm {
  command_tx: Option<UnboundedSender<Action>>,
  form: Form<Field>,
  connection_ids: Vec<ConnectionId>,
  /// Connections of the validation being edited that are not selected yet.
  /// Submitted as-is until the list contains them or the user picks another.
  wanted_source: Option<ConnectionId>,
  wanted_target: Option<ConnectionId>,
  editing: Option<ValidationId>,
  loading: bool,
  submitting: bool,
  error: Option<String>,
}

impl Default for ValidationForm {
  fn default() -> Self {
    Self::new()
  }
}

impl ValidationForm {
  pub fn new() -> Self {
    Self {
      command_tx: None,
      form: blank_form(),
      connection_ids: Vec::new(),
      wanted_source: None,
      wanted_target: None,
      editing: None,
      loading: false,
      submitting: false,
      error: None,
    }
  }

  fn selected_connection(&self, field: Field) -> Option<ConnectionId> {
    self.connection_ids.get(self.form.selected(field)).copied()
  }

  fn select_connection(&mut self, field: Field, id: ConnectionId) -> bool {
    let Some(index) = self.connection_ids.iter().position(|c| *c == id) else {
      return false;
    };
    if let Some(select) = self.form.field_mut(field) {
      select.select_index(index);
    }
    true
  }

  fn apply_wanted(&mut self) {
    if let Some(id) = self.wanted_source {
      if self.select_connection(Field::Source, id) {
        self.wanted_source = None;
      }
    }
    if let Some(id) = self.wanted_target {
      if self.select_connection(Field::Target, id) {
        self.wanted_target = None;
      }
    }
  }

  fn source_id(&self) -> Option<ConnectionId> {
    self.wanted_source.or_else(|| self.selected_connection(Field::Source))
  }

  fn target_id(&self) -> Option<ConnectionId> {
    self.wanted_target.or_else(|| self.selected_connection(Field::Target))
  }

  fn unresolved(&self) -> Option<String> {
    let missing: Vec<String> = [("Source", self.wanted_source), ("Target", self.wanted_target)]
      .into_iter()
      .filter_map(|(side, id)| id.map(|id| format!("{side} connection #{id}")))
      .collect();
    (!missing.is_empty()).then(|| format!("{} not found; saving keeps the current value", missing.join(" and ")))
  }

  /// Rebuilds both connection selectors, keeping the chosen ids when they still exist.
  fn sync_connections(&mut self, store: &Store) {
    let source = self.selected_connection(Field::Source);
    let target = self.selected_connection(Field::Target);
    let connections = store.connections().all();
    self.connection_ids = connections.iter().map(|c| c.id).collect();
    let labels: Vec<String> = connections.iter().map(|c| format!("{} ({})", c.name, c.settings.label())).collect();
    for field in [Field::Source, Field::Target] {
      if let Some(select) = self.form.field_mut(field) {
        select.set_options(labels.clone());
      }
    }
    if let Some(id) = source {
      self.select_connection(Field::Source, id);
    }
    if let Some(id) = target {
      self.select_connection(Field::Target, id);
    }
    self.apply_wanted();
  }

  fn reset(&mut self, editing: Option<ValidationId>, store: &Store) {
    self.form = blank_form();
    self.connection_ids.clear();
    self.wanted_source = None;
    self.wanted_target = None;
    self.sync_connections(store);
    self.editing = editing;
    self.loading = false;
    self.submitting = false;
    self.error = None;
  }

  fn fill(&mut self, validation: &Validation) {
    self.form.set_value(Field::Name, &validation.name);
    self.form.set_value(Field::SourceQuery, &validation.config.source_query);
    self.form.set_value(Field::TargetQuery, &validation.config.target_query);
    self.form.set_value(Field::KeyColumns, &validation.config.key_columns.join(", "));
    let comparison = validation.config.comparison_type.unwrap_or_default();
    if let Some(index) = comparison_types().iter().position(|t| *t == comparison) {
      if let Some(select) = self.form.field_mut(Field::Comparison) {
        select.select_index(index);
      }
    }
    self.wanted_source = Some(validation.source_connection_id);
    self.wanted_target = Some(validation.target_connection_id);
    self.apply_wanted();
    self.form.focus(Field::Name);
  }

  fn draft(&self) -> Result<ValidationDraft, String> {
    let missing = self.form.missing();
    if !missing.is_empty() {
      return Err(format!("{} required", missing.join(", ")));
    }
    let (Some(source), Some(target)) = (self.source_id(), self.target_id()) else {
      return Err("Source and target connections required".into());
    };
    let config = ValidationConfig {
      source_query: self.form.value(Field::SourceQuery),
      target_query: self.form.value(Field::TargetQuery),
      comparison_type: comparison_types().get(self.form.selected(Field::Comparison)).copied(),
      key_columns: split_columns(&self.form.value(Field::KeyColumns)),
    };
    Ok(ValidationDraft::new(self.form.value(Field::Name).trim(), source, target, config))
  }

  fn submit(&mut self) -> Option<Action> {
    match self.draft() {
      Ok(draft) => {
        self.error = None;
        self.submitting = true;
        Some(Action::SaveValidation(self.editing, draft))
      },
      Err(message) => {
        self.error = Some(message);
        None
      },
    }
  }

  fn on_saved(&mut self, phase: &Phase<Validation>, store: &Store) -> Option<Action> {
    if !self.submitting || phase.is_pending() {
      return None;
    }
    self.submitting = false;
    match phase {
      Phase::Rejected(_) => {
        self.error = store.validations().error().map(String::from);
        None
      },
      _ => Some(Action::Navigate(Route::Validations)),
    }
  }
}

impl Component for ValidationForm {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn mode(&self) -> Mode {
    Mode::ValidationForm
  }

  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    vec![("Tab", "next field"), ("Left/Right", "choose"), ("Ctrl-s", "save"), ("Esc", "cancel")]
  }

  fn handle_key_events(&mut self, key: KeyEvent, _store: &Store) -> Result<Option<Action>> {
    if self.loading || self.submitting {
      return Ok(None);
    }
    Ok(match self.form.handle_key(key) {
      FormEvent::Submit => self.submit(),
      FormEvent::Cancel => Some(Action::Navigate(Route::Validations)),
      FormEvent::Changed(Field::Source) => {
        self.wanted_source = None;
        None
      },
      FormEvent::Changed(Field::Target) => {
        self.wanted_target = None;
        None
      },
      _ => None,
    })
  }

  fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
    self.form.paste(text);
    Ok(None)
  }

  fn update(&mut self, action: Action, store: &Store) -> Result<Option<Action>> {
    match action {
      Action::Navigate(route @ (Route::NewValidation | Route::EditValidation(_))) => {
        let editing = match route {
          Route::EditValidation(id) => Some(id),
          _ => None,
        };
        self.reset(editing, store);
        if let Some(tx) = &self.command_tx {
          tx.send(Action::FetchConnections)?;
          if let Some(id) = editing {
            self.loading = true;
            tx.send(Action::FetchValidation(id))?;
          }
        }
      },
      Action::Store(StoreEvent::Connections(ConnectionEvent::FetchAll(Phase::Fulfilled(_)))) => {
        self.sync_connections(store)
      },
      Action::Store(StoreEvent::Validations(event)) => match event {
        ValidationEvent::FetchOne(id, phase) if self.editing == Some(id) && phase.is_settled() => {
          self.loading = false;
          if let Phase::Fulfilled(validation) = &phase {
            self.fill(validation);
          }
        },
        ValidationEvent::Create(phase) if self.editing.is_none() => return Ok(self.on_saved(&phase, store)),
        ValidationEvent::Update(id, phase) if self.editing == Some(id) => return Ok(self.on_saved(&phase, store)),
        _ => {},
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) -> Result<()> {
    let title = if self.editing.is_some() { " Edit Validation " } else { " New Validation " };
    let block = Block::default()
      .title(title)
      .title_style(theme::title())
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    if self.loading {
      f.render_widget(Paragraph::new(Span::styled("Loading validation...", theme::info())), inner);
      return Ok(());
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(3)])
      .split(inner);
    let status = if self.submitting {
      Line::from(Span::styled("Saving...", theme::info()))
    } else if let Some(error) = &self.error {
      Line::from(Span::styled(error.clone(), theme::error()))
    } else if let Some(warning) = self.unresolved() {
      Line::from(Span::styled(warning, theme::warning()))
    } else if self.connection_ids.is_empty() && !store.connections().is_loading() {
      Line::from(Span::styled("No connections available. Create one first.", theme::warning()))
    } else {
      Line::default()
    };
    f.render_widget(Paragraph::new(status), chunks[0]);
    self.form.render(f, chunks[1]);
    Ok(())
  }
}
