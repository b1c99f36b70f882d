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
  models::{Connection, ConnectionDraft, ConnectionId, ConnectionKind, ConnectionSettings, DatabricksConfig, SqlServerConfig},
  router::Route,
  store::{ConnectionEvent, Phase, Store, StoreEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Name,
  Kind,
  Server,
  Port,
  Database,
  Username,
  Password,
  Encrypt,
  TrustCertificate,
  Workspace,
  HttpPath,
  AccessToken,
}

const SQL_SERVER_FIELDS: [Field; 7] =
  [Field::Server, Field::Port, Field::Database, Field::Username, Field::Password, Field::Encrypt, Field::TrustCertificate];
const DATABRICKS_FIELDS: [Field; 3] = [Field::Workspace, Field::HttpPath, Field::AccessToken];

fn kinds() -> Vec<ConnectionKind> {
  ConnectionKind::iter().collect()
}

fn blank_form() -> Form<Field> {
  let defaults = SqlServerConfig::default();
  let mut form = Form::new(vec![
    (Field::Name, FormField::text("Connection Name").required()),
    (Field::Kind, FormField::select("Connection Type", kinds().iter().map(|k| k.label().to_string()).collect())),
    (Field::Server, FormField::text("Server").required()),
    (Field::Port, FormField::text("Port").required()),
    (Field::Database, FormField::text("Database").required()),
    (Field::Username, FormField::text("Username").required()),
    (Field::Password, FormField::text("Password").required().masked()),
    (Field::Encrypt, FormField::toggle("Encrypt Connection", defaults.encrypt)),
    (Field::TrustCertificate, FormField::toggle("Trust Server Certificate", defaults.trust_server_certificate)),
    (Field::Workspace, FormField::text("Workspace URL").required()),
    (Field::HttpPath, FormField::text("HTTP Path").required()),
    (Field::AccessToken, FormField::text("Access Token").required().masked()),
  ]);
  form.set_value(Field::Port, &defaults.port.to_string());
  form
}

/// Create or edit a connection. Fields follow the selected connection type.
pub struct ConnectionForm {
  command_tx: Option<UnboundedSender<Action>>,
  form: Form<Field>,
  editing: Option<ConnectionId>,
  loading: bool,
  submitting: bool,
  error: Option<String>,
  /// Set when editing a connection type this form has no fields for.
  unsupported: Option<String>,
}

impl Default for ConnectionForm {
  fn default() -> Self {
    Self::new()
  }
}

impl ConnectionForm {
  pub fn new() -> Self {
    let mut page =
      Self {
      command_tx: None,
      form: blank_form(),
      editing: None,
      loading: false,
      submitting: false,
      error: None,
      unsupported: None,
    };
    page.show_kind(ConnectionKind::SqlServer);
    page
  }

  fn kind(&self) -> ConnectionKind {
    kinds().get(self.form.selected(Field::Kind)).copied().unwrap_or_default()
  }

  fn show_kind(&mut self, kind: ConnectionKind) {
    for field in SQL_SERVER_FIELDS {
      self.form.set_hidden(field, kind != ConnectionKind::SqlServer);
    }
    for field in DATABRICKS_FIELDS {
      self.form.set_hidden(field, kind != ConnectionKind::Databricks);
    }
  }

  fn reset(&mut self, editing: Option<ConnectionId>) {
    self.form = blank_form();
    self.show_kind(ConnectionKind::SqlServer);
    self.editing = editing;
    self.loading = false;
    self.submitting = false;
    self.error = None;
    self.unsupported = None;
  }

  fn fill(&mut self, connection: &Connection) {
    self.form.set_value(Field::Name, &connection.name);
    let Some(kind) = connection.kind() else {
      let message = format!("{} connections cannot be edited here", connection.settings.type_name());
      self.error = Some(message.clone());
      self.unsupported = Some(message);
      return;
    };
    if let Some(index) = kinds().iter().position(|k| *k == kind) {
      if let Some(field) = self.form.field_mut(Field::Kind) {
        field.select_index(index);
      }
    }
    match &connection.settings {
      ConnectionSettings::SqlServer(c) => {
        self.form.set_value(Field::Server, &c.server);
        self.form.set_value(Field::Port, &c.port.to_string());
        self.form.set_value(Field::Database, &c.database);
        self.form.set_value(Field::Username, &c.username);
        self.form.set_value(Field::Password, &c.password);
        for (key, value) in [(Field::Encrypt, c.encrypt), (Field::TrustCertificate, c.trust_server_certificate)] {
          if let Some(field) = self.form.field_mut(key) {
            field.set_checked(value);
          }
        }
      },
      ConnectionSettings::Databricks(c) => {
        self.form.set_value(Field::Workspace, &c.workspace);
        self.form.set_value(Field::HttpPath, &c.http_path);
        self.form.set_value(Field::AccessToken, &c.access_token);
      },
      ConnectionSettings::Other { .. } => {},
    }
    self.show_kind(kind);
    self.form.focus(Field::Name);
  }

  fn draft(&self) -> Result<ConnectionDraft, String> {
    if let Some(message) = &self.unsupported {
      return Err(message.clone());
    }
    let missing = self.form.missing();
    if !missing.is_empty() {
      return Err(format!("{} required", missing.join(", ")));
    }
    let text = |field| self.form.value(field).trim().to_string();
    let settings = match self.kind() {
      ConnectionKind::SqlServer => {
        let port = text(Field::Port).parse::<u16>().map_err(|_| "Port must be a number between 0 and 65535".to_string())?;
        ConnectionSettings::SqlServer(SqlServerConfig {
          server: text(Field::Server),
          port,
          database: text(Field::Database),
          username: text(Field::Username),
          password: self.form.value(Field::Password),
          encrypt: self.form.checked(Field::Encrypt),
          trust_server_certificate: self.form.checked(Field::TrustCertificate),
        })
      },
      ConnectionKind::Databricks => ConnectionSettings::Databricks(DatabricksConfig {
        workspace: text(Field::Workspace),
        http_path: text(Field::HttpPath),
        access_token: self.form.value(Field::AccessToken),
      }),
    };
    Ok(ConnectionDraft { name: text(Field::Name), settings })
  }

  fn submit(&mut self) -> Option<Action> {
    match self.draft() {
      Ok(draft) => {
        self.error = None;
        self.submitting = true;
        Some(Action::SaveConnection(self.editing, draft))
      },
      Err(message) => {
        self.error = Some(message);
        None
      },
    }
  }

  fn on_saved(&mut self, phase: &Phase<Connection>, store: &Store) -> Option<Action> {
    if !self.submitting || phase.is_pending() {
      return None;
    }
    self.submitting = false;
    match phase {
      Phase::Rejected(_) => {
        self.error = store.connections().error().map(String::from);
        None
      },
      _ => Some(Action::Navigate(Route::Connections)),
    }
  }
}

impl Component for ConnectionForm {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn mode(&self) -> Mode {
    Mode::ConnectionForm
  }

  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    vec![("Tab", "next field"), ("Space", "toggle/cycle"), ("Ctrl-s", "save"), ("Esc", "cancel")]
  }

  fn handle_key_events(&mut self, key: KeyEvent, _store: &Store) -> Result<Option<Action>> {
    if self.loading || self.submitting {
      return Ok(None);
    }
    Ok(match self.form.handle_key(key) {
      FormEvent::Submit => self.submit(),
      FormEvent::Cancel => Some(Action::Navigate(Route::Connections)),
      FormEvent::Changed(Field::Kind) => {
        let kind = self.kind();
        self.show_kind(kind);
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
      Action::Navigate(Route::NewConnection) => self.reset(None),
      Action::Navigate(Route::EditConnection(id)) => {
        self.reset(Some(id));
        self.loading = true;
        if let Some(tx) = &self.command_tx {
          tx.send(Action::FetchConnection(id))?;
        }
      },
      Action::Store(StoreEvent::Connections(event)) => match event {
        ConnectionEvent::FetchOne(id, phase) if self.editing == Some(id) && phase.is_settled() => {
          self.loading = false;
          if let Phase::Fulfilled(connection) = &phase {
            self.fill(connection);
          }
        },
        ConnectionEvent::Create(phase) if self.editing.is_none() => return Ok(self.on_saved(&phase, store)),
        ConnectionEvent::Update(id, phase) if self.editing == Some(id) => return Ok(self.on_saved(&phase, store)),
        _ => {},
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, _store: &Store) -> Result<()> {
    let title = if self.editing.is_some() { " Edit Connection " } else { " New Connection " };
    let block = Block::default()
      .title(title)
      .title_style(theme::title())
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    if self.loading {
      f.render_widget(Paragraph::new(Span::styled("Loading connection...", theme::info())), inner);
      return Ok(());
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(3)])
      .split(inner);
    let status = match (&self.error, self.submitting) {
      (_, true) => Line::from(Span::styled("Saving...", theme::info())),
      (Some(error), false) => Line::from(Span::styled(error.clone(), theme::error())),
      (None, false) => Line::default(),
    };
    f.render_widget(Paragraph::new(status), chunks[0]);
    self.form.render(f, chunks[1]);
    Ok(())
  }
}
