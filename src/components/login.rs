use color_eyre::eyre::Result;
use compareflow_theme as theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*};

use super::{
  centered_rect,
  form::{Form, FormEvent, FormField},
  Component, Frame,
};
use crate::{
  action::Action,
  mode::Mode,
  models::{Credentials, Registration},
  router::Route,
  store::{AuthEvent, Phase, Store, StoreEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Username,
  Email,
  Password,
}

/// Sign-in and account creation. `Ctrl-r` flips between the two.
pub struct Login {
  form: Form<Field>,
  register: bool,
  error: Option<String>,
}

impl Default for Login {
  fn default() -> Self {
    Self::new()
  }
}

impl Login {
  pub fn new() -> Self {
    let mut login = Self {
      form: Form::new(vec![
        (Field::Username, FormField::text("Username").required()),
        (Field::Email, FormField::text("Email").required()),
        (Field::Password, FormField::text("Password").required().masked()),
      ]),
      register: false,
      error: None,
    };
    login.set_register(false);
    login
  }

  fn set_register(&mut self, register: bool) {
    self.register = register;
    self.form.set_hidden(Field::Email, !register);
    self.error = None;
  }

  fn submit(&mut self) -> Option<Action> {
    let missing = self.form.missing();
    if !missing.is_empty() {
      self.error = Some(format!("{} required", missing.join(", ")));
      return None;
    }
    self.error = None;
    let username = self.form.value(Field::Username).trim().to_string();
    let password = self.form.value(Field::Password);
    if self.register {
      let email = self.form.value(Field::Email).trim().to_string();
      Some(Action::Register(Registration { username, email, password }))
    } else {
      Some(Action::Login(Credentials { username, password }))
    }
  }
}

impl Component for Login {
  fn mode(&self) -> Mode {
    Mode::Login
  }

  fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
    let toggle = if self.register { "have an account" } else { "create account" };
    vec![("Tab", "next"), ("Enter", "submit"), ("Ctrl-r", toggle), ("Ctrl-c", "quit")]
  }

  fn handle_key_events(&mut self, key: KeyEvent, store: &Store) -> Result<Option<Action>> {
    if store.auth().is_loading() {
      return Ok(None);
    }
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
      let route = if self.register { Route::Login } else { Route::Register };
      return Ok(Some(Action::Navigate(route)));
    }
    Ok(match self.form.handle_key(key) {
      FormEvent::Submit => self.submit(),
      _ => None,
    })
  }

  fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
    self.form.paste(text);
    Ok(None)
  }

  fn update(&mut self, action: Action, store: &Store) -> Result<Option<Action>> {
    match action {
      Action::Navigate(route @ (Route::Login | Route::Register)) => {
        self.set_register(route == Route::Register);
        self.form.set_value(Field::Password, "");
        self.form.focus(Field::Username);
      },
      Action::Store(StoreEvent::Auth(AuthEvent::Login(Phase::Rejected(_)) | AuthEvent::Register(Phase::Rejected(_)))) => {
        // The store already applied the fallback for blank messages.
        self.error = store.auth().error().map(String::from);
      },
      Action::Logout => {
        self.form.set_value(Field::Password, "");
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect, store: &Store) -> Result<()> {
    let popup = centered_rect(50, 80, area);
    let title = if self.register { " Create account " } else { " Sign in " };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(theme::border_focused())
      .title(title)
      .title_style(theme::title());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(2)])
      .split(inner);
    self.form.render(f, chunks[0]);

    let status = if store.auth().is_loading() {
      Line::from(Span::styled("Signing in...", theme::info()))
    } else if let Some(error) = &self.error {
      Line::from(Span::styled(error.clone(), theme::error()))
    } else {
      Line::default()
    };
    f.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), chunks[1]);
    Ok(())
  }
}
