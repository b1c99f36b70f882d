use tracing::{info, warn};

use super::{message_or, Phase};
use crate::models::{AuthResponse, User};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
  Login(Phase<AuthResponse>),
  Register(Phase<AuthResponse>),
  /// A token obtained outside the login form, e.g. from the command line.
  Restore(String),
  Session(Phase<User>),
  Logout,
  ClearError,
}

#[derive(Debug, Default)]
pub struct AuthStore {
  user: Option<User>,
  token: Option<String>,
  loading: bool,
  error: Option<String>,
}

impl AuthStore {
  pub fn user(&self) -> Option<&User> {
    self.user.as_ref()
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn is_authenticated(&self) -> bool {
    self.token.is_some()
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn reduce(&mut self, event: AuthEvent) {
    match event {
      AuthEvent::Login(phase) => self.authenticate(phase, "Login failed"),
      AuthEvent::Register(phase) => self.authenticate(phase, "Registration failed"),
      AuthEvent::Restore(token) => {
        self.token = Some(token);
        self.error = None;
      },
      AuthEvent::Session(Phase::Pending) => self.loading = true,
      AuthEvent::Session(Phase::Fulfilled(user)) => {
        self.loading = false;
        self.user = Some(user);
      },
      AuthEvent::Session(Phase::Rejected(message)) => {
        // A token the server no longer accepts is as good as none.
        warn!("session check failed: {message}");
        self.loading = false;
        self.user = None;
        self.token = None;
      },
      AuthEvent::Logout => {
        self.user = None;
        self.token = None;
        self.error = None;
        self.loading = false;
      },
      AuthEvent::ClearError => self.error = None,
    }
  }

  fn authenticate(&mut self, phase: Phase<AuthResponse>, fallback: &str) {
    match phase {
      Phase::Pending => {
        self.loading = true;
        self.error = None;
      },
      Phase::Fulfilled(AuthResponse { access_token, user }) => {
        info!("signed in as {}", user.username);
        self.loading = false;
        self.token = Some(access_token);
        self.user = Some(user);
      },
      Phase::Rejected(message) => {
        self.loading = false;
        self.error = Some(message_or(message, fallback));
      },
    }
  }
}
