//! Client-side mirror of backend state.
//!
//! Each slice is mutated only through its `reduce` method, fed by
//! [`StoreEvent`]s that carry a [`Phase`]: `Pending` when a request is
//! dispatched, then exactly one of `Fulfilled` or `Rejected` when it settles.
//! The event loop is the only caller of [`Store::reduce`], so there is a
//! single writer and no locking.

pub mod auth;
pub mod connections;
pub mod validations;

use std::fmt::Display;

pub use self::{
  auth::{AuthEvent, AuthStore},
  connections::{ConnectionEvent, ConnectionStore},
  validations::{ValidationEvent, ValidationStore},
};

/// Lifecycle of one request as seen by a reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
  Pending,
  Fulfilled(T),
  Rejected(String),
}

impl<T> Phase<T> {
  pub fn settle<E: Display>(result: Result<T, E>) -> Self {
    match result {
      Ok(value) => Phase::Fulfilled(value),
      Err(e) => Phase::Rejected(e.to_string()),
    }
  }

  pub fn is_pending(&self) -> bool {
    matches!(self, Phase::Pending)
  }

  pub fn is_settled(&self) -> bool {
    !self.is_pending()
  }

  pub fn fulfilled(&self) -> Option<&T> {
    match self {
      Phase::Fulfilled(value) => Some(value),
      _ => None,
    }
  }

  pub fn rejected(&self) -> Option<&str> {
    match self {
      Phase::Rejected(message) => Some(message),
      _ => None,
    }
  }
}

/// Rejection message, or the fallback when the transport gave none.
pub(crate) fn message_or(message: String, fallback: &str) -> String {
  if message.trim().is_empty() {
    fallback.to_string()
  } else {
    message
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
  Auth(AuthEvent),
  Connections(ConnectionEvent),
  Validations(ValidationEvent),
}

impl From<AuthEvent> for StoreEvent {
  fn from(event: AuthEvent) -> Self {
    StoreEvent::Auth(event)
  }
}

impl From<ConnectionEvent> for StoreEvent {
  fn from(event: ConnectionEvent) -> Self {
    StoreEvent::Connections(event)
  }
}

impl From<ValidationEvent> for StoreEvent {
  fn from(event: ValidationEvent) -> Self {
    StoreEvent::Validations(event)
  }
}

#[derive(Debug, Default)]
pub struct Store {
  auth: AuthStore,
  connections: ConnectionStore,
  validations: ValidationStore,
}

impl Store {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn reduce(&mut self, event: StoreEvent) {
    match event {
      StoreEvent::Auth(event) => {
        let logged_out = matches!(event, AuthEvent::Logout);
        self.auth.reduce(event);
        // Nothing mirrored for one user may leak into the next session.
        if logged_out {
          self.connections = ConnectionStore::default();
          self.validations = ValidationStore::default();
        }
      },
      StoreEvent::Connections(event) => self.connections.reduce(event),
      StoreEvent::Validations(event) => self.validations.reduce(event),
    }
  }

  pub fn auth(&self) -> &AuthStore {
    &self.auth
  }

  pub fn connections(&self) -> &ConnectionStore {
    &self.connections
  }

  pub fn validations(&self) -> &ValidationStore {
    &self.validations
  }

  pub fn is_authenticated(&self) -> bool {
    self.auth.is_authenticated()
  }

  /// First error recorded on any slice, for the shell's status line.
  pub fn last_error(&self) -> Option<&str> {
    self.connections.error().or(self.validations.error()).or(self.auth.error())
  }
}
