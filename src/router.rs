//! Page addressing and the authentication guard.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
  mode::Mode,
  models::{ConnectionId, ValidationId},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Route {
  #[default]
  Login,
  Register,
  Dashboard,
  Connections,
  NewConnection,
  EditConnection(ConnectionId),
  Validations,
  NewValidation,
  EditValidation(ValidationId),
}

impl Route {
  pub fn requires_auth(&self) -> bool {
    !self.is_auth_page()
  }

  pub fn is_auth_page(&self) -> bool {
    matches!(self, Route::Login | Route::Register)
  }

  pub fn mode(&self) -> Mode {
    match self {
      Route::Login | Route::Register => Mode::Login,
      Route::Dashboard => Mode::Dashboard,
      Route::Connections => Mode::Connections,
      Route::NewConnection | Route::EditConnection(_) => Mode::ConnectionForm,
      Route::Validations => Mode::Validations,
      Route::NewValidation | Route::EditValidation(_) => Mode::ValidationForm,
    }
  }

  /// Top-level section the route belongs to, for the header tabs.
  pub fn section(&self) -> Route {
    match self {
      Route::NewConnection | Route::EditConnection(_) => Route::Connections,
      Route::NewValidation | Route::EditValidation(_) => Route::Validations,
      Route::Register => Route::Login,
      other => *other,
    }
  }

  pub fn title(&self) -> String {
    match self {
      Route::Login => "Sign in".into(),
      Route::Register => "Create account".into(),
      Route::Dashboard => "Dashboard".into(),
      Route::Connections => "Connections".into(),
      Route::NewConnection => "New Connection".into(),
      Route::EditConnection(id) => format!("Edit Connection #{id}"),
      Route::Validations => "Validations".into(),
      Route::NewValidation => "New Validation".into(),
      Route::EditValidation(id) => format!("Edit Validation #{id}"),
    }
  }
}

/// Where a navigation request actually lands.
///
/// Protected routes send anonymous users to the login page; signed-in users
/// asking for the auth pages land on the dashboard instead.
pub fn guard(requested: Route, authenticated: bool) -> Route {
  match (authenticated, requested.requires_auth()) {
    (false, true) => Route::Login,
    (true, false) => Route::Dashboard,
    _ => requested,
  }
}
