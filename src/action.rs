use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
  models::{ConnectionDraft, ConnectionId, Credentials, Registration, ValidationDraft, ValidationId},
  router::Route,
  store::StoreEvent,
};

/// Everything that flows through the event loop.
///
/// Variants carrying request bodies or store events are never bound to keys,
/// so they are skipped by serde and only constructed in code.
#[derive(Debug, Clone, PartialEq, Serialize, Display, Deserialize)]
pub enum Action {
  Tick,
  Render,
  Resize(u16, u16),
  Suspend,
  Resume,
  Quit,
  Refresh,
  Error(String),
  #[serde(alias = "navigate")]
  Navigate(Route),
  ClearError,

  // Session
  #[serde(skip)]
  Login(Credentials),
  #[serde(skip)]
  Register(Registration),
  #[serde(skip)]
  RestoreSession(String),
  Logout,

  // Connections
  FetchConnections,
  FetchConnection(ConnectionId),
  #[serde(skip)]
  SaveConnection(Option<ConnectionId>, ConnectionDraft),
  DeleteConnection(ConnectionId),
  TestConnection(ConnectionId),
  ClearTestResult,
  FetchTables(ConnectionId),
  FetchColumns(ConnectionId, String),

  // Validations
  FetchValidations,
  FetchValidation(ValidationId),
  #[serde(skip)]
  SaveValidation(Option<ValidationId>, ValidationDraft),
  DeleteValidation(ValidationId),
  RunValidation(ValidationId),
  RefreshStatus(ValidationId),
  RunFinished(ValidationId),

  /// A settled (or just dispatched) request, applied to the store by the event loop.
  #[serde(skip)]
  Store(StoreEvent),
}

impl From<StoreEvent> for Action {
  fn from(event: StoreEvent) -> Self {
    Action::Store(event)
  }
}
