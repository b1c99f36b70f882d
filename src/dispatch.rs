//! Turns request actions into backend calls.
//!
//! Every request reports a `Pending` store event synchronously, then runs on
//! its own task and reports exactly one settled event over the action
//! channel. Nothing here touches the store.

use std::{future::Future, sync::Arc};

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{info, warn};

use crate::{
  action::Action,
  api::{ApiResult, Backend},
  models::{ConnectionDraft, ConnectionId, Validation, ValidationDraft, ValidationId},
  store::{AuthEvent, ConnectionEvent, Phase, StoreEvent, ValidationEvent},
};

#[derive(Clone)]
pub struct Dispatcher {
  backend: Arc<dyn Backend>,
  tx: UnboundedSender<Action>,
}

fn emit(tx: &UnboundedSender<Action>, event: impl Into<StoreEvent>) {
  // The receiver only goes away on shutdown.
  let _ = tx.send(Action::Store(event.into()));
}

fn log_outcome<T>(what: &str, result: &ApiResult<T>) {
  match result {
    Ok(_) => info!("{what}: ok"),
    Err(e) => warn!("{what}: {e}"),
  }
}

/// Awaits one call, reporting pending and settled phases through `event`.
async fn tracked<T, E, F>(tx: &UnboundedSender<Action>, what: &str, event: E, call: F) -> bool
where
  E: Fn(Phase<T>) -> StoreEvent,
  F: Future<Output = ApiResult<T>>,
{
  emit(tx, event(Phase::Pending));
  let result = call.await;
  log_outcome(what, &result);
  let ok = result.is_ok();
  emit(tx, event(Phase::settle(result)));
  ok
}

impl Dispatcher {
  pub fn new(backend: Arc<dyn Backend>, tx: UnboundedSender<Action>) -> Self {
    Self { backend, tx }
  }

  fn request<T, E, F>(&self, what: String, event: E, call: F) -> JoinHandle<()>
  where
    T: Send + 'static,
    E: Fn(Phase<T>) -> StoreEvent + Send + 'static,
    F: Future<Output = ApiResult<T>> + Send + 'static,
  {
    let tx = self.tx.clone();
    emit(&tx, event(Phase::Pending));
    tokio::spawn(async move {
      let result = call.await;
      log_outcome(&what, &result);
      emit(&tx, event(Phase::settle(result)));
    })
  }

  /// Starts the request behind `action`. Returns `None` for actions that are not requests.
  pub fn dispatch(&self, action: &Action) -> Option<JoinHandle<()>> {
    let backend = self.backend.clone();
    let handle = match action.clone() {
      Action::Login(credentials) => self.request(
        format!("login {}", credentials.username),
        |p| AuthEvent::Login(p).into(),
        async move { backend.login(&credentials).await },
      ),
      Action::Register(registration) => self.request(
        format!("register {}", registration.username),
        |p| AuthEvent::Register(p).into(),
        async move { backend.register(&registration).await },
      ),
      Action::RestoreSession(token) => self.restore_session(token),
      Action::Logout => {
        tokio::spawn(async move { backend.set_token(None).await })
      },

      Action::FetchConnections => self.request(
        "list connections".into(),
        |p| ConnectionEvent::FetchAll(p).into(),
        async move { backend.list_connections().await },
      ),
      Action::FetchConnection(id) => self.request(
        format!("get connection {id}"),
        move |p| ConnectionEvent::FetchOne(id, p).into(),
        async move { backend.get_connection(id).await },
      ),
      Action::SaveConnection(id, draft) => self.save_connection(id, draft),
      Action::DeleteConnection(id) => self.request(
        format!("delete connection {id}"),
        move |p| ConnectionEvent::Delete(id, p).into(),
        async move { backend.delete_connection(id).await },
      ),
      Action::TestConnection(id) => self.request(
        format!("test connection {id}"),
        move |p| ConnectionEvent::Test(id, p).into(),
        async move { backend.test_connection(id).await },
      ),
      Action::FetchTables(id) => self.request(
        format!("list tables of connection {id}"),
        move |p| ConnectionEvent::Tables(id, p).into(),
        async move { backend.list_tables(id).await },
      ),
      Action::FetchColumns(id, table) => {
        let name = table.clone();
        self.request(
          format!("list columns of {table} on connection {id}"),
          move |p| ConnectionEvent::Columns(id, name.clone(), p).into(),
          async move { backend.list_columns(id, &table).await },
        )
      },

      Action::FetchValidations => self.request(
        "list validations".into(),
        |p| ValidationEvent::FetchAll(p).into(),
        async move { backend.list_validations().await },
      ),
      Action::FetchValidation(id) => self.request(
        format!("get validation {id}"),
        move |p| ValidationEvent::FetchOne(id, p).into(),
        async move { backend.get_validation(id).await },
      ),
      Action::SaveValidation(id, draft) => self.save_validation(id, draft),
      Action::DeleteValidation(id) => self.request(
        format!("delete validation {id}"),
        move |p| ValidationEvent::Delete(id, p).into(),
        async move { backend.delete_validation(id).await },
      ),
      Action::RefreshStatus(id) => self.request(
        format!("status of validation {id}"),
        move |p| ValidationEvent::Status(id, p).into(),
        async move { backend.validation_status(id).await },
      ),
      Action::RunValidation(id) => self.run_validation(id),
      _ => return None,
    };
    Some(handle)
  }

  fn save_connection(&self, id: Option<ConnectionId>, draft: ConnectionDraft) -> JoinHandle<()> {
    let backend = self.backend.clone();
    match id {
      Some(id) => self.request(
        format!("update connection {id}"),
        move |p| ConnectionEvent::Update(id, p).into(),
        async move { backend.update_connection(id, &draft).await },
      ),
      None => self.request(
        format!("create connection {}", draft.name),
        |p| ConnectionEvent::Create(p).into(),
        async move { backend.create_connection(&draft).await },
      ),
    }
  }

  fn save_validation(&self, id: Option<ValidationId>, draft: ValidationDraft) -> JoinHandle<()> {
    let backend = self.backend.clone();
    match id {
      Some(id) => self.request(
        format!("update validation {id}"),
        move |p| ValidationEvent::Update(id, p).into(),
        async move { backend.update_validation(id, &draft).await },
      ),
      None => self.request(
        format!("create validation {}", draft.name),
        |p| ValidationEvent::Create(p).into(),
        async move { backend.create_validation(&draft).await },
      ),
    }
  }

  /// Installs a saved token, then asks the backend who it belongs to.
  fn restore_session(&self, token: String) -> JoinHandle<()> {
    let backend = self.backend.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      backend.set_token(Some(token)).await;
      let accepted =
        tracked(&tx, "restore session", |p| AuthEvent::Session(p).into(), backend.current_user()).await;
      if !accepted {
        backend.set_token(None).await;
      }
    })
  }

  /// One task so the steps stay ordered: fetch, run, refetch the list,
  /// refetch the detail when the run succeeded, then `RunFinished`.
  fn run_validation(&self, id: ValidationId) -> JoinHandle<()> {
    let backend = self.backend.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let fetch_one = move |p: Phase<Validation>| -> StoreEvent { ValidationEvent::FetchOne(id, p).into() };
      tracked(&tx, &format!("get validation {id}"), fetch_one, backend.get_validation(id)).await;
      let ran = tracked(
        &tx,
        &format!("run validation {id}"),
        move |p| ValidationEvent::Run(id, p).into(),
        backend.run_validation(id),
      )
      .await;
      tracked(&tx, "list validations", |p| ValidationEvent::FetchAll(p).into(), backend.list_validations()).await;
      if ran {
        tracked(&tx, &format!("get validation {id}"), fetch_one, backend.get_validation(id)).await;
      }
      let _ = tx.send(Action::RunFinished(id));
    })
  }
}
