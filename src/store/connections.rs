use std::collections::HashMap;

use super::{message_or, Phase};
use crate::models::{ColumnInfo, Connection, ConnectionId, TestResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
  FetchAll(Phase<Vec<Connection>>),
  FetchOne(ConnectionId, Phase<Connection>),
  Create(Phase<Connection>),
  Update(ConnectionId, Phase<Connection>),
  Delete(ConnectionId, Phase<()>),
  Test(ConnectionId, Phase<TestResult>),
  Tables(ConnectionId, Phase<Vec<String>>),
  Columns(ConnectionId, String, Phase<Vec<ColumnInfo>>),
  ClearError,
  ClearTestResult,
}

#[derive(Debug, Default)]
pub struct ConnectionStore {
  connections: Vec<Connection>,
  current: Option<Connection>,
  loading: bool,
  error: Option<String>,
  test_result: Option<TestResult>,
  tables: HashMap<ConnectionId, Vec<String>>,
  columns: HashMap<(ConnectionId, String), Vec<ColumnInfo>>,
  schema_loading: bool,
}

impl ConnectionStore {
  pub fn all(&self) -> &[Connection] {
    &self.connections
  }

  pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
    self.connections.iter().find(|c| c.id == id)
  }

  pub fn current(&self) -> Option<&Connection> {
    self.current.as_ref()
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn test_result(&self) -> Option<&TestResult> {
    self.test_result.as_ref()
  }

  pub fn tables(&self, id: ConnectionId) -> Option<&[String]> {
    self.tables.get(&id).map(Vec::as_slice)
  }

  pub fn columns(&self, id: ConnectionId, table: &str) -> Option<&[ColumnInfo]> {
    self.columns.get(&(id, table.to_string())).map(Vec::as_slice)
  }

  pub fn is_schema_loading(&self) -> bool {
    self.schema_loading
  }

  pub fn reduce(&mut self, event: ConnectionEvent) {
    match event {
      ConnectionEvent::FetchAll(Phase::Pending) => self.loading = true,
      ConnectionEvent::FetchAll(Phase::Fulfilled(connections)) => {
        self.loading = false;
        self.connections = connections;
      },
      ConnectionEvent::FetchAll(Phase::Rejected(message)) => {
        self.loading = false;
        self.error = Some(message_or(message, "Failed to fetch connections"));
      },

      ConnectionEvent::FetchOne(_, Phase::Pending) => {},
      ConnectionEvent::FetchOne(_, Phase::Fulfilled(connection)) => self.current = Some(connection),
      ConnectionEvent::FetchOne(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to fetch connection"));
      },

      ConnectionEvent::Create(Phase::Pending) | ConnectionEvent::Update(_, Phase::Pending) => {},
      ConnectionEvent::Create(Phase::Fulfilled(connection)) | ConnectionEvent::Update(_, Phase::Fulfilled(connection)) => {
        self.upsert(connection)
      },
      ConnectionEvent::Create(Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to create connection"));
      },
      ConnectionEvent::Update(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to update connection"));
      },

      ConnectionEvent::Delete(_, Phase::Pending) => {},
      ConnectionEvent::Delete(id, Phase::Fulfilled(())) => {
        self.connections.retain(|c| c.id != id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
          self.current = None;
        }
        self.tables.remove(&id);
        self.columns.retain(|(connection, _), _| *connection != id);
      },
      ConnectionEvent::Delete(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to delete connection"));
      },

      ConnectionEvent::Test(_, Phase::Pending) => {},
      ConnectionEvent::Test(_, Phase::Fulfilled(result)) => self.test_result = Some(result),
      ConnectionEvent::Test(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to test connection"));
      },

      ConnectionEvent::Tables(_, Phase::Pending) | ConnectionEvent::Columns(_, _, Phase::Pending) => {
        self.schema_loading = true
      },
      ConnectionEvent::Tables(id, Phase::Fulfilled(tables)) => {
        self.schema_loading = false;
        self.tables.insert(id, tables);
      },
      ConnectionEvent::Columns(id, table, Phase::Fulfilled(columns)) => {
        self.schema_loading = false;
        self.columns.insert((id, table), columns);
      },
      ConnectionEvent::Tables(_, Phase::Rejected(message)) => {
        self.schema_loading = false;
        self.error = Some(message_or(message, "Failed to load tables"));
      },
      ConnectionEvent::Columns(_, _, Phase::Rejected(message)) => {
        self.schema_loading = false;
        self.error = Some(message_or(message, "Failed to load columns"));
      },

      ConnectionEvent::ClearError => self.error = None,
      ConnectionEvent::ClearTestResult => self.test_result = None,
    }
  }

  fn upsert(&mut self, connection: Connection) {
    match self.connections.iter_mut().find(|c| c.id == connection.id) {
      Some(existing) => *existing = connection,
      None => self.connections.push(connection),
    }
  }
}
