//! REST bindings for the compareflow backend.
//!
//! Every service method performs exactly one HTTP call and hands back either
//! the decoded body or the transport error untouched. Retries, caching and
//! pagination are deliberately absent: the stores mirror whatever the server
//! answered last.

pub mod auth;
pub mod client;
pub mod connections;
pub mod validations;

use async_trait::async_trait;
use thiserror::Error;

pub use self::client::HttpBackend;
use crate::models::{
  AuthResponse, ColumnInfo, Connection, ConnectionDraft, ConnectionId, Credentials, Registration, TestResult, User,
  Validation, ValidationDraft, ValidationId, ValidationStatusInfo,
};

/// Flat error taxonomy: the server said no, or we never got a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  #[error("{message}")]
  Status { status: u16, message: String },
  #[error("{0}")]
  Transport(String),
  #[error("Invalid response from server: {0}")]
  Decode(String),
  #[error("Invalid API url '{0}'")]
  InvalidUrl(String),
}

impl ApiError {
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.status() == Some(404)
  }

  pub fn is_unauthorized(&self) -> bool {
    self.status() == Some(401)
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      ApiError::Decode(e.to_string())
    } else {
      ApiError::Transport(e.to_string())
    }
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait AuthService: Send + Sync {
  async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;
  async fn register(&self, registration: &Registration) -> ApiResult<AuthResponse>;
  async fn current_user(&self) -> ApiResult<User>;
  /// Replace the bearer token attached to every later request. `None` logs out.
  async fn set_token(&self, token: Option<String>);
}

#[async_trait]
pub trait ConnectionService: Send + Sync {
  async fn list_connections(&self) -> ApiResult<Vec<Connection>>;
  async fn get_connection(&self, id: ConnectionId) -> ApiResult<Connection>;
  async fn create_connection(&self, draft: &ConnectionDraft) -> ApiResult<Connection>;
  async fn update_connection(&self, id: ConnectionId, draft: &ConnectionDraft) -> ApiResult<Connection>;
  async fn delete_connection(&self, id: ConnectionId) -> ApiResult<()>;
  async fn test_connection(&self, id: ConnectionId) -> ApiResult<TestResult>;
  async fn list_tables(&self, id: ConnectionId) -> ApiResult<Vec<String>>;
  async fn list_columns(&self, id: ConnectionId, table: &str) -> ApiResult<Vec<ColumnInfo>>;
}

#[async_trait]
pub trait ValidationService: Send + Sync {
  async fn list_validations(&self) -> ApiResult<Vec<Validation>>;
  async fn get_validation(&self, id: ValidationId) -> ApiResult<Validation>;
  async fn create_validation(&self, draft: &ValidationDraft) -> ApiResult<Validation>;
  async fn update_validation(&self, id: ValidationId, draft: &ValidationDraft) -> ApiResult<Validation>;
  async fn delete_validation(&self, id: ValidationId) -> ApiResult<()>;
  /// Blocks until the backend has finished the comparison.
  async fn run_validation(&self, id: ValidationId) -> ApiResult<Validation>;
  async fn validation_status(&self, id: ValidationId) -> ApiResult<ValidationStatusInfo>;
}

/// Everything the client needs from the backend.
pub trait Backend: AuthService + ConnectionService + ValidationService {}

impl<T: AuthService + ConnectionService + ValidationService> Backend for T {}

#[cfg(test)]
mockall::mock! {
  pub Backend {}

  #[async_trait]
  impl AuthService for Backend {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;
    async fn register(&self, registration: &Registration) -> ApiResult<AuthResponse>;
    async fn current_user(&self) -> ApiResult<User>;
    async fn set_token(&self, token: Option<String>);
  }

  #[async_trait]
  impl ConnectionService for Backend {
    async fn list_connections(&self) -> ApiResult<Vec<Connection>>;
    async fn get_connection(&self, id: ConnectionId) -> ApiResult<Connection>;
    async fn create_connection(&self, draft: &ConnectionDraft) -> ApiResult<Connection>;
    async fn update_connection(&self, id: ConnectionId, draft: &ConnectionDraft) -> ApiResult<Connection>;
    async fn delete_connection(&self, id: ConnectionId) -> ApiResult<()>;
    async fn test_connection(&self, id: ConnectionId) -> ApiResult<TestResult>;
    async fn list_tables(&self, id: ConnectionId) -> ApiResult<Vec<String>>;
    async fn list_columns(&self, id: ConnectionId, table: &str) -> ApiResult<Vec<ColumnInfo>>;
  }

  #[async_trait]
  impl ValidationService for Backend {
    async fn list_validations(&self) -> ApiResult<Vec<Validation>>;
    async fn get_validation(&self, id: ValidationId) -> ApiResult<Validation>;
    async fn create_validation(&self, draft: &ValidationDraft) -> ApiResult<Validation>;
    async fn update_validation(&self, id: ValidationId, draft: &ValidationDraft) -> ApiResult<Validation>;
    async fn delete_validation(&self, id: ValidationId) -> ApiResult<()>;
    async fn run_validation(&self, id: ValidationId) -> ApiResult<Validation>;
    async fn validation_status(&self, id: ValidationId) -> ApiResult<ValidationStatusInfo>;
  }
}
