use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use super::{ApiResult, ConnectionService, HttpBackend};
use crate::models::{ColumnInfo, Connection, ConnectionDraft, ConnectionId, TestResult};

// An empty schema can come back as `null` rather than `[]`.
#[derive(Deserialize)]
struct TablesBody {
  #[serde(default)]
  tables: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ColumnsBody {
  #[serde(default)]
  columns: Option<Vec<ColumnInfo>>,
}

#[async_trait]
impl ConnectionService for HttpBackend {
  async fn list_connections(&self) -> ApiResult<Vec<Connection>> {
    let request = self.request(Method::GET, &["connections"]).await?;
    self.send(request).await
  }

  async fn get_connection(&self, id: ConnectionId) -> ApiResult<Connection> {
    let request = self.request(Method::GET, &["connections", &id.to_string()]).await?;
    self.send(request).await
  }

  async fn create_connection(&self, draft: &ConnectionDraft) -> ApiResult<Connection> {
    let request = self.request(Method::POST, &["connections"]).await?.json(draft);
    self.send(request).await
  }

  async fn update_connection(&self, id: ConnectionId, draft: &ConnectionDraft) -> ApiResult<Connection> {
    let request = self.request(Method::PUT, &["connections", &id.to_string()]).await?.json(draft);
    self.send(request).await
  }

  async fn delete_connection(&self, id: ConnectionId) -> ApiResult<()> {
    let request = self.request(Method::DELETE, &["connections", &id.to_string()]).await?;
    self.send_empty(request).await
  }

  // A failing test comes back as 400 with the same body shape as a passing one.
  async fn test_connection(&self, id: ConnectionId) -> ApiResult<TestResult> {
    let request = self.request(Method::POST, &["connections", &id.to_string(), "test"]).await?;
    self.send_accepting(request, &[StatusCode::BAD_REQUEST]).await
  }

  async fn list_tables(&self, id: ConnectionId) -> ApiResult<Vec<String>> {
    let request = self.request(Method::GET, &["connections", &id.to_string(), "tables"]).await?;
    let body: TablesBody = self.send(request).await?;
    Ok(body.tables.unwrap_or_default())
  }

  async fn list_columns(&self, id: ConnectionId, table: &str) -> ApiResult<Vec<ColumnInfo>> {
    let request = self.request(Method::GET, &["connections", &id.to_string(), "tables", table, "columns"]).await?;
    let body: ColumnsBody = self.send(request).await?;
    Ok(body.columns.unwrap_or_default())
  }
}
