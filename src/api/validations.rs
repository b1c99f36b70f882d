use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use super::{ApiResult, HttpBackend, ValidationService};
use crate::models::{Validation, ValidationDraft, ValidationId, ValidationStatusInfo};

#[async_trait]
impl ValidationService for HttpBackend {
  async fn list_validations(&self) -> ApiResult<Vec<Validation>> {
    let request = self.request(Method::GET, &["validations"]).await?;
    self.send(request).await
  }

  async fn get_validation(&self, id: ValidationId) -> ApiResult<Validation> {
    let request = self.request(Method::GET, &["validations", &id.to_string()]).await?;
    self.send(request).await
  }

  async fn create_validation(&self, draft: &ValidationDraft) -> ApiResult<Validation> {
    let request = self.request(Method::POST, &["validations"]).await?.json(draft);
    self.send(request).await
  }

  async fn update_validation(&self, id: ValidationId, draft: &ValidationDraft) -> ApiResult<Validation> {
    let request = self.request(Method::PUT, &["validations", &id.to_string()]).await?.json(draft);
    self.send(request).await
  }

  async fn delete_validation(&self, id: ValidationId) -> ApiResult<()> {
    let request = self.request(Method::DELETE, &["validations", &id.to_string()]).await?;
    self.send_empty(request).await
  }

  async fn run_validation(&self, id: ValidationId) -> ApiResult<Validation> {
    info!("Running validation {id}");
    let request = self.request(Method::POST, &["validations", &id.to_string(), "run"]).await?;
    let validation: Validation = self.send(request).await?;
    info!("Validation {id} finished with status {}", validation.status);
    Ok(validation)
  }

  async fn validation_status(&self, id: ValidationId) -> ApiResult<ValidationStatusInfo> {
    let request = self.request(Method::GET, &["validations", &id.to_string(), "status"]).await?;
    self.send(request).await
  }
}
