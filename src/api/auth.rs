use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use super::{ApiResult, AuthService, HttpBackend};
use crate::models::{AuthResponse, Credentials, Registration, User};

#[async_trait]
impl AuthService for HttpBackend {
  async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
    let request = self.request(Method::POST, &["auth", "login"]).await?.json(credentials);
    let response: AuthResponse = self.send(request).await?;
    self.store_token(Some(response.access_token.clone())).await;
    info!("Logged in as {}", response.user.username);
    Ok(response)
  }

  async fn register(&self, registration: &Registration) -> ApiResult<AuthResponse> {
    let request = self.request(Method::POST, &["auth", "register"]).await?.json(registration);
    let response: AuthResponse = self.send(request).await?;
    self.store_token(Some(response.access_token.clone())).await;
    info!("Registered {}", response.user.username);
    Ok(response)
  }

  async fn current_user(&self) -> ApiResult<User> {
    let request = self.request(Method::GET, &["auth", "me"]).await?;
    self.send(request).await
  }

  async fn set_token(&self, token: Option<String>) {
    self.store_token(token).await;
  }
}
