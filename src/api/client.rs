use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{ApiError, ApiResult};
use crate::config::ApiConfig;

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Thin reqwest wrapper that owns the base URL and the session token.
pub struct HttpBackend {
  http: reqwest::Client,
  base_url: Url,
  token: RwLock<Option<String>>,
}

impl HttpBackend {
  pub fn new(config: &ApiConfig) -> ApiResult<Self> {
    let base_url = Url::parse(config.base_url.trim_end_matches('/'))
      .map_err(|_| ApiError::InvalidUrl(config.base_url.clone()))?;
    if base_url.cannot_be_a_base() {
      return Err(ApiError::InvalidUrl(config.base_url.clone()));
    }

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(ApiError::from)?;

    Ok(Self { http, base_url, token: RwLock::new(None) })
  }

  pub async fn token(&self) -> Option<String> {
    self.token.read().await.clone()
  }

  pub(super) async fn store_token(&self, token: Option<String>) {
    *self.token.write().await = token;
  }

  /// Joins path segments onto the base URL, percent-encoding each one.
  pub(super) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  pub(super) async fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
    let url = self.endpoint(segments)?;
    debug!("{method} {url}");
    let builder = self.http.request(method, url);
    Ok(match self.token.read().await.as_deref() {
      Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
      None => builder,
    })
  }

  #[instrument(level = "debug", skip_all)]
  pub(super) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
    self.send_response(builder.send().await?).await
  }

  pub(super) async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
    let response = builder.send().await?;
    error_for_status(response).await?;
    Ok(())
  }

  /// Like [`send`](Self::send), but decodes the body when the status is one of `accepted`
  /// even if it is not a success code.
  pub(super) async fn send_accepting<T: DeserializeOwned>(
    &self,
    builder: RequestBuilder,
    accepted: &[StatusCode],
  ) -> ApiResult<T> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() || !accepted.contains(&status) {
      return self.send_response(response).await;
    }
    let bytes = response.bytes().await?;
    match serde_json::from_slice::<T>(&bytes) {
      Ok(body) => Ok(body),
      Err(_) => Err(status_error(status, &bytes)),
    }
  }

  async fn send_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
    let response = error_for_status(response).await?;
    response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
  }
}

async fn error_for_status(response: Response) -> ApiResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let bytes = response.bytes().await.unwrap_or_default();
  Err(status_error(status, &bytes))
}

/// The backend reports failures as `{"error": "..."}`; anything else gets a generic message.
fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
  let message = serde_json::from_slice::<ErrorBody>(body)
    .map(|b| b.error)
    .ok()
    .filter(|m| !m.is_empty())
    .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
  ApiError::Status { status: status.as_u16(), message }
}
