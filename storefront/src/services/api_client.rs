// storefront/src/services/api_client.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use reqwest::{Client, RequestBuilder};

/// Shared HTTP client for the storefront API. Attaches the bearer token, when
/// one is configured, to every request it builds.
#[derive(Clone)]
pub struct ApiClient {
  http: Client,
  base_url: String,
  auth_token: Option<String>,
}

impl ApiClient {
  pub fn new(config: &AppConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.http_timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;
    Ok(Self {
      http,
      base_url: config.api_base_url.clone(),
      auth_token: config.auth_token.clone(),
    })
  }

  /// The underlying client, for requests outside the API (the widget script).
  pub fn http(&self) -> &Client {
    &self.http
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  pub fn get(&self, path: &str) -> RequestBuilder {
    self.authorized(self.http.get(self.url(path)))
  }

  pub fn post(&self, path: &str) -> RequestBuilder {
    self.authorized(self.http.post(self.url(path)))
  }

  fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
    match &self.auth_token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }
}
