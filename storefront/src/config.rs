// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use paydesk::checkout::settings::{DEFAULT_SCRIPT_ID, DEFAULT_SCRIPT_URL};
use paydesk::domain::WidgetScript;
use paydesk::CheckoutSettings;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Base URL of the storefront REST API, without a trailing slash.
  pub api_base_url: String,
  pub auth_token: Option<String>,
  /// Used when the create-order response does not carry a key.
  pub widget_key: Option<String>,
  pub widget_script_url: String,
  pub merchant_name: String,
  pub verify_timeout: Duration,
  /// `None` when set to 0: wait for the widget indefinitely.
  pub widget_timeout: Option<Duration>,
  pub http_timeout: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source. Blank values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let api_base_url = get_env("STOREFRONT_API_BASE_URL")
      .ok_or_else(|| AppError::Config("Missing environment variable 'STOREFRONT_API_BASE_URL'".to_string()))?
      .trim_end_matches('/')
      .to_string();
    if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
      return Err(AppError::Config(format!(
        "Invalid STOREFRONT_API_BASE_URL '{}': expected an http(s) URL",
        api_base_url
      )));
    }

    let verify_timeout = parse_secs("PAYMENT_VERIFY_TIMEOUT_SECS", get_env("PAYMENT_VERIFY_TIMEOUT_SECS"), 30)?;
    if verify_timeout.is_zero() {
      return Err(AppError::Config(
        "Invalid PAYMENT_VERIFY_TIMEOUT_SECS: must be greater than zero".to_string(),
      ));
    }
    let widget_timeout = parse_secs("PAYMENT_WIDGET_TIMEOUT_SECS", get_env("PAYMENT_WIDGET_TIMEOUT_SECS"), 15 * 60)?;
    let http_timeout = parse_secs("STOREFRONT_HTTP_TIMEOUT_SECS", get_env("STOREFRONT_HTTP_TIMEOUT_SECS"), 10)?;

    let config = Self {
      api_base_url,
      auth_token: get_env("STOREFRONT_AUTH_TOKEN"),
      widget_key: get_env("PAYMENT_WIDGET_KEY"),
      widget_script_url: get_env("PAYMENT_WIDGET_SCRIPT_URL").unwrap_or_else(|| DEFAULT_SCRIPT_URL.to_string()),
      merchant_name: get_env("STOREFRONT_MERCHANT_NAME").unwrap_or_else(|| "Your Ecommerce Store".to_string()),
      verify_timeout,
      widget_timeout: Some(widget_timeout).filter(|d| !d.is_zero()),
      http_timeout,
    };

    // Never log the token itself.
    tracing::info!(
      api_base_url = %config.api_base_url,
      has_auth_token = config.auth_token.is_some(),
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  pub fn checkout_settings(&self) -> CheckoutSettings {
    CheckoutSettings {
      widget_script: WidgetScript {
        id: DEFAULT_SCRIPT_ID.to_string(),
        url: self.widget_script_url.clone(),
      },
      merchant_name: self.merchant_name.clone(),
      verification_timeout: self.verify_timeout,
      widget_timeout: self.widget_timeout,
      ..CheckoutSettings::default()
    }
  }
}

fn parse_secs(name: &str, raw: Option<String>, default_secs: u64) -> Result<Duration> {
  match raw {
    None => Ok(Duration::from_secs(default_secs)),
    Some(value) => value
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, value, e))),
  }
}
