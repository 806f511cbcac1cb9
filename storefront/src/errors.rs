// storefront/src/errors.rs

use paydesk::CheckoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("HTTP Client Error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Checkout Error: {source}")]
  Checkout {
    #[from]
    source: CheckoutError,
  },

  #[error("Terminal I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Internal Error: {0}")]
  Internal(String),
}

// Lets helpers returning anyhow::Result use `?` in command code.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<reqwest::Error>() {
      Ok(http_err) => AppError::Http(http_err),
      Err(err) => AppError::Internal(format!("{:#}", err)),
    }
  }
}

impl AppError {
  /// What the CLI prints on failure. Checkout errors carry their own wording.
  pub fn user_message(&self) -> String {
    match self {
      AppError::Checkout { source } => source.user_message(),
      other => other.to_string(),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
