// paydesk/src/ports.rs

//! Collaborators the checkout orchestrator drives. The storefront binary
//! implements them over HTTP and the terminal; tests implement them in memory.

use crate::domain::{
  Order, OrderId, PaymentSession, UserId, VerificationRequest, VerificationVerdict, WidgetConfig, WidgetOutcome,
  WidgetScript,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why an order could not be loaded. Each variant gets its own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderLoadError {
  #[error("order not found")]
  NotFound,
  #[error("order belongs to another user")]
  Forbidden,
  #[error("order service unreachable: {0}")]
  Unreachable(String),
}

#[async_trait]
pub trait OrderService: Send + Sync {
  async fn fetch_order(&self, order_id: OrderId, user_id: UserId) -> Result<Order, OrderLoadError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Asks the backend for a fresh session. `amount_hint` is the client's copy
  /// of the order total; the returned session's amount is authoritative.
  async fn create_session(&self, order_id: OrderId, amount_hint: Decimal) -> anyhow::Result<PaymentSession>;

  /// Server-side check of the widget's signed confirmation.
  async fn verify(&self, request: &VerificationRequest) -> anyhow::Result<VerificationVerdict>;
}

/// Fetches and installs the widget's script. Called at most once per
/// successful load by `ScriptLoader`.
#[async_trait]
pub trait ScriptSource: Send + Sync {
  async fn fetch(&self, script: &WidgetScript) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PaymentWidget: Send + Sync {
  /// Shows the widget and resolves with whichever of success, failure or
  /// dismissal happened.
  async fn open(&self, config: WidgetConfig) -> WidgetOutcome;
}
