// paydesk/src/checkout/error.rs

use crate::domain::{BillingError, OrderId, OrderStatus};
use crate::error::FlowError;
use crate::ports::OrderLoadError;
use crate::script_loader::ScriptLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("order {0} not found")]
  NotFound(OrderId),

  #[error("order {0} belongs to another user")]
  Forbidden(OrderId),

  #[error("order service unreachable: {0}")]
  Unreachable(String),

  #[error("billing validation failed: {0}")]
  Validation(#[from] BillingError),

  #[error("order is {0} and cannot be paid")]
  OrderNotPayable(OrderStatus),

  #[error("order details are not loaded")]
  OrderNotLoaded,

  #[error("a payment attempt is already in flight")]
  PaymentInFlight,

  #[error("payment session creation failed: {0}")]
  SessionCreationFailed(String),

  #[error(transparent)]
  ScriptLoadFailed(#[from] ScriptLoadError),

  #[error("payment widget reported failure: {reason}")]
  WidgetFailed { reason: String },

  /// Funds may have moved; the payment id must reach the user.
  #[error("payment {payment_id} failed verification: {reason}")]
  VerificationFailed { payment_id: String, reason: String },

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },
}

impl CheckoutError {
  pub(crate) fn from_load(order_id: OrderId, err: OrderLoadError) -> Self {
    match err {
      OrderLoadError::NotFound => CheckoutError::NotFound(order_id),
      OrderLoadError::Forbidden => CheckoutError::Forbidden(order_id),
      OrderLoadError::Unreachable(detail) => CheckoutError::Unreachable(detail),
    }
  }

  /// Plain-language text shown to the shopper.
  pub fn user_message(&self) -> String {
    match self {
      CheckoutError::NotFound(_) => "Order not found.".to_string(),
      CheckoutError::Forbidden(_) => "You do not have access to this order.".to_string(),
      CheckoutError::Unreachable(_) => "Could not load order details. Please try again later.".to_string(),
      CheckoutError::Validation(e) => e.user_message(),
      CheckoutError::OrderNotPayable(status) => format!("This order is {} and cannot be paid.", status),
      CheckoutError::OrderNotLoaded => "Order details are still loading.".to_string(),
      CheckoutError::PaymentInFlight => "A payment is already in progress.".to_string(),
      CheckoutError::SessionCreationFailed(_) => "Failed to initiate payment. Please try again.".to_string(),
      CheckoutError::ScriptLoadFailed(_) => "Could not load the payment window. Please try again.".to_string(),
      CheckoutError::WidgetFailed { reason } => format!("Payment failed: {}", reason),
      CheckoutError::VerificationFailed { payment_id, .. } => format!(
        "Payment verification failed. If you were charged, contact support with payment ID {}.",
        payment_id
      ),
      CheckoutError::Workflow { .. } => "Something went wrong while processing your payment.".to_string(),
    }
  }

  /// Failures raised after a session was requested. These move the view
  /// through `Failed` back to `ReadyToPay`.
  pub fn is_payment_stage(&self) -> bool {
    matches!(
      self,
      CheckoutError::SessionCreationFailed(_)
        | CheckoutError::ScriptLoadFailed(_)
        | CheckoutError::WidgetFailed { .. }
        | CheckoutError::VerificationFailed { .. }
        | CheckoutError::Workflow { .. }
    )
  }

  /// The opaque payment id to quote to support, when money may have moved.
  pub fn payment_id(&self) -> Option<&str> {
    match self {
      CheckoutError::VerificationFailed { payment_id, .. } => Some(payment_id),
      _ => None,
    }
  }
}
