// paydesk/src/domain/session.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the verification endpoint returns for a verified payment.
pub const VERIFIED_MARKER: &str = "Payment verified successfully!";

/// One checkout attempt's session, as created by the payment backend.
///
/// The amount here is what gets charged; the client-side order total is only
/// a hint when asking for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
  /// Third-party order identifier the widget is opened against.
  pub session_id: String,
  /// Minor currency units.
  pub amount_minor: u64,
  pub currency: String,
  /// Public key the widget is constructed with.
  pub widget_key: String,
}

/// What the widget's success callback handed back, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
  pub provider_order_id: String,
  pub payment_id: String,
  pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationVerdict {
  Verified,
  Rejected { reason: String },
}

impl VerificationVerdict {
  /// Reads a verification response body.
  ///
  /// Verified: the exact marker string (bare or JSON-quoted), `{"verified": true}`
  /// or `{"status": "success"}`. Everything else is a rejection carrying the body.
  pub fn from_response_body(body: &str) -> Self {
    let trimmed = body.trim();
    if trimmed == VERIFIED_MARKER {
      return VerificationVerdict::Verified;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
      let verified_flag = value.get("verified").and_then(Value::as_bool) == Some(true);
      let success_status = value
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("success"));
      if verified_flag || success_status || value.as_str() == Some(VERIFIED_MARKER) {
        return VerificationVerdict::Verified;
      }
    }
    let reason = if trimmed.is_empty() {
      "empty verification response".to_string()
    } else {
      trimmed.to_string()
    };
    VerificationVerdict::Rejected { reason }
  }

  pub fn is_verified(&self) -> bool {
    matches!(self, VerificationVerdict::Verified)
  }
}
