// paydesk/src/domain/widget.rs

use crate::domain::billing::BillingDetails;
use serde::{Deserialize, Serialize};

/// The hosted widget's script, identified by a stable id so it is fetched once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetScript {
  pub id: String,
  pub url: String,
}

/// Contact details the widget shows pre-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
  pub name: String,
  pub email: String,
  pub contact: String,
}

impl From<&BillingDetails> for Prefill {
  fn from(billing: &BillingDetails) -> Self {
    Prefill {
      name: billing.name.trim().to_string(),
      email: billing.email.trim().to_string(),
      contact: billing.phone.trim().to_string(),
    }
  }
}

/// Everything the widget is constructed with for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
  pub key: String,
  pub amount_minor: u64,
  pub currency: String,
  pub merchant_name: String,
  pub description: String,
  pub provider_order_id: String,
  pub prefill: Prefill,
  pub theme_color: String,
}

/// The single result of one widget invocation.
///
/// The widget fires exactly one of success, failure or dismissal per open;
/// modelling it as one value makes that a property of the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
  Success {
    payment_id: String,
    provider_order_id: String,
    signature: String,
  },
  Failure {
    reason: String,
  },
  Dismissed,
}
