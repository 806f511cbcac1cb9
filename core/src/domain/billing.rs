// paydesk/src/domain/billing.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static EMAIL_PATTERN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex"));

/// Billing form contents. Client-only; used to pre-fill the payment widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
  pub name: String,
  pub email: String,
  pub phone: String,
  pub address: String,
  pub city: String,
  pub zip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingField {
  Name,
  Email,
  Phone,
  Address,
  City,
  Zip,
}

impl BillingField {
  pub const ALL: [BillingField; 6] = [
    BillingField::Name,
    BillingField::Email,
    BillingField::Phone,
    BillingField::Address,
    BillingField::City,
    BillingField::Zip,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      BillingField::Name => "Full Name",
      BillingField::Email => "Email",
      BillingField::Phone => "Phone",
      BillingField::Address => "Address",
      BillingField::City => "City",
      BillingField::Zip => "ZIP Code",
    }
  }
}

impl fmt::Display for BillingField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Why a billing form cannot be submitted. Lists every offending field in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid billing details (missing: {missing:?}, invalid email: {invalid_email})")]
pub struct BillingError {
  pub missing: Vec<BillingField>,
  pub invalid_email: bool,
}

impl BillingError {
  pub fn user_message(&self) -> String {
    let mut parts = Vec::new();
    if !self.missing.is_empty() {
      let labels: Vec<&str> = self.missing.iter().map(BillingField::label).collect();
      parts.push(format!("Please fill in: {}.", labels.join(", ")));
    }
    if self.invalid_email {
      parts.push("Please enter a valid email address.".to_string());
    }
    parts.join(" ")
  }
}

impl BillingDetails {
  pub fn field(&self, field: BillingField) -> &str {
    match field {
      BillingField::Name => &self.name,
      BillingField::Email => &self.email,
      BillingField::Phone => &self.phone,
      BillingField::Address => &self.address,
      BillingField::City => &self.city,
      BillingField::Zip => &self.zip,
    }
  }

  /// Local check run before any payment request: every field present and the
  /// email shaped like `local@domain.tld`.
  pub fn validate(&self) -> Result<(), BillingError> {
    let missing: Vec<BillingField> = BillingField::ALL
      .into_iter()
      .filter(|f| self.field(*f).trim().is_empty())
      .collect();
    let email = self.email.trim();
    let invalid_email = !email.is_empty() && !EMAIL_PATTERN.is_match(email);

    if missing.is_empty() && !invalid_email {
      Ok(())
    } else {
      Err(BillingError { missing, invalid_email })
    }
  }
}
