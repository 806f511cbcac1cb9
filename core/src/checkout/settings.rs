// paydesk/src/checkout/settings.rs

use crate::domain::WidgetScript;
use std::time::Duration;

pub const DEFAULT_SCRIPT_ID: &str = "payment-widget-script";
pub const DEFAULT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

/// Knobs for the checkout flow. Loaded by the host application; the defaults
/// match the hosted widget the storefront ships with.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
  pub widget_script: WidgetScript,
  pub merchant_name: String,
  pub theme_color: String,
  /// Upper bound on the server-side verification call.
  pub verification_timeout: Duration,
  /// Upper bound on waiting for the widget to report back. `None` waits forever.
  pub widget_timeout: Option<Duration>,
}

impl Default for CheckoutSettings {
  fn default() -> Self {
    Self {
      widget_script: WidgetScript {
        id: DEFAULT_SCRIPT_ID.to_string(),
        url: DEFAULT_SCRIPT_URL.to_string(),
      },
      merchant_name: "Your Ecommerce Store".to_string(),
      theme_color: "#667eea".to_string(),
      verification_timeout: Duration::from_secs(30),
      widget_timeout: Some(Duration::from_secs(15 * 60)),
    }
  }
}
