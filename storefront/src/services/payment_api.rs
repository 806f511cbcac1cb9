// storefront/src/services/payment_api.rs

use crate::services::api_client::ApiClient;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use paydesk::domain::{OrderId, PaymentSession, VerificationRequest, VerificationVerdict};
use paydesk::ports::PaymentGateway;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Provider order as returned by `create-order`. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct ProviderOrder {
  id: String,
  amount: u64,
  currency: String,
  #[serde(default)]
  key: Option<String>,
}

/// Payment endpoints of the storefront API.
pub struct HttpPaymentGateway {
  api: Arc<ApiClient>,
  widget_key: Option<String>,
}

impl HttpPaymentGateway {
  pub fn new(api: Arc<ApiClient>, widget_key: Option<String>) -> Self {
    Self { api, widget_key }
  }
}

pub(crate) fn parse_provider_order(body: &str, fallback_key: Option<&str>) -> anyhow::Result<PaymentSession> {
  let order: ProviderOrder = serde_json::from_str(body.trim()).context("malformed create-order response")?;
  if order.id.trim().is_empty() {
    bail!("create-order response has an empty order id");
  }
  let widget_key = order
    .key
    .filter(|k| !k.trim().is_empty())
    .or_else(|| fallback_key.map(str::to_string))
    .ok_or_else(|| anyhow!("no widget key in the response and none configured (PAYMENT_WIDGET_KEY)"))?;
  Ok(PaymentSession {
    session_id: order.id,
    amount_minor: order.amount,
    currency: order.currency,
    widget_key,
  })
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
  #[instrument(name = "HttpPaymentGateway::create_session", skip_all, fields(%order_id, %amount_hint))]
  async fn create_session(&self, order_id: OrderId, amount_hint: Decimal) -> anyhow::Result<PaymentSession> {
    let path = format!("payment/create-order/{}/{}", order_id, amount_hint.round_dp(2));
    let response = self.api.post(&path).send().await.context("create-order request failed")?;
    let status = response.status();
    let body = response.text().await.context("failed to read create-order response")?;
    if !status.is_success() {
      bail!("create-order returned {}: {}", status, body.trim());
    }
    let session = parse_provider_order(&body, self.widget_key.as_deref())?;
    info!(session_id = %session.session_id, amount_minor = session.amount_minor, "Provider order created.");
    Ok(session)
  }

  #[instrument(
    name = "HttpPaymentGateway::verify",
    skip_all,
    fields(provider_order_id = %request.provider_order_id, payment_id = %request.payment_id)
  )]
  async fn verify(&self, request: &VerificationRequest) -> anyhow::Result<VerificationVerdict> {
    let response = self
      .api
      .post("payment/verify")
      .query(&[
        ("razorpayOrderId", request.provider_order_id.as_str()),
        ("paymentId", request.payment_id.as_str()),
        ("signature", request.signature.as_str()),
      ])
      .send()
      .await
      .context("verification request failed")?;
    let status = response.status();
    let body = response.text().await.context("failed to read verification response")?;

    if !status.is_success() {
      warn!(%status, "Verification endpoint returned an error status.");
      return Ok(VerificationVerdict::Rejected {
        reason: format!("verification endpoint returned {}: {}", status, body.trim()),
      });
    }
    Ok(VerificationVerdict::from_response_body(&body))
  }
}
