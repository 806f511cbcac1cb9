// storefront/src/services/order_api.rs

use crate::services::api_client::ApiClient;
use async_trait::async_trait;
use paydesk::domain::{Order, OrderId, UserId};
use paydesk::ports::{OrderLoadError, OrderService};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// `GET {api}/orders/{id}?userId={user}`.
pub struct HttpOrderService {
  api: Arc<ApiClient>,
}

impl HttpOrderService {
  pub fn new(api: Arc<ApiClient>) -> Self {
    Self { api }
  }
}

/// Maps a non-success status onto the load error the view reports.
pub(crate) fn classify_status(status: StatusCode) -> Option<OrderLoadError> {
  match status {
    s if s.is_success() => None,
    StatusCode::NOT_FOUND => Some(OrderLoadError::NotFound),
    StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Some(OrderLoadError::Forbidden),
    other => Some(OrderLoadError::Unreachable(format!("order service returned {}", other))),
  }
}

#[async_trait]
impl OrderService for HttpOrderService {
  #[instrument(name = "HttpOrderService::fetch_order", skip_all, fields(%order_id, %user_id))]
  async fn fetch_order(&self, order_id: OrderId, user_id: UserId) -> Result<Order, OrderLoadError> {
    let response = self
      .api
      .get(&format!("orders/{}", order_id))
      .query(&[("userId", user_id.0)])
      .send()
      .await
      .map_err(|e| {
        warn!(error = %e, "Order request failed.");
        OrderLoadError::Unreachable(e.to_string())
      })?;

    let status = response.status();
    debug!(%status, "Order service responded.");
    if let Some(err) = classify_status(status) {
      return Err(err);
    }

    response
      .json::<Order>()
      .await
      .map_err(|e| OrderLoadError::Unreachable(format!("malformed order response: {}", e)))
  }
}
