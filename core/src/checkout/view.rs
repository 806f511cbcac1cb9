// paydesk/src/checkout/view.rs

use crate::checkout::attempt::{build_attempt_pipeline, AttemptData, CheckoutServices};
use crate::checkout::error::CheckoutError;
use crate::checkout::phase::{CheckoutPhase, PayAction, Route, ViewState};
use crate::domain::{format_amount, BillingDetails, OrderId, OrderStatus, UserId};
use crate::flow::{ContextData, Pipeline, PipelineResult};
use crate::ports::OrderLoadError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::field::Empty;
use tracing::{info, instrument, warn};

/// How a Pay click ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayOutcome {
  Paid,
  /// The shopper dismissed the widget.
  Cancelled,
}

/// Checkout for a single order.
///
/// Holds the view state and a "payment in flight" flag that is set from the
/// moment Pay is accepted until the attempt reaches a terminal outcome; a
/// second Pay in that window is refused without touching the network.
pub struct CheckoutView {
  services: CheckoutServices,
  pipeline: Arc<Pipeline<AttemptData, CheckoutError>>,
  state: ContextData<ViewState>,
  in_flight: AtomicBool,
  /// Why the order could not be loaded, once the view is in `Error`.
  load_failure: Mutex<Option<OrderLoadError>>,
}

/// Ends an attempt however `pay()` exits. If the future was dropped mid-way
/// the view is still in an attempt phase; it goes back to the pay form.
struct InFlightGuard<'a> {
  flag: &'a AtomicBool,
  state: &'a ContextData<ViewState>,
}

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    {
      let mut state = self.state.write();
      if state.phase.is_in_flight() {
        warn!(phase = ?state.phase, "Payment attempt abandoned; returning to the pay form.");
        state.enter(CheckoutPhase::ReadyToPay);
      }
    }
    self.flag.store(false, Ordering::Release);
  }
}

impl CheckoutView {
  pub fn new(services: CheckoutServices, order_id: OrderId, user_id: UserId) -> Self {
    Self::with_pipeline(services, Arc::new(build_attempt_pipeline()), order_id, user_id)
  }

  /// Same as `new`, sharing an already built attempt pipeline.
  pub fn with_pipeline(
    services: CheckoutServices,
    pipeline: Arc<Pipeline<AttemptData, CheckoutError>>,
    order_id: OrderId,
    user_id: UserId,
  ) -> Self {
    Self {
      services,
      pipeline,
      state: ContextData::new(ViewState::new(order_id, user_id)),
      in_flight: AtomicBool::new(false),
      load_failure: Mutex::new(None),
    }
  }

  /// Handle to the live view state.
  pub fn state(&self) -> ContextData<ViewState> {
    self.state.clone()
  }

  pub fn snapshot(&self) -> ViewState {
    self.state.read().clone()
  }

  pub fn phase(&self) -> CheckoutPhase {
    self.state.read().phase
  }

  pub fn is_payment_in_flight(&self) -> bool {
    self.in_flight.load(Ordering::Acquire)
  }

  pub fn set_billing(&self, billing: BillingDetails) {
    self.state.write().billing = billing;
  }

  pub fn update_billing(&self, edit: impl FnOnce(&mut BillingDetails)) {
    edit(&mut self.state.write().billing);
  }

  /// The stored load failure, if the view is in `Error`.
  fn terminal_error(&self) -> Option<CheckoutError> {
    let (phase, order_id) = {
      let state = self.state.read();
      (state.phase, state.order_id)
    };
    if phase != CheckoutPhase::Error {
      return None;
    }
    let cause = self
      .load_failure
      .lock()
      .clone()
      .unwrap_or_else(|| OrderLoadError::Unreachable("order could not be loaded".to_string()));
    Some(CheckoutError::from_load(order_id, cause))
  }

  /// Fetches the order. A failure is terminal for this view: later calls
  /// return the same error without asking the order service again.
  #[instrument(name = "CheckoutView::load", skip_all, fields(order_id = Empty, user_id = Empty))]
  pub async fn load(&self) -> Result<(), CheckoutError> {
    if let Some(err) = self.terminal_error() {
      return Err(err);
    }
    let (order_id, user_id) = {
      let mut state = self.state.write();
      if state.phase != CheckoutPhase::Loading {
        state.enter(CheckoutPhase::Loading);
      }
      (state.order_id, state.user_id)
    };
    tracing::Span::current()
      .record("order_id", order_id.0)
      .record("user_id", user_id.0);

    match self.services.orders.fetch_order(order_id, user_id).await {
      Ok(order) => {
        info!(status = %order.status, total = %order.total_price, "Order loaded.");
        let mut state = self.state.write();
        state.error = None;
        state.settle_on_order(order);
        Ok(())
      }
      Err(load_err) => {
        *self.load_failure.lock() = Some(load_err.clone());
        let err = CheckoutError::from_load(order_id, load_err);
        warn!(error = %err, "Order could not be loaded.");
        let mut state = self.state.write();
        state.order = None;
        state.error = Some(err.user_message());
        state.enter(CheckoutPhase::Error);
        Err(err)
      }
    }
  }

  /// Re-fetches an already loaded order so the status guard sees fresh data.
  /// On failure the last known order stays in place. A view in `Error` stays
  /// there.
  #[instrument(name = "CheckoutView::refresh", skip_all)]
  pub async fn refresh(&self) -> Result<(), CheckoutError> {
    if self.is_payment_in_flight() {
      return Err(CheckoutError::PaymentInFlight);
    }
    if let Some(err) = self.terminal_error() {
      return Err(err);
    }
    let (order_id, user_id, phase) = {
      let state = self.state.read();
      (state.order_id, state.user_id, state.phase)
    };
    if phase == CheckoutPhase::Loading {
      return self.load().await;
    }

    match self.services.orders.fetch_order(order_id, user_id).await {
      Ok(order) => {
        let mut state = self.state.write();
        if state.order.as_ref().map(|o| o.status) != Some(order.status) {
          info!(status = %order.status, "Order status changed since last fetch.");
        }
        state.error = None;
        state.settle_on_order(order);
        Ok(())
      }
      Err(load_err) => {
        let err = CheckoutError::from_load(order_id, load_err);
        warn!(error = %err, "Order refresh failed; keeping the last known order.");
        self.state.write().error = Some(err.user_message());
        Err(err)
      }
    }
  }

  pub fn pay_action(&self) -> PayAction {
    if self.is_payment_in_flight() {
      return PayAction::disabled("Processing…");
    }
    let state = self.state.read();
    if state.phase.is_in_flight() {
      return PayAction::disabled("Processing…");
    }
    let status_label = |status: Option<OrderStatus>| match status {
      Some(status) => format!("Order {}", status),
      None => "Unavailable".to_string(),
    };
    match state.phase {
      CheckoutPhase::Loading => PayAction::disabled("Loading…"),
      CheckoutPhase::Error => PayAction::disabled("Unavailable"),
      CheckoutPhase::ReadyToPay => match &state.order {
        Some(order) if order.is_payable() => PayAction {
          label: format!("Pay {}", format_amount(order.total_price)),
          enabled: true,
        },
        other => PayAction::disabled(status_label(other.as_ref().map(|o| o.status))),
      },
      _ => PayAction::disabled(status_label(state.order.as_ref().map(|o| o.status))),
    }
  }

  /// Runs one payment attempt against the latest order state.
  ///
  /// Every call starts from a fresh attempt and asks for a new session.
  #[instrument(name = "CheckoutView::pay", skip_all)]
  pub async fn pay(&self) -> Result<PayOutcome, CheckoutError> {
    if self
      .in_flight
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      info!("Pay ignored: an attempt is already in flight.");
      return Err(CheckoutError::PaymentInFlight);
    }
    let _in_flight = InFlightGuard {
      flag: &self.in_flight,
      state: &self.state,
    };

    let (order, billing) = {
      let mut state = self.state.write();
      info!(order_id = %state.order_id, "Pay accepted.");
      let order = match (&state.order, state.phase) {
        (Some(order), phase) if phase != CheckoutPhase::Loading && phase != CheckoutPhase::Error => order.clone(),
        _ => return Err(CheckoutError::OrderNotLoaded),
      };
      state.error = None;
      state.notice = None;
      (order, state.billing.clone())
    };

    let attempt = ContextData::new(AttemptData::new(self.services.clone(), self.state.clone(), order, billing));
    let result = self.pipeline.run(attempt).await;

    let mut state = self.state.write();
    match result {
      Ok(PipelineResult::Completed) => {
        if let Some(order) = state.order.as_mut() {
          order.status = OrderStatus::Paid;
        }
        state.enter(CheckoutPhase::Paid);
        state.notice = Some("Payment successful!".to_string());
        state.redirect = Some(Route::Orders);
        info!("Payment completed.");
        Ok(PayOutcome::Paid)
      }
      Ok(PipelineResult::Stopped) => {
        state.enter(CheckoutPhase::ReadyToPay);
        Ok(PayOutcome::Cancelled)
      }
      Err(err) => {
        if err.is_payment_stage() {
          state.enter(CheckoutPhase::Failed);
          state.enter(CheckoutPhase::ReadyToPay);
        }
        state.error = Some(err.user_message());
        Err(err)
      }
    }
  }

  /// "Back to Cart". Refused while a payment is in flight.
  pub fn back_to_cart(&self) -> Result<(), CheckoutError> {
    if self.is_payment_in_flight() {
      return Err(CheckoutError::PaymentInFlight);
    }
    self.state.write().redirect = Some(Route::Cart);
    Ok(())
  }
}
