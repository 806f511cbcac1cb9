// paydesk/src/checkout/phase.rs

//! What the checkout view shows: its phase, the pay button, where it navigates.

use crate::domain::{BillingDetails, Order, OrderId, PaymentSession, UserId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
  /// Fetching the order.
  Loading,
  /// The order could not be loaded. Terminal for the view.
  Error,
  /// Pending order, billing form editable.
  ReadyToPay,
  /// Loaded, but the order has left PENDING.
  NotPayable,
  /// Session requested, widget script loading.
  AwaitingWidget,
  WidgetOpen,
  /// Signed confirmation received, server verification in flight.
  Verifying,
  Paid,
  /// An attempt failed; the view goes back to `ReadyToPay` right after.
  Failed,
}

impl CheckoutPhase {
  pub fn is_in_flight(&self) -> bool {
    matches!(
      self,
      CheckoutPhase::AwaitingWidget | CheckoutPhase::WidgetOpen | CheckoutPhase::Verifying | CheckoutPhase::Failed
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Orders,
  Cart,
}

impl Route {
  pub fn path(&self) -> &'static str {
    match self {
      Route::Orders => "/orders",
      Route::Cart => "/cart",
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.path())
  }
}

/// The primary action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayAction {
  pub label: String,
  pub enabled: bool,
}

impl PayAction {
  pub(crate) fn disabled(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      enabled: false,
    }
  }
}

/// Most phases kept in `ViewState::history`.
pub const HISTORY_LIMIT: usize = 256;

/// Everything the checkout view renders. Shared between the view and the
/// attempt pipeline, which moves it between phases.
#[derive(Debug, Clone)]
pub struct ViewState {
  pub order_id: OrderId,
  pub user_id: UserId,
  pub phase: CheckoutPhase,
  pub order: Option<Order>,
  pub billing: BillingDetails,
  /// Latest surfaced error, cleared when an attempt starts.
  pub error: Option<String>,
  pub notice: Option<String>,
  pub redirect: Option<Route>,
  /// Session of the latest attempt, if it got that far.
  pub last_session: Option<PaymentSession>,
  /// Phases entered, oldest first. Keeps the last `HISTORY_LIMIT` entries.
  pub history: Vec<CheckoutPhase>,
}

impl ViewState {
  pub fn new(order_id: OrderId, user_id: UserId) -> Self {
    Self {
      order_id,
      user_id,
      phase: CheckoutPhase::Loading,
      order: None,
      billing: BillingDetails::default(),
      error: None,
      notice: None,
      redirect: None,
      last_session: None,
      history: vec![CheckoutPhase::Loading],
    }
  }

  pub fn enter(&mut self, phase: CheckoutPhase) {
    self.phase = phase;
    self.history.push(phase);
    if self.history.len() > HISTORY_LIMIT {
      let excess = self.history.len() - HISTORY_LIMIT;
      self.history.drain(..excess);
    }
  }

  /// Phase for a freshly (re)loaded order.
  pub(crate) fn settle_on_order(&mut self, order: Order) {
    let phase = if order.is_payable() {
      CheckoutPhase::ReadyToPay
    } else {
      CheckoutPhase::NotPayable
    };
    self.order = Some(order);
    if self.phase != phase {
      self.enter(phase);
    }
  }

  pub fn times_entered(&self, phase: CheckoutPhase) -> usize {
    self.history.iter().filter(|p| **p == phase).count()
  }
}
