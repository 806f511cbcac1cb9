// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use paydesk::checkout::{CheckoutServices, CheckoutSettings};
use paydesk::domain::{
  BillingDetails, Order, OrderId, OrderItem, OrderStatus, PaymentSession, ProductRef, UserId, VerificationRequest,
  VerificationVerdict, WidgetConfig, WidgetOutcome, WidgetScript,
};
use paydesk::flow::{ContextData, Handler, PipelineControl};
use paydesk::ports::{OrderLoadError, OrderService, PaymentGateway, PaymentWidget, ScriptSource};
use paydesk::{FlowError, ScriptLoader};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::Level;

// --- Tracing ---

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Pipeline engine fixtures ---

/// Data threaded through the engine tests: which steps ran and a running amount.
#[derive(Clone, Debug, Default)]
pub struct AttemptLog {
  pub amount_minor: u64,
  pub visited: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LogError {
  #[error("engine error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for LogError {
  fn from(err: FlowError) -> Self {
    LogError::Flow(format!("{:?}", err))
  }
}

/// Records the step, adds `add_minor` to the amount, and stops if asked to.
pub fn recording_handler(step_name: &'static str, add_minor: u64) -> Handler<AttemptLog, LogError> {
  Box::new(move |ctx: ContextData<AttemptLog>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.amount_minor += add_minor;
      guard.visited.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> Handler<AttemptLog, LogError> {
  Box::new(move |ctx: ContextData<AttemptLog>| {
    Box::pin(async move {
      ctx.write().visited.push(step_name.to_string());
      Err(LogError::Step(message.to_string()))
    })
  })
}

// --- Checkout fixtures ---

pub const ORDER_ID: OrderId = OrderId(42);
pub const USER_ID: UserId = UserId(7);

pub fn order_with(status: OrderStatus, total: Decimal) -> Order {
  Order {
    id: ORDER_ID,
    user_id: Some(USER_ID),
    status,
    total_price: total,
    order_items: vec![OrderItem {
      id: Some(1),
      product: ProductRef {
        id: 9,
        name: "Wireless Headphones".to_string(),
      },
      quantity: 1,
      price: total,
    }],
  }
}

pub fn pending_order() -> Order {
  order_with(OrderStatus::Pending, dec!(120.97))
}

pub fn filled_billing() -> BillingDetails {
  BillingDetails {
    name: "Asha Rao".to_string(),
    email: "asha@example.com".to_string(),
    phone: "9999999999".to_string(),
    address: "12 Park Street".to_string(),
    city: "Pune".to_string(),
    zip: "411001".to_string(),
  }
}

pub struct FakeOrders {
  pub responses: Mutex<VecDeque<Result<Order, OrderLoadError>>>,
  pub fallback: Mutex<Result<Order, OrderLoadError>>,
  pub calls: AtomicUsize,
}

impl FakeOrders {
  pub fn returning(result: Result<Order, OrderLoadError>) -> Arc<Self> {
    Arc::new(Self {
      responses: Mutex::new(VecDeque::new()),
      fallback: Mutex::new(result),
      calls: AtomicUsize::new(0),
    })
  }

  /// Queues a one-off response ahead of the fallback.
  pub fn then(&self, result: Result<Order, OrderLoadError>) {
    self.responses.lock().push_back(result);
  }
}

#[async_trait]
impl OrderService for FakeOrders {
  async fn fetch_order(&self, _order_id: OrderId, _user_id: UserId) -> Result<Order, OrderLoadError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let queued = self.responses.lock().pop_front();
    queued.unwrap_or_else(|| self.fallback.lock().clone())
  }
}

pub struct FakeGateway {
  pub sessions: Mutex<Vec<PaymentSession>>,
  pub session_failure: Mutex<Option<String>>,
  pub amount_minor: u64,
  pub verdicts: Mutex<VecDeque<anyhow::Result<VerificationVerdict>>>,
  pub verify_requests: Mutex<Vec<VerificationRequest>>,
  pub verify_delay: Option<Duration>,
}

impl FakeGateway {
  pub fn new(amount_minor: u64) -> Self {
    Self {
      sessions: Mutex::new(Vec::new()),
      session_failure: Mutex::new(None),
      amount_minor,
      verdicts: Mutex::new(VecDeque::new()),
      verify_requests: Mutex::new(Vec::new()),
      verify_delay: None,
    }
  }

  pub fn with_verdicts(self, verdicts: Vec<VerificationVerdict>) -> Self {
    *self.verdicts.lock() = verdicts.into_iter().map(Ok).collect();
    self
  }

  pub fn session_ids(&self) -> Vec<String> {
    self.sessions.lock().iter().map(|s| s.session_id.clone()).collect()
  }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
  async fn create_session(&self, _order_id: OrderId, _amount_hint: Decimal) -> anyhow::Result<PaymentSession> {
    if let Some(reason) = self.session_failure.lock().clone() {
      anyhow::bail!(reason);
    }
    let mut sessions = self.sessions.lock();
    let session = PaymentSession {
      session_id: format!("order_rzp_{}", sessions.len() + 1),
      amount_minor: self.amount_minor,
      currency: "INR".to_string(),
      widget_key: "rzp_test_key".to_string(),
    };
    sessions.push(session.clone());
    Ok(session)
  }

  async fn verify(&self, request: &VerificationRequest) -> anyhow::Result<VerificationVerdict> {
    self.verify_requests.lock().push(request.clone());
    if let Some(delay) = self.verify_delay {
      tokio::time::sleep(delay).await;
    }
    let next = self.verdicts.lock().pop_front();
    next.unwrap_or(Ok(VerificationVerdict::Verified))
  }
}

#[derive(Default)]
pub struct FakeScripts {
  pub fetches: AtomicUsize,
  pub failures_left: AtomicUsize,
  pub delay: Option<Duration>,
}

impl FakeScripts {
  pub fn failing_first(failures: usize) -> Self {
    Self {
      failures_left: AtomicUsize::new(failures),
      ..Default::default()
    }
  }
}

#[async_trait]
impl ScriptSource for FakeScripts {
  async fn fetch(&self, _script: &WidgetScript) -> anyhow::Result<()> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    let left = self.failures_left.load(Ordering::SeqCst);
    if left > 0 {
      self.failures_left.store(left - 1, Ordering::SeqCst);
      anyhow::bail!("connection reset");
    }
    Ok(())
  }
}

/// Plays back queued outcomes. With a gate set, each open waits for a permit first.
#[derive(Default)]
pub struct ScriptedWidget {
  pub outcomes: Mutex<VecDeque<WidgetOutcome>>,
  pub configs: Mutex<Vec<WidgetConfig>>,
  pub gate: Option<Arc<Notify>>,
}

impl ScriptedWidget {
  pub fn new(outcomes: Vec<WidgetOutcome>) -> Self {
    Self {
      outcomes: Mutex::new(outcomes.into()),
      ..Default::default()
    }
  }

  pub fn opens(&self) -> usize {
    self.configs.lock().len()
  }
}

/// The success callback for whatever session the widget was opened with.
pub fn success(payment_id: &str) -> WidgetOutcome {
  WidgetOutcome::Success {
    payment_id: payment_id.to_string(),
    provider_order_id: String::new(),
    signature: format!("sig_{}", payment_id),
  }
}

#[async_trait]
impl PaymentWidget for ScriptedWidget {
  async fn open(&self, config: WidgetConfig) -> WidgetOutcome {
    self.configs.lock().push(config.clone());
    if let Some(gate) = &self.gate {
      gate.notified().await;
    }
    let next = self.outcomes.lock().pop_front();
    match next {
      Some(WidgetOutcome::Success {
        payment_id,
        provider_order_id,
        signature,
      }) if provider_order_id.is_empty() => WidgetOutcome::Success {
        payment_id,
        provider_order_id: config.provider_order_id,
        signature,
      },
      Some(outcome) => outcome,
      None => WidgetOutcome::Dismissed,
    }
  }
}

pub struct Harness {
  pub orders: Arc<FakeOrders>,
  pub gateway: Arc<FakeGateway>,
  pub scripts: Arc<FakeScripts>,
  pub widget: Arc<ScriptedWidget>,
  pub services: CheckoutServices,
}

impl Harness {
  pub fn new(orders: Arc<FakeOrders>, gateway: FakeGateway, scripts: FakeScripts, widget: ScriptedWidget) -> Self {
    Self::with_settings(orders, gateway, scripts, widget, CheckoutSettings::default())
  }

  pub fn with_settings(
    orders: Arc<FakeOrders>,
    gateway: FakeGateway,
    scripts: FakeScripts,
    widget: ScriptedWidget,
    settings: CheckoutSettings,
  ) -> Self {
    let gateway = Arc::new(gateway);
    let scripts = Arc::new(scripts);
    let widget = Arc::new(widget);
    let services = CheckoutServices {
      orders: orders.clone(),
      gateway: gateway.clone(),
      widget: widget.clone(),
      scripts: Arc::new(ScriptLoader::new(scripts.clone())),
      settings: Arc::new(settings),
    };
    Self {
      orders,
      gateway,
      scripts,
      widget,
      services,
    }
  }

  /// Pending order 42 for 120.97, session amount 12097.
  pub fn standard(widget: ScriptedWidget) -> Self {
    Self::new(
      FakeOrders::returning(Ok(pending_order())),
      FakeGateway::new(12097),
      FakeScripts::default(),
      widget,
    )
  }

  pub fn fetches(&self) -> usize {
    self.scripts.fetches.load(Ordering::SeqCst)
  }
}
