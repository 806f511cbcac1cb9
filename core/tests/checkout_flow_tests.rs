// tests/checkout_flow_tests.rs
mod common;

use common::*;
use parking_lot::Mutex;
use paydesk::domain::{BillingField, OrderStatus, WidgetOutcome};
use paydesk::checkout::build_attempt_pipeline;
use paydesk::ports::OrderLoadError;
use paydesk::{CheckoutError, CheckoutPhase, CheckoutSettings, CheckoutView, PayOutcome, Route};
use rust_decimal_macros::dec;
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

async fn loaded_view(harness: &Harness) -> CheckoutView {
  let view = CheckoutView::new(harness.services.clone(), ORDER_ID, USER_ID);
  view.load().await.unwrap();
  view
}

#[test]
fn attempt_pipeline_runs_the_checkout_steps_in_order() {
  assert_eq!(
    build_attempt_pipeline().step_names(),
    vec![
      "guard_status",
      "validate_billing",
      "create_session",
      "load_widget_script",
      "open_widget",
      "reconcile_outcome",
    ]
  );
}

#[tokio::test]
async fn successful_payment_is_verified_and_redirects_to_orders() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::new(vec![success("pay_abc123")]));
  let view = loaded_view(&harness).await;
  assert_eq!(view.pay_action().label, "Pay $120.97");
  assert!(view.pay_action().enabled);

  view.set_billing(filled_billing());
  let outcome = view.pay().await.unwrap();
  assert_eq!(outcome, PayOutcome::Paid);

  let requests = harness.gateway.verify_requests.lock().clone();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].provider_order_id, "order_rzp_1");
  assert_eq!(requests[0].payment_id, "pay_abc123");
  assert_eq!(requests[0].signature, "sig_pay_abc123");

  let configs = harness.widget.configs.lock().clone();
  assert_eq!(configs[0].amount_minor, 12097);
  assert_eq!(configs[0].currency, "INR");
  assert_eq!(configs[0].key, "rzp_test_key");
  assert_eq!(configs[0].description, "Order #42");
  assert_eq!(configs[0].prefill.name, "Asha Rao");
  assert_eq!(configs[0].prefill.contact, "9999999999");

  let state = view.snapshot();
  assert_eq!(
    state.history,
    vec![
      CheckoutPhase::Loading,
      CheckoutPhase::ReadyToPay,
      CheckoutPhase::AwaitingWidget,
      CheckoutPhase::WidgetOpen,
      CheckoutPhase::Verifying,
      CheckoutPhase::Paid,
    ]
  );
  assert_eq!(state.times_entered(CheckoutPhase::Paid), 1);
  assert_eq!(state.notice.as_deref(), Some("Payment successful!"));
  assert_eq!(state.redirect, Some(Route::Orders));
  assert_eq!(state.error, None);
  assert_eq!(state.order.map(|o| o.status), Some(OrderStatus::Paid));
  assert_eq!(view.pay_action().label, "Order PAID");
  assert!(!view.pay_action().enabled);
  assert!(!view.is_payment_in_flight());
}

#[tokio::test]
async fn paid_order_refuses_another_attempt() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::new(vec![success("pay_1"), success("pay_2")]));
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());
  view.pay().await.unwrap();

  let err = view.pay().await.unwrap_err();
  assert!(matches!(err, CheckoutError::OrderNotPayable(OrderStatus::Paid)));
  assert_eq!(harness.gateway.session_ids(), vec!["order_rzp_1"]);
  assert_eq!(view.snapshot().times_entered(CheckoutPhase::Paid), 1);
}

#[tokio::test]
async fn non_pending_order_is_not_payable() {
  setup_tracing();
  let harness = Harness::new(
    FakeOrders::returning(Ok(order_with(OrderStatus::Shipped, dec!(49.50)))),
    FakeGateway::new(4950),
    FakeScripts::default(),
    ScriptedWidget::new(vec![success("pay_never")]),
  );
  let view = loaded_view(&harness).await;
  assert_eq!(view.phase(), CheckoutPhase::NotPayable);
  let action = view.pay_action();
  assert_eq!(action.label, "Order SHIPPED");
  assert!(!action.enabled);

  view.set_billing(filled_billing());
  let err = view.pay().await.unwrap_err();
  assert!(matches!(err, CheckoutError::OrderNotPayable(OrderStatus::Shipped)));
  assert_eq!(
    view.snapshot().error.as_deref(),
    Some("This order is SHIPPED and cannot be paid.")
  );
  assert!(harness.gateway.session_ids().is_empty());
  assert_eq!(harness.widget.opens(), 0);
  assert_eq!(harness.fetches(), 0);
}

#[tokio::test]
async fn incomplete_billing_blocks_before_any_network_call() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::new(vec![success("pay_never")]));
  let view = loaded_view(&harness).await;
  view.update_billing(|b| {
    b.name = "Asha Rao".to_string();
    b.email = "asha@example.com".to_string();
  });

  match view.pay().await {
    Err(CheckoutError::Validation(e)) => {
      assert_eq!(
        e.missing,
        vec![BillingField::Phone, BillingField::Address, BillingField::City, BillingField::Zip]
      );
      assert!(!e.invalid_email);
    }
    other => panic!("expected a validation error, got {:?}", other),
  }
  let state = view.snapshot();
  assert_eq!(state.error.as_deref(), Some("Please fill in: Phone, Address, City, ZIP Code."));
  assert_eq!(state.phase, CheckoutPhase::ReadyToPay);
  assert_eq!(state.times_entered(CheckoutPhase::AwaitingWidget), 0);
  assert!(harness.gateway.session_ids().is_empty());
  assert_eq!(harness.fetches(), 0);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::default());
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());
  view.update_billing(|b| b.email = "asha@example".to_string());

  let err = view.pay().await.unwrap_err();
  assert_eq!(err.user_message(), "Please enter a valid email address.");
  assert!(harness.gateway.session_ids().is_empty());
}

#[tokio::test]
async fn failed_verification_surfaces_payment_id_and_next_attempt_uses_a_new_session() {
  setup_tracing();
  let gateway = FakeGateway::new(12097).with_verdicts(vec![
    paydesk::domain::VerificationVerdict::Rejected {
      reason: "signature mismatch".to_string(),
    },
    paydesk::domain::VerificationVerdict::Verified,
  ]);
  let harness = Harness::new(
    FakeOrders::returning(Ok(pending_order())),
    gateway,
    FakeScripts::default(),
    ScriptedWidget::new(vec![success("pay_first"), success("pay_second")]),
  );
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  let err = view.pay().await.unwrap_err();
  assert_eq!(err.payment_id(), Some("pay_first"));
  let state = view.snapshot();
  assert!(state.error.as_deref().unwrap().contains("pay_first"));
  assert_eq!(state.phase, CheckoutPhase::ReadyToPay);
  assert_eq!(state.times_entered(CheckoutPhase::Failed), 1);
  assert_eq!(state.times_entered(CheckoutPhase::Paid), 0);
  assert!(view.pay_action().enabled);
  assert!(!view.is_payment_in_flight());

  assert_eq!(view.pay().await.unwrap(), PayOutcome::Paid);
  assert_eq!(harness.gateway.session_ids(), vec!["order_rzp_1", "order_rzp_2"]);
  let requests = harness.gateway.verify_requests.lock().clone();
  assert_eq!(requests[1].provider_order_id, "order_rzp_2");
  assert_eq!(requests[1].payment_id, "pay_second");
  assert_eq!(view.snapshot().error, None);
  // The script is fetched once across both attempts.
  assert_eq!(harness.fetches(), 1);
}

#[tokio::test]
async fn dismissing_the_widget_is_not_an_error() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::new(vec![WidgetOutcome::Dismissed]));
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  assert_eq!(view.pay().await.unwrap(), PayOutcome::Cancelled);
  let state = view.snapshot();
  assert_eq!(state.error, None);
  assert_eq!(state.phase, CheckoutPhase::ReadyToPay);
  assert_eq!(state.billing, filled_billing());
  assert_eq!(state.times_entered(CheckoutPhase::Failed), 0);
  assert!(harness.gateway.verify_requests.lock().is_empty());
  assert!(view.pay_action().enabled);
}

#[tokio::test]
async fn widget_failure_shows_reason_and_allows_retry() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::new(vec![
    WidgetOutcome::Failure {
      reason: "card declined".to_string(),
    },
    WidgetOutcome::Failure { reason: "  ".to_string() },
  ]));
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  let err = view.pay().await.unwrap_err();
  assert!(matches!(err, CheckoutError::WidgetFailed { .. }));
  assert_eq!(view.snapshot().error.as_deref(), Some("Payment failed: card declined"));
  assert_eq!(view.phase(), CheckoutPhase::ReadyToPay);

  view.pay().await.unwrap_err();
  assert_eq!(
    view.snapshot().error.as_deref(),
    Some("Payment failed: the payment was declined")
  );
  assert!(harness.gateway.verify_requests.lock().is_empty());
  assert_eq!(view.snapshot().times_entered(CheckoutPhase::Failed), 2);
}

#[tokio::test]
async fn session_creation_failure_never_opens_the_widget() {
  setup_tracing();
  let gateway = FakeGateway::new(12097);
  *gateway.session_failure.lock() = Some("backend returned 500".to_string());
  let harness = Harness::new(
    FakeOrders::returning(Ok(pending_order())),
    gateway,
    FakeScripts::default(),
    ScriptedWidget::new(vec![success("pay_never")]),
  );
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  match view.pay().await {
    Err(CheckoutError::SessionCreationFailed(detail)) => assert!(detail.contains("backend returned 500")),
    other => panic!("expected a session failure, got {:?}", other),
  }
  let state = view.snapshot();
  assert_eq!(state.error.as_deref(), Some("Failed to initiate payment. Please try again."));
  assert_eq!(state.phase, CheckoutPhase::ReadyToPay);
  assert_eq!(state.times_entered(CheckoutPhase::Failed), 1);
  assert_eq!(harness.widget.opens(), 0);
  assert_eq!(harness.fetches(), 0);
}

#[tokio::test]
async fn script_load_failure_is_retried_on_next_attempt() {
  setup_tracing();
  let harness = Harness::new(
    FakeOrders::returning(Ok(pending_order())),
    FakeGateway::new(12097),
    FakeScripts::failing_first(1),
    ScriptedWidget::new(vec![success("pay_retry")]),
  );
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  let err = view.pay().await.unwrap_err();
  assert!(matches!(err, CheckoutError::ScriptLoadFailed(_)));
  assert_eq!(
    view.snapshot().error.as_deref(),
    Some("Could not load the payment window. Please try again.")
  );
  assert_eq!(harness.widget.opens(), 0);

  assert_eq!(view.pay().await.unwrap(), PayOutcome::Paid);
  assert_eq!(harness.fetches(), 2);
  assert!(harness.services.scripts.is_loaded(&harness.services.settings.widget_script.id));
}

#[tokio::test]
async fn load_failures_map_to_user_messages() {
  setup_tracing();
  let cases = [
    (OrderLoadError::NotFound, "Order not found."),
    (OrderLoadError::Forbidden, "You do not have access to this order."),
    (
      OrderLoadError::Unreachable("connection refused".to_string()),
      "Could not load order details. Please try again later.",
    ),
  ];
  for (load_err, message) in cases {
    let harness = Harness::new(
      FakeOrders::returning(Err(load_err)),
      FakeGateway::new(12097),
      FakeScripts::default(),
      ScriptedWidget::default(),
    );
    let view = CheckoutView::new(harness.services.clone(), ORDER_ID, USER_ID);
    assert_eq!(view.pay_action().label, "Loading…");

    let err = view.load().await.unwrap_err();
    assert_eq!(err.user_message(), message);
    let state = view.snapshot();
    assert_eq!(state.phase, CheckoutPhase::Error);
    assert_eq!(state.error.as_deref(), Some(message));
    assert!(state.order.is_none());
    assert_eq!(view.pay_action().label, "Unavailable");

    view.set_billing(filled_billing());
    assert!(matches!(view.pay().await, Err(CheckoutError::OrderNotLoaded)));
    assert!(harness.gateway.session_ids().is_empty());
  }
}

#[tokio::test]
#[serial]
async fn second_pay_while_in_flight_is_refused() {
  setup_tracing();
  let gate = Arc::new(Notify::new());
  let widget = ScriptedWidget {
    outcomes: Mutex::new(vec![success("pay_once")].into()),
    gate: Some(gate.clone()),
    ..Default::default()
  };
  let harness = Harness::standard(widget);
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  let (first, second) = tokio::join!(view.pay(), async {
    while harness.widget.opens() == 0 {
      tokio::task::yield_now().await;
    }
    assert!(view.is_payment_in_flight());
    assert_eq!(view.phase(), CheckoutPhase::WidgetOpen);
    assert_eq!(view.pay_action().label, "Processing…");
    assert!(!view.pay_action().enabled);
    assert!(matches!(view.back_to_cart(), Err(CheckoutError::PaymentInFlight)));
    assert!(matches!(view.refresh().await, Err(CheckoutError::PaymentInFlight)));
    let second = view.pay().await;
    gate.notify_one();
    second
  });

  assert_eq!(first.unwrap(), PayOutcome::Paid);
  assert!(matches!(second, Err(CheckoutError::PaymentInFlight)));
  assert_eq!(harness.gateway.session_ids(), vec!["order_rzp_1"]);
  assert_eq!(harness.widget.opens(), 1);
  assert_eq!(view.snapshot().times_entered(CheckoutPhase::Paid), 1);
  assert!(!view.is_payment_in_flight());
}

#[tokio::test]
#[serial]
async fn slow_verification_times_out_with_payment_id() {
  setup_tracing();
  let mut gateway = FakeGateway::new(12097);
  gateway.verify_delay = Some(Duration::from_secs(5));
  let settings = CheckoutSettings {
    verification_timeout: Duration::from_millis(50),
    ..Default::default()
  };
  let harness = Harness::with_settings(
    FakeOrders::returning(Ok(pending_order())),
    gateway,
    FakeScripts::default(),
    ScriptedWidget::new(vec![success("pay_slow")]),
    settings,
  );
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  match view.pay().await {
    Err(CheckoutError::VerificationFailed { payment_id, reason }) => {
      assert_eq!(payment_id, "pay_slow");
      assert!(reason.contains("did not complete within"));
    }
    other => panic!("expected a verification failure, got {:?}", other),
  }
  assert_eq!(view.phase(), CheckoutPhase::ReadyToPay);
  assert!(view.snapshot().error.unwrap().contains("pay_slow"));
}

#[tokio::test]
#[serial]
async fn widget_that_never_reports_back_times_out() {
  setup_tracing();
  let widget = ScriptedWidget {
    gate: Some(Arc::new(Notify::new())),
    ..Default::default()
  };
  let settings = CheckoutSettings {
    widget_timeout: Some(Duration::from_millis(50)),
    ..Default::default()
  };
  let harness = Harness::with_settings(
    FakeOrders::returning(Ok(pending_order())),
    FakeGateway::new(12097),
    FakeScripts::default(),
    widget,
    settings,
  );
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  match view.pay().await {
    Err(CheckoutError::WidgetFailed { reason }) => assert_eq!(reason, "the payment window timed out"),
    other => panic!("expected a widget failure, got {:?}", other),
  }
  assert!(!view.is_payment_in_flight());
  assert!(view.pay_action().enabled);
}

#[tokio::test]
async fn refresh_picks_up_status_changes_and_keeps_order_on_failure() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::default());
  let view = loaded_view(&harness).await;
  assert_eq!(view.phase(), CheckoutPhase::ReadyToPay);

  harness.orders.then(Err(OrderLoadError::Unreachable("timeout".to_string())));
  assert!(matches!(view.refresh().await, Err(CheckoutError::Unreachable(_))));
  let state = view.snapshot();
  assert_eq!(state.phase, CheckoutPhase::ReadyToPay);
  assert!(state.order.is_some());
  assert_eq!(
    state.error.as_deref(),
    Some("Could not load order details. Please try again later.")
  );

  harness.orders.then(Ok(order_with(OrderStatus::Cancelled, dec!(120.97))));
  view.refresh().await.unwrap();
  assert_eq!(view.phase(), CheckoutPhase::NotPayable);
  assert_eq!(view.pay_action().label, "Order CANCELLED");
  assert_eq!(harness.orders.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_load_is_terminal_for_the_view() {
  setup_tracing();
  let orders = FakeOrders::returning(Ok(pending_order()));
  orders.then(Err(OrderLoadError::NotFound));
  let harness = Harness::new(orders, FakeGateway::new(12097), FakeScripts::default(), ScriptedWidget::default());
  let view = CheckoutView::new(harness.services.clone(), ORDER_ID, USER_ID);

  assert!(matches!(view.load().await, Err(CheckoutError::NotFound(_))));
  assert_eq!(view.phase(), CheckoutPhase::Error);
  assert_eq!(harness.orders.calls.load(Ordering::SeqCst), 1);

  assert!(matches!(view.refresh().await, Err(CheckoutError::NotFound(_))));
  assert!(matches!(view.load().await, Err(CheckoutError::NotFound(_))));
  assert_eq!(harness.orders.calls.load(Ordering::SeqCst), 1);
  let state = view.snapshot();
  assert_eq!(state.phase, CheckoutPhase::Error);
  assert!(state.order.is_none());
  assert_eq!(view.pay_action().label, "Unavailable");
  assert!(!view.pay_action().enabled);
}

#[tokio::test]
#[serial]
async fn abandoned_pay_returns_the_view_to_the_pay_form() {
  setup_tracing();
  let widget = ScriptedWidget {
    gate: Some(Arc::new(Notify::new())),
    ..Default::default()
  };
  let harness = Harness::standard(widget);
  let view = loaded_view(&harness).await;
  view.set_billing(filled_billing());

  let abandoned = tokio::time::timeout(Duration::from_millis(50), view.pay()).await;
  assert!(abandoned.is_err());
  assert_eq!(harness.widget.opens(), 1);

  assert!(!view.is_payment_in_flight());
  let state = view.snapshot();
  assert_eq!(state.phase, CheckoutPhase::ReadyToPay);
  assert_eq!(
    state.history[state.history.len() - 2..],
    [CheckoutPhase::WidgetOpen, CheckoutPhase::ReadyToPay]
  );
  let action = view.pay_action();
  assert_eq!(action.label, "Pay $120.97");
  assert!(action.enabled);
  view.back_to_cart().unwrap();
}

#[tokio::test]
async fn created_order_is_shown_but_not_payable() {
  setup_tracing();
  let harness = Harness::new(
    FakeOrders::returning(Ok(order_with(OrderStatus::Created, dec!(120.97)))),
    FakeGateway::new(12097),
    FakeScripts::default(),
    ScriptedWidget::new(vec![success("pay_never")]),
  );
  let view = loaded_view(&harness).await;
  assert_eq!(view.phase(), CheckoutPhase::NotPayable);
  assert_eq!(view.snapshot().error, None);
  let action = view.pay_action();
  assert_eq!(action.label, "Order CREATED");
  assert!(!action.enabled);

  view.set_billing(filled_billing());
  let err = view.pay().await.unwrap_err();
  assert!(matches!(err, CheckoutError::OrderNotPayable(OrderStatus::Created)));
  assert!(harness.gateway.session_ids().is_empty());
  assert_eq!(harness.widget.opens(), 0);
}

#[tokio::test]
async fn back_to_cart_redirects_when_idle() {
  setup_tracing();
  let harness = Harness::standard(ScriptedWidget::default());
  let view = loaded_view(&harness).await;

  view.back_to_cart().unwrap();
  assert_eq!(view.snapshot().redirect, Some(Route::Cart));
  assert_eq!(Route::Cart.path(), "/cart");
}
