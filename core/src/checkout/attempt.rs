// paydesk/src/checkout/attempt.rs

//! One payment attempt, run as a pipeline:
//! guard_status -> validate_billing -> create_session -> load_widget_script
//! -> open_widget -> reconcile_outcome.

use crate::checkout::error::CheckoutError;
use crate::checkout::phase::{CheckoutPhase, ViewState};
use crate::checkout::settings::CheckoutSettings;
use crate::domain::{
  BillingDetails, Order, PaymentSession, Prefill, VerificationRequest, VerificationVerdict, WidgetConfig,
  WidgetOutcome,
};
use crate::error::FlowError;
use crate::flow::{ContextData, Pipeline, PipelineControl};
use crate::ports::{OrderService, PaymentGateway, PaymentWidget};
use crate::script_loader::ScriptLoader;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const GUARD_STATUS: &str = "guard_status";
pub const VALIDATE_BILLING: &str = "validate_billing";
pub const CREATE_SESSION: &str = "create_session";
pub const LOAD_WIDGET_SCRIPT: &str = "load_widget_script";
pub const OPEN_WIDGET: &str = "open_widget";
pub const RECONCILE_OUTCOME: &str = "reconcile_outcome";

/// Collaborators shared by every view and attempt.
#[derive(Clone)]
pub struct CheckoutServices {
  pub orders: Arc<dyn OrderService>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub widget: Arc<dyn PaymentWidget>,
  pub scripts: Arc<ScriptLoader>,
  pub settings: Arc<CheckoutSettings>,
}

/// Data for a single attempt. Built fresh for every Pay, so nothing (least of
/// all a session) carries over from an earlier attempt.
pub struct AttemptData {
  pub services: CheckoutServices,
  pub view: ContextData<ViewState>,
  pub order: Order,
  pub billing: BillingDetails,
  pub session: Option<PaymentSession>,
  pub outcome: Option<WidgetOutcome>,
}

impl AttemptData {
  pub fn new(services: CheckoutServices, view: ContextData<ViewState>, order: Order, billing: BillingDetails) -> Self {
    Self {
      services,
      view,
      order,
      billing,
      session: None,
      outcome: None,
    }
  }
}

/// What to do with a widget outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
  /// Signed confirmation to check server-side before anything counts as paid.
  Verify(VerificationRequest),
  /// The shopper closed the widget. Not an error.
  Cancelled,
  Failed { reason: String },
}

/// Maps the widget's single outcome onto the next action.
pub fn reconcile(outcome: WidgetOutcome) -> Settlement {
  match outcome {
    WidgetOutcome::Success {
      payment_id,
      provider_order_id,
      signature,
    } => Settlement::Verify(VerificationRequest {
      provider_order_id,
      payment_id,
      signature,
    }),
    WidgetOutcome::Dismissed => Settlement::Cancelled,
    WidgetOutcome::Failure { reason } => {
      let reason = if reason.trim().is_empty() {
        "the payment was declined".to_string()
      } else {
        reason
      };
      Settlement::Failed { reason }
    }
  }
}

pub fn build_attempt_pipeline() -> Pipeline<AttemptData, CheckoutError> {
  let mut p = Pipeline::<AttemptData, CheckoutError>::new(&[
    (GUARD_STATUS, false, None),
    (VALIDATE_BILLING, false, None),
    (CREATE_SESSION, false, None),
    (LOAD_WIDGET_SCRIPT, false, None),
    (OPEN_WIDGET, false, None),
    (RECONCILE_OUTCOME, false, None),
  ]);

  // Both guards run before any network call.
  p.on_root(GUARD_STATUS, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let status = ctx.read().order.status;
      if !status.is_payable() {
        info!(%status, "Refusing payment for an order that is not pending.");
        return Err(CheckoutError::OrderNotPayable(status));
      }
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root(VALIDATE_BILLING, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let result = ctx.read().billing.validate();
      result?;
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  // Phase moves that bracket the network steps.
  p.before_root(CREATE_SESSION, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let view = ctx.read().view.clone();
      view.write().enter(CheckoutPhase::AwaitingWidget);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root(CREATE_SESSION, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let (gateway, order_id, amount_hint) = {
        let guard = ctx.read();
        (guard.services.gateway.clone(), guard.order.id, guard.order.total_price)
      };

      let session = match gateway.create_session(order_id, amount_hint).await {
        Ok(session) => session,
        Err(e) => {
          let detail = format!("{:#}", e);
          warn!(%order_id, error = %detail, "Payment session creation failed.");
          return Err(CheckoutError::SessionCreationFailed(detail));
        }
      };
      if session.amount_minor == 0 {
        return Err(CheckoutError::SessionCreationFailed(
          "backend returned a zero amount".to_string(),
        ));
      }
      if crate::domain::to_minor_units(amount_hint) != Some(session.amount_minor) {
        warn!(
          %order_id,
          client_total = %amount_hint,
          session_amount_minor = session.amount_minor,
          "Session amount differs from the local order total; charging the session amount."
        );
      }
      info!(
        %order_id,
        session_id = %session.session_id,
        amount_minor = session.amount_minor,
        currency = %session.currency,
        "Payment session created."
      );

      ctx.write().session = Some(session);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.after_root(CREATE_SESSION, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let (view, session) = {
        let guard = ctx.read();
        (guard.view.clone(), guard.session.clone())
      };
      view.write().last_session = session;
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root(LOAD_WIDGET_SCRIPT, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let (scripts, script) = {
        let guard = ctx.read();
        (guard.services.scripts.clone(), guard.services.settings.widget_script.clone())
      };
      scripts.ensure_loaded(&script).await?;
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.before_root(OPEN_WIDGET, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let view = ctx.read().view.clone();
      view.write().enter(CheckoutPhase::WidgetOpen);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root(OPEN_WIDGET, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let (widget, config, timeout) = {
        let guard = ctx.read();
        let session = guard.session.as_ref().ok_or_else(|| {
          CheckoutError::from(FlowError::Internal("widget opened without a payment session".to_string()))
        })?;
        let settings = &guard.services.settings;
        let config = WidgetConfig {
          key: session.widget_key.clone(),
          amount_minor: session.amount_minor,
          currency: session.currency.clone(),
          merchant_name: settings.merchant_name.clone(),
          description: format!("Order #{}", guard.order.id),
          provider_order_id: session.session_id.clone(),
          prefill: Prefill::from(&guard.billing),
          theme_color: settings.theme_color.clone(),
        };
        (guard.services.widget.clone(), config, settings.widget_timeout)
      };

      let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, widget.open(config))
          .await
          .unwrap_or_else(|_| {
            warn!(?limit, "Payment widget did not report back in time.");
            WidgetOutcome::Failure {
              reason: "the payment window timed out".to_string(),
            }
          }),
        None => widget.open(config).await,
      };
      ctx.write().outcome = Some(outcome);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root(RECONCILE_OUTCOME, |ctx: ContextData<AttemptData>| {
    Box::pin(async move {
      let (outcome, gateway, verification_timeout, view) = {
        let mut guard = ctx.write();
        (
          guard.outcome.take(),
          guard.services.gateway.clone(),
          guard.services.settings.verification_timeout,
          guard.view.clone(),
        )
      };
      let outcome = outcome
        .ok_or_else(|| CheckoutError::from(FlowError::Internal("no widget outcome to reconcile".to_string())))?;

      let request = match reconcile(outcome) {
        Settlement::Cancelled => {
          info!("Payment widget dismissed by the shopper.");
          return Ok::<_, CheckoutError>(PipelineControl::Stop);
        }
        Settlement::Failed { reason } => {
          warn!(%reason, "Payment widget reported a failure.");
          return Err(CheckoutError::WidgetFailed { reason });
        }
        Settlement::Verify(request) => request,
      };

      view.write().enter(CheckoutPhase::Verifying);
      let payment_id = request.payment_id.clone();
      let verdict = tokio::time::timeout(verification_timeout, gateway.verify(&request)).await;
      let reason = match verdict {
        Ok(Ok(VerificationVerdict::Verified)) => {
          info!(%payment_id, "Payment verified.");
          return Ok(PipelineControl::Continue);
        }
        Ok(Ok(VerificationVerdict::Rejected { reason })) => reason,
        Ok(Err(e)) => format!("{:#}", e),
        Err(_) => format!("verification did not complete within {:?}", verification_timeout),
      };
      error!(%payment_id, %reason, "Payment verification failed; funds may have moved.");
      Err(CheckoutError::VerificationFailed { payment_id, reason })
    })
  });

  p
}
