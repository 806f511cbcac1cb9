// src/lib.rs

//! Paydesk: an async checkout payment orchestrator.
//!
//! Paydesk drives one order from PENDING to PAID by coordinating:
//!  - an order service (load the order the shopper is paying for),
//!  - a payment backend (create a fresh session per attempt, verify the
//!    signed confirmation),
//!  - a hosted payment widget, whose script is loaded once and whose single
//!    outcome (success, failure or dismissal) is reconciled in one place.
//!
//! Each Pay click runs as a pipeline of named async steps on the small engine
//! in [`flow`]; the collaborators are traits in [`ports`] so hosts can plug in
//! HTTP clients, terminals or in-memory fakes.

pub mod checkout;
pub mod domain;
pub mod error;
pub mod flow;
pub mod ports;
pub mod script_loader;

pub use crate::checkout::{
  CheckoutError, CheckoutPhase, CheckoutServices, CheckoutSettings, CheckoutView, PayAction, PayOutcome, Route,
  ViewState,
};
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::{ContextData, Handler, Pipeline, PipelineControl, PipelineResult, StepDef};
pub use crate::script_loader::{ScriptLoadError, ScriptLoader};

/*
    Wiring a checkout:
    1. Implement (or pick) the ports: OrderService, PaymentGateway, ScriptSource, PaymentWidget.
    2. Build `CheckoutServices`, wrapping the ScriptSource in a shared `ScriptLoader`
       so every view reuses one loaded script.
    3. `CheckoutView::new(services, order_id, user_id)`, then `.load().await`.
    4. Fill the billing form with `set_billing` / `update_billing`.
    5. `pay().await` per click; render `pay_action()` and `snapshot()` in between.
*/
