//! The checkout payment orchestrator.
//!
//! A `CheckoutView` loads one order, keeps the billing form, and turns each
//! Pay click into a run of the attempt pipeline (see `attempt`). The pipeline
//! moves the shared `ViewState` through its phases; the view settles the final
//! phase from the run's result.

pub mod attempt;
pub mod error;
pub mod phase;
pub mod settings;
pub mod view;

pub use attempt::{build_attempt_pipeline, reconcile, AttemptData, CheckoutServices, Settlement};
pub use error::CheckoutError;
pub use phase::{CheckoutPhase, PayAction, Route, ViewState};
pub use settings::CheckoutSettings;
pub use view::{CheckoutView, PayOutcome};
