//! Checkout domain types: orders as the order service reports them, the
//! billing form, payment sessions and what the hosted widget hands back.

pub mod billing;
pub mod order;
pub mod session;
pub mod widget;

pub use billing::{BillingDetails, BillingError, BillingField};
pub use order::{format_amount, to_minor_units, Order, OrderId, OrderItem, OrderStatus, ProductRef, UserId};
pub use session::{PaymentSession, VerificationRequest, VerificationVerdict, VERIFIED_MARKER};
pub use widget::{Prefill, WidgetConfig, WidgetOutcome, WidgetScript};
