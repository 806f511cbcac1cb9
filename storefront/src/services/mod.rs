// storefront/src/services/mod.rs

//! Port implementations for the storefront: REST adapters over `reqwest`,
//! bearer-token claims, and a payment widget driven from the terminal.

pub mod api_client;
pub mod auth_claims;
pub mod order_api;
pub mod payment_api;
pub mod script_host;
pub mod terminal_widget;

pub use api_client::ApiClient;
pub use auth_claims::AuthClaims;
pub use order_api::HttpOrderService;
pub use payment_api::HttpPaymentGateway;
pub use script_host::HttpScriptSource;
pub use terminal_widget::TerminalWidget;
