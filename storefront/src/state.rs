// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::{ApiClient, HttpOrderService, HttpPaymentGateway, HttpScriptSource, TerminalWidget};
use paydesk::checkout::{build_attempt_pipeline, AttemptData};
use paydesk::{CheckoutError, CheckoutServices, Pipeline, ScriptLoader};
use std::sync::Arc;

/// Everything a command needs, built once from the config.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub services: CheckoutServices,
  pub pipeline: Arc<Pipeline<AttemptData, CheckoutError>>,
}

impl AppState {
  pub fn build(config: Arc<AppConfig>) -> Result<Self> {
    let api = Arc::new(ApiClient::new(&config)?);
    let scripts = HttpScriptSource::new(api.http().clone());

    let services = CheckoutServices {
      orders: Arc::new(HttpOrderService::new(api.clone())),
      gateway: Arc::new(HttpPaymentGateway::new(api.clone(), config.widget_key.clone())),
      widget: Arc::new(TerminalWidget::stdin()),
      scripts: Arc::new(ScriptLoader::new(Arc::new(scripts))),
      settings: Arc::new(config.checkout_settings()),
    };

    Ok(Self {
      config,
      services,
      pipeline: Arc::new(build_attempt_pipeline()),
    })
  }
}
