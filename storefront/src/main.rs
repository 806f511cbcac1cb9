// storefront/src/main.rs

mod config;
mod errors;
mod services;
mod state;
mod tracker;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::services::AuthClaims;
use crate::state::AppState;

use clap::{Args, Parser, Subcommand};
use paydesk::domain::{BillingDetails, OrderId, UserId};
use paydesk::{CheckoutView, PayOutcome};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pay for and track storefront orders", long_about = None)]
struct Cli {
  /// User id to act as. Defaults to the id in STOREFRONT_AUTH_TOKEN.
  #[arg(long, global = true)]
  user_id: Option<u64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Pay for a pending order
  Checkout {
    order_id: u64,

    #[command(flatten)]
    billing: BillingArgs,
  },
  /// Show where an order is in its lifecycle
  Track { order_id: u64 },
}

#[derive(Args, Default)]
struct BillingArgs {
  #[arg(long)]
  name: Option<String>,
  #[arg(long)]
  email: Option<String>,
  #[arg(long)]
  phone: Option<String>,
  #[arg(long)]
  address: Option<String>,
  #[arg(long)]
  city: Option<String>,
  #[arg(long)]
  zip: Option<String>,
}

impl BillingArgs {
  fn into_details(self) -> BillingDetails {
    BillingDetails {
      name: self.name.unwrap_or_default(),
      email: self.email.unwrap_or_default(),
      phone: self.phone.unwrap_or_default(),
      address: self.address.unwrap_or_default(),
      city: self.city.unwrap_or_default(),
      zip: self.zip.unwrap_or_default(),
    }
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  // Logs go to stderr; stdout is the shopper's conversation with the widget.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!(error = %e, "Command failed.");
      eprintln!("{}", e.user_message());
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> AppResult<()> {
  let config = Arc::new(AppConfig::from_env()?);
  let user_id = resolve_user(&config, cli.user_id)?;
  let state = AppState::build(config)?;

  match cli.command {
    Command::Checkout { order_id, billing } => checkout(&state, OrderId(order_id), user_id, billing).await,
    Command::Track { order_id } => track(&state, OrderId(order_id), user_id).await,
  }
}

fn resolve_user(config: &AppConfig, override_id: Option<u64>) -> AppResult<UserId> {
  if let Some(id) = override_id {
    return Ok(UserId(id));
  }
  let token = config
    .auth_token
    .as_deref()
    .ok_or_else(|| AppError::Auth("Set STOREFRONT_AUTH_TOKEN or pass --user-id".to_string()))?;
  let claims = AuthClaims::from_token(token)?;
  tracing::debug!(user_id = %claims.user_id, role = ?claims.role, "Resolved user from token.");
  Ok(claims.user_id)
}

async fn checkout(state: &AppState, order_id: OrderId, user_id: UserId, billing: BillingArgs) -> AppResult<()> {
  let view = CheckoutView::with_pipeline(state.services.clone(), state.pipeline.clone(), order_id, user_id);
  view.load().await?;
  println!("{} checkout", state.config.merchant_name);
  if let Some(order) = view.snapshot().order {
    print!("{}", tracker::render_summary(&order));
  }
  let action = view.pay_action();
  println!("[{}]", action.label);

  view.set_billing(billing.into_details());
  match view.pay().await? {
    PayOutcome::Paid => {
      let snapshot = view.snapshot();
      if let Some(notice) = &snapshot.notice {
        println!("{}", notice);
      }
      if let Some(route) = snapshot.redirect {
        println!("Next: {}", route);
      }
    }
    PayOutcome::Cancelled => println!("Payment cancelled. Run the command again to retry."),
  }
  Ok(())
}

async fn track(state: &AppState, order_id: OrderId, user_id: UserId) -> AppResult<()> {
  let view = CheckoutView::with_pipeline(state.services.clone(), state.pipeline.clone(), order_id, user_id);
  view.load().await?;
  if let Some(order) = view.snapshot().order {
    print!("{}", tracker::render_summary(&order));
    print!("{}", tracker::render_tracker(order.status));
  }
  Ok(())
}
