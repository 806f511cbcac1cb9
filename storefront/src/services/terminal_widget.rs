// storefront/src/services/terminal_widget.rs

use async_trait::async_trait;
use paydesk::domain::{WidgetConfig, WidgetOutcome};
use paydesk::ports::PaymentWidget;
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

type LineSource = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;

/// A payment widget the shopper drives from the terminal.
///
/// Shows the session, then reads one reply per prompt:
/// `paid <payment_id> <signature>`, `fail <reason>` or `cancel`.
/// End of input counts as closing the widget.
pub struct TerminalWidget {
  lines: Mutex<LineSource>,
}

impl TerminalWidget {
  pub fn stdin() -> Self {
    Self::from_reader(tokio::io::stdin())
  }

  pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
    let boxed: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
    Self {
      lines: Mutex::new(BufReader::new(boxed).lines()),
    }
  }
}

/// Parses one reply. `provider_order_id` is the session the widget was
/// opened for; the success callback echoes it back.
pub(crate) fn parse_reply(line: &str, provider_order_id: &str) -> Option<WidgetOutcome> {
  let line = line.trim();
  let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
  match command.to_ascii_lowercase().as_str() {
    "paid" => {
      let mut parts = rest.split_whitespace();
      match (parts.next(), parts.next(), parts.next()) {
        (Some(payment_id), Some(signature), None) => Some(WidgetOutcome::Success {
          payment_id: payment_id.to_string(),
          provider_order_id: provider_order_id.to_string(),
          signature: signature.to_string(),
        }),
        _ => None,
      }
    }
    "fail" => Some(WidgetOutcome::Failure {
      reason: rest.trim().to_string(),
    }),
    "cancel" | "close" => Some(WidgetOutcome::Dismissed),
    _ => None,
  }
}

#[async_trait]
impl PaymentWidget for TerminalWidget {
  #[instrument(name = "TerminalWidget::open", skip_all, fields(provider_order_id = %config.provider_order_id))]
  async fn open(&self, config: WidgetConfig) -> WidgetOutcome {
    let amount = match i64::try_from(config.amount_minor) {
      Ok(minor) => Decimal::new(minor, 2),
      Err(_) => {
        warn!(amount_minor = config.amount_minor, "Amount does not fit a displayable value.");
        return WidgetOutcome::Failure {
          reason: "amount out of range".to_string(),
        };
      }
    };
    println!();
    println!("== {} ==", config.merchant_name);
    println!("{}: {} {}", config.description, amount, config.currency);
    println!("Payment order: {}  (key {})", config.provider_order_id, config.key);
    println!("Billing: {} <{}> {}", config.prefill.name, config.prefill.email, config.prefill.contact);
    println!("Reply with `paid <payment_id> <signature>`, `fail <reason>` or `cancel`.");

    let mut lines = self.lines.lock().await;
    loop {
      match lines.next_line().await {
        Ok(Some(line)) => match parse_reply(&line, &config.provider_order_id) {
          Some(outcome) => {
            info!("Widget reply received.");
            return outcome;
          }
          None => println!("Unrecognised reply. Try again."),
        },
        Ok(None) => {
          info!("Input closed; treating as dismissal.");
          return WidgetOutcome::Dismissed;
        }
        Err(e) => {
          warn!(error = %e, "Could not read widget reply.");
          return WidgetOutcome::Failure {
            reason: format!("could not read input: {}", e),
          };
        }
      }
    }
  }
}
