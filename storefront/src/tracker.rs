// storefront/src/tracker.rs

//! Text rendering of an order for the `track` and `checkout` commands.

use paydesk::domain::{format_amount, Order, OrderStatus};
use std::fmt::Write;

/// One line per tracker stage, reached stages ticked. Cancelled orders have
/// no position on the tracker.
pub fn render_tracker(status: OrderStatus) -> String {
  let current = match status.tracker_stage() {
    Some(stage) => Some(stage),
    // Not yet at the first stage.
    None if status == OrderStatus::Created => None,
    None => return format!("Order {}: no further progress.", status),
  };
  let mut out = String::new();
  for (stage_idx, stage) in OrderStatus::TRACKER.iter().enumerate() {
    let mark = if current.is_some_and(|c| stage_idx <= c) { "x" } else { " " };
    let here = if current == Some(stage_idx) { "  <- current" } else { "" };
    let _ = writeln!(out, "[{}] {}{}", mark, stage, here);
  }
  out
}

pub fn render_summary(order: &Order) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Order #{} ({})", order.id, order.status);
  for item in &order.order_items {
    let _ = writeln!(
      out,
      "  {} x{}  {}",
      item.product.name,
      item.quantity,
      format_amount(item.line_total())
    );
  }
  let _ = writeln!(out, "  Total: {}", format_amount(order.total_price));
  out
}
