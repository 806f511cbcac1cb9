// paydesk/src/domain/order.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Order lifecycle as the order service reports it. Upper case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum OrderStatus {
  /// Created by the payment service before the order is confirmed as pending.
  Created,
  Pending,
  Paid,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  /// Stages of the order progress tracker, in order. Created and cancelled
  /// orders have no stage.
  pub const TRACKER: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Created => "CREATED",
      OrderStatus::Pending => "PENDING",
      OrderStatus::Paid => "PAID",
      OrderStatus::Processing => "PROCESSING",
      OrderStatus::Shipped => "SHIPPED",
      OrderStatus::Delivered => "DELIVERED",
      OrderStatus::Cancelled => "CANCELLED",
    }
  }

  /// Only pending orders accept a payment attempt.
  pub fn is_payable(&self) -> bool {
    *self == OrderStatus::Pending
  }

  pub fn tracker_stage(&self) -> Option<usize> {
    Self::TRACKER.iter().position(|s| s == self)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "CREATED" => Ok(OrderStatus::Created),
      "PENDING" => Ok(OrderStatus::Pending),
      "PAID" => Ok(OrderStatus::Paid),
      "PROCESSING" => Ok(OrderStatus::Processing),
      "SHIPPED" => Ok(OrderStatus::Shipped),
      "DELIVERED" => Ok(OrderStatus::Delivered),
      "CANCELLED" => Ok(OrderStatus::Cancelled),
      _ => Err(format!("unknown order status: {}", s)),
    }
  }
}

impl TryFrom<String> for OrderStatus {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
  pub id: u64,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
  #[serde(default)]
  pub id: Option<u64>,
  pub product: ProductRef,
  pub quantity: u32,
  /// Unit price in major currency units.
  pub price: Decimal,
}

impl OrderItem {
  pub fn line_total(&self) -> Decimal {
    self.price * Decimal::from(self.quantity)
  }
}

/// The view's read-only, possibly stale copy of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  #[serde(default)]
  pub user_id: Option<UserId>,
  pub status: OrderStatus,
  pub total_price: Decimal,
  #[serde(default)]
  pub order_items: Vec<OrderItem>,
}

impl Order {
  pub fn is_payable(&self) -> bool {
    self.status.is_payable()
  }
}

/// Major units to minor units (two decimals), rounding half away from zero.
/// `None` for negative or unrepresentable amounts.
pub fn to_minor_units(amount: Decimal) -> Option<u64> {
  (amount * Decimal::ONE_HUNDRED)
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_u64()
}

/// `$120.97` style display used on the pay button.
pub fn format_amount(amount: Decimal) -> String {
  format!("${:.2}", amount)
}
