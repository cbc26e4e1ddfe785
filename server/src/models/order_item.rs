// orderdesk/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A committed line of an order. `unit_price_cents` is the price captured when
/// the order was placed, not the product's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
  /// Index of the line in the original request.
  pub position: i32,
}

impl OrderItem {
  pub fn line_total_cents(&self) -> i64 {
    self.unit_price_cents * i64::from(self.quantity)
  }
}

/// One requested line: which product, how many, and at what unit price.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineItemRequest {
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
}
