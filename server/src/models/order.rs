// orderdesk/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::order_item::OrderItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub created_at: DateTime<Utc>,
}

/// An order as read back: header, its lines, and the total derived from them.
///
/// The total is computed here from the captured line prices and is never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
  pub total_cents: i64,
}

impl OrderWithItems {
  pub fn new(order: Order, mut items: Vec<OrderItem>) -> Self {
    items.sort_by_key(|item| item.position);
    let total_cents = items.iter().map(OrderItem::line_total_cents).sum();
    Self {
      order,
      items,
      total_cents,
    }
  }
}
