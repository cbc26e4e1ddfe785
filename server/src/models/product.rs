// orderdesk/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  /// Available-to-sell count. Never negative outside a transaction.
  pub stock: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// A fresh product, mostly for fixtures and embedding the in-memory store.
  pub fn new(name: impl Into<String>, price_cents: i64, stock: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      description: None,
      price_cents,
      stock,
      created_at: now,
      updated_at: now,
    }
  }
}
