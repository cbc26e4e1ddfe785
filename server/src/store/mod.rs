// orderdesk/src/store/mod.rs

//! The relational datastore behind the service.
//!
//! `Store` is the seam between the order flow and persistence. `PgStore` is the
//! production implementation; `MemoryStore` keeps the same transactional
//! contract in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{OrderWithItems, Product, Session, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// An order ready to be written, ids already assigned.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub id: Uuid,
  pub user_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
  pub id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
}

/// Conditional decrement: applies only while `stock >= quantity` still holds
/// at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
  async fn user_exists(&self, user_id: Uuid) -> Result<bool>;

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

  async fn insert_session(&self, session: &Session) -> Result<()>;

  async fn find_session(&self, token: &str) -> Result<Option<Session>>;

  async fn delete_session(&self, token: &str) -> Result<()>;

  async fn list_products(&self) -> Result<Vec<Product>>;

  /// Batch read by id. Unknown ids are simply absent from the result.
  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;

  /// Writes the order, its items and every stock decrement as one unit.
  ///
  /// If any decrement's precondition no longer holds, nothing is written and
  /// `AppError::Conflict` is returned.
  async fn commit_order(&self, order: NewOrder, decrements: &[StockDecrement]) -> Result<OrderWithItems>;

  async fn find_order(&self, order_id: Uuid) -> Result<Option<OrderWithItems>>;
}
