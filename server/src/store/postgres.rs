// orderdesk/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{NewOrder, StockDecrement, Store};
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItem, OrderWithItems, Product, Session, User};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price_cents, position";

/// Postgres-backed store using runtime-checked `sqlx` queries.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl Store for PgStore {
  async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
      "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE lower(email) = lower($1)",
    )
    .bind(email)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  async fn insert_session(&self, session: &Session) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)")
      .bind(&session.token)
      .bind(session.user_id)
      .bind(session.created_at)
      .bind(session.expires_at)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    let session =
      sqlx::query_as::<_, Session>("SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = $1")
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
    Ok(session)
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
      .bind(token)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products ORDER BY name ASC", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS))
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  #[instrument(
    name = "PgStore::commit_order",
    skip_all,
    fields(order_id = %order.id, user_id = %order.user_id, decrements = decrements.len()),
    err(Display)
  )]
  async fn commit_order(&self, order: NewOrder, decrements: &[StockDecrement]) -> Result<OrderWithItems> {
    // Dropping `tx` without commit rolls everything back, so every `?` below
    // leaves the database untouched.
    let mut tx = self.pool.begin().await?;

    for decrement in decrements {
      let result = sqlx::query(
        "UPDATE products SET stock = stock - $1, updated_at = NOW() WHERE id = $2 AND stock >= $1",
      )
      .bind(decrement.quantity)
      .bind(decrement.product_id)
      .execute(&mut *tx)
      .await?;

      if result.rows_affected() == 0 {
        warn!(product_id = %decrement.product_id, quantity = decrement.quantity, "Conditional stock decrement matched no row.");
        tx.rollback().await?;
        return Err(AppError::Conflict(format!(
          "Stock for product {} changed while the order was being placed.",
          decrement.product_id
        )));
      }
    }

    let header = sqlx::query_as::<_, Order>(
      "INSERT INTO orders (id, user_id, created_at) VALUES ($1, $2, $3) RETURNING id, user_id, created_at",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.created_at)
    .fetch_one(&mut *tx)
    .await?;

    let insert_item = format!(
      "INSERT INTO order_items ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
      cols = ORDER_ITEM_COLUMNS
    );
    let mut items = Vec::with_capacity(order.items.len());
    for (position, item) in order.items.iter().enumerate() {
      let position = i32::try_from(position).map_err(|_| AppError::Validation("Too many line items.".to_string()))?;
      let row = sqlx::query_as::<_, OrderItem>(&insert_item)
        .bind(item.id)
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;
      items.push(row);
    }

    tx.commit().await?;
    debug!(items = items.len(), "Order transaction committed.");
    Ok(OrderWithItems::new(header, items))
  }

  async fn find_order(&self, order_id: Uuid) -> Result<Option<OrderWithItems>> {
    let header = sqlx::query_as::<_, Order>("SELECT id, user_id, created_at FROM orders WHERE id = $1")
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    let Some(header) = header else {
      return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItem>(&format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY position ASC",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(Some(OrderWithItems::new(header, items)))
  }
}
