// orderdesk/src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use super::{NewOrder, StockDecrement, Store};
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItem, OrderWithItems, Product, Session, User};

#[derive(Default)]
struct Tables {
  users: HashMap<Uuid, User>,
  sessions: HashMap<String, Session>,
  products: HashMap<Uuid, Product>,
  orders: HashMap<Uuid, Order>,
  order_items: Vec<OrderItem>,
}

/// In-process store with the same commit contract as `PgStore`.
///
/// Every operation takes the single table lock, so a commit checks all of its
/// decrements and applies them together or not at all.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_product(&self, product: Product) {
    self.tables.lock().products.insert(product.id, product);
  }

  pub fn insert_user(&self, user: User) {
    self.tables.lock().users.insert(user.id, user);
  }

  pub fn product_stock(&self, product_id: Uuid) -> Option<i32> {
    self.tables.lock().products.get(&product_id).map(|p| p.stock)
  }

  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }

  pub fn order_item_count(&self) -> usize {
    self.tables.lock().order_items.len()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
    Ok(self.tables.lock().users.contains_key(&user_id))
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let tables = self.tables.lock();
    Ok(tables.users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
  }

  async fn insert_session(&self, session: &Session) -> Result<()> {
    let mut tables = self.tables.lock();
    if !tables.users.contains_key(&session.user_id) {
      return Err(AppError::NotFound(format!("User {} not found.", session.user_id)));
    }
    tables.sessions.insert(session.token.clone(), session.clone());
    Ok(())
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    Ok(self.tables.lock().sessions.get(token).cloned())
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    self.tables.lock().sessions.remove(token);
    Ok(())
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let mut products: Vec<Product> = self.tables.lock().products.values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let tables = self.tables.lock();
    Ok(ids.iter().filter_map(|id| tables.products.get(id).cloned()).collect())
  }

  async fn commit_order(&self, order: NewOrder, decrements: &[StockDecrement]) -> Result<OrderWithItems> {
    let mut tables = self.tables.lock();

    if !tables.users.contains_key(&order.user_id) {
      return Err(AppError::NotFound(format!("User {} not found.", order.user_id)));
    }
    for item in &order.items {
      if !tables.products.contains_key(&item.product_id) {
        return Err(AppError::Conflict(format!(
          "Product {} disappeared while the order was being placed.",
          item.product_id
        )));
      }
    }
    // Check every precondition before touching anything.
    for decrement in decrements {
      let holds = tables
        .products
        .get(&decrement.product_id)
        .map_or(false, |p| p.stock >= decrement.quantity);
      if !holds {
        tracing::warn!(product_id = %decrement.product_id, quantity = decrement.quantity, "Conditional stock decrement rejected.");
        return Err(AppError::Conflict(format!(
          "Stock for product {} changed while the order was being placed.",
          decrement.product_id
        )));
      }
    }

    let now = Utc::now();
    for decrement in decrements {
      if let Some(product) = tables.products.get_mut(&decrement.product_id) {
        product.stock -= decrement.quantity;
        product.updated_at = now;
      }
    }

    let header = Order {
      id: order.id,
      user_id: order.user_id,
      created_at: order.created_at,
    };
    let items: Vec<OrderItem> = order
      .items
      .iter()
      .zip(0..)
      .map(|(item, position)| OrderItem {
        id: item.id,
        order_id: order.id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price_cents: item.unit_price_cents,
        position,
      })
      .collect();

    tables.orders.insert(header.id, header.clone());
    tables.order_items.extend(items.iter().cloned());
    Ok(OrderWithItems::new(header, items))
  }

  async fn find_order(&self, order_id: Uuid) -> Result<Option<OrderWithItems>> {
    let tables = self.tables.lock();
    let Some(header) = tables.orders.get(&order_id).cloned() else {
      return Ok(None);
    };
    let items = tables
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
      .cloned()
      .collect();
    Ok(Some(OrderWithItems::new(header, items)))
  }
}
