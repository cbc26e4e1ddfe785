// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use orderdesk::config::AppConfig;
use orderdesk::errors::Result;
use orderdesk::models::{LineItemRequest, OrderWithItems, Product, Session, User};
use orderdesk::services::auth_service;
use orderdesk::state::AppState;
use orderdesk::store::{MemoryStore, NewOrder, StockDecrement, Store};
use std::sync::Arc;
use tokio::sync::Barrier;
use tracing::Level;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "hunter2-but-longer";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// A memory-backed state plus a typed handle on the store for assertions.
pub fn memory_state() -> (Arc<MemoryStore>, AppState) {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let state = AppState::new(store.clone(), AppConfig::default()).expect("state should build");
  (store, state)
}

pub fn seed_user(store: &MemoryStore, email: &str) -> User {
  let now = Utc::now();
  let user = User {
    id: Uuid::new_v4(),
    email: email.to_string(),
    password_hash: auth_service::hash_password(TEST_PASSWORD).expect("hashing should succeed"),
    created_at: now,
    updated_at: now,
  };
  store.insert_user(user.clone());
  user
}

pub fn seed_product(store: &MemoryStore, name: &str, price_cents: i64, stock: i32) -> Product {
  let product = Product::new(name, price_cents, stock);
  store.insert_product(product.clone());
  product
}

pub fn line(product_id: Uuid, quantity: i32, unit_price_cents: i64) -> LineItemRequest {
  LineItemRequest {
    product_id,
    quantity,
    unit_price_cents,
  }
}

/// Wraps a store so that every `find_products` call returns only once
/// `parties` callers have taken their snapshot.
pub struct GatedStore {
  inner: Arc<MemoryStore>,
  barrier: Barrier,
}

impl GatedStore {
  pub fn new(inner: Arc<MemoryStore>, parties: usize) -> Self {
    Self {
      inner,
      barrier: Barrier::new(parties),
    }
  }
}

#[async_trait]
impl Store for GatedStore {
  async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
    self.inner.user_exists(user_id).await
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.inner.find_user_by_email(email).await
  }

  async fn insert_session(&self, session: &Session) -> Result<()> {
    self.inner.insert_session(session).await
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    self.inner.find_session(token).await
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    self.inner.delete_session(token).await
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    self.inner.list_products().await
  }

  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let snapshot = self.inner.find_products(ids).await;
    self.barrier.wait().await;
    snapshot
  }

  async fn commit_order(&self, order: NewOrder, decrements: &[StockDecrement]) -> Result<OrderWithItems> {
    self.inner.commit_order(order, decrements).await
  }

  async fn find_order(&self, order_id: Uuid) -> Result<Option<OrderWithItems>> {
    self.inner.find_order(order_id).await
  }
}
