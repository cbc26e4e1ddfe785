// tests/postgres_store_tests.rs
//
// Runs against a real database only when TEST_DATABASE_URL is set; otherwise
// each test returns early.
mod common;

use chrono::Utc;
use common::{line, setup_tracing};
use orderdesk::config::AppConfig;
use orderdesk::errors::AppError;
use orderdesk::services::order_service;
use orderdesk::state::AppState;
use orderdesk::store::{NewOrder, NewOrderItem, PgStore, StockDecrement, Store};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
  let url = std::env::var("TEST_DATABASE_URL").ok()?;
  setup_tracing();
  let pool = PgPoolOptions::new()
    .max_connections(8)
    .connect(&url)
    .await
    .expect("TEST_DATABASE_URL should be reachable");
  sqlx::migrate!("./migrations").run(&pool).await.expect("migrations should apply");
  Some(pool)
}

async fn insert_user(pool: &PgPool) -> Uuid {
  let id = Uuid::new_v4();
  sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
    .bind(id)
    .bind(format!("{}@example.com", id))
    .bind("not-a-real-hash")
    .execute(pool)
    .await
    .unwrap();
  id
}

async fn insert_product(pool: &PgPool, price_cents: i64, stock: i32) -> Uuid {
  let id = Uuid::new_v4();
  sqlx::query("INSERT INTO products (id, name, price_cents, stock) VALUES ($1, $2, $3, $4)")
    .bind(id)
    .bind(format!("Product {}", id))
    .bind(price_cents)
    .bind(stock)
    .execute(pool)
    .await
    .unwrap();
  id
}

async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
  sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn orders_of(pool: &PgPool, user_id: Uuid) -> i64 {
  sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn pg_state(pool: &PgPool) -> AppState {
  AppState::new(Arc::new(PgStore::new(pool.clone())), AppConfig::default()).unwrap()
}

#[tokio::test]
async fn places_order_through_postgres() {
  let Some(pool) = test_pool().await else { return };
  let user_id = insert_user(&pool).await;
  let product_id = insert_product(&pool, 500, 10).await;
  let state = pg_state(&pool);

  let placed = order_service::place_order(&state, user_id, vec![line(product_id, 3, 500)])
    .await
    .unwrap();
  assert_eq!(placed.total_cents, 1500);
  assert_eq!(stock_of(&pool, product_id).await, 7);

  let read_back = state.store.find_order(placed.order.id).await.unwrap().expect("order row");
  assert_eq!(read_back.items, placed.items);
  assert_eq!(read_back.total_cents, 1500);
}

#[tokio::test]
async fn failed_decrement_rolls_back_earlier_writes() {
  let Some(pool) = test_pool().await else { return };
  let user_id = insert_user(&pool).await;
  let first = insert_product(&pool, 100, 10).await;
  let second = insert_product(&pool, 100, 1).await;
  let store = PgStore::new(pool.clone());

  let mut decrements = vec![
    StockDecrement {
      product_id: first,
      quantity: 2,
    },
    StockDecrement {
      product_id: second,
      quantity: 5,
    },
  ];
  decrements.sort_by_key(|d| d.product_id);
  let order = NewOrder {
    id: Uuid::new_v4(),
    user_id,
    created_at: Utc::now(),
    items: decrements
      .iter()
      .map(|d| NewOrderItem {
        id: Uuid::new_v4(),
        product_id: d.product_id,
        quantity: d.quantity,
        unit_price_cents: 100,
      })
      .collect(),
  };

  let err = store.commit_order(order, &decrements).await.unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
  assert_eq!(stock_of(&pool, first).await, 10);
  assert_eq!(stock_of(&pool, second).await, 1);
  assert_eq!(orders_of(&pool, user_id).await, 0);
}

#[tokio::test]
async fn concurrent_postgres_orders_never_oversell() {
  let Some(pool) = test_pool().await else { return };
  let user_id = insert_user(&pool).await;
  let product_id = insert_product(&pool, 2_000, 5).await;
  let state = pg_state(&pool);

  let mut handles = Vec::new();
  for _ in 0..12 {
    let state = state.clone();
    handles.push(tokio::spawn(async move {
      order_service::place_order(&state, user_id, vec![line(product_id, 1, 2_000)]).await
    }));
  }

  let mut placed = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => placed += 1,
      Err(AppError::InsufficientStock(_)) | Err(AppError::Conflict(_)) => {}
      Err(other) => panic!("unexpected error: {:?}", other),
    }
  }
  assert_eq!(placed, 5);
  assert_eq!(stock_of(&pool, product_id).await, 0);
  assert_eq!(orders_of(&pool, user_id).await, 5);
}
