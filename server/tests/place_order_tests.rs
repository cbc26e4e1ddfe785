// tests/place_order_tests.rs
mod common;

use common::{line, memory_state, seed_product, seed_user};
use orderdesk::errors::AppError;
use orderdesk::services::order_service;
use uuid::Uuid;

#[tokio::test]
async fn places_order_and_decrements_stock() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "ada@example.com");
  let product = seed_product(&store, "Desk lamp", 500, 10);

  let placed = order_service::place_order(&state, user.id, vec![line(product.id, 3, 500)])
    .await
    .expect("order should be placed");

  assert_eq!(placed.order.user_id, user.id);
  assert_eq!(placed.items.len(), 1);
  assert_eq!(placed.items[0].quantity, 3);
  assert_eq!(placed.items[0].unit_price_cents, 500);
  assert_eq!(placed.total_cents, 1500);
  assert_eq!(store.product_stock(product.id), Some(7));

  let read_back = order_service::get_order_for_user(&state, user.id, placed.order.id)
    .await
    .expect("order should be readable by its owner");
  assert_eq!(read_back.total_cents, 1500);
  assert_eq!(read_back.items, placed.items);
}

#[tokio::test]
async fn total_sums_every_line_in_request_order() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "grace@example.com");
  let pen = seed_product(&store, "Pen", 150, 20);
  let pad = seed_product(&store, "Notepad", 325, 5);

  let placed = order_service::place_order(
    &state,
    user.id,
    vec![line(pad.id, 2, 325), line(pen.id, 4, 150), line(pad.id, 1, 300)],
  )
  .await
  .unwrap();

  assert_eq!(placed.total_cents, 2 * 325 + 4 * 150 + 300);
  let products: Vec<Uuid> = placed.items.iter().map(|item| item.product_id).collect();
  assert_eq!(products, vec![pad.id, pen.id, pad.id]);
  let positions: Vec<i32> = placed.items.iter().map(|item| item.position).collect();
  assert_eq!(positions, vec![0, 1, 2]);
  assert_eq!(store.product_stock(pad.id), Some(2));
  assert_eq!(store.product_stock(pen.id), Some(16));
}

#[tokio::test]
async fn insufficient_stock_rejects_whole_order_without_writes() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "linus@example.com");
  let plenty = seed_product(&store, "Cable", 900, 50);
  let scarce = seed_product(&store, "Monitor", 19_900, 1);

  let err = order_service::place_order(&state, user.id, vec![line(plenty.id, 2, 900), line(scarce.id, 2, 19_900)])
    .await
    .unwrap_err();

  match err {
    AppError::InsufficientStock(shortfalls) => {
      assert_eq!(shortfalls.len(), 1);
      assert_eq!(shortfalls[0].product_id, scarce.id);
      assert_eq!(shortfalls[0].requested, 2);
      assert_eq!(shortfalls[0].available, 1);
    }
    other => panic!("expected InsufficientStock, got {:?}", other),
  }
  assert_eq!(store.product_stock(plenty.id), Some(50));
  assert_eq!(store.product_stock(scarce.id), Some(1));
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.order_item_count(), 0);
}

#[tokio::test]
async fn every_shortfall_is_reported() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "ken@example.com");
  let a = seed_product(&store, "A", 100, 0);
  let b = seed_product(&store, "B", 100, 2);

  let err = order_service::place_order(&state, user.id, vec![line(a.id, 1, 100), line(b.id, 3, 100)])
    .await
    .unwrap_err();

  let AppError::InsufficientStock(shortfalls) = err else {
    panic!("expected InsufficientStock");
  };
  let mut short_ids: Vec<Uuid> = shortfalls.iter().map(|s| s.product_id).collect();
  short_ids.sort();
  let mut expected = vec![a.id, b.id];
  expected.sort();
  assert_eq!(short_ids, expected);
}

#[tokio::test]
async fn rejected_request_stays_rejected_when_retried() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "barbara@example.com");
  let product = seed_product(&store, "Chair", 4_500, 2);

  for _ in 0..2 {
    let err = order_service::place_order(&state, user.id, vec![line(product.id, 3, 4_500)])
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert!(!err.is_retryable());
  }
  assert_eq!(store.product_stock(product.id), Some(2));
  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn repeated_lines_are_checked_against_their_sum() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "dennis@example.com");
  let product = seed_product(&store, "Mug", 800, 4);

  // 2 + 3 exceeds 4 even though each line alone fits.
  let err = order_service::place_order(&state, user.id, vec![line(product.id, 2, 800), line(product.id, 3, 800)])
    .await
    .unwrap_err();
  let AppError::InsufficientStock(shortfalls) = err else {
    panic!("expected InsufficientStock");
  };
  assert_eq!(shortfalls[0].requested, 5);
  assert_eq!(shortfalls[0].available, 4);
  assert_eq!(store.product_stock(product.id), Some(4));

  // 2 + 2 fits exactly and drains the stock.
  let placed = order_service::place_order(&state, user.id, vec![line(product.id, 2, 800), line(product.id, 2, 800)])
    .await
    .unwrap();
  assert_eq!(placed.items.len(), 2);
  assert_eq!(placed.total_cents, 3_200);
  assert_eq!(store.product_stock(product.id), Some(0));
}

#[tokio::test]
async fn unknown_product_is_not_found() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "margaret@example.com");
  let known = seed_product(&store, "Known", 100, 10);

  let err = order_service::place_order(&state, user.id, vec![line(known.id, 1, 100), line(Uuid::new_v4(), 1, 100)])
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
  assert_eq!(store.product_stock(known.id), Some(10));
  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
  let (store, state) = memory_state();
  let product = seed_product(&store, "Orphan", 100, 10);

  let err = order_service::place_order(&state, Uuid::new_v4(), vec![line(product.id, 1, 100)])
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
  assert_eq!(store.product_stock(product.id), Some(10));
}

#[tokio::test]
async fn malformed_requests_are_validation_errors() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "alan@example.com");
  let product = seed_product(&store, "Widget", 100, 10);

  let cases = vec![
    vec![],
    vec![line(product.id, 0, 100)],
    vec![line(product.id, -1, 100)],
    vec![line(product.id, 1, 100), line(product.id, 1, -5)],
  ];
  for items in cases {
    let err = order_service::place_order(&state, user.id, items).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
  }
  assert_eq!(store.product_stock(product.id), Some(10));
  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn overflowing_total_is_rejected_before_any_write() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "john@example.com");
  let product = seed_product(&store, "Gold bar", 100, 10);

  let err = order_service::place_order(&state, user.id, vec![line(product.id, 2, i64::MAX / 2 + 1)])
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);

  let err = order_service::place_order(
    &state,
    user.id,
    vec![line(product.id, 1, i64::MAX), line(product.id, 1, 1)],
  )
  .await
  .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);

  assert_eq!(store.product_stock(product.id), Some(10));
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.order_item_count(), 0);
}

#[tokio::test]
async fn line_price_comes_from_the_request_not_the_catalog() {
  let (store, state) = memory_state();
  let user = seed_user(&store, "edsger@example.com");
  let product = seed_product(&store, "Sale item", 1_000, 5);

  let placed = order_service::place_order(&state, user.id, vec![line(product.id, 2, 750)])
    .await
    .unwrap();
  assert_eq!(placed.items[0].unit_price_cents, 750);
  assert_eq!(placed.total_cents, 1_500);

  // A later catalog change does not touch the captured price.
  let mut repriced = product.clone();
  repriced.price_cents = 2_000;
  repriced.stock = 3;
  store.insert_product(repriced);
  let read_back = order_service::get_order_for_user(&state, user.id, placed.order.id)
    .await
    .unwrap();
  assert_eq!(read_back.total_cents, 1_500);
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
  let (store, state) = memory_state();
  let owner = seed_user(&store, "owner@example.com");
  let other = seed_user(&store, "other@example.com");
  let product = seed_product(&store, "Book", 2_500, 3);

  let placed = order_service::place_order(&state, owner.id, vec![line(product.id, 1, 2_500)])
    .await
    .unwrap();

  let err = order_service::get_order_for_user(&state, other.id, placed.order.id)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
  let err = order_service::get_order_for_user(&state, owner.id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}
