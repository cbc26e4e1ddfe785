// orderdesk/src/pipelines/place_order_pipeline.rs

use crate::errors::{AppError, StockShortfall};
use crate::models::{LineItemRequest, Product};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::store::{NewOrder, NewOrderItem, StockDecrement};
use chrono::Utc;
use orderdesk_flow::{ContextData, FlowRegistry, FlowResult, Pipeline, PipelineControl};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

pub const VALIDATE_REQUEST: &str = "validate_order_request";
pub const LOAD_PRODUCTS: &str = "load_order_products";
pub const VERIFY_STOCK: &str = "verify_stock_levels";
pub const COMMIT_ORDER: &str = "commit_order";

pub fn register_place_order_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    (VALIDATE_REQUEST, false, None),
    (LOAD_PRODUCTS, false, None),
    (VERIFY_STOCK, false, None),
    (COMMIT_ORDER, false, None),
  ]);

  // Step 1: reject malformed requests and sum quantities per product.
  p.on_root(VALIDATE_REQUEST, |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let requested = aggregate_line_items(&ctx_data.read().items)?;
      info!(distinct_products = requested.len(), "Order request validated.");
      ctx_data.write().requested_by_product = requested;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Step 2: the buyer must exist; one batch read for every referenced product.
  p.on_root(LOAD_PRODUCTS, |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (store, user_id, product_ids) = {
        let guard = ctx_data.read();
        let ids: Vec<Uuid> = guard.requested_by_product.keys().copied().collect();
        (guard.store.clone(), guard.user_id, ids)
      };

      if !store.user_exists(user_id).await? {
        warn!(%user_id, "Order placement for unknown user.");
        return Err(AppError::NotFound(format!("User {} not found.", user_id)));
      }

      let products: HashMap<Uuid, Product> = store
        .find_products(&product_ids)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

      let missing: Vec<String> = product_ids
        .iter()
        .filter(|id| !products.contains_key(*id))
        .map(Uuid::to_string)
        .collect();
      if !missing.is_empty() {
        warn!(?missing, "Order references unknown products.");
        return Err(AppError::NotFound(format!("Products not found: {}.", missing.join(", "))));
      }

      ctx_data.write().products = products;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Step 3: every product must cover the summed quantity; otherwise reject the
  // whole order with every shortfall listed.
  p.on_root(VERIFY_STOCK, |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let shortfalls = {
        let guard = ctx_data.read();
        find_shortfalls(&guard.requested_by_product, &guard.products)
      };
      if !shortfalls.is_empty() {
        warn!(?shortfalls, "Order rejected for insufficient stock.");
        return Err(AppError::InsufficientStock(shortfalls));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  // Step 4: one transaction for the order, its lines and the decrements.
  p.on_root(COMMIT_ORDER, |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (store, new_order, decrements) = {
        let guard = ctx_data.read();
        let decrements = build_decrements(&guard.requested_by_product)?;
        (guard.store.clone(), build_new_order(guard.user_id, &guard.items), decrements)
      };

      let placed = store.commit_order(new_order, &decrements).await?;
      ctx_data.write().placed_order = Some(placed);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.after_root(COMMIT_ORDER, |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      if let Some(order) = &guard.placed_order {
        info!(
          order_id = %order.order.id,
          user_id = %order.order.user_id,
          items = order.items.len(),
          total_cents = order.total_cents,
          "Order placed."
        );
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  registry.register_pipeline(p);
  info!("Place order pipeline registered.");
  Ok(())
}

/// Sums requested quantities per product after checking each line.
///
/// The order total must fit in an `i64` number of cents; anything larger is
/// rejected here, before the store is touched.
pub fn aggregate_line_items(items: &[LineItemRequest]) -> Result<BTreeMap<Uuid, i64>, AppError> {
  if items.is_empty() {
    return Err(AppError::Validation("An order needs at least one line item.".to_string()));
  }

  let mut requested = BTreeMap::new();
  let mut total_cents: i64 = 0;
  for (idx, item) in items.iter().enumerate() {
    if item.quantity <= 0 {
      return Err(AppError::Validation(format!(
        "Line {}: quantity must be a positive number, got {}.",
        idx, item.quantity
      )));
    }
    if item.unit_price_cents < 0 {
      return Err(AppError::Validation(format!(
        "Line {}: unit price cannot be negative, got {}.",
        idx, item.unit_price_cents
      )));
    }
    total_cents = item
      .unit_price_cents
      .checked_mul(i64::from(item.quantity))
      .and_then(|line_total| total_cents.checked_add(line_total))
      .ok_or_else(|| AppError::Validation(format!("Line {}: order total exceeds the supported amount.", idx)))?;
    *requested.entry(item.product_id).or_insert(0i64) += i64::from(item.quantity);
  }
  Ok(requested)
}

pub fn find_shortfalls(requested: &BTreeMap<Uuid, i64>, products: &HashMap<Uuid, Product>) -> Vec<StockShortfall> {
  requested
    .iter()
    .filter_map(|(product_id, &quantity)| {
      let available = products.get(product_id).map_or(0, |p| p.stock);
      (i64::from(available) < quantity).then(|| StockShortfall {
        product_id: *product_id,
        requested: quantity,
        available,
      })
    })
    .collect()
}

fn build_decrements(requested: &BTreeMap<Uuid, i64>) -> Result<Vec<StockDecrement>, AppError> {
  requested
    .iter()
    .map(|(product_id, &quantity)| {
      let quantity = i32::try_from(quantity)
        .map_err(|_| AppError::Internal(format!("Verified quantity {} for {} exceeds i32.", quantity, product_id)))?;
      Ok(StockDecrement {
        product_id: *product_id,
        quantity,
      })
    })
    .collect()
}

fn build_new_order(user_id: Uuid, items: &[LineItemRequest]) -> NewOrder {
  NewOrder {
    id: Uuid::new_v4(),
    user_id,
    created_at: Utc::now(),
    items: items
      .iter()
      .map(|item| NewOrderItem {
        id: Uuid::new_v4(),
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price_cents: item.unit_price_cents,
      })
      .collect(),
  }
}
