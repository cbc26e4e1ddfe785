// orderdesk/src/pipelines/contexts.rs

//! Data structs that pipelines run on, wrapped in `orderdesk_flow::ContextData`.

use crate::models::{LineItemRequest, OrderWithItems, Product};
use crate::store::Store;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

/// State carried through order placement.
#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub store: Arc<dyn Store>,
  pub user_id: Uuid,
  pub items: Vec<LineItemRequest>,
  /// Summed requested quantity per distinct product. Ordered by id so stock
  /// rows are always locked in the same order.
  pub requested_by_product: BTreeMap<Uuid, i64>,
  /// Snapshot taken before the commit; stock is re-checked at write time.
  pub products: HashMap<Uuid, Product>,
  pub placed_order: Option<OrderWithItems>,
}

impl PlaceOrderCtxData {
  pub fn new(store: Arc<dyn Store>, user_id: Uuid, items: Vec<LineItemRequest>) -> Self {
    Self {
      store,
      user_id,
      items,
      requested_by_product: BTreeMap::new(),
      products: HashMap::new(),
      placed_order: None,
    }
  }
}
