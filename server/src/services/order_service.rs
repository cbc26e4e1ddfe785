// orderdesk/src/services/order_service.rs

use orderdesk_flow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{LineItemRequest, OrderWithItems};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::state::AppState;

/// Places an order for `user_id`: checks every line against current stock,
/// then writes the order and decrements stock in one transaction.
///
/// Either the whole order is placed or nothing changes.
#[instrument(name = "order_service::place_order", skip(state, items), fields(user_id = %user_id, lines = items.len()))]
pub async fn place_order(state: &AppState, user_id: Uuid, items: Vec<LineItemRequest>) -> Result<OrderWithItems> {
  let ctx_data = ContextData::new(PlaceOrderCtxData::new(state.store.clone(), user_id, items));

  match state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let placed = ctx_data.write().placed_order.take();
      placed.ok_or_else(|| {
        warn!("Place order pipeline completed without an order in context.");
        AppError::Internal("Order placement completed without producing an order.".to_string())
      })
    }
    PipelineResult::Stopped => {
      warn!("Place order pipeline was stopped by a handler.");
      Err(AppError::Internal("Order placement was halted by an internal step.".to_string()))
    }
  }
}

/// Reads an order back for its owner. Orders of other users look absent.
#[instrument(name = "order_service::get_order_for_user", skip(state))]
pub async fn get_order_for_user(state: &AppState, user_id: Uuid, order_id: Uuid) -> Result<OrderWithItems> {
  match state.store.find_order(order_id).await? {
    Some(order) if order.order.user_id == user_id => {
      info!(items = order.items.len(), "Order fetched.");
      Ok(order)
    }
    _ => Err(AppError::NotFound(format!("Order with ID {} not found.", order_id))),
  }
}
