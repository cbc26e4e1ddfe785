// orderdesk/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::LineItemRequest;
use crate::services::order_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTO ---
#[derive(Deserialize, Debug)]
pub struct PlaceOrderRequestPayload {
  pub items: Vec<LineItemRequest>,
}

#[instrument(
  name = "handler::place_order",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, lines = req_payload.items.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let placed = order_service::place_order(&app_state, auth_user.user_id, payload.items).await?;

  info!(order_id = %placed.order.id, total_cents = placed.total_cents, "Order created.");
  Ok(HttpResponse::Created().json(placed))
}

#[instrument(name = "handler::get_order", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_service::get_order_for_user(&app_state, auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}
