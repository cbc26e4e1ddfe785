// orderdesk/src/pipelines/mod.rs

//! Step pipelines used by the application and their registration.

use crate::errors::AppError;
use orderdesk_flow::{FlowRegistry, FlowResult};

pub mod contexts;
pub mod place_order_pipeline;

/// Registers every pipeline with `registry`. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  tracing::info!("Registering pipelines...");

  place_order_pipeline::register_place_order_pipeline(registry)?;

  tracing::info!("All application pipelines registered.");
  Ok(())
}
