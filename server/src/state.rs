// orderdesk/src/state.rs
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::store::Store;
use orderdesk_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Builds the shared state and registers every pipeline against it.
  pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Result<Self> {
    let flows = FlowRegistry::<AppError>::new();
    pipelines::register_all_pipelines(&flows)?;
    Ok(Self {
      store,
      flows: Arc::new(flows),
      config: Arc::new(config),
    })
  }
}
