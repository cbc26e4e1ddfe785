// orderdesk-flow/src/lib.rs

//! orderdesk-flow: async, type-safe step pipelines.
//!
//! A pipeline is an ordered list of named steps. Each step carries `before`,
//! `on` and `after` handlers that run against a shared `ContextData<T>` and
//! either continue, stop the run, or fail it with the pipeline's error type.
//! Steps can be optional, skipped by a condition, inserted or removed after
//! construction. A `FlowRegistry` holds one pipeline per context type so that
//! callers dispatch by handing over the context alone.
//!
//! ```ignore
//! let mut p = Pipeline::<OrderCtx, AppError>::new(&[("validate", false, None), ("commit", false, None)]);
//! p.on_root("validate", |ctx| Box::pin(async move { /* ... */ Ok::<_, AppError>(PipelineControl::Continue) }))?;
//! registry.register_pipeline(p);
//! registry.run(ContextData::new(order_ctx)).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
