// orderdesk/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use orderdesk_flow::FlowError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// One product that cannot cover the quantity requested for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortfall {
  pub product_id: Uuid,
  /// Summed over every line of the request that references the product.
  pub requested: i64,
  pub available: i32,
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Insufficient stock for {} product(s)", .0.len())]
  InsufficientStock(Vec<StockShortfall>),

  /// A concurrent commit changed stock after this request validated it.
  /// Re-running the whole placement is safe.
  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(err) => AppError::Internal(err.to_string()),
      },
    }
  }
}

impl AppError {
  /// Whether re-sending the same request may succeed without changing it.
  pub fn is_retryable(&self) -> bool {
    matches!(self, AppError::Conflict(_))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }

    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) => json!({ "error": m }),
      AppError::InsufficientStock(shortfalls) => json!({
        "error": "Insufficient stock",
        "shortfalls": shortfalls,
      }),
      AppError::Conflict(m) => json!({ "error": m, "retryable": true }),
      AppError::Sqlx(_) => json!({ "error": "Database operation failed" }),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        json!({ "error": "Workflow processing error" })
      }
      AppError::Config(_) | AppError::Internal(_) => json!({ "error": "An internal error occurred" }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
