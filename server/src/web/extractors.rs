// orderdesk/src/web/extractors.rs

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;

/// The signed-in user behind the request's session cookie.
///
/// Handlers that take this argument reject unauthenticated requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
      return Box::pin(async { Err::<Self, _>(AppError::Internal("Application state is not configured.".to_string())) });
    };
    let token = req
      .cookie(&state.config.session_cookie_name)
      .map(|cookie| cookie.value().to_string());

    Box::pin(async move {
      let Some(token) = token else {
        warn!("Request without a session cookie.");
        return Err(AppError::Auth("Sign in required.".to_string()));
      };
      let user_id = auth_service::authenticate(&state, &token).await?;
      Ok(AuthenticatedUser { user_id })
    })
  }
}
