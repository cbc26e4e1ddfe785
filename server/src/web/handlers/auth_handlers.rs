// orderdesk/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;

// --- Request DTO ---
#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

fn session_cookie(name: &str, value: String, max_age: CookieDuration) -> Cookie<'static> {
  Cookie::build(name.to_string(), value)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(max_age)
    .finish()
}

#[instrument(name = "handler::signin", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let session = auth_service::sign_in(&app_state, &req_payload.email, &req_payload.password).await?;

  let cookie = session_cookie(
    &app_state.config.session_cookie_name,
    session.token,
    CookieDuration::seconds((session.expires_at - session.created_at).num_seconds()),
  );
  info!(user_id = %session.user_id, "Signin successful.");
  Ok(HttpResponse::Ok().cookie(cookie).json(json!({
      "userId": session.user_id.to_string(),
      "expiresAt": session.expires_at,
  })))
}

/// Drops the server-side session, if any, and expires the cookie.
#[instrument(name = "handler::signout", skip(app_state, req))]
pub async fn signout_handler(app_state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
  let cookie_name = &app_state.config.session_cookie_name;
  if let Some(cookie) = req.cookie(cookie_name) {
    auth_service::sign_out(&app_state, cookie.value()).await?;
  }

  Ok(
    HttpResponse::Ok()
      .cookie(session_cookie(cookie_name, String::new(), CookieDuration::ZERO))
      .json(json!({ "signedOut": true })),
  )
}
