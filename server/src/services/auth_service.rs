// orderdesk/src/services/auth_service.rs

//! Password hashing and cookie sessions.

use crate::errors::AppError;
use crate::models::Session;
use crate::state::AppState;
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const SESSION_TOKEN_BYTES: usize = 32;

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch. A stored hash that cannot be parsed is an
/// internal error, not a failed sign-in.
#[instrument(
  name = "auth_service::verify_password",
  skip(hashed_password_str, provided_password),
  err(Display),
  fields(hash_len = hashed_password_str.len())
)]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if hashed_password_str.is_empty() {
    return Err(AppError::Auth("Invalid stored password format (empty).".to_string()));
  }
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// 256 random bits from the OS generator, hex encoded.
pub fn new_session_token() -> String {
  let mut bytes = [0u8; SESSION_TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Checks credentials and opens a new session for the user.
#[instrument(name = "auth_service::sign_in", skip_all, fields(email = %email), err(Display))]
pub async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<Session, AppError> {
  let email = email.trim();
  if email.is_empty() {
    return Err(AppError::Validation("Email is required.".to_string()));
  }

  let invalid = || AppError::Auth("Invalid email or password.".to_string());
  let Some(user) = state.store.find_user_by_email(email).await? else {
    warn!("Sign-in attempt for unknown email.");
    return Err(invalid());
  };
  if !verify_password(&user.password_hash, password)? {
    warn!(user_id = %user.id, "Sign-in attempt with wrong password.");
    return Err(invalid());
  }

  let now = Utc::now();
  let expires_at = now
    .checked_add_signed(state.config.session_ttl()?)
    .ok_or_else(|| AppError::Config("Session expiry is out of range.".to_string()))?;
  let session = Session {
    token: new_session_token(),
    user_id: user.id,
    created_at: now,
    expires_at,
  };
  state.store.insert_session(&session).await?;
  info!(user_id = %user.id, expires_at = %session.expires_at, "Session opened.");
  Ok(session)
}

/// Resolves a session token to its user. Expired sessions are removed.
#[instrument(name = "auth_service::authenticate", skip_all, err(Display))]
pub async fn authenticate(state: &AppState, token: &str) -> Result<Uuid, AppError> {
  let Some(session) = state.store.find_session(token).await? else {
    return Err(AppError::Auth("Session not found.".to_string()));
  };
  if session.is_expired_at(Utc::now()) {
    debug!(user_id = %session.user_id, "Session expired; removing it.");
    state.store.delete_session(token).await?;
    return Err(AppError::Auth("Session expired.".to_string()));
  }
  Ok(session.user_id)
}

#[instrument(name = "auth_service::sign_out", skip_all, err(Display))]
pub async fn sign_out(state: &AppState, token: &str) -> Result<(), AppError> {
  state.store.delete_session(token).await
}
