// orderdesk/src/config.rs

use crate::errors::{AppError, Result};
use chrono::{Duration, Utc};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  /// Apply the bundled migrations at startup.
  pub run_migrations: bool,

  pub session_cookie_name: String,
  pub session_ttl_hours: i64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let session_cookie_name = get_env("SESSION_COOKIE_NAME").unwrap_or_else(|_| "orderdesk_session".to_string());
    let session_ttl_hours = get_env("SESSION_TTL_HOURS")
      .unwrap_or_else(|_| "24".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_HOURS: {}", e)))?;
    session_ttl(session_ttl_hours)?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      session_cookie_name,
      session_ttl_hours,
    })
  }

  /// Session lifetime as a duration; fails for values `from_env` would reject.
  pub fn session_ttl(&self) -> Result<Duration> {
    session_ttl(self.session_ttl_hours)
  }
}

/// A TTL must be positive and still yield a representable expiry from now.
fn session_ttl(hours: i64) -> Result<Duration> {
  if hours <= 0 {
    return Err(AppError::Config("SESSION_TTL_HOURS must be positive".to_string()));
  }
  let ttl = Duration::try_hours(hours)
    .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
    .ok_or_else(|| AppError::Config(format!("SESSION_TTL_HOURS is out of range: {}", hours)))?;
  Ok(ttl)
}

impl Default for AppConfig {
  /// Local defaults with no database URL; suitable for the in-memory store.
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: String::new(),
      database_max_connections: 10,
      run_migrations: false,
      session_cookie_name: "orderdesk_session".to_string(),
      session_ttl_hours: 24,
    }
  }
}
