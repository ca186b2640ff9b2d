//! HTTP Basic-auth gate in front of the admin endpoints.
//!
//! Credentials resolve against the `users` table via [`UserStore`]; the
//! record stores themselves enforce nothing. Gate decisions happen
//! strictly before any admin store operation is invoked.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use atrio_core::{store::UserStore, user::User};

use crate::{AppState, error::Error};

/// Zero-size marker: present in a handler means the request was made by
/// an authenticated admin.
pub struct RequireAdmin;

/// Decode a `Basic` authorization header into `(username, password)`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((username.to_string(), password.to_string()))
}

/// Verify `password` against a stored argon2 PHC string.
pub fn verify_password(hash: &str, password: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Authenticate the request against the user table and require the admin
/// flag. Provider-only accounts (no password hash) cannot use Basic auth.
pub async fn verify_admin<S>(headers: &HeaderMap, store: &S) -> Result<User, Error>
where
  S: UserStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let (username, password) = basic_credentials(headers)?;

  let user = store
    .user_by_username(&username)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthorized)?;

  let hash = user.password_hash.as_deref().ok_or(Error::Unauthorized)?;
  if !verify_password(hash, &password) {
    return Err(Error::Unauthorized);
  }
  if !user.admin {
    return Err(Error::Forbidden);
  }
  Ok(user)
}

impl<S> FromRequestParts<AppState<S>> for RequireAdmin
where
  S: UserStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_admin(&parts.headers, state.store.as_ref()).await?;
    Ok(RequireAdmin)
  }
}
