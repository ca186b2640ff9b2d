//! User accounts consulted by the auth gate in front of admin routes.
//!
//! Exclusively managed by the auth layer; the record stores never touch
//! the underlying table.

use chrono::{DateTime, Utc};

/// A persisted account.
#[derive(Debug, Clone)]
pub struct User {
  pub id:            i64,
  pub username:      String,
  /// Argon2 PHC string. `None` for accounts created by an external
  /// identity provider — those cannot authenticate with a password.
  pub password_hash: Option<String>,
  /// External-provider identity, unique when present.
  pub provider_id:   Option<String>,
  pub admin:         bool,
  pub created_at:    DateTime<Utc>,
}

/// Input for [`UserStore::create_user`](crate::store::UserStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: Option<String>,
  pub provider_id:   Option<String>,
  pub admin:         bool,
}
