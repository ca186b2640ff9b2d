//! HTTP layer for atrio.
//!
//! Exposes an axum [`Router`] with the public submission forms and the
//! auth-gated admin endpoints, backed by any store implementing the
//! `atrio-core` traits. View rendering is out of scope — every endpoint
//! speaks JSON.

pub mod auth;
pub mod enrich;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use atrio_core::store::{ContactStore, PaymentStore, UserStore};
use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use enrich::{CaptchaClient, GeoClient, Notifier};
use handlers::{admin, contact, payment};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ATRIO_*` environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:    String,
  pub port:    u16,
  pub db_path: PathBuf,

  /// reCAPTCHA secret. When absent, captcha verification is skipped.
  #[serde(default)]
  pub recaptcha_secret: Option<String>,

  /// Base URL of the ipapi.co-compatible geolocation service.
  #[serde(default = "default_geo_base_url")]
  pub geo_base_url: String,

  /// Addresses notified of new contact submissions. Delivery is a logged
  /// boundary — no mail transport is wired in.
  #[serde(default)]
  pub notify_recipients: Vec<String>,
}

fn default_geo_base_url() -> String { "https://ipapi.co".to_string() }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. Configuration is
/// consumed when the collaborators are built; the handlers only ever see
/// these.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub geo:      Arc<GeoClient>,
  pub captcha:  Arc<CaptchaClient>,
  pub notifier: Arc<Notifier>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the intake server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContactStore + PaymentStore + UserStore + Clone + Send + Sync + 'static,
  <S as ContactStore>::Error: std::error::Error + Send + Sync + 'static,
  <S as PaymentStore>::Error: std::error::Error + Send + Sync + 'static,
  <S as UserStore>::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/contact", post(contact::submit::<S>))
    .route("/payment", post(payment::submit::<S>))
    .route(
      "/admin/contacts",
      get(admin::list_contacts::<S>).delete(admin::delete_contacts::<S>),
    )
    .route("/admin/payments", get(admin::list_payments::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
