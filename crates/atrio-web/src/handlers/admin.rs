//! Admin listings, gated by [`RequireAdmin`].

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use atrio_core::{
  contact::Contact,
  payment::{Payment, PaymentStatus},
  store::{ContactStore, PaymentStore, UserStore},
};

use crate::{AppState, auth::RequireAdmin, error::Error};

// ─── Contacts ────────────────────────────────────────────────────────────────

/// `GET /admin/contacts` — every submission, newest first.
pub async fn list_contacts<S>(
  _admin: RequireAdmin,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Contact>>, Error>
where
  S: ContactStore + UserStore + Clone + Send + Sync + 'static,
  <S as ContactStore>::Error: std::error::Error + Send + Sync + 'static,
  <S as UserStore>::Error: std::error::Error + Send + Sync + 'static,
{
  let contacts = state
    .store
    .list_contacts()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(Json(contacts))
}

#[derive(Serialize)]
pub struct Deleted {
  pub deleted: u64,
}

/// `DELETE /admin/contacts` — unconditionally removes every row.
pub async fn delete_contacts<S>(
  _admin: RequireAdmin,
  State(state): State<AppState<S>>,
) -> Result<Json<Deleted>, Error>
where
  S: ContactStore + UserStore + Clone + Send + Sync + 'static,
  <S as ContactStore>::Error: std::error::Error + Send + Sync + 'static,
  <S as UserStore>::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_all_contacts()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  tracing::info!(deleted, "admin cleared contact submissions");
  Ok(Json(Deleted { deleted }))
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
  pub start:   Option<NaiveDate>,
  pub end:     Option<NaiveDate>,
  pub service: Option<String>,
  pub status:  Option<PaymentStatus>,
}

/// `GET /admin/payments[?start=..&end=..|service=..|status=..]`
///
/// Filter precedence mirrors the admin search form: date range first,
/// then service substring, then status, else everything.
pub async fn list_payments<S>(
  _admin: RequireAdmin,
  State(state): State<AppState<S>>,
  Query(query): Query<PaymentQuery>,
) -> Result<Json<Vec<Payment>>, Error>
where
  S: PaymentStore + UserStore + Clone + Send + Sync + 'static,
  <S as PaymentStore>::Error: std::error::Error + Send + Sync + 'static,
  <S as UserStore>::Error: std::error::Error + Send + Sync + 'static,
{
  let payments = match query {
    PaymentQuery { start: Some(start), end: Some(end), .. } => {
      state.store.payments_by_date_range(start, end).await
    }
    PaymentQuery { service: Some(ref service), .. } => {
      state.store.payments_by_service(service).await
    }
    PaymentQuery { status: Some(status), .. } => {
      state.store.payments_by_status(status).await
    }
    _ => state.store.list_payments().await,
  }
  .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(Json(payments))
}
