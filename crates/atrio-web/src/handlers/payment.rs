//! `POST /payment` — records a payment submission.
//!
//! No gateway is integrated: the stored record is an intent with status
//! `completed`, not a processed transaction.

use axum::{
  Form, Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use atrio_core::{
  payment::{self, NewPayment},
  store::PaymentStore,
};

use crate::{AppState, error::Error};

/// Urlencoded body of the public payment form. `amount` arrives as the
/// raw text the user typed.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
  #[serde(default)]
  pub service: String,
  #[serde(default)]
  pub amount:  String,
}

pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<PaymentForm>,
) -> Result<impl IntoResponse, Error>
where
  S: PaymentStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let amount = payment::parse_amount(&form.amount)?;
  let input = NewPayment {
    service: form.service.trim().to_string(),
    amount,
  };

  let payment = state
    .store
    .add_payment(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(payment)))
}
