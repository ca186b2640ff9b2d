//! Payment submissions.
//!
//! No payment gateway is integrated: a stored payment is a recorded
//! intent, not a processed transaction, and always carries status
//! `completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifecycle status of a recorded payment.
///
/// Only [`Completed`](PaymentStatus::Completed) is produced today; the
/// other variants exist so rows written by a future gateway integration
/// remain queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Completed,
  Pending,
  Failed,
}

/// A persisted payment submission. Immutable; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
  pub id:           i64,
  pub service:      String,
  pub amount:       f64,
  pub payment_date: DateTime<Utc>,
  pub status:       PaymentStatus,
  pub created_at:   DateTime<Utc>,
}

/// Input for [`PaymentStore::add_payment`](crate::store::PaymentStore::add_payment).
///
/// `payment_date`, `status` and `created_at` are store-assigned.
#[derive(Debug, Clone)]
pub struct NewPayment {
  pub service: String,
  pub amount:  f64,
}

impl NewPayment {
  /// The amount must be a finite, non-negative number.
  pub fn validate(&self) -> Result<()> {
    if !self.amount.is_finite() || self.amount < 0.0 {
      return Err(Error::InvalidAmount(self.amount.to_string()));
    }
    Ok(())
  }
}

/// Parse a user-supplied amount string into a non-negative decimal.
pub fn parse_amount(raw: &str) -> Result<f64> {
  let amount: f64 = raw
    .trim()
    .parse()
    .map_err(|_| Error::InvalidAmount(raw.to_string()))?;

  if !amount.is_finite() || amount < 0.0 {
    return Err(Error::InvalidAmount(raw.to_string()));
  }
  Ok(amount)
}
