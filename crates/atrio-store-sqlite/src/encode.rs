//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings so lexicographic and
//! chronological order agree — `ORDER BY created_at` relies on this.
//! Payment statuses are stored as lowercase text, amounts as REAL.

use atrio_core::{
  contact::Contact,
  payment::{Payment, PaymentStatus},
  user::User,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

/// Calendar-date bound for range queries, compared against
/// `date(payment_date)` in SQL.
pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── PaymentStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: PaymentStatus) -> &'static str {
  match s {
    PaymentStatus::Completed => "completed",
    PaymentStatus::Pending => "pending",
    PaymentStatus::Failed => "failed",
  }
}

pub fn decode_status(s: &str) -> Result<PaymentStatus> {
  match s {
    "completed" => Ok(PaymentStatus::Completed),
    "pending" => Ok(PaymentStatus::Pending),
    "failed" => Ok(PaymentStatus::Failed),
    other => Err(Error::Decode(format!("unknown payment status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:         i64,
  pub email:      String,
  pub names:      String,
  /// Nullable: rows migrated from the pre-`subject` table shape.
  pub subject:    Option<String>,
  pub comment:    String,
  pub ip:         Option<String>,
  pub country:    Option<String>,
  pub created_at: String,
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:         self.id,
      email:      self.email,
      names:      self.names,
      subject:    self.subject.unwrap_or_default(),
      comment:    self.comment,
      ip:         self.ip,
      country:    self.country,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `payments` row.
pub struct RawPayment {
  pub id:             i64,
  pub service:        String,
  pub amount:         f64,
  pub payment_date:   String,
  pub payment_status: String,
  pub created_at:     String,
}

impl RawPayment {
  pub fn into_payment(self) -> Result<Payment> {
    Ok(Payment {
      id:           self.id,
      service:      self.service,
      amount:       self.amount,
      payment_date: decode_dt(&self.payment_date)?,
      status:       decode_status(&self.payment_status)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: Option<String>,
  pub provider_id:   Option<String>,
  pub is_admin:      bool,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      // An empty hash is a legacy provider-only marker; normalise to None.
      password_hash: self.password_hash.filter(|h| !h.is_empty()),
      provider_id:   self.provider_id,
      admin:         self.is_admin,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
