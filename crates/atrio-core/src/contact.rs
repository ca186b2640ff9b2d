//! Contact submissions — the records produced by the public contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A persisted contact-form submission.
///
/// Write-once: contacts are never updated; the only mutation is the
/// admin-only bulk delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub id:         i64,
  pub email:      String,
  pub names:      String,
  pub subject:    String,
  pub comment:    String,
  /// Submitter address as observed by the server, when available.
  pub ip:         Option<String>,
  /// Country derived from `ip` by a best-effort lookup.
  pub country:    Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for [`ContactStore::add_contact`](crate::store::ContactStore::add_contact).
///
/// `id` and `created_at` are store-assigned.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
  pub email:   String,
  pub names:   String,
  pub subject: String,
  pub comment: String,
  pub ip:      Option<String>,
  pub country: Option<String>,
}

impl NewContact {
  /// Reject submissions with any required field empty after trimming.
  /// `ip` and `country` are optional enrichment and never checked.
  pub fn validate(&self) -> Result<()> {
    required("email", &self.email)?;
    required("names", &self.names)?;
    required("subject", &self.subject)?;
    required("comment", &self.comment)?;
    Ok(())
  }
}

fn required(name: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(name));
  }
  Ok(())
}
