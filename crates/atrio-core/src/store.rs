//! Store traits implemented by storage backends.
//!
//! Each trait owns exactly one table; no other component writes to the
//! underlying relation. A backend (e.g. `atrio-store-sqlite`) implements
//! all three on a single handle, and `atrio-web` is generic over them
//! rather than tied to a concrete backend.
//!
//! Every method returns a `Send` future, so the traits work on
//! multi-threaded runtimes without boxing.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  contact::{Contact, NewContact},
  payment::{NewPayment, Payment, PaymentStatus},
  user::{NewUser, User},
};

// ─── Contacts ────────────────────────────────────────────────────────────────

/// Durable CRUD access to contact submissions.
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate and insert one submission; returns the persisted record.
  /// `created_at` is store-assigned so the stored format is uniform.
  fn add_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// All contacts, newest first. Ordering is a query-level guarantee,
  /// not client-side sorting.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Unconditionally remove every contact row; returns the number
  /// deleted. Irreversible. Authorization must be decided before calling
  /// — the store enforces none.
  fn delete_all_contacts(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Payments ────────────────────────────────────────────────────────────────

/// Durable access to payment submissions. Write-once, read-many.
pub trait PaymentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate and insert one payment with status fixed at `completed`.
  /// `payment_date` and `created_at` are store-assigned.
  fn add_payment(
    &self,
    input: NewPayment,
  ) -> impl Future<Output = Result<Payment, Self::Error>> + Send + '_;

  /// All payments, newest first.
  fn list_payments(
    &self,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;

  /// Payments whose `payment_date` falls within `[start, end]`, bounds
  /// inclusive. Results remain ordered by creation time descending.
  fn payments_by_date_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;

  /// Payments whose `service` contains `pattern` (case-sensitive
  /// substring match).
  fn payments_by_service<'a>(
    &'a self,
    pattern: &'a str,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + 'a;

  /// Payments with exactly the given status.
  fn payments_by_status(
    &self,
    status: PaymentStatus,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Account storage for the auth gate.
pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new account. A duplicate username surfaces as a storage
  /// error.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up an account by username. Returns `None` if absent.
  fn user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;
}
