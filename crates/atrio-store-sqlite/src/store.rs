//! [`SqliteStore`] — the SQLite implementation of the record-store traits.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use atrio_core::{
  contact::{Contact, NewContact},
  payment::{NewPayment, Payment, PaymentStatus},
  store::{ContactStore, PaymentStore, UserStore},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawContact, RawPayment, RawUser, encode_date, encode_dt, encode_status,
  },
  migrate,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An atrio record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. A value
/// of this type is only obtainable after migrations succeeded, so every
/// operation runs against a reconciled schema.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run pending migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.migrate().await?;
    Ok(store)
  }

  async fn migrate(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(
          "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;",
        )?;
        migrate::run(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn add_contact(&self, input: NewContact) -> Result<Contact> {
    input.validate()?;

    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (email, names, subject, comment, ip, country, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.email,
            row.names,
            row.subject,
            row.comment,
            row.ip,
            row.country,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Contact {
      id,
      email: input.email,
      names: input.names,
      subject: input.subject,
      comment: input.comment,
      ip: input.ip,
      country: input.country,
      created_at,
    })
  }

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, email, names, subject, comment, ip, country, created_at
           FROM contacts
           ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawContact {
              id:         row.get(0)?,
              email:      row.get(1)?,
              names:      row.get(2)?,
              subject:    row.get(3)?,
              comment:    row.get(4)?,
              ip:         row.get(5)?,
              country:    row.get(6)?,
              created_at: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn delete_all_contacts(&self) -> Result<u64> {
    let deleted = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM contacts", [])? as u64))
      .await?;
    Ok(deleted)
  }
}

// ─── PaymentStore impl ───────────────────────────────────────────────────────

fn payment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPayment> {
  Ok(RawPayment {
    id:             row.get(0)?,
    service:        row.get(1)?,
    amount:         row.get(2)?,
    payment_date:   row.get(3)?,
    payment_status: row.get(4)?,
    created_at:     row.get(5)?,
  })
}

impl SqliteStore {
  /// Run a payment query with one optional parameter and decode the rows.
  async fn payment_query(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<Payment>> {
    let raws: Vec<RawPayment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            payment_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPayment::into_payment).collect()
  }
}

impl PaymentStore for SqliteStore {
  type Error = Error;

  async fn add_payment(&self, input: NewPayment) -> Result<Payment> {
    input.validate()?;

    // No gateway in scope: the submission is recorded as completed.
    let now = Utc::now();
    let payment = Payment {
      id:           0,
      service:      input.service,
      amount:       input.amount,
      payment_date: now,
      status:       PaymentStatus::Completed,
      created_at:   now,
    };

    let service = payment.service.clone();
    let amount = payment.amount;
    let date_str = encode_dt(payment.payment_date);
    let status_str = encode_status(payment.status).to_owned();
    let at_str = encode_dt(payment.created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO payments (service, amount, payment_date, payment_status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![service, amount, date_str, status_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Payment { id, ..payment })
  }

  async fn list_payments(&self) -> Result<Vec<Payment>> {
    self
      .payment_query(
        "SELECT id, service, amount, payment_date, payment_status, created_at
         FROM payments
         ORDER BY created_at DESC, id DESC",
        vec![],
      )
      .await
  }

  async fn payments_by_date_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Payment>> {
    self
      .payment_query(
        "SELECT id, service, amount, payment_date, payment_status, created_at
         FROM payments
         WHERE date(payment_date) BETWEEN ?1 AND ?2
         ORDER BY created_at DESC, id DESC",
        vec![encode_date(start), encode_date(end)],
      )
      .await
  }

  async fn payments_by_service(&self, pattern: &str) -> Result<Vec<Payment>> {
    // instr() rather than LIKE: SQLite LIKE is case-insensitive for
    // ASCII, and this match must be case-sensitive.
    self
      .payment_query(
        "SELECT id, service, amount, payment_date, payment_status, created_at
         FROM payments
         WHERE instr(service, ?1) > 0
         ORDER BY created_at DESC, id DESC",
        vec![pattern.to_owned()],
      )
      .await
  }

  async fn payments_by_status(
    &self,
    status: PaymentStatus,
  ) -> Result<Vec<Payment>> {
    self
      .payment_query(
        "SELECT id, service, amount, payment_date, payment_status, created_at
         FROM payments
         WHERE payment_status = ?1
         ORDER BY created_at DESC, id DESC",
        vec![encode_status(status).to_owned()],
      )
      .await
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = Error;

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, password_hash, provider_id, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            row.username,
            row.password_hash,
            row.provider_id,
            row.admin,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User {
      id,
      username: input.username,
      password_hash: input.password_hash,
      provider_id: input.provider_id,
      admin: input.admin,
      created_at,
    })
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, username, password_hash, provider_id, is_admin, created_at
               FROM users WHERE username = ?1",
              rusqlite::params![name],
              |row| {
                Ok(RawUser {
                  id:            row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                  provider_id:   row.get(3)?,
                  is_admin:      row.get(4)?,
                  created_at:    row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}
