//! Integration tests for `SqliteStore` against an in-memory database,
//! plus direct tests of the migration runner against legacy shapes.

use atrio_core::{
  contact::NewContact,
  payment::{NewPayment, PaymentStatus},
  store::{ContactStore, PaymentStore, UserStore},
  user::NewUser,
};
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::{Error, SqliteStore, migrate};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn contact(email: &str) -> NewContact {
  NewContact {
    email:   email.into(),
    names:   "Alice Liddell".into(),
    subject: "Quote request".into(),
    comment: "Please get back to me.".into(),
    ip:      Some("203.0.113.9".into()),
    country: Some("Wonderland".into()),
  }
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_contact_round_trip() {
  let s = store().await;

  let added = s.add_contact(contact("alice@example.com")).await.unwrap();
  assert!(added.id > 0);

  let listed = s.list_contacts().await.unwrap();
  assert_eq!(listed.len(), 1);

  let got = &listed[0];
  assert_eq!(got.id, added.id);
  assert_eq!(got.email, "alice@example.com");
  assert_eq!(got.names, "Alice Liddell");
  assert_eq!(got.subject, "Quote request");
  assert_eq!(got.comment, "Please get back to me.");
  assert_eq!(got.ip.as_deref(), Some("203.0.113.9"));
  assert_eq!(got.country.as_deref(), Some("Wonderland"));
  assert_eq!(got.created_at, added.created_at);
}

#[tokio::test]
async fn list_contacts_newest_first() {
  let s = store().await;
  let first = s.add_contact(contact("a@example.com")).await.unwrap();
  let second = s.add_contact(contact("b@example.com")).await.unwrap();
  let third = s.add_contact(contact("c@example.com")).await.unwrap();

  let listed = s.list_contacts().await.unwrap();
  let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
  assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn add_contact_rejects_empty_required_fields() {
  let s = store().await;

  for field in ["email", "names", "subject", "comment"] {
    let mut input = contact("a@example.com");
    match field {
      "email" => input.email.clear(),
      "names" => input.names.clear(),
      "subject" => input.subject.clear(),
      _ => input.comment.clear(),
    }

    let err = s.add_contact(input).await.unwrap_err();
    assert!(
      matches!(
        err,
        Error::Validation(atrio_core::Error::MissingField(f)) if f == field
      ),
      "expected MissingField({field})"
    );
  }

  // No insert happened for any of the rejected submissions.
  assert!(s.list_contacts().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_all_contacts_empties_the_table() {
  let s = store().await;
  s.add_contact(contact("a@example.com")).await.unwrap();
  s.add_contact(contact("b@example.com")).await.unwrap();

  let deleted = s.delete_all_contacts().await.unwrap();
  assert_eq!(deleted, 2);
  assert!(s.list_contacts().await.unwrap().is_empty());

  // Deleting again is harmless.
  assert_eq!(s.delete_all_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn optional_enrichment_fields_may_be_absent() {
  let s = store().await;
  let input = NewContact { ip: None, country: None, ..contact("a@example.com") };

  let added = s.add_contact(input).await.unwrap();
  assert!(added.ip.is_none());
  assert!(added.country.is_none());

  let listed = s.list_contacts().await.unwrap();
  assert!(listed[0].ip.is_none());
  assert!(listed[0].country.is_none());
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_payment_records_completed_status() {
  let s = store().await;

  let payment = s
    .add_payment(NewPayment { service: "Web Hosting".into(), amount: 49.99 })
    .await
    .unwrap();
  assert!(payment.id > 0);
  assert_eq!(payment.status, PaymentStatus::Completed);

  let listed = s.list_payments().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].service, "Web Hosting");
  assert_eq!(listed[0].amount, 49.99);
  assert_eq!(listed[0].status, PaymentStatus::Completed);
}

#[tokio::test]
async fn add_payment_rejects_negative_amount() {
  let s = store().await;

  let err = s
    .add_payment(NewPayment { service: "Web Hosting".into(), amount: -5.0 })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(atrio_core::Error::InvalidAmount(_))
  ));
  assert!(s.list_payments().await.unwrap().is_empty());
}

/// Insert a payment row with a chosen payment date, bypassing the
/// store-assigned timestamps.
async fn seed_payment(s: &SqliteStore, service: &str, date: &str, created: &str) {
  let service = service.to_owned();
  let date = date.to_owned();
  let created = created.to_owned();
  s.conn
    .call(move |conn| {
      conn.execute(
        "INSERT INTO payments (service, amount, payment_date, payment_status, created_at)
         VALUES (?1, 10.0, ?2, 'completed', ?3)",
        rusqlite::params![service, date, created],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn payments_by_date_range_is_inclusive_and_ordered() {
  let s = store().await;
  seed_payment(&s, "jan-first", "2024-01-01T00:00:00+00:00", "2024-01-01T09:00:00+00:00").await;
  seed_payment(&s, "jan-mid", "2024-01-15T12:30:00+00:00", "2024-01-15T12:30:00+00:00").await;
  seed_payment(&s, "jan-last", "2024-01-31T23:59:00+00:00", "2024-01-31T23:59:00+00:00").await;
  seed_payment(&s, "feb", "2024-02-01T00:00:00+00:00", "2024-02-01T00:00:00+00:00").await;

  let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
  let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
  let in_range = s.payments_by_date_range(start, end).await.unwrap();

  let services: Vec<&str> =
    in_range.iter().map(|p| p.service.as_str()).collect();
  // Both boundary days included, February excluded, newest first.
  assert_eq!(services, vec!["jan-last", "jan-mid", "jan-first"]);
}

#[tokio::test]
async fn payments_by_service_is_case_sensitive_substring() {
  let s = store().await;
  s.add_payment(NewPayment { service: "Web Hosting".into(), amount: 10.0 })
    .await
    .unwrap();
  s.add_payment(NewPayment { service: "web design".into(), amount: 20.0 })
    .await
    .unwrap();

  let hits = s.payments_by_service("Host").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].service, "Web Hosting");

  // Case matters.
  assert!(s.payments_by_service("host").await.unwrap().is_empty());
  // Substring anywhere in the name matches.
  assert_eq!(s.payments_by_service("eb").await.unwrap().len(), 2);
}

#[tokio::test]
async fn payments_by_status_matches_exactly() {
  let s = store().await;
  s.add_payment(NewPayment { service: "Web Hosting".into(), amount: 10.0 })
    .await
    .unwrap();
  seed_payment(&s, "stuck", "2024-03-01T00:00:00+00:00", "2024-03-01T00:00:00+00:00").await;
  s.conn
    .call(|conn| {
      conn.execute(
        "UPDATE payments SET payment_status = 'pending' WHERE service = 'stuck'",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let completed = s.payments_by_status(PaymentStatus::Completed).await.unwrap();
  assert_eq!(completed.len(), 1);
  assert_eq!(completed[0].service, "Web Hosting");

  let pending = s.payments_by_status(PaymentStatus::Pending).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].service, "stuck");
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_user() {
  let s = store().await;

  let created = s
    .create_user(NewUser {
      username:      "admin".into(),
      password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def".into()),
      provider_id:   None,
      admin:         true,
    })
    .await
    .unwrap();
  assert!(created.id > 0);

  let fetched = s.user_by_username("admin").await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert!(fetched.admin);
  assert_eq!(fetched.password_hash, created.password_hash);

  assert!(s.user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_storage_error() {
  let s = store().await;
  let input = NewUser {
    username:      "admin".into(),
    password_hash: None,
    provider_id:   None,
    admin:         false,
  };

  s.create_user(input.clone()).await.unwrap();
  let err = s.create_user(input).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn legacy_empty_password_hash_reads_as_none() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO users (username, password_hash, provider_id, is_admin, created_at)
         VALUES ('gh-user', '', 'gh:1234', 0, '2024-01-01T00:00:00+00:00')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let user = s.user_by_username("gh-user").await.unwrap().unwrap();
  assert!(user.password_hash.is_none());
  assert_eq!(user.provider_id.as_deref(), Some("gh:1234"));
}

// ─── Migrations ──────────────────────────────────────────────────────────────

fn user_version(conn: &Connection) -> u32 {
  conn
    .query_row("PRAGMA user_version", [], |row| row.get(0))
    .unwrap()
}

fn columns(conn: &Connection, table: &str) -> Vec<String> {
  let mut stmt = conn
    .prepare(&format!("PRAGMA table_info({table})"))
    .unwrap();
  stmt
    .query_map([], |row| row.get::<_, String>(1))
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

fn schema_snapshot(conn: &Connection) -> Vec<String> {
  let mut stmt = conn
    .prepare(
      "SELECT COALESCE(sql, '') FROM sqlite_master ORDER BY type, name",
    )
    .unwrap();
  stmt
    .query_map([], |row| row.get::<_, String>(0))
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

#[test]
fn migrations_are_idempotent_on_a_fresh_database() {
  let mut conn = Connection::open_in_memory().unwrap();

  migrate::run(&mut conn).unwrap();
  let version = user_version(&conn);
  let schema = schema_snapshot(&conn);

  migrate::run(&mut conn).unwrap();
  assert_eq!(user_version(&conn), version);
  assert_eq!(schema_snapshot(&conn), schema);
}

#[test]
fn legacy_contacts_without_subject_are_rebuilt_preserving_rows() {
  let mut conn = Connection::open_in_memory().unwrap();
  conn
    .execute_batch(
      "CREATE TABLE contacts (
          id         INTEGER PRIMARY KEY AUTOINCREMENT,
          email      TEXT,
          names      TEXT,
          comment    TEXT,
          ip         TEXT,
          country    TEXT,
          created_at TEXT
       );
       INSERT INTO contacts (email, names, comment, ip, country, created_at)
       VALUES ('old@example.com', 'Old Timer', 'Kept my message',
               '198.51.100.7', 'Chile', '2023-06-01T08:00:00+00:00');",
    )
    .unwrap();

  migrate::run(&mut conn).unwrap();

  let cols = columns(&conn, "contacts");
  assert_eq!(
    cols,
    vec![
      "id", "email", "names", "subject", "comment", "ip", "country",
      "created_at"
    ]
  );

  let (email, subject, comment, ip): (String, Option<String>, String, String) =
    conn
      .query_row(
        "SELECT email, subject, comment, ip FROM contacts",
        [],
        |row| {
          Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        },
      )
      .unwrap();
  assert_eq!(email, "old@example.com");
  assert!(subject.is_none());
  assert_eq!(comment, "Kept my message");
  assert_eq!(ip, "198.51.100.7");
}

#[test]
fn legacy_combined_country_ip_column_is_split() {
  let mut conn = Connection::open_in_memory().unwrap();
  conn
    .execute_batch(
      "CREATE TABLE contacts (
          id         INTEGER PRIMARY KEY AUTOINCREMENT,
          email      TEXT,
          names      TEXT,
          subject    TEXT,
          comment    TEXT,
          country_ip TEXT,
          created_at TEXT
       );
       INSERT INTO contacts (email, names, subject, comment, country_ip, created_at)
       VALUES ('a@example.com', 'A', 'Hi', 'Hello',
               'Mexico (203.0.113.9)', '2023-06-01T08:00:00+00:00'),
              ('b@example.com', 'B', 'Yo', 'Hey',
               'local', '2023-06-02T08:00:00+00:00');",
    )
    .unwrap();

  migrate::run(&mut conn).unwrap();

  let (country, ip): (Option<String>, Option<String>) = conn
    .query_row(
      "SELECT country, ip FROM contacts WHERE email = 'a@example.com'",
      [],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap();
  assert_eq!(country.as_deref(), Some("Mexico"));
  assert_eq!(ip.as_deref(), Some("203.0.113.9"));

  // A combined value with no parenthesised address keeps the country.
  let (country, ip): (Option<String>, Option<String>) = conn
    .query_row(
      "SELECT country, ip FROM contacts WHERE email = 'b@example.com'",
      [],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap();
  assert_eq!(country.as_deref(), Some("local"));
  assert!(ip.is_none());
}

#[test]
fn legacy_null_required_fields_survive_rebuild() {
  let mut conn = Connection::open_in_memory().unwrap();
  // Every column was nullable in the legacy schema; a rebuild must not
  // trip over NULLs heading into NOT NULL target columns.
  conn
    .execute_batch(
      "CREATE TABLE contacts (
          id         INTEGER PRIMARY KEY AUTOINCREMENT,
          email      TEXT,
          names      TEXT,
          comment    TEXT,
          ip         TEXT,
          country    TEXT,
          created_at TEXT
       );
       INSERT INTO contacts (email, names, comment, ip, country, created_at)
       VALUES (NULL, 'No Address', NULL, NULL, NULL, NULL);",
    )
    .unwrap();

  migrate::run(&mut conn).unwrap();

  let (email, names, comment, created_at): (String, String, String, String) =
    conn
      .query_row(
        "SELECT email, names, comment, created_at FROM contacts",
        [],
        |row| {
          Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        },
      )
      .unwrap();
  assert_eq!(email, "");
  assert_eq!(names, "No Address");
  assert_eq!(comment, "");
  assert_eq!(created_at, "1970-01-01T00:00:00+00:00");
}

#[test]
fn reconciled_database_is_not_rebuilt_again() {
  let mut conn = Connection::open_in_memory().unwrap();
  conn
    .execute_batch(
      "CREATE TABLE contacts (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          email TEXT, names TEXT, comment TEXT, created_at TEXT
       );",
    )
    .unwrap();

  migrate::run(&mut conn).unwrap();
  let schema = schema_snapshot(&conn);

  migrate::run(&mut conn).unwrap();
  assert_eq!(schema_snapshot(&conn), schema);
}

#[tokio::test]
async fn store_open_runs_migrations_before_serving() {
  // open_in_memory only returns once migrations have succeeded, so the
  // target tables are immediately usable.
  let s = store().await;
  s.add_contact(contact("a@example.com")).await.unwrap();
  s.add_payment(NewPayment { service: "x".into(), amount: 1.0 })
    .await
    .unwrap();
}
