//! Versioned schema migrations, gated on `PRAGMA user_version`.
//!
//! The list is explicit and ordered. Each migration runs inside its own
//! transaction and bumps `user_version` on commit, so a half-applied step
//! can never be observed and re-running the list against an up-to-date
//! database performs no work. Any failure aborts the open and surfaces
//! the underlying storage error.

use rusqlite::Connection;

pub(crate) struct Migration {
  pub version: u32,
  pub name:    &'static str,
  pub apply:   fn(&Connection) -> rusqlite::Result<()>,
}

pub(crate) const MIGRATIONS: &[Migration] = &[
  Migration { version: 1, name: "baseline tables", apply: baseline },
  Migration {
    version: 2,
    name:    "reconcile contacts shape",
    apply:   reconcile_contacts,
  },
];

/// Run every migration newer than the database's `user_version`, in order.
pub(crate) fn run(conn: &mut Connection) -> rusqlite::Result<()> {
  for m in MIGRATIONS {
    let version: u32 =
      conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version >= m.version {
      continue;
    }

    let tx = conn.transaction()?;
    (m.apply)(&tx)?;
    tx.pragma_update(None, "user_version", m.version)?;
    tx.commit()?;
    tracing::info!(version = m.version, name = m.name, "applied migration");
  }
  Ok(())
}

// ─── v1: baseline ────────────────────────────────────────────────────────────

/// Create the three tables in their target shapes. `IF NOT EXISTS` makes
/// this a no-op on populated legacy databases — v2 then reconciles any
/// drifted `contacts` shape.
fn baseline(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    "CREATE TABLE IF NOT EXISTS contacts (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        email      TEXT NOT NULL,
        names      TEXT NOT NULL,
        subject    TEXT,             -- nullable: legacy rows predate it
        comment    TEXT NOT NULL,
        ip         TEXT,
        country    TEXT,
        created_at TEXT NOT NULL     -- RFC 3339 UTC; store-assigned
     );

     CREATE TABLE IF NOT EXISTS payments (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        service        TEXT NOT NULL,
        amount         REAL NOT NULL,
        payment_date   TEXT NOT NULL,
        payment_status TEXT NOT NULL, -- 'completed' | 'pending' | 'failed'
        created_at     TEXT NOT NULL
     );

     CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT,           -- argon2 PHC; NULL for provider-only
        provider_id   TEXT UNIQUE,
        is_admin      INTEGER NOT NULL DEFAULT 0,
        created_at    TEXT NOT NULL
     );

     CREATE INDEX IF NOT EXISTS contacts_created_idx ON contacts(created_at);
     CREATE INDEX IF NOT EXISTS payments_created_idx ON payments(created_at);
     CREATE INDEX IF NOT EXISTS payments_date_idx    ON payments(payment_date);",
  )
}

// ─── v2: reconcile contacts shape ────────────────────────────────────────────

/// Target column set for `contacts`; also the physical column order of a
/// rebuilt table.
const CONTACT_COLUMNS: [&str; 8] = [
  "id", "email", "names", "subject", "comment", "ip", "country", "created_at",
];

/// Compare the actual `contacts` columns against [`CONTACT_COLUMNS`] and,
/// if they differ, rebuild: create a replacement table with the target
/// shape, copy forward every column present in both shapes (splitting a
/// legacy combined `country_ip` display column back into `ip` and
/// `country`), then swap the replacement in. Columns absent from the
/// target shape are dropped — accepted data loss.
fn reconcile_contacts(conn: &Connection) -> rusqlite::Result<()> {
  let actual = table_columns(conn, "contacts")?;
  if actual.iter().map(String::as_str).eq(CONTACT_COLUMNS) {
    return Ok(());
  }

  tracing::warn!(columns = ?actual, "contacts table shape drifted, rebuilding");

  conn.execute_batch(
    "CREATE TABLE contacts_new (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        email      TEXT NOT NULL,
        names      TEXT NOT NULL,
        subject    TEXT,
        comment    TEXT NOT NULL,
        ip         TEXT,
        country    TEXT,
        created_at TEXT NOT NULL
     );",
  )?;

  let select: Vec<String> = CONTACT_COLUMNS
    .iter()
    .map(|col| source_expr(col, &actual))
    .collect();

  conn.execute(
    &format!(
      "INSERT INTO contacts_new ({}) SELECT {} FROM contacts",
      CONTACT_COLUMNS.join(", "),
      select.join(", "),
    ),
    [],
  )?;

  conn.execute("DROP TABLE contacts", [])?;
  conn.execute("ALTER TABLE contacts_new RENAME TO contacts", [])?;
  conn.execute(
    "CREATE INDEX IF NOT EXISTS contacts_created_idx ON contacts(created_at)",
    [],
  )?;
  Ok(())
}

/// SQL expression producing the value of target column `col` from one row
/// of the legacy table whose columns are `actual`.
///
/// The legacy schema declared every column nullable, so carried-over
/// values destined for a NOT NULL target column are coalesced; otherwise
/// a single NULL row would abort the rebuild on every boot.
fn source_expr(col: &str, actual: &[String]) -> String {
  if actual.iter().any(|a| a == col) {
    return match col {
      "email" | "names" | "comment" => format!("COALESCE({col}, '')"),
      "created_at" => {
        "COALESCE(created_at, '1970-01-01T00:00:00+00:00')".to_string()
      }
      _ => col.to_string(),
    };
  }

  // Legacy combined display column, formatted "<country> (<ip>)".
  let combined = actual.iter().any(|a| a == "country_ip");
  match col {
    "ip" if combined => "CASE WHEN instr(country_ip, '(') > 0 \
       THEN rtrim(substr(country_ip, instr(country_ip, '(') + 1), ')') \
       ELSE NULL END"
      .to_string(),
    "country" if combined => "CASE WHEN instr(country_ip, '(') > 0 \
       THEN rtrim(substr(country_ip, 1, instr(country_ip, '(') - 1), ' ') \
       ELSE nullif(country_ip, '') END"
      .to_string(),
    _ => "NULL".to_string(),
  }
}

/// Column names of `table`, in declaration order.
fn table_columns(
  conn: &Connection,
  table: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
  let cols = stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(cols)
}
