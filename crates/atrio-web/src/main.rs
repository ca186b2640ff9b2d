//! atrio server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store — running schema migrations before anything is served —
//! and exposes the intake API over HTTP.
//!
//! # Bootstrap
//!
//! Generate an argon2 PHC string for out-of-band use:
//!
//! ```text
//! cargo run -p atrio-web --bin server -- --hash-password
//! ```
//!
//! Create the first admin account (password read from stdin):
//!
//! ```text
//! cargo run -p atrio-web --bin server -- --create-admin admin
//! ```

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use atrio_core::{store::UserStore as _, user::NewUser};
use atrio_store_sqlite::SqliteStore;
use atrio_web::{
  AppState, ServerConfig,
  enrich::{CaptchaClient, GeoClient, HTTP_TIMEOUT, Notifier},
};

#[derive(Parser)]
#[command(author, version, about = "atrio intake server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create an admin account with this username (password entered on
  /// stdin) and exit.
  #[arg(long, value_name = "USERNAME")]
  create_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ATRIO"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the store. Migrations run here: if the schema cannot be
  // reconciled, the process exits before serving anything.
  let db_path = expand_tilde(&server_cfg.db_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  // Helper mode: bootstrap an admin account and exit.
  if let Some(username) = cli.create_admin {
    let password = read_password()?;
    let user = store
      .create_user(NewUser {
        username,
        password_hash: Some(hash_password(&password)?),
        provider_id: None,
        admin: true,
      })
      .await
      .context("failed to create admin user")?;
    tracing::info!(username = %user.username, "admin user created");
    return Ok(());
  }

  let http = reqwest::Client::builder()
    .timeout(HTTP_TIMEOUT)
    .build()
    .context("failed to build HTTP client")?;

  let state = AppState {
    geo: Arc::new(GeoClient::new(
      http.clone(),
      server_cfg.geo_base_url.clone(),
    )),
    captcha: Arc::new(CaptchaClient::new(
      http,
      server_cfg.recaptcha_secret.clone(),
    )),
    notifier: Arc::new(Notifier {
      recipients: server_cfg.notify_recipients.clone(),
    }),
    store: Arc::new(store),
  };

  let app = atrio_web::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .await
  .context("server error")?;

  Ok(())
}

fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))
}

/// Read a password from stdin (no echo handling; piped input expected).
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
