//! Error types for `atrio-core`.

use thiserror::Error;

/// Validation failures — user-correctable, surfaced as 4xx by the web
/// layer. Storage failures live in the backend crates.
#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid amount: {0:?}")]
  InvalidAmount(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
