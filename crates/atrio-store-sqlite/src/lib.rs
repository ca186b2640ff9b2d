//! SQLite backend for the atrio record stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Schema migrations run at
//! open; a store that failed to migrate is never handed out.

mod encode;
mod migrate;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
