//! Domain records, input validation and store traits for the atrio
//! intake service.
//!
//! Deliberately free of HTTP and database dependencies; the backend and
//! web crates both build on top of this one.

#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod payment;
pub mod store;
pub mod user;

pub use error::{Error, Result};
