//! Core types and trait definitions for the sosdesk emergency-report backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! intake normalizer lives here so it can be exercised without either.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod announcement;
pub mod error;
pub mod intake;
pub mod sos;
pub mod store;

pub use error::{Error, Result};
