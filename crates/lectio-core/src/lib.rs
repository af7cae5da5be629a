//! Core types and trait definitions for the lectio favorites store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod canon;
pub mod dedup;
pub mod error;
pub mod favorite;
pub mod gateway;
pub mod kv;
pub mod remote;
pub mod repository;
pub mod status;
pub mod view;

pub use error::{Error, Result};
