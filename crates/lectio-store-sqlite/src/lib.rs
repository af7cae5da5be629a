//! SQLite backends for lectio.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteKv`] is the device-side
//! key-value layer; [`SqliteFavorites`] is the server-side favorites table.

mod encode;
mod favorites;
mod kv;
mod schema;

pub mod error;

pub use error::{Error, Result};
pub use favorites::SqliteFavorites;
pub use kv::SqliteKv;
