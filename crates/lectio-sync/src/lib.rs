//! Local-first favorites synchronisation.
//!
//! [`SyncEngine`] is the only writer that reconciles the device collection
//! with the remote service. [`Favorites`] is the read model handed to the
//! presentation layer.
//!
//! Construct one engine at startup and share it by [`std::sync::Arc`].

mod engine;
mod local;
mod query;
mod status;

pub mod error;

pub use engine::{SyncEngine, SyncOutcome, SyncReport};
pub use error::{Error, Result};
pub use local::{FAVORITES_KEY, LocalFavorites};
pub use query::{Favorites, Snapshot};
pub use status::{SYNC_STATUS_KEY, StatusStore};
