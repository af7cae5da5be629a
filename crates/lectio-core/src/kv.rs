//! The `KeyValueStore` trait — the device's persistence layer.
//!
//! Values are opaque strings written and read whole. Backends live in other
//! crates (e.g. `lectio-store-sqlite`).

use std::future::Future;

/// Asynchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`. Returns `None` if nothing is stored.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace whatever is stored under `key`.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
