//! Durable storage for configuration snapshots.
//!
//! The raw [`DurableStore`] medium behaves like a browser `localStorage`:
//! synchronous string get/set/remove. [`ConfigStore`] layers JSON
//! (de)serialization and the never-fail contract on top, and broadcasts a
//! best-effort [`StorageEvent`] for every write so other sessions sharing the
//! medium can follow along.

mod config_store;
mod error;
mod file;
mod medium;

pub use config_store::{ConfigStore, SessionId, StorageEvent};
pub use error::StoreError;
pub use file::FileStore;
pub use medium::{DurableStore, MemoryStore};
