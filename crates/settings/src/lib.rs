//! Settings controllers: render from cache, refresh in the background,
//! save through the backend, then propagate.
//!
//! A [`CacheRegistry`] is created once at application start and owns the
//! durable store, the propagation bus, the sink table, and one cache entry
//! per configuration name. Each [`SettingsController`] is a typed view over
//! one entry:
//!
//! 1. construction reads the durable store synchronously and is render-ready,
//! 2. [`SettingsController::refresh`] asks the remote source and, on success,
//!    commits the fresh value,
//! 3. [`SettingsController::save`] sends the candidate and commits only what
//!    the backend confirmed.
//!
//! A commit always runs store write, entry update, bus publish, then sinks,
//! in that order.

mod controller;
mod domain;
pub mod domains;
mod error;
mod registry;

// Used only by the integration tests.
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tempfile as _;

pub use campus_bus::Subscription;
pub use controller::{RefreshOutcome, SettingsController};
pub use domain::{ConfigDomain, ValidationError};
pub use error::{SaveError, SettingsError};
pub use registry::{CacheRegistry, StorageFollower};
