//! Core types for the configuration cache: names, values, and entries.

/// Cache entry state and provenance.
pub mod entry;
/// Configuration domain identifiers.
pub mod name;
/// Opaque JSON configuration records and default backfill.
pub mod value;

pub use entry::{CacheEntry, Origin, Timestamp};
pub use name::{ConfigName, ConfigNameError};
pub use value::ConfigValue;
