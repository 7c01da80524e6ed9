//! Sink appliers.
//!
//! A sink is an external, write-only rendering surface (document title,
//! favicon links, style variables). Appliers are leaf functions of their
//! input: they never read the store or the bus, so calling one twice with
//! the same input leaves the surface exactly as calling it once.

mod appliers;
mod error;
mod surface;
mod table;

pub use appliers::{DocumentTitle, FAVICON_RELS, FaviconLinks, SinkApplier, ThemeVariables, css_variable_name};
pub use error::SinkError;
pub use surface::{DocumentSnapshot, DocumentSurface, MemoryDocument};
pub use table::{SinkBinding, SinkReport, SinkTable};
