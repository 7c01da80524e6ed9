use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;
use serde::Serialize;

use crate::SinkError;
use crate::appliers::FAVICON_RELS;

/// Write-only view of a rendered document.
pub trait DocumentSurface: Send + Sync {
	/// Replaces the document title.
	fn set_title(&self, title: &str) -> Result<(), SinkError>;

	/// Points every `<link>` with relation `rel` at `href`.
	///
	/// Fails with [`SinkError::MissingElement`] when no such link exists.
	fn set_link_href(&self, rel: &str, href: &str) -> Result<(), SinkError>;

	/// Sets one inline style custom property on the document root.
	fn set_style_property(&self, property: &str, value: &str) -> Result<(), SinkError>;
}

/// Observable state of a [`MemoryDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
	pub title: String,
	pub links: BTreeMap<String, String>,
	pub style: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct DocumentState {
	snapshot: DocumentSnapshot,
	link_elements: BTreeSet<String>,
	writes: usize,
}

/// In-process document surface.
///
/// Only link relations declared up front exist; writes to any other
/// relation report a missing element, like a page whose `<head>` lacks it.
#[derive(Debug, Default)]
pub struct MemoryDocument {
	state: Mutex<DocumentState>,
}

impl MemoryDocument {
	/// Creates a document with no link elements.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a document with the standard favicon link elements.
	pub fn with_favicon_links() -> Self {
		Self::with_links(FAVICON_RELS.iter().copied())
	}

	/// Creates a document with a `<link>` element for each relation.
	pub fn with_links<'a>(rels: impl IntoIterator<Item = &'a str>) -> Self {
		let doc = Self::new();
		doc.state.lock().link_elements = rels.into_iter().map(str::to_string).collect();
		doc
	}

	/// Removes the `<link>` element for `rel`.
	pub fn remove_link(&self, rel: &str) {
		let mut state = self.state.lock();
		state.link_elements.remove(rel);
		state.snapshot.links.remove(rel);
	}

	/// Returns the current document title.
	pub fn title(&self) -> String {
		self.state.lock().snapshot.title.clone()
	}

	/// Returns the href of the link for `rel`, if it was ever set.
	pub fn link_href(&self, rel: &str) -> Option<String> {
		self.state.lock().snapshot.links.get(rel).cloned()
	}

	/// Returns one style property, if set.
	pub fn style_property(&self, property: &str) -> Option<String> {
		self.state.lock().snapshot.style.get(property).cloned()
	}

	/// Returns a copy of the whole observable state.
	pub fn snapshot(&self) -> DocumentSnapshot {
		self.state.lock().snapshot.clone()
	}

	/// Number of successful writes, for asserting sink activity.
	pub fn write_count(&self) -> usize {
		self.state.lock().writes
	}
}

impl DocumentSurface for MemoryDocument {
	fn set_title(&self, title: &str) -> Result<(), SinkError> {
		let mut state = self.state.lock();
		state.snapshot.title = title.to_string();
		state.writes += 1;
		Ok(())
	}

	fn set_link_href(&self, rel: &str, href: &str) -> Result<(), SinkError> {
		let mut state = self.state.lock();
		if !state.link_elements.contains(rel) {
			return Err(SinkError::MissingElement(format!("link[rel=\"{rel}\"]")));
		}
		state.snapshot.links.insert(rel.to_string(), href.to_string());
		state.writes += 1;
		Ok(())
	}

	fn set_style_property(&self, property: &str, value: &str) -> Result<(), SinkError> {
		if !property.starts_with("--") {
			return Err(SinkError::Surface(format!("not a custom property: {property}")));
		}
		let mut state = self.state.lock();
		state.snapshot.style.insert(property.to_string(), value.to_string());
		state.writes += 1;
		Ok(())
	}
}
