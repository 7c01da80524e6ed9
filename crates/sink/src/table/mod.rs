use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use campus_primitives::{ConfigName, ConfigValue};

use crate::{DocumentSurface, DocumentTitle, FaviconLinks, SinkApplier, SinkError, ThemeVariables};


/// Static mapping from a configuration name (or a JSON-pointer subfield of
/// it) to one applier.
#[derive(Clone)]
pub struct SinkBinding {
	pub name: ConfigName,
	/// JSON pointer into the value; `""` binds the whole value.
	pub pointer: &'static str,
	pub applier: Arc<dyn SinkApplier>,
}

impl fmt::Debug for SinkBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SinkBinding")
			.field("name", &self.name)
			.field("pointer", &self.pointer)
			.field("applier", &self.applier.label())
			.finish()
	}
}

/// Outcome of applying one value to every binding for its name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SinkReport {
	/// Bindings that applied cleanly.
	pub applied: usize,
	/// Bindings whose subfield was absent from the value.
	pub skipped: usize,
	/// Bindings that failed, with the applier label.
	pub failed: Vec<(&'static str, SinkError)>,
}

impl SinkReport {
	pub fn is_clean(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Ordered set of sink bindings, fixed at process start.
#[derive(Debug, Default, Clone)]
pub struct SinkTable {
	bindings: Vec<SinkBinding>,
}

impl SinkTable {
	/// Creates a table with no bindings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates the standard bindings over one document surface:
	///
	/// * `schoolMeta /websiteTitle` -> document title
	/// * `logo /url` -> favicon links
	/// * `theme` -> `--color-*` style variables
	pub fn standard(surface: Arc<dyn DocumentSurface>) -> Self {
		Self::new()
			.bind(ConfigName::SchoolMeta, "/websiteTitle", DocumentTitle::new(Arc::clone(&surface)))
			.bind(ConfigName::Logo, "/url", FaviconLinks::new(Arc::clone(&surface)))
			.bind(ConfigName::Theme, "", ThemeVariables::new(surface))
	}

	/// Adds one binding.
	pub fn bind(mut self, name: ConfigName, pointer: &'static str, applier: impl SinkApplier + 'static) -> Self {
		self.bindings.push(SinkBinding {
			name,
			pointer,
			applier: Arc::new(applier),
		});
		self
	}

	/// Returns the bindings for `name`, in registration order.
	pub fn bindings_for<'a>(&'a self, name: &'a ConfigName) -> impl Iterator<Item = &'a SinkBinding> + 'a {
		self.bindings.iter().filter(move |b| &b.name == name)
	}

	/// Returns true when no binding targets `name`.
	pub fn is_unbound(&self, name: &ConfigName) -> bool {
		self.bindings_for(name).next().is_none()
	}

	/// Applies `value` to every binding for `name`.
	///
	/// Failures are caught per binding and logged; later bindings still run.
	/// A panicking applier is recorded as a surface failure. Missing elements
	/// log at `debug`, anything else at `warn`.
	pub fn apply(&self, name: &ConfigName, value: &ConfigValue) -> SinkReport {
		let mut report = SinkReport::default();
		for binding in self.bindings_for(name) {
			let label = binding.applier.label();
			let Some(input) = value.field(binding.pointer) else {
				tracing::debug!(%name, sink = label, pointer = binding.pointer, "sink input absent, skipped");
				report.skipped += 1;
				continue;
			};
			let applied = catch_unwind(AssertUnwindSafe(|| binding.applier.apply(input))).unwrap_or_else(|payload| {
				Err(SinkError::Surface(format!("applier panicked: {}", panic_message(payload.as_ref()))))
			});
			match applied {
				Ok(()) => report.applied += 1,
				Err(error) => {
					if error.is_missing_element() {
						tracing::debug!(%name, sink = label, %error, "sink target missing");
					} else {
						tracing::warn!(%name, sink = label, %error, "sink application failed");
					}
					report.failed.push((label, error));
				}
			}
		}
		report
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"<non-string panic payload>".to_string()
	}
}
