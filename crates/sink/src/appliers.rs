use std::sync::Arc;

use serde_json::Value;

use crate::{DocumentSurface, SinkError};

/// Link relations that carry the site icon.
pub const FAVICON_RELS: &[&str] = &["icon", "shortcut icon", "apple-touch-icon"];

const THEME_VARIABLE_PREFIX: &str = "--color-";

/// Idempotent function from a confirmed value (or subfield) to a surface.
pub trait SinkApplier: Send + Sync {
	/// Short label used in logs.
	fn label(&self) -> &'static str;

	/// Pushes `input` into the surface.
	fn apply(&self, input: &Value) -> Result<(), SinkError>;
}

fn non_empty_str<'a>(input: &'a Value, what: &str) -> Result<&'a str, SinkError> {
	let s = input
		.as_str()
		.ok_or_else(|| SinkError::InvalidInput(format!("{what} must be a string, got {input}")))?
		.trim();
	if s.is_empty() {
		return Err(SinkError::InvalidInput(format!("{what} is empty")));
	}
	Ok(s)
}

/// Writes the document title.
pub struct DocumentTitle {
	surface: Arc<dyn DocumentSurface>,
}

impl DocumentTitle {
	pub fn new(surface: Arc<dyn DocumentSurface>) -> Self {
		Self { surface }
	}
}

impl SinkApplier for DocumentTitle {
	fn label(&self) -> &'static str {
		"document_title"
	}

	fn apply(&self, input: &Value) -> Result<(), SinkError> {
		let title = non_empty_str(input, "website title")?;
		self.surface.set_title(title)
	}
}

/// Points every favicon link at the logo URL.
///
/// Every relation is attempted even when some are missing; the first
/// missing element is reported after the others were written.
pub struct FaviconLinks {
	surface: Arc<dyn DocumentSurface>,
}

impl FaviconLinks {
	pub fn new(surface: Arc<dyn DocumentSurface>) -> Self {
		Self { surface }
	}
}

impl SinkApplier for FaviconLinks {
	fn label(&self) -> &'static str {
		"favicon_links"
	}

	fn apply(&self, input: &Value) -> Result<(), SinkError> {
		let href = non_empty_str(input, "logo url")?;
		let mut first_err = None;
		for rel in FAVICON_RELS {
			if let Err(e) = self.surface.set_link_href(rel, href) {
				first_err.get_or_insert(e);
			}
		}
		first_err.map_or(Ok(()), Err)
	}
}

/// Maps each theme color slot to a `--color-*` custom property.
pub struct ThemeVariables {
	surface: Arc<dyn DocumentSurface>,
}

impl ThemeVariables {
	pub fn new(surface: Arc<dyn DocumentSurface>) -> Self {
		Self { surface }
	}
}

impl SinkApplier for ThemeVariables {
	fn label(&self) -> &'static str {
		"theme_variables"
	}

	fn apply(&self, input: &Value) -> Result<(), SinkError> {
		let slots = input
			.as_object()
			.ok_or_else(|| SinkError::InvalidInput(format!("theme must be an object, got {input}")))?;
		let mut first_err = None;
		for (slot, color) in slots {
			let result = match color.as_str() {
				Some(color) => self.surface.set_style_property(&css_variable_name(slot), color),
				None => Err(SinkError::InvalidInput(format!("color slot {slot} is not a string"))),
			};
			if let Err(e) = result {
				first_err.get_or_insert(e);
			}
		}
		first_err.map_or(Ok(()), Err)
	}
}

/// Converts a camelCase slot name into its custom property name:
/// `primaryHover` becomes `--color-primary-hover`.
pub fn css_variable_name(slot: &str) -> String {
	let mut out = String::with_capacity(THEME_VARIABLE_PREFIX.len() + slot.len() + 4);
	out.push_str(THEME_VARIABLE_PREFIX);
	for (i, ch) in slot.chars().enumerate() {
		if ch.is_ascii_uppercase() {
			if i > 0 {
				out.push('-');
			}
			out.push(ch.to_ascii_lowercase());
		} else if ch == '_' {
			out.push('-');
		} else {
			out.push(ch);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;
	use serde_json::json;

	use super::*;
	use crate::MemoryDocument;

	fn doc() -> Arc<MemoryDocument> {
		Arc::new(MemoryDocument::with_favicon_links())
	}

	#[test]
	fn css_names_are_kebab_case() {
		assert_eq!(css_variable_name("primary"), "--color-primary");
		assert_eq!(css_variable_name("primaryHover"), "--color-primary-hover");
		assert_eq!(css_variable_name("text_muted"), "--color-text-muted");
	}

	#[test]
	fn title_rejects_blank_input() {
		let doc = doc();
		let sink = DocumentTitle::new(doc.clone());
		assert!(matches!(sink.apply(&json!("  ")), Err(SinkError::InvalidInput(_))));
		assert!(matches!(sink.apply(&json!(42)), Err(SinkError::InvalidInput(_))));
		sink.apply(&json!(" Oak Hill Academy ")).unwrap();
		assert_eq!(doc.title(), "Oak Hill Academy");
	}

	#[test]
	fn favicon_writes_present_links_and_reports_missing() {
		let doc = doc();
		doc.remove_link("apple-touch-icon");
		let sink = FaviconLinks::new(doc.clone());

		let err = sink.apply(&json!("/new.png")).unwrap_err();
		assert!(err.is_missing_element());
		assert_eq!(doc.link_href("icon").as_deref(), Some("/new.png"));
		assert_eq!(doc.link_href("shortcut icon").as_deref(), Some("/new.png"));
		assert_eq!(doc.link_href("apple-touch-icon"), None);
	}

	#[test]
	fn theme_skips_bad_slots_but_writes_good_ones() {
		let doc = doc();
		let sink = ThemeVariables::new(doc.clone());
		let err = sink.apply(&json!({"primary": "#111111", "broken": 3})).unwrap_err();
		assert!(matches!(err, SinkError::InvalidInput(_)));
		assert_eq!(doc.style_property("--color-primary").as_deref(), Some("#111111"));
	}

	#[test]
	fn stale_then_fresh_input_leaves_fresh_state() {
		let doc = doc();
		let sink = ThemeVariables::new(doc.clone());
		sink.apply(&json!({"primary": "#3B82F6"})).unwrap();
		sink.apply(&json!({"primary": "#111111"})).unwrap();
		assert_eq!(doc.style_property("--color-primary").as_deref(), Some("#111111"));
	}

	proptest! {
		#[test]
		fn appliers_are_idempotent(
			title in "[A-Za-z ]{1,20}[A-Za-z]",
			url in "/[a-z]{1,10}\\.png",
			colors in prop::collection::btree_map("[a-z]{1,8}", "#[0-9A-F]{6}", 0..5),
		) {
			let theme: serde_json::Map<String, Value> = colors.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
			let theme = Value::Object(theme);

			let once = doc();
			let twice = doc();
			for target in [&once, &twice] {
				let appliers: [Box<dyn SinkApplier>; 3] = [
					Box::new(DocumentTitle::new(target.clone())),
					Box::new(FaviconLinks::new(target.clone())),
					Box::new(ThemeVariables::new(target.clone())),
				];
				let inputs = [json!(title), json!(url), theme.clone()];
				let rounds = if Arc::ptr_eq(target, &once) { 1 } else { 2 };
				for _ in 0..rounds {
					for (applier, input) in appliers.iter().zip(&inputs) {
						applier.apply(input).unwrap();
					}
				}
			}
			prop_assert_eq!(once.snapshot(), twice.snapshot());
		}
	}
}
