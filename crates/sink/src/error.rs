use thiserror::Error;

/// Failure applying a value to a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
	/// The target element does not exist on the surface.
	#[error("sink target missing: {0}")]
	MissingElement(String),

	/// The input does not have the shape the applier expects.
	#[error("invalid sink input: {0}")]
	InvalidInput(String),

	/// The surface rejected the write.
	#[error("surface error: {0}")]
	Surface(String),
}

impl SinkError {
	/// Missing elements are expected on partial documents and only worth a
	/// debug line.
	pub fn is_missing_element(&self) -> bool {
		matches!(self, Self::MissingElement(_))
	}
}
