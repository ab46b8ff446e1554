//! Error handling shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = SeedError> = std::result::Result<T, E>;

/// Failures reported by model construction, training, generation and persistence.
///
/// Every variant is returned synchronously to the caller. The generation
/// fallback chain is not an error path and never produces one of these.
#[derive(Debug, Error)]
pub enum SeedError {
	/// A constructor or configuration value is out of range.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// Training text is not longer than the n-gram size.
	#[error("insufficient input: text has {len} code points, need more than n = {n}")]
	InsufficientInput {
		len: usize,
		n: usize,
	},

	/// Generation was requested before any transition was learned.
	#[error("untrained model: no n-grams available")]
	UntrainedModel,

	/// Requested output is shorter than the n-gram window.
	#[error("requested length {length} must be at least n = {n}")]
	LengthTooShort {
		length: usize,
		n: usize,
	},

	/// Read or write failure, with the path involved when known.
	#[error("io error while processing {path:?}: {source}")]
	Io {
		source: std::io::Error,
		path: Option<PathBuf>,
	},

	/// Persisted model data is malformed or inconsistent with the model.
	#[error("corrupt model: {0}")]
	CorruptModel(String),

	/// The persisted model does not exist.
	#[error("model file not found: {}", .0.display())]
	NotFound(PathBuf),
}

impl SeedError {
	/// Wraps an IO error, mapping `NotFound` to [`SeedError::NotFound`] when a path is known.
	pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
		match path {
			Some(path) if source.kind() == std::io::ErrorKind::NotFound => Self::NotFound(path),
			path => Self::Io { source, path },
		}
	}
}

impl From<std::io::Error> for SeedError {
	fn from(source: std::io::Error) -> Self {
		Self::Io { source, path: None }
	}
}

impl From<serde_json::Error> for SeedError {
	fn from(err: serde_json::Error) -> Self {
		if err.is_io() {
			Self::Io { source: err.into(), path: None }
		} else {
			Self::CorruptModel(err.to_string())
		}
	}
}

impl From<postcard::Error> for SeedError {
	fn from(err: postcard::Error) -> Self {
		Self::CorruptModel(err.to_string())
	}
}
