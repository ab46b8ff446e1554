//! Saving and loading the transition table.
//!
//! Two encodings are supported:
//! - JSON, human-inspectable. The document is either the bare table
//!   `{ "<key>": { "<successor>": count } }` or, with
//!   [`SnapshotScope::Full`], `{ "n": .., "corpus": .., "transitions": { .. } }`.
//! - Postcard, compact binary, wrapping the same data in a tagged envelope.
//!
//! Loading decodes and validates the whole document before anything is
//! handed back, so a failed load never leaves a model half replaced.

use std::io::{Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SnapshotScope;
use crate::error::{Result, SeedError};
use crate::io;
use crate::model::ngram_model::{NGramModel, Transitions};

/// On-disk encoding of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFormat {
	Json,
	Postcard,
}

impl ModelFormat {
	/// `Postcard` for `.bin` / `.postcard` files, `Json` otherwise.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension().and_then(|e| e.to_str()) {
			Some("bin" | "postcard") => Self::Postcard,
			_ => Self::Json,
		}
	}
}

/// Decoded content of a model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
	/// Window length, present only in full snapshots
	pub n: Option<usize>,
	/// Training text, present only in full snapshots
	pub corpus: Option<String>,
	pub transitions: Transitions,
}

impl Snapshot {
	/// Checks the snapshot against a model of order `n`.
	///
	/// # Errors
	/// `CorruptModel` if a key does not have exactly `n` code points, a count
	/// is zero, the counts of a key do not sum in a `usize`, or the stored `n`
	/// differs.
	pub fn check(&self, n: usize) -> Result<()> {
		if let Some(stored) = self.n {
			if stored != n {
				return Err(SeedError::CorruptModel(format!("model has n = {stored}, expected {n}")));
			}
		}
		for (key, state) in &self.transitions {
			let len = key.chars().count();
			if len != n {
				return Err(SeedError::CorruptModel(format!(
					"key {key:?} has {len} code points, expected {n}"
				)));
			}
			if state.has_zero_count() {
				return Err(SeedError::CorruptModel(format!("key {key:?} has a zero transition count")));
			}
			if state.checked_total().is_none() {
				return Err(SeedError::CorruptModel(format!("transition counts of key {key:?} overflow")));
			}
		}
		Ok(())
	}
}

#[derive(Serialize)]
struct FullDocumentRef<'a> {
	n: usize,
	corpus: &'a str,
	transitions: &'a Transitions,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FullDocument {
	n: usize,
	corpus: String,
	transitions: Transitions,
}

/// JSON shapes accepted on load, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
	Full(FullDocument),
	Table(Transitions),
}

#[derive(Serialize)]
enum EnvelopeRef<'a> {
	Table(&'a Transitions),
	Full(FullDocumentRef<'a>),
}

#[derive(Deserialize)]
enum Envelope {
	Table(Transitions),
	Full(FullDocument),
}

impl From<FullDocument> for Snapshot {
	fn from(doc: FullDocument) -> Self {
		Self { n: Some(doc.n), corpus: Some(doc.corpus), transitions: doc.transitions }
	}
}

impl From<Transitions> for Snapshot {
	fn from(transitions: Transitions) -> Self {
		Self { n: None, corpus: None, transitions }
	}
}

/// Encodes `model` into `writer`.
pub fn write_model<W: Write>(model: &NGramModel, mut writer: W, format: ModelFormat, scope: SnapshotScope) -> Result<()> {
	let transitions = model.transitions();
	let full = FullDocumentRef { n: model.n(), corpus: model.corpus(), transitions: &transitions };

	match format {
		ModelFormat::Json => match scope {
			SnapshotScope::TransitionsOnly => serde_json::to_writer_pretty(&mut writer, &transitions)?,
			SnapshotScope::Full => serde_json::to_writer_pretty(&mut writer, &full)?,
		},
		ModelFormat::Postcard => {
			let envelope = match scope {
				SnapshotScope::TransitionsOnly => EnvelopeRef::Table(&transitions),
				SnapshotScope::Full => EnvelopeRef::Full(full),
			};
			let bytes = postcard::to_stdvec(&envelope)?;
			writer.write_all(&bytes)?;
		}
	}

	writer.flush()?;
	Ok(())
}

/// Decodes a snapshot from `reader` without validating it against a model.
pub fn read_snapshot<R: Read>(mut reader: R, format: ModelFormat) -> Result<Snapshot> {
	match format {
		ModelFormat::Json => {
			let doc: JsonDocument = serde_json::from_reader(reader)?;
			Ok(match doc {
				JsonDocument::Full(full) => full.into(),
				JsonDocument::Table(table) => table.into(),
			})
		}
		ModelFormat::Postcard => {
			let mut bytes = Vec::new();
			reader.read_to_end(&mut bytes)?;
			let envelope: Envelope = postcard::from_bytes(&bytes)?;
			Ok(match envelope {
				Envelope::Full(full) => full.into(),
				Envelope::Table(table) => table.into(),
			})
		}
	}
}

/// Saves `model` to `path`.
pub fn save<P: AsRef<Path>>(model: &NGramModel, path: P, format: ModelFormat, scope: SnapshotScope) -> Result<()> {
	let path = path.as_ref();
	let writer = io::create(path)?;
	write_model(model, writer, format, scope).map_err(|e| attach_path(e, path))?;
	info!("model saved to {} ({} n-grams, {format:?})", path.display(), model.len());
	Ok(())
}

/// Loads and validates a snapshot for a model of order `n`.
///
/// # Errors
/// - `NotFound` if `path` does not exist
/// - `CorruptModel` if the document cannot be decoded or fails [`Snapshot::check`]
/// - `Io` for any other read failure
pub fn load<P: AsRef<Path>>(path: P, format: ModelFormat, n: usize) -> Result<Snapshot> {
	let path = path.as_ref();
	let (reader, _) = io::open_with_size(path)?;
	let snapshot = read_snapshot(reader, format).map_err(|e| attach_path(e, path))?;
	snapshot.check(n)?;
	info!("model loaded from {} ({} n-grams)", path.display(), snapshot.transitions.len());
	Ok(snapshot)
}

fn attach_path(err: SeedError, path: &Path) -> SeedError {
	match err {
		SeedError::Io { source, path: None } => SeedError::io(source, Some(path.to_path_buf())),
		other => other,
	}
}
