//! Batch and streamed training of an [`NGramModel`].
//!
//! Streamed training reads a bounded chunk at a time and threads an explicit
//! carry buffer between chunks, so transitions spanning a chunk boundary are
//! recorded exactly as if the whole text had been trained at once.

use std::io::{self, ErrorKind, Read};

use log::debug;

use super::ngram_model::NGramModel;
use crate::config::GeneratorConfig;
use crate::error::{Result, SeedError};

/// Outcome of a training call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingSummary {
	/// Raw bytes read (streamed) or the byte length of the input (batch).
	pub bytes: u64,
	/// Code points kept after filtering.
	pub code_points: usize,
	/// Transitions recorded into the model.
	pub transitions: usize,
	/// Number of chunks processed; `1` for batch training.
	pub chunks: usize,
}

/// Observer notified after every streamed chunk.
pub trait TrainingProgress {
	/// `processed` bytes so far, out of `total` when the size is known.
	fn on_chunk(&mut self, processed: u64, total: Option<u64>);
}

/// Progress observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl TrainingProgress for NoProgress {
	fn on_chunk(&mut self, _processed: u64, _total: Option<u64>) {}
}

impl<F: FnMut(u64, Option<u64>)> TrainingProgress for F {
	fn on_chunk(&mut self, processed: u64, total: Option<u64>) {
		self(processed, total)
	}
}

/// Text normalisation applied before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFilter {
	pub sanitize: bool,
	pub lowercase: bool,
}

impl TextFilter {
	pub fn from_config(cfg: &GeneratorConfig) -> Self {
		Self { sanitize: cfg.sanitize, lowercase: cfg.lowercase }
	}

	pub fn apply(&self, text: &str) -> String {
		let mut out = String::with_capacity(text.len());
		for c in text.chars() {
			if self.sanitize && is_control(c) {
				continue;
			}
			if self.lowercase {
				out.extend(c.to_lowercase());
			} else {
				out.push(c);
			}
		}
		out
	}
}

/// Control characters removed by sanitisation: below 0x20 except `\n` and `\t`, and 0x7F.
fn is_control(c: char) -> bool {
	(c < ' ' && c != '\n' && c != '\t') || c == '\u{7f}'
}

/// Filters `text` and trains `model` on it in one pass.
///
/// # Errors
/// `InsufficientInput` if the filtered text is not longer than `n`;
/// the model is left unchanged in that case.
pub fn train_text(model: &mut NGramModel, text: &str, filter: TextFilter) -> Result<TrainingSummary> {
	let filtered = filter.apply(text);
	let transitions = model.train(&filtered)?;
	Ok(TrainingSummary {
		bytes: text.len() as u64,
		code_points: filtered.chars().count(),
		transitions,
		chunks: 1,
	})
}

/// Carry-over buffer threaded between successive chunks.
///
/// After a chunk is windowed, its last `n` code points are kept and
/// prepended to the next one. A transition spans `n + 1` code points
/// (key plus successor), so keeping `n` is exactly enough for every window
/// crossing the boundary to be seen once, and no window is seen twice.
#[derive(Debug, Clone)]
pub struct ChunkCarry {
	n: usize,
	tail: Vec<char>,
}

impl ChunkCarry {
	pub fn new(n: usize) -> Self {
		Self { n, tail: Vec::with_capacity(n) }
	}

	/// Code points currently carried.
	pub fn tail(&self) -> &[char] {
		&self.tail
	}

	/// Windows `tail + chunk` into the model and appends `chunk` to its corpus.
	///
	/// # Returns
	/// The number of transitions recorded.
	pub fn feed(&mut self, model: &mut NGramModel, chunk: &str) -> usize {
		let mut buffer = std::mem::take(&mut self.tail);
		buffer.extend(chunk.chars());

		let recorded = model.add_windows(&buffer);
		model.append_corpus(chunk);

		let keep = buffer.len().min(self.n);
		buffer.drain(..buffer.len() - keep);
		self.tail = buffer;
		recorded
	}
}

/// Streams `source` into `model`, `chunk_size` bytes at a time.
///
/// # Behavior
/// - Incomplete UTF-8 sequences at the end of a read are completed by the next read
/// - Each chunk is filtered, windowed with the carried tail, then reported to `progress`
/// - Transitions from chunks already processed stay in the model when a read fails
///
/// # Errors
/// - `Io` when reading fails or the stream is not valid UTF-8
/// - `InsufficientInput` if the whole stream has `n` code points or fewer;
///   the corpus is then restored to its previous content
pub fn train_stream<R, P>(
	model: &mut NGramModel,
	mut source: R,
	filter: TextFilter,
	chunk_size: usize,
	total: Option<u64>,
	progress: &mut P,
) -> Result<TrainingSummary>
where
	R: Read,
	P: TrainingProgress + ?Sized,
{
	if chunk_size == 0 {
		return Err(SeedError::InvalidArgument("chunk_size must be greater than zero".into()));
	}

	let corpus_len = model.corpus().len();
	let mut carry = ChunkCarry::new(model.n());
	let mut buffer = vec![0u8; chunk_size];
	let mut pending: Vec<u8> = Vec::new();
	let mut summary = TrainingSummary::default();

	loop {
		let read = match source.read(&mut buffer) {
			Ok(0) => break,
			Ok(read) => read,
			Err(e) if e.kind() == ErrorKind::Interrupted => continue,
			Err(e) => return Err(e.into()),
		};

		pending.extend_from_slice(&buffer[..read]);
		let valid = complete_utf8_prefix(&pending)?;
		let text = std::str::from_utf8(&pending[..valid]).map_err(invalid_data)?;
		let chunk = filter.apply(text);
		pending.drain(..valid);

		summary.bytes += read as u64;
		summary.code_points += chunk.chars().count();
		summary.transitions += carry.feed(model, &chunk);
		summary.chunks += 1;

		debug!(
			"chunk {} processed: {} bytes, {} transitions so far",
			summary.chunks, summary.bytes, summary.transitions
		);
		progress.on_chunk(summary.bytes, total);
	}

	if !pending.is_empty() {
		return Err(SeedError::Io {
			source: io::Error::new(ErrorKind::InvalidData, "stream ends inside a UTF-8 sequence"),
			path: None,
		});
	}

	if summary.transitions == 0 {
		model.truncate_corpus(corpus_len);
		return Err(SeedError::InsufficientInput { len: summary.code_points, n: model.n() });
	}

	Ok(summary)
}

/// Length of the longest prefix that is valid UTF-8, allowing an
/// incomplete sequence at the very end.
fn complete_utf8_prefix(bytes: &[u8]) -> Result<usize> {
	match std::str::from_utf8(bytes) {
		Ok(_) => Ok(bytes.len()),
		Err(e) if e.error_len().is_none() => Ok(e.valid_up_to()),
		Err(e) => Err(invalid_data(e)),
	}
}

fn invalid_data(err: std::str::Utf8Error) -> SeedError {
	SeedError::Io { source: io::Error::new(ErrorKind::InvalidData, err), path: None }
}

#[cfg(test)]
mod tests {
	use super::*;

	const RAW: TextFilter = TextFilter { sanitize: false, lowercase: false };
	const SANITIZE: TextFilter = TextFilter { sanitize: true, lowercase: false };

	/// Reader that hands out at most `step` bytes per call.
	struct Trickle<'a> {
		data: &'a [u8],
		step: usize,
	}

	impl Read for Trickle<'_> {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			let n = self.step.min(buf.len()).min(self.data.len());
			buf[..n].copy_from_slice(&self.data[..n]);
			self.data = &self.data[n..];
			Ok(n)
		}
	}

	/// Reader that fails after `ok_reads` successful reads.
	struct Failing<'a> {
		inner: Trickle<'a>,
		ok_reads: usize,
	}

	impl Read for Failing<'_> {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			if self.ok_reads == 0 {
				return Err(io::Error::new(ErrorKind::BrokenPipe, "source closed"));
			}
			self.ok_reads -= 1;
			self.inner.read(buf)
		}
	}

	#[test]
	fn sanitize_strips_control_characters() {
		let text = "a\u{0}b\u{7}c\nd\te\u{7f}f\r";
		assert_eq!(SANITIZE.apply(text), "abc\nd\tef");
		assert_eq!(RAW.apply(text), text);
	}

	#[test]
	fn lowercase_is_applied_per_code_point() {
		let filter = TextFilter { sanitize: true, lowercase: true };
		assert_eq!(filter.apply("AbÇD"), "abçd");
	}

	#[test]
	fn streamed_training_equals_batch_training() {
		let text = "Le cœur a ses raisons que la raison ne connaît point. 日本語のテキスト!";
		for n in 1..=4 {
			let mut batch = NGramModel::new(n).unwrap();
			train_text(&mut batch, text, RAW).unwrap();

			for chunk_size in [1, 2, 3, 7, 64] {
				let mut streamed = NGramModel::new(n).unwrap();
				let source = Trickle { data: text.as_bytes(), step: chunk_size };
				train_stream(&mut streamed, source, RAW, chunk_size, None, &mut NoProgress).unwrap();
				assert_eq!(streamed, batch, "n = {n}, chunk_size = {chunk_size}");
			}
		}
	}

	#[test]
	fn carry_keeps_last_n_code_points() {
		let mut model = NGramModel::new(3).unwrap();
		let mut carry = ChunkCarry::new(3);
		assert_eq!(carry.feed(&mut model, "ab"), 0);
		assert_eq!(carry.tail(), &['a', 'b']);
		assert_eq!(carry.feed(&mut model, "cde"), 2);
		assert_eq!(carry.tail(), &['c', 'd', 'e']);
		assert_eq!(model.get("abc").map(|s| s.count('d')), Some(1));
		assert_eq!(model.get("bcd").map(|s| s.count('e')), Some(1));
	}

	#[test]
	fn progress_reports_cumulative_bytes() {
		let text = "abcdefghij";
		let mut seen = Vec::new();
		let mut model = NGramModel::new(2).unwrap();
		let mut observer = |processed: u64, total: Option<u64>| seen.push((processed, total));
		let summary = train_stream(
			&mut model,
			text.as_bytes(),
			RAW,
			4,
			Some(text.len() as u64),
			&mut observer,
		)
		.unwrap();

		assert_eq!(seen, vec![(4, Some(10)), (8, Some(10)), (10, Some(10))]);
		assert_eq!(summary.chunks, 3);
		assert_eq!(summary.transitions, 8);
	}

	#[test]
	fn read_error_keeps_earlier_chunks() {
		let text = b"abcdefghijkl";
		let mut model = NGramModel::new(2).unwrap();
		let source = Failing { inner: Trickle { data: text, step: 4 }, ok_reads: 2 };
		let err = train_stream(&mut model, source, RAW, 4, None, &mut NoProgress).unwrap_err();

		assert!(matches!(err, SeedError::Io { ref source, .. } if source.kind() == ErrorKind::BrokenPipe));
		assert_eq!(model.corpus(), "abcdefgh");
		assert_eq!(model.len(), 6);
	}

	#[test]
	fn short_stream_is_insufficient_and_leaves_corpus() {
		let mut model = NGramModel::new(3).unwrap();
		let err = train_stream(&mut model, "abc".as_bytes(), RAW, 2, None, &mut NoProgress).unwrap_err();
		assert!(matches!(err, SeedError::InsufficientInput { len: 3, n: 3 }));
		assert!(model.is_empty());
		assert!(model.corpus().is_empty());
	}

	#[test]
	fn invalid_utf8_is_rejected() {
		let mut model = NGramModel::new(1).unwrap();
		let bytes: &[u8] = &[b'a', b'b', 0xff, b'c'];
		let err = train_stream(&mut model, bytes, RAW, 8, None, &mut NoProgress).unwrap_err();
		assert!(matches!(err, SeedError::Io { ref source, .. } if source.kind() == ErrorKind::InvalidData));
	}

	#[test]
	fn truncated_utf8_at_end_is_rejected() {
		let mut model = NGramModel::new(1).unwrap();
		let bytes: &[u8] = &[b'a', b'b', b'c', 0xe6, 0x97];
		let err = train_stream(&mut model, bytes, RAW, 2, None, &mut NoProgress).unwrap_err();
		assert!(matches!(err, SeedError::Io { .. }));
	}
}
