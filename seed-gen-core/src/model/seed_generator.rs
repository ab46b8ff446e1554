use std::io::Read;
use std::path::Path;

use super::generator::{Generator, StartSeed};
use super::log_buffer::LogBuffer;
use super::ngram_model::NGramModel;
use super::trainer::{self, NoProgress, TextFilter, TrainingProgress, TrainingSummary};
use super::validator::{self, HealthReport};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::io;
use crate::persistence::{self, ModelFormat};

/// Public entry point: one model, its configuration and its diagnostic log.
///
/// # Responsibilities
/// - Train from text, readers and files
/// - Generate seeds of an exact length
/// - Save, load and validate the model
/// - Keep the caller-visible log when `verbose` is set
///
/// # Notes
/// - No internal locking: share an instance across threads only behind a `Mutex`.
#[derive(Debug, Clone)]
pub struct SeedGenerator {
	config: GeneratorConfig,
	model: NGramModel,
	logs: LogBuffer,
}

impl SeedGenerator {
	/// Creates a generator of order `n` with default settings.
	///
	/// # Errors
	/// Returns `InvalidArgument` if `n == 0`.
	pub fn new(n: usize, verbose: bool) -> Result<Self> {
		Self::with_config(GeneratorConfig::builder().n(n).verbose(verbose).build()?)
	}

	/// Creates a generator from a full configuration.
	pub fn with_config(config: GeneratorConfig) -> Result<Self> {
		config.validate()?;
		let model = NGramModel::new(config.n)?;
		let logs = LogBuffer::new(config.verbose);
		Ok(Self { config, model, logs })
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	/// Read-only view of the model.
	pub fn model(&self) -> &NGramModel {
		&self.model
	}

	/// Trains on a whole text.
	///
	/// # Errors
	/// `InsufficientInput` if the filtered text is not longer than `n`; the
	/// model is unchanged in that case.
	pub fn train(&mut self, text: &str) -> Result<TrainingSummary> {
		let summary = trainer::train_text(&mut self.model, text, TextFilter::from_config(&self.config))
			.inspect_err(|e| self.logs.warn(format!("training failed: {e}")))?;
		self.logs.info(format!(
			"trained on {} code points: {} transitions, model has {} n-grams",
			summary.code_points,
			summary.transitions,
			self.model.len()
		));
		Ok(summary)
	}

	/// Trains from a reader, `chunk_size` bytes at a time.
	///
	/// `total` is the expected byte count, used for progress messages only.
	pub fn train_from_stream<R: Read>(&mut self, source: R, total: Option<u64>) -> Result<TrainingSummary> {
		self.train_from_stream_with(source, total, &mut NoProgress)
	}

	/// Same as [`SeedGenerator::train_from_stream`], notifying `progress` after every chunk.
	pub fn train_from_stream_with<R, P>(&mut self, source: R, total: Option<u64>, progress: &mut P) -> Result<TrainingSummary>
	where
		R: Read,
		P: TrainingProgress + ?Sized,
	{
		let filter = TextFilter::from_config(&self.config);
		let chunk_size = self.config.chunk_size;
		let logs = &mut self.logs;
		let mut observer = |processed: u64, total: Option<u64>| {
			match total {
				Some(total) if total > 0 => logs.debug(format!(
					"processed {processed}/{total} bytes ({:.1}%)",
					processed as f64 / total as f64 * 100.0
				)),
				_ => logs.debug(format!("processed {processed} bytes")),
			}
			progress.on_chunk(processed, total);
		};

		let result = trainer::train_stream(&mut self.model, source, filter, chunk_size, total, &mut observer);
		match &result {
			Ok(summary) => self.logs.info(format!(
				"streamed {} bytes in {} chunks: {} transitions, model has {} n-grams",
				summary.bytes,
				summary.chunks,
				summary.transitions,
				self.model.len()
			)),
			Err(e) => self.logs.warn(format!("streamed training failed: {e}")),
		}
		result
	}

	/// Streams a file into the model, reporting progress against its size.
	pub fn train_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<TrainingSummary> {
		let path = path.as_ref();
		let (reader, size) = io::open_with_size(path)?;
		self.logs.info(format!("training from file: {}", path.display()));
		self.train_from_stream(reader, Some(size))
	}

	/// Generates a seed of exactly `length` code points.
	///
	/// `start_hint` is used as the first window when it is a known n-gram;
	/// anything else is logged and replaced by a random key.
	///
	/// # Errors
	/// `UntrainedModel` or `LengthTooShort`.
	pub fn generate(&mut self, length: usize, start_hint: Option<&str>) -> Result<String> {
		let generator = Generator::new(&self.model, self.config.weighting, self.config.recovery);
		let seed = generator.generate(length, StartSeed::from(start_hint), &mut self.logs)?;
		self.logs.debug(format!("generated: {seed:?}"));
		Ok(seed)
	}

	/// Generates `count` independent seeds.
	pub fn generate_many(&mut self, count: usize, length: usize) -> Result<Vec<String>> {
		(0..count).map(|_| self.generate(length, None)).collect()
	}

	/// Saves the model; `.bin` files use postcard, anything else JSON.
	pub fn save_model<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let path = path.as_ref();
		persistence::save(&self.model, path, ModelFormat::from_path(path), self.config.snapshot_scope)?;
		self.logs.info(format!("model saved to {}", path.display()));
		Ok(())
	}

	/// Replaces the model with the content of `path`.
	///
	/// Transitions-only files keep the current corpus.
	///
	/// # Errors
	/// `NotFound`, `CorruptModel` or `Io`; the current model is kept on failure.
	pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let path = path.as_ref();
		let snapshot = persistence::load(path, ModelFormat::from_path(path), self.model.n())
			.inspect_err(|e| self.logs.warn(format!("loading {} failed: {e}", path.display())))?;
		self.model.replace(snapshot.transitions, snapshot.corpus);
		self.logs.info(format!("model loaded from {} with {} n-grams", path.display(), self.model.len()));
		Ok(())
	}

	/// Adds the transitions and corpus of `other` to this model.
	///
	/// # Errors
	/// `InvalidArgument` if the orders differ or a merged count would
	/// overflow; the model is unchanged in that case.
	pub fn merge_model(&mut self, other: &NGramModel) -> Result<()> {
		self.model
			.merge(other)
			.inspect_err(|e| self.logs.warn(format!("merge failed: {e}")))?;
		self.logs.info(format!("merged {} n-grams, model has {}", other.len(), self.model.len()));
		Ok(())
	}

	pub fn validate_model(&self) -> HealthReport {
		validator::validate(&self.model)
	}

	/// Clears transitions and corpus.
	pub fn reset_model(&mut self) {
		self.model.reset();
		self.logs.info("model reset".into());
	}

	pub fn get_logs(&self) -> &[String] {
		self.logs.messages()
	}

	pub fn clear_logs(&mut self) {
		self.logs.clear();
	}
}
