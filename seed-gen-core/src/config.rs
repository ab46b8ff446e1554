//! Generator configuration and its builder.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedError};

/// Default streaming read budget, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// How successors of a known n-gram are weighted when sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weighting {
	/// Probability proportional to the number of times a successor was observed.
	#[default]
	Frequency,
	/// Every distinct successor is equally likely.
	Uniform,
}

/// Last-resort recovery used when no n-gram in the model has a successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecoveryPolicy {
	/// Inject one random code point taken from the training corpus.
	/// Falls back to `Restart` when the corpus is empty.
	#[default]
	CorpusCharacter,
	/// Append a whole random key and continue from it.
	Restart,
}

/// What a saved model file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapshotScope {
	/// Only the key to successor table.
	#[default]
	TransitionsOnly,
	/// Transitions plus `n` and the corpus, so a reload keeps the corpus fallback.
	Full,
}

/// Configuration of a [`SeedGenerator`](crate::model::seed_generator::SeedGenerator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
	/// Window length in code points (must be >= 1).
	pub n: usize,
	/// Accumulates diagnostic messages in the caller-visible log buffer.
	pub verbose: bool,
	/// Strips control characters before training.
	pub sanitize: bool,
	/// Lowercases training text before windowing.
	pub lowercase: bool,
	/// Read budget per chunk when training from a stream.
	pub chunk_size: usize,
	pub weighting: Weighting,
	pub recovery: RecoveryPolicy,
	pub snapshot_scope: SnapshotScope,
}

impl GeneratorConfig {
	/// Returns a builder initialised with [`GeneratorConfig::default`].
	#[must_use]
	pub fn builder() -> GeneratorBuilder {
		GeneratorBuilder::default()
	}

	/// Validates the invariants required by the model.
	pub fn validate(&self) -> Result<()> {
		if self.n == 0 {
			return Err(SeedError::InvalidArgument("n must be a positive integer".into()));
		}
		if self.chunk_size == 0 {
			return Err(SeedError::InvalidArgument("chunk_size must be greater than zero".into()));
		}
		Ok(())
	}
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			n: 3,
			verbose: false,
			sanitize: true,
			lowercase: false,
			chunk_size: DEFAULT_CHUNK_SIZE,
			weighting: Weighting::default(),
			recovery: RecoveryPolicy::default(),
			snapshot_scope: SnapshotScope::default(),
		}
	}
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Default, Clone)]
pub struct GeneratorBuilder {
	cfg: GeneratorConfig,
}

impl GeneratorBuilder {
	#[must_use]
	pub fn n(mut self, value: usize) -> Self {
		self.cfg.n = value;
		self
	}

	#[must_use]
	pub fn verbose(mut self, value: bool) -> Self {
		self.cfg.verbose = value;
		self
	}

	#[must_use]
	pub fn sanitize(mut self, value: bool) -> Self {
		self.cfg.sanitize = value;
		self
	}

	#[must_use]
	pub fn lowercase(mut self, value: bool) -> Self {
		self.cfg.lowercase = value;
		self
	}

	#[must_use]
	pub fn chunk_size(mut self, value: usize) -> Self {
		self.cfg.chunk_size = value;
		self
	}

	#[must_use]
	pub fn weighting(mut self, value: Weighting) -> Self {
		self.cfg.weighting = value;
		self
	}

	#[must_use]
	pub fn recovery(mut self, value: RecoveryPolicy) -> Self {
		self.cfg.recovery = value;
		self
	}

	#[must_use]
	pub fn snapshot_scope(mut self, value: SnapshotScope) -> Self {
		self.cfg.snapshot_scope = value;
		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<GeneratorConfig> {
		self.cfg.validate()?;
		Ok(self.cfg)
	}
}
