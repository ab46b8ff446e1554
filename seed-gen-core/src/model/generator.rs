use std::collections::VecDeque;

use super::distance;
use super::log_buffer::LogBuffer;
use super::ngram_model::NGramModel;
use super::sampler::SecureSampler;
use crate::config::{RecoveryPolicy, Weighting};
use crate::error::{Result, SeedError};

/// Strategy used to select the starting window of a generation.
///
/// # Variants
/// - `Random`: a uniformly random key of the model.
/// - `Custom(&str)`: the given key, if it has exactly `n` code points and is
///   known to the model; otherwise a random key is used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSeed<'a> {
	Random,
	Custom(&'a str),
}

impl<'a> From<Option<&'a str>> for StartSeed<'a> {
	fn from(hint: Option<&'a str>) -> Self {
		hint.map_or(StartSeed::Random, StartSeed::Custom)
	}
}

/// Sequential sampler over a trained model.
///
/// # Responsibilities
/// - Pick the starting window from a hint or at random
/// - Sample successors of the current window
/// - Apply the fallback chain when the window has no usable transition:
///   nearest live key by edit distance, then the configured [`RecoveryPolicy`]
#[derive(Debug)]
pub struct Generator<'a> {
	model: &'a NGramModel,
	sampler: SecureSampler,
	weighting: Weighting,
	recovery: RecoveryPolicy,
}

impl<'a> Generator<'a> {
	pub fn new(model: &'a NGramModel, weighting: Weighting, recovery: RecoveryPolicy) -> Self {
		Self { model, sampler: SecureSampler::new(), weighting, recovery }
	}

	/// Generates exactly `length` code points.
	///
	/// # Errors
	/// - `UntrainedModel` if the model has no key
	/// - `LengthTooShort` if `length < n`
	///
	/// # Notes
	/// - Output is never reproducible: every draw comes from the secure sampler.
	/// - Every loop iteration makes the output longer, so generation always ends.
	pub fn generate(&self, length: usize, start: StartSeed<'_>, logs: &mut LogBuffer) -> Result<String> {
		let n = self.model.n();
		if self.model.is_empty() {
			return Err(SeedError::UntrainedModel);
		}
		if length < n {
			return Err(SeedError::LengthTooShort { length, n });
		}

		let seed = self.select_seed(start, logs)?;
		let mut window: VecDeque<char> = seed.chars().collect();
		let mut output: Vec<char> = Vec::with_capacity(length + n);
		output.extend(window.iter());

		let mut key = String::with_capacity(seed.len());
		while output.len() < length {
			key.clear();
			key.extend(window.iter());

			let next = match self.model.get(&key).and_then(|s| s.predict(&self.sampler, self.weighting)) {
				Some(c) => Some(c),
				None => self.predict_similar(&window, &key, logs),
			};

			match next {
				Some(c) => {
					output.push(c);
					Self::slide(&mut window, c);
				}
				None => self.recover(&mut window, &mut output, logs)?,
			}
		}

		// Restarts may overshoot
		output.truncate(length);
		Ok(output.into_iter().collect())
	}

	/// Resolves the starting window; a mismatching hint falls back to a random key.
	fn select_seed(&self, start: StartSeed<'_>, logs: &mut LogBuffer) -> Result<&'a str> {
		if let StartSeed::Custom(hint) = start {
			if hint.chars().count() == self.model.n() {
				if let Some((key, _)) = self.model.get_key_value(hint) {
					logs.debug(format!("starting generation with {key:?}"));
					return Ok(key);
				}
			}
			logs.warn(format!("starting n-gram {hint:?} not found, using a random one"));
		}
		self.model.random_key(&self.sampler).ok_or(SeedError::UntrainedModel)
	}

	/// Samples from the live key closest to the current window.
	fn predict_similar(&self, window: &VecDeque<char>, key: &str, logs: &mut LogBuffer) -> Option<char> {
		let target: Vec<char> = window.iter().copied().collect();
		let (similar, d) = distance::nearest(&target, self.model.live_keys())?;
		logs.debug(format!("fallback: using similar n-gram {similar:?} (distance {d}) for {key:?}"));
		self.model.get(similar)?.predict(&self.sampler, self.weighting)
	}

	/// Last resort when no key in the model has a successor.
	fn recover(&self, window: &mut VecDeque<char>, output: &mut Vec<char>, logs: &mut LogBuffer) -> Result<()> {
		if self.recovery == RecoveryPolicy::CorpusCharacter {
			if let Some(c) = self.model.random_corpus_char(&self.sampler) {
				logs.debug(format!("recovery: injected corpus character {c:?}"));
				output.push(c);
				Self::slide(window, c);
				return Ok(());
			}
		}

		let key = self.model.random_key(&self.sampler).ok_or(SeedError::UntrainedModel)?;
		logs.debug(format!("recovery: restarting from {key:?}"));
		window.clear();
		window.extend(key.chars());
		output.extend(key.chars());
		Ok(())
	}

	/// Drops the oldest code point and appends `c`.
	fn slide(window: &mut VecDeque<char>, c: char) {
		window.pop_front();
		window.push_back(c);
	}
}
