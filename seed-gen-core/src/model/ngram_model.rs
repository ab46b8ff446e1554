use std::collections::BTreeMap;

use super::sampler::SecureSampler;
use super::state::State;
use crate::error::{Result, SeedError};

/// Key to successor table of the model.
pub type Transitions = BTreeMap<String, State>;

/// Character-level n-gram model.
///
/// The `NGramModel` stores one state per key of exactly `n` code points,
/// plus the text it was trained on for the last-resort corpus fallback.
///
/// # Responsibilities
/// - Record (key -> next character) transitions from windows of text
/// - Pick random keys for seeding and restarts
/// - Merge with another n-gram model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 1 and never changes
/// - Every key in `states` has exactly `n` code points
/// - All transition counts are >= 1
///
/// The table is never handed out mutably; [`NGramModel::transitions`] returns a copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramModel {
	/// Window length in code points
	n: usize,

	/// Mapping from an n-gram key to its outgoing transitions
	states: Transitions,

	/// Accumulated training text
	corpus: String,

	/// Code points in `corpus`
	corpus_chars: usize,
}

impl NGramModel {
	/// Creates a new empty model of order `n`.
	///
	/// # Errors
	/// Returns `InvalidArgument` if `n == 0`.
	pub fn new(n: usize) -> Result<Self> {
		if n == 0 {
			return Err(SeedError::InvalidArgument("n must be a positive integer".into()));
		}
		Ok(Self { n, states: BTreeMap::new(), corpus: String::new(), corpus_chars: 0 })
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of distinct n-gram keys.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn corpus(&self) -> &str {
		&self.corpus
	}

	/// Returns the state stored for `key`, if any.
	pub fn get(&self, key: &str) -> Option<&State> {
		self.states.get(key)
	}

	/// Returns the stored key and its state, borrowed from the model.
	pub fn get_key_value(&self, key: &str) -> Option<(&str, &State)> {
		self.states.get_key_value(key).map(|(k, s)| (k.as_str(), s))
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.states.contains_key(key)
	}

	/// Iterates over `(key, state)` in lexicographic key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &State)> {
		self.states.iter().map(|(k, s)| (k.as_str(), s))
	}

	/// Keys that have at least one successor.
	pub fn live_keys(&self) -> impl Iterator<Item = &str> {
		self.iter().filter(|(_, s)| !s.is_dead_end()).map(|(k, _)| k)
	}

	/// Copy of the transition table.
	pub fn transitions(&self) -> Transitions {
		self.states.clone()
	}

	/// Returns a uniformly random key, `None` if the model is empty.
	pub fn random_key(&self, sampler: &SecureSampler) -> Option<&str> {
		sampler.choose_iter(self.states.keys()).map(String::as_str)
	}

	/// Returns a uniformly random code point of the corpus, `None` if it is empty.
	///
	/// ASCII corpora are indexed directly; others are walked once.
	pub fn random_corpus_char(&self, sampler: &SecureSampler) -> Option<char> {
		if self.corpus_chars == 0 {
			return None;
		}
		let i = sampler.sample(self.corpus_chars);
		if self.corpus_chars == self.corpus.len() {
			return self.corpus.as_bytes().get(i).map(|&b| char::from(b));
		}
		self.corpus.chars().nth(i)
	}

	/// Trains on an already filtered text and appends it to the corpus.
	///
	/// # Errors
	/// Returns `InsufficientInput` (and changes nothing) if the text has
	/// `n` code points or fewer.
	///
	/// # Returns
	/// The number of transitions recorded.
	pub fn train(&mut self, text: &str) -> Result<usize> {
		let chars: Vec<char> = text.chars().collect();
		if chars.len() <= self.n {
			return Err(SeedError::InsufficientInput { len: chars.len(), n: self.n });
		}
		let recorded = self.add_windows(&chars);
		self.corpus.push_str(text);
		self.corpus_chars += chars.len();
		Ok(recorded)
	}

	/// Records every (key, successor) window of `chars`.
	///
	/// For each `i` in `0..=len - n - 1`, key is `chars[i..i + n]` and the
	/// successor is `chars[i + n]`. Slices of `n` characters or fewer
	/// record nothing.
	pub(crate) fn add_windows(&mut self, chars: &[char]) -> usize {
		if chars.len() <= self.n {
			return 0;
		}

		let mut key = String::new();
		for window in chars.windows(self.n + 1) {
			key.clear();
			key.extend(&window[..self.n]);
			// Avoid allocating a new key for n-grams already known
			match self.states.get_mut(key.as_str()) {
				Some(state) => state.add_transition(window[self.n]),
				None => {
					let mut state = State::new();
					state.add_transition(window[self.n]);
					self.states.insert(key.clone(), state);
				}
			}
		}
		chars.len() - self.n
	}

	pub(crate) fn append_corpus(&mut self, text: &str) {
		self.corpus.push_str(text);
		self.corpus_chars += text.chars().count();
	}

	/// Drops corpus bytes past `len`, which must be a char boundary.
	pub(crate) fn truncate_corpus(&mut self, len: usize) {
		if let Some(dropped) = self.corpus.get(len..) {
			self.corpus_chars -= dropped.chars().count();
			self.corpus.truncate(len);
		}
	}

	/// Replaces the table (and optionally the corpus) wholesale.
	///
	/// Callers validate key lengths beforehand.
	pub(crate) fn replace(&mut self, states: Transitions, corpus: Option<String>) {
		self.states = states;
		if let Some(corpus) = corpus {
			self.corpus_chars = corpus.chars().count();
			self.corpus = corpus;
		}
	}

	/// Clears transitions and corpus; `n` is kept.
	pub fn reset(&mut self) {
		self.states.clear();
		self.corpus.clear();
		self.corpus_chars = 0;
	}

	/// Merges another n-gram model into this one.
	///
	/// Occurrence counts for matching keys are summed and the other
	/// corpus is appended.
	///
	/// # Errors
	/// Returns `InvalidArgument`, leaving this model unchanged, if the model
	/// orders do not match or the summed counts of a key would overflow.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.n != other.n {
			return Err(SeedError::InvalidArgument(format!(
				"cannot merge models of different order: {} and {}",
				self.n, other.n
			)));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get(key) {
				if existing.total().checked_add(state.total()).is_none() {
					return Err(SeedError::InvalidArgument(format!("merged counts of key {key:?} overflow")));
				}
			}
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state);
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}
		self.corpus.push_str(&other.corpus);
		self.corpus_chars += other.corpus_chars;

		Ok(())
	}
}
