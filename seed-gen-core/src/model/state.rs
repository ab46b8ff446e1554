use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Weighting;
use super::sampler::SecureSampler;

/// Outgoing transitions of a single n-gram key.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during training
/// - Pick the next character with weighted or uniform sampling
/// - Merge with the state of the same key from another model
///
/// ## Invariants
/// - Each occurrence count is strictly positive
/// - An empty state is a dead end; it is kept so validation can report it
///
/// Serializes as a plain `{ successor: count }` map; the key lives in the
/// owning table.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct State {
	/// Outgoing transitions indexed by the next character.
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: BTreeMap<char, usize>,
}

impl State {
	/// Creates a new empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records an occurrence of a transition toward `next_char`.
	pub fn add_transition(&mut self, next_char: char) {
		*self.transitions.entry(next_char).or_insert(0) += 1;
	}

	/// `true` when no successor was ever recorded.
	pub fn is_dead_end(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Total number of observed transitions (sum of all counts).
	///
	/// Loaded and merged tables are checked with [`State::checked_total`]
	/// first, so the sum always fits.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Sum of all counts, `None` if it does not fit in a `usize`.
	pub fn checked_total(&self) -> Option<usize> {
		self.transitions.values().try_fold(0usize, |acc, &n| acc.checked_add(n))
	}

	/// Number of distinct successors.
	pub fn distinct(&self) -> usize {
		self.transitions.len()
	}

	/// Occurrence count of a given successor, `0` if never observed.
	pub fn count(&self, next_char: char) -> usize {
		self.transitions.get(&next_char).copied().unwrap_or(0)
	}

	/// Iterates over `(successor, count)` in code-point order.
	pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
		self.transitions.iter().map(|(c, n)| (*c, *n))
	}

	/// `true` if any count is zero, which breaks the sampling invariant.
	pub(crate) fn has_zero_count(&self) -> bool {
		self.transitions.values().any(|&n| n == 0)
	}

	/// Picks the next character, `None` for a dead end.
	///
	/// With [`Weighting::Frequency`] a uniform draw `r` in `[0, total)` walks
	/// the successors accumulating counts; the first one whose running sum
	/// exceeds `r` wins.
	pub fn predict(&self, sampler: &SecureSampler, weighting: Weighting) -> Option<char> {
		match weighting {
			Weighting::Uniform => sampler.choose_iter(self.transitions.keys()).copied(),
			Weighting::Frequency => {
				let total = self.total();
				if total == 0 {
					return None;
				}

				let r = sampler.sample(total);
				let mut cumulative = 0;
				for (next_char, occurrence) in &self.transitions {
					cumulative += occurrence;
					if cumulative > r {
						return Some(*next_char);
					}
				}

				// Unreachable while counts sum to `total`.
				self.transitions.keys().next_back().copied()
			}
		}
	}

	/// Merges another state into this one, summing occurrence counts.
	pub fn merge(&mut self, other: &Self) {
		for (next_char, occurrence) in &other.transitions {
			*self.transitions.entry(*next_char).or_insert(0) += *occurrence;
		}
	}
}

impl FromIterator<(char, usize)> for State {
	fn from_iter<T: IntoIterator<Item = (char, usize)>>(iter: T) -> Self {
		Self { transitions: iter.into_iter().collect() }
	}
}
