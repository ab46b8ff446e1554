use serde::Serialize;

use super::ngram_model::NGramModel;

/// Aggregate health statistics of a trained model.
///
/// Dead ends are the real signal; keys seen with a single transition are
/// listed as warnings only, since any text has a few of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthReport {
	/// Number of distinct n-gram keys
	pub ngrams: usize,
	/// Sum of all transition counts, saturating at `usize::MAX`
	pub total_transitions: usize,
	/// Number of distinct (key, successor) pairs
	pub distinct_transitions: usize,
	/// Keys with no successor
	pub dead_ends: usize,
	/// `dead_ends / ngrams`, `0.0` for an empty model
	pub dead_end_ratio: f64,
	/// Keys observed with exactly one transition
	pub single_transition: usize,
	pub min_transitions: usize,
	pub max_transitions: usize,
	pub avg_transitions: f64,
	/// Advisory messages, never errors
	pub warnings: Vec<String>,
}

impl HealthReport {
	/// `true` when no key is a dead end.
	pub fn is_healthy(&self) -> bool {
		self.dead_ends == 0
	}
}

/// Inspects `model` without modifying it.
pub fn validate(model: &NGramModel) -> HealthReport {
	let mut report = HealthReport::default();
	let mut fragile = Vec::new();

	for (key, state) in model.iter() {
		let total = state.total();
		report.ngrams += 1;
		report.total_transitions = report.total_transitions.saturating_add(total);
		report.distinct_transitions += state.distinct();

		if report.ngrams == 1 || total < report.min_transitions {
			report.min_transitions = total;
		}
		report.max_transitions = report.max_transitions.max(total);

		match total {
			0 => report.dead_ends += 1,
			1 => fragile.push(key),
			_ => (),
		}
	}

	report.single_transition = fragile.len();
	if report.ngrams > 0 {
		report.dead_end_ratio = report.dead_ends as f64 / report.ngrams as f64;
		report.avg_transitions = report.total_transitions as f64 / report.ngrams as f64;
	}

	if report.dead_ends > 0 {
		report.warnings.push(format!(
			"{} of {} n-grams are dead ends ({:.1}%)",
			report.dead_ends,
			report.ngrams,
			report.dead_end_ratio * 100.0
		));
	}
	if !fragile.is_empty() {
		let sample: Vec<String> = fragile.iter().take(5).map(|k| format!("{k:?}")).collect();
		report.warnings.push(format!(
			"{} n-grams have a single observed transition (e.g. {})",
			fragile.len(),
			sample.join(", ")
		));
	}

	report
}
