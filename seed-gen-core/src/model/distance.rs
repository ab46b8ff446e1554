/// Levenshtein distance between two code-point sequences.
///
/// Insertion, deletion and substitution each cost 1. Runs in
/// O(|a| * |b|) time with two rows of O(|b|) memory.
pub fn distance(a: &[char], b: &[char]) -> usize {
	if a.is_empty() {
		return b.len();
	}
	if b.is_empty() {
		return a.len();
	}

	let mut previous: Vec<usize> = (0..=b.len()).collect();
	let mut current = vec![0; b.len() + 1];

	for (i, ca) in a.iter().enumerate() {
		current[0] = i + 1;
		for (j, cb) in b.iter().enumerate() {
			let cost = usize::from(ca != cb);
			current[j + 1] = (previous[j + 1] + 1) // deletion
				.min(current[j] + 1) // insertion
				.min(previous[j] + cost); // substitution
		}
		std::mem::swap(&mut previous, &mut current);
	}

	previous[b.len()]
}

/// Finds the key closest to `target`.
///
/// Ties keep the first key yielded by `keys`; callers iterating a
/// `BTreeMap` therefore get the lexicographically smallest one.
/// Returns `None` only when `keys` is empty.
pub fn nearest<'a, I>(target: &[char], keys: I) -> Option<(&'a str, usize)>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut best: Option<(&'a str, usize)> = None;
	let mut buffer: Vec<char> = Vec::with_capacity(target.len());

	for key in keys {
		buffer.clear();
		buffer.extend(key.chars());
		let d = distance(target, &buffer);
		if best.is_none_or(|(_, best_d)| d < best_d) {
			best = Some((key, d));
		}
		if d == 0 {
			break;
		}
	}

	best
}
