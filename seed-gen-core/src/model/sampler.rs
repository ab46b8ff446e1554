use rand::{CryptoRng, Rng};

/// Uniform integer source backed by a cryptographically secure generator.
///
/// Every draw goes through `rand::rng()`, the thread-local ChaCha generator
/// seeded from the operating system. No time-based or user-provided seeding
/// is possible, so the output of the generator cannot be replayed.
///
/// # Policy
/// - `sample(0)` returns `0` instead of failing; callers check for empty
///   collections before drawing.
/// - Draws use `random_range`, which rejects out-of-zone values and therefore
///   carries no modulo bias.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureSampler;

impl SecureSampler {
	pub fn new() -> Self {
		Self
	}

	/// Returns a uniform integer in `[0, bound)`.
	pub fn sample(&self, bound: usize) -> usize {
		sample_with(&mut rand::rng(), bound)
	}

	/// Picks a uniform element of an iterator of known length.
	pub fn choose_iter<I>(&self, mut items: I) -> Option<I::Item>
	where
		I: ExactSizeIterator,
	{
		let len = items.len();
		if len == 0 {
			return None;
		}
		items.nth(self.sample(len))
	}
}

/// Same contract as [`SecureSampler::sample`] for a caller-provided cryptographic generator.
pub fn sample_with<R: CryptoRng>(rng: &mut R, bound: usize) -> usize {
	if bound == 0 {
		return 0;
	}
	rng.random_range(0..bound)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn bound_one_is_always_zero() {
		let sampler = SecureSampler::new();
		for _ in 0..1000 {
			assert_eq!(sampler.sample(1), 0);
		}
	}

	#[test]
	fn bound_zero_is_zero() {
		assert_eq!(SecureSampler::new().sample(0), 0);
	}

	#[test]
	fn every_value_is_visited() {
		let sampler = SecureSampler::new();
		let k = 16;
		let mut hits = vec![0usize; k];
		for _ in 0..16_000 {
			let v = sampler.sample(k);
			assert!(v < k);
			hits[v] += 1;
		}
		// Expected 1000 per bucket; 600 is far outside any plausible deviation.
		for (value, count) in hits.iter().enumerate() {
			assert!(*count > 600, "value {value} starved: {count} hits");
		}
	}

	#[test]
	fn choose_iter_handles_empty_and_singletons() {
		let sampler = SecureSampler::new();
		assert_eq!(sampler.choose_iter(std::iter::empty::<u8>()), None);
		assert_eq!(sampler.choose_iter(vec![7].into_iter()), Some(7));
	}

	#[test]
	fn sample_with_accepts_any_crypto_rng() {
		let mut rng = StdRng::from_os_rng();
		for _ in 0..100 {
			assert!(sample_with(&mut rng, 5) < 5);
		}
	}
}
