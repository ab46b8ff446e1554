use std::fs;
use std::io::{self, Read};

use seed_gen_core::{GeneratorConfig, SeedError, SeedGenerator, SnapshotScope};
use tempfile::TempDir;

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWX";
const TRAINING: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>/?\
	The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs.";

fn temp_workspace() -> TempDir {
	tempfile::tempdir().expect("create tempdir")
}

fn trained(n: usize, text: &str) -> SeedGenerator {
	let mut generator = SeedGenerator::new(n, false).expect("valid n");
	generator.train(text).expect("training succeeds");
	generator
}

#[test]
fn generation_always_has_requested_length() {
	let mut generator = trained(3, TRAINING);
	for length in 3..64 {
		let seed = generator.generate(length, None).unwrap();
		assert_eq!(seed.chars().count(), length);
	}
}

#[test]
fn generation_errors() {
	let mut empty = SeedGenerator::new(3, false).unwrap();
	assert!(matches!(empty.generate(10, None), Err(SeedError::UntrainedModel)));

	let mut generator = trained(3, TRAINING);
	assert!(matches!(generator.generate(2, None), Err(SeedError::LengthTooShort { length: 2, n: 3 })));
}

#[test]
fn abcabcabcx_scenario() {
	let mut generator = trained(3, "abcabcabcX");
	let abc = generator.model().get("abc").unwrap();
	assert_eq!(abc.count('a'), 2);
	assert_eq!(abc.count('X'), 1);
	assert_eq!(generator.generate(3, Some("abc")).unwrap(), "abc");
}

#[test]
fn alphabet_model_is_healthy() {
	let generator = trained(3, ALPHABET);
	let report = generator.validate_model();
	assert_eq!(report.dead_ends, 0);
	assert!(report.is_healthy());
}

#[test]
fn insufficient_input_keeps_previous_model() {
	let mut generator = trained(3, "hello world");
	let before = generator.model().clone();
	assert!(matches!(generator.train("abc"), Err(SeedError::InsufficientInput { .. })));
	assert_eq!(generator.model(), &before);
}

#[test]
fn json_round_trip_through_files() {
	let workspace = temp_workspace();
	let path = workspace.path().join("model.json");

	let mut original = trained(3, TRAINING);
	original.save_model(&path).unwrap();

	let text = fs::read_to_string(&path).unwrap();
	let value: serde_json::Value = serde_json::from_str(&text).expect("model file is valid JSON");
	assert!(value.is_object());

	let mut reloaded = SeedGenerator::new(3, false).unwrap();
	reloaded.load_model(&path).unwrap();
	assert_eq!(reloaded.model().transitions(), original.model().transitions());
	assert!(reloaded.model().corpus().is_empty());
	assert_eq!(reloaded.generate(12, None).unwrap().chars().count(), 12);
}

#[test]
fn postcard_round_trip_through_files() {
	let workspace = temp_workspace();
	let path = workspace.path().join("model.bin");

	let mut original = trained(4, TRAINING);
	original.save_model(&path).unwrap();

	let mut reloaded = SeedGenerator::new(4, false).unwrap();
	reloaded.load_model(&path).unwrap();
	assert_eq!(reloaded.model().transitions(), original.model().transitions());
}

#[test]
fn full_snapshot_restores_corpus() {
	let workspace = temp_workspace();
	let path = workspace.path().join("full.json");
	let config = GeneratorConfig::builder().n(2).snapshot_scope(SnapshotScope::Full).build().unwrap();

	let mut original = SeedGenerator::with_config(config.clone()).unwrap();
	original.train("hello markov world").unwrap();
	original.save_model(&path).unwrap();

	let mut reloaded = SeedGenerator::with_config(config).unwrap();
	reloaded.load_model(&path).unwrap();
	assert_eq!(reloaded.model(), original.model());
}

#[test]
fn failed_load_keeps_current_model() {
	let workspace = temp_workspace();
	let mut generator = trained(3, TRAINING);
	let before = generator.model().clone();

	let bad_length = workspace.path().join("bad.json");
	fs::write(&bad_length, r#"{ "abcd": { "e": 1 } }"#).unwrap();
	assert!(matches!(generator.load_model(&bad_length), Err(SeedError::CorruptModel(_))));

	let garbage = workspace.path().join("garbage.json");
	fs::write(&garbage, "{ not json").unwrap();
	assert!(matches!(generator.load_model(&garbage), Err(SeedError::CorruptModel(_))));

	let missing = workspace.path().join("missing.json");
	assert!(matches!(generator.load_model(&missing), Err(SeedError::NotFound(_))));

	assert_eq!(generator.model(), &before);
}

#[test]
fn overflowing_counts_are_rejected_on_load() {
	let workspace = temp_workspace();
	let path = workspace.path().join("huge.json");
	fs::write(&path, r#"{ "ab": { "c": 18446744073709551615, "d": 1 } }"#).unwrap();

	let mut generator = trained(2, "abcabd");
	let before = generator.model().clone();
	assert!(matches!(generator.load_model(&path), Err(SeedError::CorruptModel(_))));
	assert_eq!(generator.model(), &before);
	assert_eq!(generator.generate(4, Some("ab")).unwrap().chars().count(), 4);
	assert!(generator.validate_model().is_healthy());
}

#[test]
fn file_training_matches_text_training() {
	let workspace = temp_workspace();
	let path = workspace.path().join("corpus.txt");
	let text = TRAINING.repeat(200);
	fs::write(&path, &text).unwrap();

	let config = GeneratorConfig::builder().n(3).chunk_size(100).build().unwrap();
	let mut streamed = SeedGenerator::with_config(config).unwrap();
	let summary = streamed.train_from_file(&path).unwrap();
	assert_eq!(summary.bytes, text.len() as u64);
	assert!(summary.chunks > 1);

	let batch = trained(3, &text);
	assert_eq!(streamed.model(), batch.model());
}

#[test]
fn missing_training_file_is_not_found() {
	let workspace = temp_workspace();
	let mut generator = SeedGenerator::new(3, false).unwrap();
	let err = generator.train_from_file(workspace.path().join("nope.txt")).unwrap_err();
	assert!(matches!(err, SeedError::NotFound(_)));
}

struct BrokenAfter<'a> {
	data: &'a [u8],
	remaining_reads: usize,
}

impl Read for BrokenAfter<'_> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.remaining_reads == 0 {
			return Err(io::Error::new(io::ErrorKind::ConnectionReset, "aborted by caller"));
		}
		self.remaining_reads -= 1;
		let n = buf.len().min(self.data.len());
		buf[..n].copy_from_slice(&self.data[..n]);
		self.data = &self.data[n..];
		Ok(n)
	}
}

#[test]
fn aborted_stream_keeps_folded_chunks() {
	let config = GeneratorConfig::builder().n(2).chunk_size(8).verbose(true).build().unwrap();
	let mut generator = SeedGenerator::with_config(config).unwrap();
	let source = BrokenAfter { data: TRAINING.as_bytes(), remaining_reads: 2 };

	let err = generator.train_from_stream(source, None).unwrap_err();
	assert!(matches!(err, SeedError::Io { .. }));
	assert_eq!(generator.model().corpus(), &TRAINING[..16]);
	assert!(!generator.model().is_empty());
	assert!(generator.get_logs().iter().any(|m| m.contains("streamed training failed")));
	assert_eq!(generator.generate(6, None).unwrap().chars().count(), 6);
}
