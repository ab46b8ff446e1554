use log::info;
use seed_gen_core::io::build_output_path;
use seed_gen_core::{GeneratorConfig, RecoveryPolicy, SeedGenerator, SnapshotScope};

// Training text with enough variety for a 3-gram model
const TRAINING_TEXT: &str = concat!(
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>/?",
    "The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs.",
);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Window of 3 code points, keep diagnostic messages in the log buffer
    let config = GeneratorConfig::builder()
        .n(3)
        .verbose(true)
        .recovery(RecoveryPolicy::CorpusCharacter)
        // Also store n and the corpus so a reloaded model keeps the corpus fallback
        .snapshot_scope(SnapshotScope::Full)
        .build()?;
    let mut generator = SeedGenerator::with_config(config)?;

    generator.train(TRAINING_TEXT)?;

    let stats = generator.validate_model();
    println!("Model Statistics:");
    println!("- N-Grams: {}", stats.ngrams);
    println!("- Total Transitions: {}", stats.total_transitions);
    println!("- Average Transitions: {:.2}", stats.avg_transitions);
    println!("- Max Transitions: {}", stats.max_transitions);
    println!("- Min Transitions: {}", stats.min_transitions);
    println!("- Dead Ends: {} ({:.1}%)", stats.dead_ends, stats.dead_end_ratio * 100.0);
    for warning in &stats.warnings {
        println!("- Warning: {warning}");
    }
    println!();

    for (i, seed) in generator.generate_many(5, 16)?.iter().enumerate() {
        println!("Generated {}: {:?}", i + 1, seed);
    }

    // A known 3-gram is used as the first window
    println!("Seeded: {:?}", generator.generate(20, Some("The"))?);

    // An unknown one is ignored (see the logs below)
    println!("Unknown start: {:?}", generator.generate(20, Some("zzz"))?);
    println!();

    // Save as JSON and postcard, then reload the binary one
    let dir = std::env::temp_dir();
    let json_path = dir.join("markov_model.json");
    let bin_path = build_output_path(&json_path, "bin")?;
    generator.save_model(&json_path)?;
    generator.save_model(&bin_path)?;

    generator.reset_model();
    generator.load_model(&bin_path)?;
    println!("Reloaded model generated: {:?}", generator.generate(12, None)?);
    info!("model files written to {}", dir.display());
    println!();

    println!("Logs:");
    for message in generator.get_logs() {
        println!("  {message}");
    }
    generator.clear_logs();

    Ok(())
}
