//! Markov chain seed generation library.
//!
//! This crate builds a character-level n-gram model from training text and
//! generates strings of an exact length from it, drawing every random choice
//! from a cryptographically secure source:
//! - Batch and chunked streaming training
//! - Weighted successor sampling with an edit-distance fallback
//! - JSON and postcard persistence
//! - Model health statistics
//!
//! ```no_run
//! use seed_gen_core::SeedGenerator;
//!
//! # fn main() -> seed_gen_core::Result<()> {
//! let mut generator = SeedGenerator::new(3, false)?;
//! generator.train("The quick brown fox jumps over the lazy dog.")?;
//! let seed = generator.generate(16, None)?;
//! generator.save_model("model.json")?;
//! # Ok(())
//! # }
//! ```

/// Core model, training and generation logic.
pub mod model;

/// Generator configuration and builder.
pub mod config;

/// Error type shared by every operation.
pub mod error;

/// Model file encoding and decoding.
pub mod persistence;

/// File helpers (buffered open/create, path building).
pub mod io;

pub use config::{GeneratorConfig, RecoveryPolicy, SnapshotScope, Weighting};
pub use error::{Result, SeedError};
pub use model::seed_generator::SeedGenerator;
pub use model::validator::HealthReport;
pub use persistence::ModelFormat;
