//! Top-level module for the seed generation engine.
//!
//! This module provides a character-level Markov seed generator, including:
//! - The n-gram transition table (`NGramModel`) and its per-key `State`
//! - Batch and streamed training (`trainer`)
//! - Generation with a fallback chain (`Generator`)
//! - Health statistics (`validator`)
//! - A high-level facade (`SeedGenerator`)

/// High-level facade owning a model, its configuration and its log buffer.
pub mod seed_generator;

/// Sequential generation and its fallback chain.
pub mod generator;

/// Character-level n-gram transition table.
pub mod ngram_model;

/// Outgoing transitions of a single key, with weighted sampling.
pub mod state;

/// Batch and chunked streaming training.
pub mod trainer;

/// Read-only model health statistics.
pub mod validator;

/// Uniform sampling from a cryptographically secure source.
pub mod sampler;

/// Levenshtein distance, used by the nearest-key fallback.
pub mod distance;

/// Caller-visible diagnostic messages.
pub mod log_buffer;
