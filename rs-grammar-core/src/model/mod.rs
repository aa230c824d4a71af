//! Statistical core of the grammar scorer.
//!
//! Data flows leaf-first through these modules:
//! - `ngram_model`: counting windows into raw count models (`GramCounter`)
//! - `smoothing`: Good-Turing and Laplace estimates
//! - `multigram_model`: per-order language models and the ordered `ModelSet`
//! - `builder`: orchestration of counting and smoothing for every order
//! - `scorer`: deleted-interpolation scoring of sequences

/// Context of an n-gram, with explicit empty-context semantics.
pub mod context;

/// Sliding-window counting (`GramCounter`) and frozen counts (`RawCountModel`).
pub mod ngram_model;

/// Frequency-of-frequencies, Good-Turing tables and Laplace estimates.
pub mod smoothing;

/// `LanguageModel` (counts + estimator) and the ordered `ModelSet`.
pub mod multigram_model;

/// Builds a `ModelSet` from a corpus.
pub mod builder;

/// Interpolated scoring of token sequences.
pub mod scorer;

/// Next-token counts of a single context.
pub mod state;
