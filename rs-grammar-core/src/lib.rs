//! N-gram grammar plausibility scoring.
//!
//! This crate builds word n-gram language models from a text corpus and
//! scores candidate word sequences with them:
//! - Sentence splitting and word tokenization
//! - Per-order n-gram counting
//! - Good-Turing (or Laplace) smoothing, with an unseen-event estimate
//! - Deleted-interpolation scoring across orders
//!
//! Models live in memory only; they are built once per corpus and are
//! read-only afterwards.

/// Training and scoring parameters.
pub mod config;

/// Tokenized training corpus.
pub mod corpus;

/// Error type shared by the whole crate.
pub mod error;

/// Counting, smoothing, model assembly and scoring.
pub mod model;

/// Sentence splitting, word tokenization and boundary markers.
pub mod tokenize;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use config::{GapPolicy, GrammarConfig, Smoothing, UnseenEstimate};
pub use corpus::Corpus;
pub use error::GrammarError;
pub use model::builder::ModelBuilder;
pub use model::multigram_model::ModelSet;
pub use model::scorer::{InterpolatedScorer, Score};
