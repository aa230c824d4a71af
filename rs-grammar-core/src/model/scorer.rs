use std::sync::mpsc;
use std::thread;

use serde::Serialize;

use super::context::Context;
use super::multigram_model::ModelSet;
use crate::config::{GrammarConfig, validate_weights};
use crate::error::GrammarError;
use crate::tokenize::{is_marker, mark};

/// Likelihood of a token sequence under a [`ModelSet`].
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Score {
	/// Product of the blended probability of every window.
	pub probability: f64,

	/// Sum of the natural log of every window's blended probability.
	/// Stays usable when `probability` underflows on long sequences.
	pub log_probability: f64,

	/// Number of windows scored.
	pub windows: usize,
}

impl Score {
	/// Score of a sequence with no window.
	fn certain() -> Self {
		Self { probability: 1.0, log_probability: 0.0, windows: 0 }
	}

	/// True when the sequence was shorter than the top order: the
	/// probability is then exactly 1 and says nothing about the sequence.
	pub fn is_degenerate(&self) -> bool {
		self.windows == 0
	}
}

/// Scores sequences by blending every order of a [`ModelSet`].
///
/// For each window of the top order, model `i` is queried with the
/// window's context shrunk by `i` leftmost tokens, and its probability is
/// weighted by `weights[i]`. The blended probabilities of all windows are
/// multiplied together.
///
/// With weights `[1, 0, ..., 0]` only the top order contributes.
#[derive(Debug, Clone)]
pub struct InterpolatedScorer<'a> {
	models: &'a ModelSet,
	weights: Vec<f64>,
}

impl<'a> InterpolatedScorer<'a> {
	/// # Errors
	/// - `WeightMismatch` if there is not exactly one weight per model
	/// - `InvalidWeight` for a negative or non-finite weight
	pub fn new(models: &'a ModelSet, weights: Vec<f64>) -> Result<Self, GrammarError> {
		validate_weights(&weights, models.len())?;
		Ok(Self { models, weights })
	}

	/// Uses the interpolation weights of `config`.
	pub fn from_config(models: &'a ModelSet, config: &GrammarConfig) -> Result<Self, GrammarError> {
		Self::new(models, config.interpolation_weights.clone())
	}

	pub fn weights(&self) -> &[f64] {
		&self.weights
	}

	/// Scores a raw word sequence, adding the boundary markers first.
	///
	/// # Errors
	/// Returns `ReservedToken` if a word is one of the boundary markers.
	pub fn score<S: AsRef<str>>(&self, words: &[S]) -> Result<Score, GrammarError> {
		check_words(words)?;
		Ok(self.score_marked(&mark(words)))
	}

	/// Scores a sequence that already carries its boundary markers.
	///
	/// A sequence shorter than the top order yields a degenerate score.
	pub fn score_marked<S: AsRef<str>>(&self, tokens: &[S]) -> Score {
		let n = self.models.max_order();
		let mut score = Score::certain();
		if n == 0 || tokens.len() < n {
			return score;
		}

		for window in tokens.windows(n) {
			let p = self.blend(window);
			score.probability *= p;
			score.log_probability += p.ln();
			score.windows += 1;
		}
		score
	}

	/// Blended probability of the last token of `window` given the others.
	fn blend<S: AsRef<str>>(&self, window: &[S]) -> f64 {
		let (context, next) = window.split_at(window.len() - 1);
		let next = next[0].as_ref();
		let mut context = Context::from_tokens(context);

		let mut p = 0.0;
		for (model, weight) in self.models.iter().zip(&self.weights) {
			p += weight * model.probability(&context, next);
			context = context.shrink();
		}
		p
	}

	/// Scores many raw word sequences in parallel.
	///
	/// The model set is shared read-only between worker threads; scores
	/// come back in input order.
	///
	/// # Errors
	/// Returns `ReservedToken` if any sentence holds a boundary marker;
	/// nothing is scored then.
	pub fn score_batch<S: AsRef<str> + Sync>(&self, sentences: &[Vec<S>]) -> Result<Vec<Score>, GrammarError> {
		for words in sentences {
			check_words(words)?;
		}
		if sentences.is_empty() {
			return Ok(Vec::new());
		}

		let workers = num_cpus::get().max(1);
		let chunk_size = sentences.len().div_ceil(workers);
		let chunks = sentences.len().div_ceil(chunk_size);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for (index, chunk) in sentences.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				scope.spawn(move || {
					let scores: Vec<Score> = chunk.iter().map(|words| self.score_marked(&mark(words))).collect();
					// The receiver outlives the scope, so sending cannot fail
					let _ = tx.send((index, scores));
				});
			}
		});
		drop(tx);

		let mut partial: Vec<Vec<Score>> = vec![Vec::new(); chunks];
		for (index, scores) in rx.iter() {
			partial[index] = scores;
		}
		Ok(partial.into_iter().flatten().collect())
	}
}

/// Rejects caller words that would be read as boundary markers.
fn check_words<S: AsRef<str>>(words: &[S]) -> Result<(), GrammarError> {
	match words.iter().map(|w| w.as_ref()).find(|w| is_marker(w)) {
		Some(marker) => Err(GrammarError::ReservedToken(marker.to_owned())),
		None => Ok(()),
	}
}
