use super::multigram_model::{Estimator, LanguageModel, ModelSet};
use super::ngram_model::GramCounter;
use super::smoothing::good_turing;
use crate::config::{GrammarConfig, Smoothing};
use crate::corpus::Corpus;
use crate::error::GrammarError;

/// Builds the [`ModelSet`] of a corpus, one order at a time.
///
/// Orders are processed sequentially from `max_order` down to 1: each is
/// counted over the whole token stream, then smoothed against the corpus
/// vocabulary.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
	config: GrammarConfig,
}

impl ModelBuilder {
	/// # Errors
	/// Returns an error if the configuration is invalid.
	pub fn new(config: GrammarConfig) -> Result<Self, GrammarError> {
		config.validate()?;
		Ok(Self { config })
	}

	pub fn config(&self) -> &GrammarConfig {
		&self.config
	}

	/// Counts and smooths every order of `corpus`.
	///
	/// # Errors
	/// - `EmptyCorpus` if the corpus holds no token
	/// - smoothing errors (`NegativeUnseenMass`, `VocabularyOverflow`)
	pub fn build(&self, corpus: &Corpus) -> Result<ModelSet, GrammarError> {
		if corpus.is_empty() {
			return Err(GrammarError::EmptyCorpus);
		}

		let vocab_size = corpus.vocabulary_size();
		let mut models = Vec::with_capacity(self.config.max_order);

		for n in (1..=self.config.max_order).rev() {
			let mut counter = GramCounter::new(n)?;
			counter.feed(corpus.tokens());
			let raw = counter.finish();

			let estimator = match self.config.smoothing {
				Smoothing::GoodTuring => Estimator::GoodTuring(good_turing(
					&raw,
					vocab_size,
					self.config.gap_policy,
					self.config.unseen_estimate,
				)?),
				Smoothing::Laplace => Estimator::Laplace { vocab_size },
			};

			match &estimator {
				Estimator::GoodTuring(table) => log::info!(
					"order {}: {} contexts, {} occurrences, unseen probability {:e}",
					n,
					raw.contexts(),
					raw.total_occurrences(),
					table.unseen_probability()
				),
				Estimator::Laplace { .. } => log::info!(
					"order {}: {} contexts, {} occurrences (laplace)",
					n,
					raw.contexts(),
					raw.total_occurrences()
				),
			}

			models.push(LanguageModel::new(raw, estimator));
		}

		Ok(ModelSet::new(models, vocab_size))
	}
}
