use super::context::Context;
use super::ngram_model::RawCountModel;
use super::smoothing::{self, SmoothedProbabilityTable};

/// Turns a count lookup into a probability.
#[derive(Clone, Debug, PartialEq)]
pub enum Estimator {
	/// Count-class table shared by every context of the order.
	GoodTuring(SmoothedProbabilityTable),
	/// Add-one estimate per context over a vocabulary of `vocab_size`.
	Laplace { vocab_size: usize },
}

/// One n-gram order: its raw counts and the estimator smoothing them.
///
/// Read-only once built by [`ModelBuilder`](super::builder::ModelBuilder).
#[derive(Clone, Debug, PartialEq)]
pub struct LanguageModel {
	raw: RawCountModel,
	estimator: Estimator,
}

impl LanguageModel {
	pub fn new(raw: RawCountModel, estimator: Estimator) -> Self {
		Self { raw, estimator }
	}

	pub fn order(&self) -> usize {
		self.raw.order()
	}

	pub fn raw(&self) -> &RawCountModel {
		&self.raw
	}

	pub fn estimator(&self) -> &Estimator {
		&self.estimator
	}

	/// The Good-Turing table, if this order is Good-Turing smoothed.
	pub fn table(&self) -> Option<&SmoothedProbabilityTable> {
		match &self.estimator {
			Estimator::GoodTuring(table) => Some(table),
			Estimator::Laplace { .. } => None,
		}
	}

	/// Probability of `next` after `context` under this order.
	///
	/// A known context yields the count of `next` (possibly 0), looked up
	/// in the smoothed table. An unknown context yields the unseen
	/// probability.
	pub fn probability(&self, context: &Context, next: &str) -> f64 {
		let state = self.raw.get(&context.key(next));
		match &self.estimator {
			Estimator::GoodTuring(table) => match state {
				Some(state) => table
					.probability(state.count(next))
					.unwrap_or_else(|| table.unseen_probability()),
				None => table.unseen_probability(),
			},
			Estimator::Laplace { vocab_size } => smoothing::laplace(state, next, *vocab_size),
		}
	}
}

/// Smoothed models for every order from `max_order` down to 1.
///
/// # Invariants
/// - `models[i].order() == max_order - i`: highest order first, so that
///   position `i` lines up with interpolation weight `i`
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSet {
	models: Vec<LanguageModel>,
	vocab_size: usize,
}

impl ModelSet {
	pub(crate) fn new(models: Vec<LanguageModel>, vocab_size: usize) -> Self {
		debug_assert!(models.windows(2).all(|w| w[0].order() == w[1].order() + 1));
		Self { models, vocab_size }
	}

	/// Order of the first model, 0 for an empty set.
	pub fn max_order(&self) -> usize {
		self.models.first().map_or(0, LanguageModel::order)
	}

	pub fn len(&self) -> usize {
		self.models.len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}

	/// Number of distinct corpus tokens the models were smoothed against.
	pub fn vocabulary_size(&self) -> usize {
		self.vocab_size
	}

	/// Model of order `n`, if built.
	pub fn get(&self, n: usize) -> Option<&LanguageModel> {
		self.models.iter().find(|model| model.order() == n)
	}

	/// Models, highest order first.
	pub fn iter(&self) -> impl Iterator<Item = &LanguageModel> {
		self.models.iter()
	}
}
