//! Frequency smoothing of raw n-gram counts.
//!
//! Good-Turing turns a [`RawCountModel`] into a table mapping a count
//! class `c` to the probability of one n-gram observed `c` times, with
//! class 0 holding the probability of an unseen n-gram. Laplace is the
//! simpler per-context alternative.

use std::collections::BTreeMap;

use super::ngram_model::RawCountModel;
use super::state::State;
use crate::config::{GapPolicy, UnseenEstimate};
use crate::error::GrammarError;

/// Number of distinct n-grams per observed count, `N_c`.
///
/// # Invariants
/// - `sum(c * N_c for c > 0) == total_observed`
/// - `N_0` is never negative: `V^n - sum(N_c)` or `V^n - total_observed`
///   depending on the [`UnseenEstimate`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyOfFrequencies {
	classes: BTreeMap<u64, u128>,
	total_observed: u64,
}

impl FrequencyOfFrequencies {
	/// Builds `N_c` from every count of `model`, and estimates `N_0` from
	/// the size of the n-gram space `vocab_size^n`.
	///
	/// # Errors
	/// - `VocabularyOverflow` if `vocab_size^n` does not fit in a `u128`
	/// - `NegativeUnseenMass` if more n-grams were observed than can exist
	pub fn from_model(
		model: &RawCountModel,
		vocab_size: usize,
		estimate: UnseenEstimate,
	) -> Result<Self, GrammarError> {
		let order = model.order();
		let mut classes: BTreeMap<u64, u128> = BTreeMap::new();
		for count in model.iter_counts() {
			*classes.entry(count).or_insert(0) += 1;
		}

		let total_observed = model.total_occurrences();
		let observed = match estimate {
			UnseenEstimate::Types => classes.values().sum::<u128>(),
			UnseenEstimate::Occurrences => total_observed as u128,
		};
		let space = ngram_space(vocab_size, order)?;
		let unseen = space
			.checked_sub(observed)
			.ok_or(GrammarError::NegativeUnseenMass { order, vocab_size, observed })?;
		classes.insert(0, unseen);

		Ok(Self { classes, total_observed })
	}

	/// `N_c`, or `None` when no n-gram has count `c`.
	pub fn get(&self, c: u64) -> Option<u128> {
		self.classes.get(&c).copied()
	}

	/// Estimated number of unseen n-grams, `N_0`.
	pub fn unseen(&self) -> u128 {
		self.get(0).unwrap_or(0)
	}

	pub fn total_observed(&self) -> u64 {
		self.total_observed
	}

	/// Largest observed count.
	pub fn max_class(&self) -> u64 {
		self.classes.keys().next_back().copied().unwrap_or(0)
	}

	/// `(c, N_c)` pairs in ascending count order, class 0 included.
	pub fn classes(&self) -> impl Iterator<Item = (u64, u128)> + '_ {
		self.classes.iter().map(|(c, n)| (*c, *n))
	}
}

/// `vocab_size^order` as a `u128`.
fn ngram_space(vocab_size: usize, order: usize) -> Result<u128, GrammarError> {
	u32::try_from(order)
		.ok()
		.and_then(|exp| (vocab_size as u128).checked_pow(exp))
		.ok_or(GrammarError::VocabularyOverflow { order, vocab_size })
}

/// Probability of a single n-gram, keyed by its observed count.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedProbabilityTable {
	probabilities: BTreeMap<u64, f64>,
	frequencies: FrequencyOfFrequencies,
}

impl SmoothedProbabilityTable {
	/// Probability of one n-gram seen `c` times.
	pub fn probability(&self, c: u64) -> Option<f64> {
		self.probabilities.get(&c).copied()
	}

	/// Probability of one n-gram never seen in the corpus.
	pub fn unseen_probability(&self) -> f64 {
		self.probability(0).unwrap_or(0.0)
	}

	/// The `N_c` table the probabilities were derived from.
	pub fn frequencies(&self) -> &FrequencyOfFrequencies {
		&self.frequencies
	}

	/// `sum(P(c) * N_c)`, close to 1 for a well-formed table.
	pub fn mass(&self) -> f64 {
		self.frequencies
			.classes()
			.map(|(c, n_c)| self.probability(c).unwrap_or(0.0) * n_c as f64)
			.sum()
	}

	/// `(c, P(c))` pairs in ascending count order.
	pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
		self.probabilities.iter().map(|(c, p)| (*c, *p))
	}
}

/// Good-Turing smoothing of one order's counts.
///
/// For every class but the largest, the re-estimated count is
/// `c* = c' * N_c' / N_c` where `c'` is the successor class picked by
/// `policy`, and one n-gram of that class gets `c* / total`. The largest
/// class keeps its empirical mass `N_max / total`, i.e. `1 / total` per
/// n-gram.
///
/// Count classes without a usable successor are tolerated and logged.
pub fn good_turing(
	model: &RawCountModel,
	vocab_size: usize,
	policy: GapPolicy,
	estimate: UnseenEstimate,
) -> Result<SmoothedProbabilityTable, GrammarError> {
	let order = model.order();
	let frequencies = FrequencyOfFrequencies::from_model(model, vocab_size, estimate)?;
	let mut probabilities = BTreeMap::new();

	if frequencies.total_observed() == 0 {
		let unseen = frequencies.unseen();
		log::warn!("order {}: no n-gram observed, unseen probability is uniform", order);
		probabilities.insert(0, if unseen > 0 { 1.0 / unseen as f64 } else { 0.0 });
		return Ok(SmoothedProbabilityTable { probabilities, frequencies });
	}

	let total = frequencies.total_observed() as f64;
	let classes: Vec<(u64, u128)> = frequencies.classes().collect();
	let mut gaps = 0usize;

	for (i, window) in classes.windows(2).enumerate() {
		let (c, n_c) = window[0];
		let (c_next, n_next) = window[1];

		if n_c == 0 {
			// Only class 0 can be empty: every possible n-gram was observed
			probabilities.insert(c, 0.0);
			continue;
		}

		let successor = if c_next == c + 1 {
			Some((c_next, n_next))
		} else {
			gaps += 1;
			log::debug!("order {}: count class {} has no successor {} (next present: {})", order, c, c + 1, c_next);
			match policy {
				GapPolicy::AdjacentPresent => Some((c_next, n_next)),
				// The unseen class always discounts against the first
				// present class so that it keeps some mass
				GapPolicy::Strict if i == 0 => Some((c_next, n_next)),
				GapPolicy::Strict => None,
			}
		};

		let c_star = match successor {
			Some((c_next, n_next)) => c_next as f64 * n_next as f64 / n_c as f64,
			None => c as f64,
		};

		// p*(c) = c* * N_c / total, spread over the N_c n-grams of the class
		let class_mass = c_star * n_c as f64 / total;
		probabilities.insert(c, class_mass / n_c as f64);
	}

	// Largest class keeps its empirical mass
	let (c_max, n_max) = classes[classes.len() - 1];
	if c_max > 0 {
		let class_mass = n_max as f64 / total;
		probabilities.insert(c_max, class_mass / n_max as f64);
	}

	if gaps > 0 {
		log::warn!("order {}: {} count classes smoothed across a gap in the count spectrum ({:?})", order, gaps, policy);
	}
	log::debug!("order {}: smoothed {} count classes, unseen probability {:e}", order, probabilities.len(), probabilities.get(&0).copied().unwrap_or(0.0));

	Ok(SmoothedProbabilityTable { probabilities, frequencies })
}

/// Add-one estimate of `next` following the context whose transitions are
/// `state`: `(c + 1) / (total + V)`, or `1 / V` for an unseen context.
pub fn laplace(state: Option<&State>, next: &str, vocab_size: usize) -> f64 {
	let (count, total) = state.map_or((0, 0), |state| (state.count(next), state.total()));
	let denominator = total as f64 + vocab_size as f64;
	if denominator == 0.0 {
		return 0.0;
	}
	(count as f64 + 1.0) / denominator
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPSILON: f64 = 1e-12;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < EPSILON
	}

	fn tokens(text: &str) -> Vec<String> {
		text.split_whitespace().map(str::to_owned).collect()
	}

	/// Bigram counts: (a,b)=3, (b,a)=2, (b,c)=1, (c,a)=1 over V=3.
	fn sample() -> RawCountModel {
		RawCountModel::from_tokens(&tokens("a b a b a b c a"), 2).unwrap()
	}

	#[test]
	fn frequency_of_frequencies_accounts_for_whole_space() {
		let model = sample();
		let fof = FrequencyOfFrequencies::from_model(&model, 3, UnseenEstimate::Occurrences).unwrap();

		assert_eq!(fof.total_observed(), 7);
		assert_eq!(fof.get(1), Some(2));
		assert_eq!(fof.get(2), Some(1));
		assert_eq!(fof.get(3), Some(1));
		assert_eq!(fof.unseen(), 9 - 7);
		assert_eq!(fof.max_class(), 3);

		let seen: u128 = fof.classes().filter(|(c, _)| *c > 0).map(|(c, n)| c as u128 * n).sum();
		assert_eq!(seen + fof.unseen(), 9);
	}

	#[test]
	fn type_estimate_counts_distinct_ngrams() {
		let fof = FrequencyOfFrequencies::from_model(&sample(), 3, UnseenEstimate::Types).unwrap();
		// 4 distinct bigrams out of 9 possible
		assert_eq!(fof.unseen(), 5);
		assert_eq!(fof.total_observed(), 7);
	}

	#[test]
	fn negative_unseen_mass_is_an_error() {
		let model = sample();
		let err = FrequencyOfFrequencies::from_model(&model, 2, UnseenEstimate::Occurrences).unwrap_err();
		assert!(matches!(err, GrammarError::NegativeUnseenMass { order: 2, vocab_size: 2, observed: 7 }));

		let err = FrequencyOfFrequencies::from_model(&model, 1, UnseenEstimate::Types).unwrap_err();
		assert!(matches!(err, GrammarError::NegativeUnseenMass { order: 2, vocab_size: 1, observed: 4 }));
	}

	#[test]
	fn occurrence_estimate_rejects_repeated_unigrams() {
		let model = RawCountModel::from_tokens(&tokens("a b a"), 1).unwrap();
		let err = good_turing(&model, 2, GapPolicy::AdjacentPresent, UnseenEstimate::Occurrences).unwrap_err();
		assert!(matches!(err, GrammarError::NegativeUnseenMass { order: 1, .. }));
	}

	#[test]
	fn huge_space_overflows() {
		let model = RawCountModel::from_tokens(&tokens("a b c"), 3).unwrap();
		assert!(FrequencyOfFrequencies::from_model(&model, 3, UnseenEstimate::Types).is_ok());
		let err = FrequencyOfFrequencies::from_model(&model, usize::MAX, UnseenEstimate::Types).unwrap_err();
		assert!(matches!(err, GrammarError::VocabularyOverflow { order: 3, .. }));
	}

	#[test]
	fn good_turing_matches_hand_computation() {
		let table = good_turing(&sample(), 3, GapPolicy::AdjacentPresent, UnseenEstimate::Occurrences).unwrap();
		// N_0 = 2, N_1 = 2, N_2 = 1, N_3 = 1, total = 7
		// c*(0) = 1 * 2 / 2 = 1    -> P(0) = 1 / 7
		// c*(1) = 2 * 1 / 2 = 1    -> P(1) = 1 / 7
		// c*(2) = 3 * 1 / 1 = 3    -> P(2) = 3 / 7
		// top class 3              -> P(3) = 1 / 7
		assert!(close(table.unseen_probability(), 1.0 / 7.0));
		assert!(close(table.probability(1).unwrap(), 1.0 / 7.0));
		assert!(close(table.probability(2).unwrap(), 3.0 / 7.0));
		assert!(close(table.probability(3).unwrap(), 1.0 / 7.0));
		assert_eq!(table.probability(4), None);

		// N_0 = 5 with distinct types: c*(0) = 1 * 2 / 5
		let table = good_turing(&sample(), 3, GapPolicy::AdjacentPresent, UnseenEstimate::Types).unwrap();
		assert!(close(table.unseen_probability(), 0.4 / 7.0));
		assert!(close(table.probability(2).unwrap(), 3.0 / 7.0));
	}

	#[test]
	fn probabilities_are_non_negative_and_roughly_normalized() {
		let stream = tokens("* the cat sat on the mat $ * the dog sat on the log $ * a cat ate $");
		let vocab = 11;
		for n in 1..=3 {
			let model = RawCountModel::from_tokens(&stream, n).unwrap();
			let table = good_turing(&model, vocab, GapPolicy::AdjacentPresent, UnseenEstimate::Types).unwrap();
			assert!(table.iter().all(|(_, p)| p >= 0.0));
			// every token is seen, so the unigram space is saturated
			if n > 1 {
				assert!(table.unseen_probability() > 0.0, "order {}", n);
				// sum(c* N_c) over all but the top class equals the total,
				// the top class adds N_max / total on top
				let top = table.frequencies().get(table.frequencies().max_class()).unwrap() as f64;
				let expected = 1.0 + top / model.total_occurrences() as f64;
				assert!((table.mass() - expected).abs() < 1e-9, "order {}", n);
			}
		}
	}

	#[test]
	fn gap_policies_differ_only_across_gaps() {
		// Unigram counts: x=3, y=3, z=1 -> classes 1 and 3, gap at 2
		let model = RawCountModel::from_tokens(&tokens("x y x y x y z"), 1).unwrap();

		let adjacent = good_turing(&model, 10, GapPolicy::AdjacentPresent, UnseenEstimate::Types).unwrap();
		let strict = good_turing(&model, 10, GapPolicy::Strict, UnseenEstimate::Types).unwrap();
		// Class 1 -> next present class 3 with N_3 = 2: c* = 3 * 2 / 1 = 6
		assert!(close(adjacent.probability(1).unwrap(), 6.0 / 7.0));
		// Strict keeps the raw count: c* = 1
		assert!(close(strict.probability(1).unwrap(), 1.0 / 7.0));
		// N_0 = 10 - 3 and class 1 follows class 0 directly: c*(0) = 1 * 1 / 7
		assert!(close(adjacent.unseen_probability(), 1.0 / 49.0));
		assert!(close(adjacent.unseen_probability(), strict.unseen_probability()));
		assert!(close(adjacent.probability(3).unwrap(), strict.probability(3).unwrap()));
	}

	#[test]
	fn strict_unseen_class_discounts_against_first_present_class() {
		// Unigram counts: p=2, q=2 -> no class 1
		let model = RawCountModel::from_tokens(&tokens("p q p q"), 1).unwrap();
		let table = good_turing(&model, 4, GapPolicy::Strict, UnseenEstimate::Types).unwrap();
		// N_0 = 2, c*(0) = 2 * 2 / 2 = 2 -> P(0) = 2 / 4
		assert!(close(table.unseen_probability(), 0.5));
	}

	#[test]
	fn empty_model_is_uniform_over_space() {
		let model = RawCountModel::from_tokens(&tokens("a"), 2).unwrap();
		let table = good_turing(&model, 4, GapPolicy::AdjacentPresent, UnseenEstimate::Types).unwrap();
		assert!(close(table.unseen_probability(), 1.0 / 16.0));
		assert_eq!(table.iter().count(), 1);
	}

	#[test]
	fn saturated_space_has_no_unseen_mass() {
		// Unigrams over V=2 where both tokens are seen: N_0 = 2 - 2 = 0
		let model = RawCountModel::from_tokens(&tokens("a b"), 1).unwrap();
		let table = good_turing(&model, 2, GapPolicy::AdjacentPresent, UnseenEstimate::Types).unwrap();
		assert_eq!(table.unseen_probability(), 0.0);
		assert!(close(table.probability(1).unwrap(), 0.5));
	}

	#[test]
	fn laplace_adds_one() {
		let model = sample();
		// context "b" saw a twice and c once
		assert!(close(laplace(model.get("b"), "a", 3), 3.0 / 6.0));
		assert!(close(laplace(model.get("b"), "b", 3), 1.0 / 6.0));
		assert!(close(laplace(model.get("zz"), "a", 3), 1.0 / 3.0));
		assert_eq!(laplace(None, "a", 0), 0.0);
	}
}
