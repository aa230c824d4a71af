use serde::{Deserialize, Serialize};

use crate::error::GrammarError;

/// Frequency smoothing applied to every order's raw counts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
	/// Count-class re-estimation with an unseen-event class.
	#[default]
	GoodTuring,
	/// Add-one estimate per context.
	Laplace,
}

/// How Good-Turing re-estimation treats a count class whose successor
/// class `c + 1` was never observed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
	/// Discount against the next *present* class: `c* = c' * N_c' / N_c`.
	#[default]
	AdjacentPresent,
	/// Discount against `c + 1` only; a class without a successor keeps
	/// its raw count.
	Strict,
}

/// What `N_0`, the number of unseen n-grams, is subtracted from `V^n`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnseenEstimate {
	/// `N_0 = V^n - sum(N_c)`: every distinct observed n-gram takes one slot.
	///
	/// With this estimate `sum(c * N_c) + N_0` exceeds `V^n` whenever an
	/// n-gram repeats; only `Occurrences` keeps that sum equal to `V^n`.
	/// It is the default because `Occurrences` is negative for unigrams
	/// of any text where a word repeats.
	#[default]
	Types,
	/// `N_0 = V^n - sum(c * N_c)`: every observed occurrence takes one slot.
	/// Negative for unigram models as soon as a token repeats.
	Occurrences,
}

/// Parameters of a training and scoring run.
///
/// # Invariants
/// - `max_order >= 1`
/// - `interpolation_weights.len() == max_order`, highest order first
/// - every weight is finite and non-negative
///
/// Fields missing from a serialized config take their default; missing
/// weights are sized to `max_order` like [`GrammarConfig::with_max_order`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "PartialGrammarConfig")]
pub struct GrammarConfig {
	/// Highest n-gram order; models are built for `max_order..=1`.
	pub max_order: usize,

	/// Smoothing applied to every order.
	pub smoothing: Smoothing,

	/// Blending weights, aligned with the model set (highest order first).
	pub interpolation_weights: Vec<f64>,

	/// Treatment of gaps in the count spectrum.
	pub gap_policy: GapPolicy,

	/// Estimate of the number of unseen n-grams.
	pub unseen_estimate: UnseenEstimate,
}

impl Default for GrammarConfig {
	/// Trigram, Good-Turing, weights `[1, 0, 0]`: only the trigram model
	/// contributes, lower orders are built but zero-weighted.
	fn default() -> Self {
		Self {
			max_order: 3,
			smoothing: Smoothing::GoodTuring,
			interpolation_weights: vec![1.0, 0.0, 0.0],
			gap_policy: GapPolicy::AdjacentPresent,
			unseen_estimate: UnseenEstimate::Types,
		}
	}
}

/// Serialized form of [`GrammarConfig`], before defaults are filled in.
#[derive(Deserialize)]
#[serde(default)]
struct PartialGrammarConfig {
	max_order: usize,
	smoothing: Smoothing,
	interpolation_weights: Option<Vec<f64>>,
	gap_policy: GapPolicy,
	unseen_estimate: UnseenEstimate,
}

impl Default for PartialGrammarConfig {
	fn default() -> Self {
		let config = GrammarConfig::default();
		Self {
			max_order: config.max_order,
			smoothing: config.smoothing,
			interpolation_weights: None,
			gap_policy: config.gap_policy,
			unseen_estimate: config.unseen_estimate,
		}
	}
}

impl From<PartialGrammarConfig> for GrammarConfig {
	fn from(partial: PartialGrammarConfig) -> Self {
		Self {
			interpolation_weights: partial
				.interpolation_weights
				.unwrap_or_else(|| GrammarConfig::top_order_weights(partial.max_order)),
			max_order: partial.max_order,
			smoothing: partial.smoothing,
			gap_policy: partial.gap_policy,
			unseen_estimate: partial.unseen_estimate,
		}
	}
}

impl GrammarConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the highest order.
	///
	/// The weight vector is reset to `[1, 0, ..., 0]` of matching length;
	/// call `with_weights` afterwards to blend orders.
	pub fn with_max_order(mut self, max_order: usize) -> Self {
		self.max_order = max_order;
		self.interpolation_weights = Self::top_order_weights(max_order);
		self
	}

	pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
		self.interpolation_weights = weights;
		self
	}

	pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
		self.smoothing = smoothing;
		self
	}

	pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
		self.gap_policy = gap_policy;
		self
	}

	pub fn with_unseen_estimate(mut self, unseen_estimate: UnseenEstimate) -> Self {
		self.unseen_estimate = unseen_estimate;
		self
	}

	/// `[1, 0, ..., 0]` with `max_order` entries.
	pub fn top_order_weights(max_order: usize) -> Vec<f64> {
		(0..max_order).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect()
	}

	/// Checks the invariants listed on the type.
	pub fn validate(&self) -> Result<(), GrammarError> {
		if self.max_order == 0 {
			return Err(GrammarError::InvalidOrder(0));
		}
		validate_weights(&self.interpolation_weights, self.max_order)
	}
}

/// Checks that there is one finite, non-negative weight per model.
pub(crate) fn validate_weights(weights: &[f64], models: usize) -> Result<(), GrammarError> {
	if weights.len() != models {
		return Err(GrammarError::WeightMismatch { weights: weights.len(), models });
	}
	if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
		return Err(GrammarError::InvalidWeight(*w));
	}
	Ok(())
}
