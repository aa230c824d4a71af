use std::collections::HashMap;

use super::context::Context;
use super::state::State;
use crate::error::GrammarError;

/// Accumulates n-gram counts of a single order from token streams.
///
/// The counter is the only mutable stage of a model: once every stream
/// has been fed, `finish` freezes it into a read-only [`RawCountModel`].
///
/// # Invariants
/// - `n` is always >= 1
/// - Each state in `states` corresponds to a unique context key
#[derive(Debug)]
pub struct GramCounter {
	/// The order of the model (number of tokens in the n-gram)
	n: usize,

	/// Mapping from a context key to its observed transitions
	states: HashMap<String, State>,

	/// Number of windows processed so far
	windows: u64,
}

impl GramCounter {
	/// Creates a new counter of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn new(n: usize) -> Result<Self, GrammarError> {
		if n < 1 {
			return Err(GrammarError::InvalidOrder(n));
		}
		Ok(Self { n, states: HashMap::new(), windows: 0 })
	}

	/// Slides a window of width `n` over `tokens` and counts each
	/// (context, next token) pair.
	///
	/// A stream shorter than `n` contributes no window.
	pub fn feed<S: AsRef<str>>(&mut self, tokens: &[S]) {
		if tokens.len() < self.n {
			return;
		}

		for window in tokens.windows(self.n) {
			let (context, next) = window.split_at(self.n - 1);
			let next = next[0].as_ref();
			let key = Context::from_tokens(context).key(next);

			let state = self.states.entry(key).or_insert_with_key(|key| State::new(key));
			state.add_transition(next);
			self.windows += 1;
		}
	}

	/// Number of windows counted so far.
	pub fn windows(&self) -> u64 {
		self.windows
	}

	/// Freezes the counter into a read-only model.
	pub fn finish(self) -> RawCountModel {
		RawCountModel { n: self.n, states: self.states, total: self.windows }
	}
}

/// Raw n-gram counts of one order: context key → next token → count.
///
/// Built by [`GramCounter`]; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCountModel {
	n: usize,
	states: HashMap<String, State>,
	total: u64,
}

impl RawCountModel {
	/// Counts every window of `tokens` at order `n`.
	pub fn from_tokens<S: AsRef<str>>(tokens: &[S], n: usize) -> Result<Self, GrammarError> {
		let mut counter = GramCounter::new(n)?;
		counter.feed(tokens);
		Ok(counter.finish())
	}

	pub fn order(&self) -> usize {
		self.n
	}

	/// Transitions recorded for a context key, if the context was seen.
	pub fn get(&self, key: &str) -> Option<&State> {
		self.states.get(key)
	}

	/// Occurrences of `next` after the context stored under `key`.
	pub fn count(&self, key: &str, next: &str) -> u64 {
		self.states.get(key).map_or(0, |state| state.count(next))
	}

	/// Number of distinct context keys.
	pub fn contexts(&self) -> usize {
		self.states.len()
	}

	/// Total number of n-gram occurrences, i.e. windows processed.
	pub fn total_occurrences(&self) -> u64 {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.total == 0
	}

	/// Every stored (context, next token) count, in arbitrary order.
	pub fn iter_counts(&self) -> impl Iterator<Item = u64> + '_ {
		self.states.values().flat_map(|state| state.transitions().map(|(_, c)| c))
	}
}
