use std::collections::HashMap;

/// Next-token counts observed after one context.
///
/// A `State` is keyed by its context's lookup key (see
/// [`Context::key`](super::context::Context::key)) and records how often
/// each next token followed it in the corpus.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// Lookup key of the context.
	key: String,
	/// Occurrences indexed by next token.
	/// Example: { "cat" => 42, "dog" => 3 }
	transitions: HashMap<String, u64>,
}

impl State {
	/// Creates a new empty state for the given key.
	pub(crate) fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: HashMap::new(),
		}
	}

	/// Records an occurrence of `next`.
	///
	/// Starts the count at 1 when the transition is new.
	pub(crate) fn add_transition(&mut self, next: &str) {
		if let Some(occurrence) = self.transitions.get_mut(next) {
			*occurrence += 1;
		} else {
			self.transitions.insert(next.to_owned(), 1);
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Occurrences of `next` after this context, 0 if never seen.
	pub fn count(&self, next: &str) -> u64 {
		self.transitions.get(next).copied().unwrap_or(0)
	}

	/// Sum of all transition counts.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	/// Number of distinct next tokens.
	pub fn distinct(&self) -> usize {
		self.transitions.len()
	}

	/// Iterates over `(next token, count)` pairs in arbitrary order.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(next, occurrence)| (next.as_str(), *occurrence))
	}
}
