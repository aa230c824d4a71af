use std::fmt;

/// The tokens preceding a predicted token in an n-gram.
///
/// Order-1 models have no context: their count tables are keyed by the
/// predicted token itself, so an `Empty` context resolves to the next
/// token when a lookup key is needed. Back-off shrinking ends on `Empty`
/// and follows the same convention.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Context {
	Empty,
	Tokens(Vec<String>),
}

impl Context {
	/// Builds a context from a token slice; an empty slice gives `Empty`.
	pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
		if tokens.is_empty() {
			Context::Empty
		} else {
			Context::Tokens(tokens.iter().map(|t| t.as_ref().to_owned()).collect())
		}
	}

	/// Number of tokens in the context.
	pub fn len(&self) -> usize {
		match self {
			Context::Empty => 0,
			Context::Tokens(tokens) => tokens.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Context::Empty)
	}

	/// Key under which a count table stores transitions from this context
	/// towards `next`.
	pub fn key(&self, next: &str) -> String {
		match self {
			Context::Empty => next.to_owned(),
			Context::Tokens(tokens) => tokens.join(" "),
		}
	}

	/// Drops the leftmost token.
	pub fn shrink(self) -> Self {
		match self {
			Context::Tokens(mut tokens) if tokens.len() > 1 => {
				tokens.remove(0);
				Context::Tokens(tokens)
			}
			_ => Context::Empty,
		}
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Context::Empty => Ok(()),
			Context::Tokens(tokens) => write!(f, "{}", tokens.join(" ")),
		}
	}
}
