use std::fmt;

/// Errors raised while building or querying grammar models.
///
/// Count-spectrum gaps met during Good-Turing smoothing are not errors:
/// they are tolerated and reported through the `log` facade instead.
#[derive(Debug)]
pub enum GrammarError {
	/// Reading a corpus file failed.
	Io(std::io::Error),

	/// An n-gram order of 0 was requested.
	InvalidOrder(usize),

	/// The interpolation weight vector does not have one weight per model.
	WeightMismatch { weights: usize, models: usize },

	/// An interpolation weight is negative, NaN or infinite.
	InvalidWeight(f64),

	/// `V^n` is smaller than the number of observed n-grams, so the
	/// unseen mass `N_0` would be negative.
	NegativeUnseenMass { order: usize, vocab_size: usize, observed: u128 },

	/// `V^n` does not fit in the integer type used for frequency tables.
	VocabularyOverflow { order: usize, vocab_size: usize },

	/// A sentence handed to the corpus contains a boundary marker.
	ReservedToken(String),

	/// Nothing was left to train on after tokenization.
	EmptyCorpus,
}

impl fmt::Display for GrammarError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GrammarError::Io(e) => write!(f, "I/O error: {}", e),
			GrammarError::InvalidOrder(n) => write!(f, "n-gram order must be >= 1, got {}", n),
			GrammarError::WeightMismatch { weights, models } => write!(
				f,
				"{} interpolation weights given for {} models",
				weights, models
			),
			GrammarError::InvalidWeight(w) => {
				write!(f, "interpolation weight must be finite and >= 0, got {}", w)
			}
			GrammarError::NegativeUnseenMass { order, vocab_size, observed } => write!(
				f,
				"negative unseen mass for order {}: {}^{} is smaller than {} observed n-grams",
				order, vocab_size, order, observed
			),
			GrammarError::VocabularyOverflow { order, vocab_size } => {
				write!(f, "{}^{} overflows the frequency table", vocab_size, order)
			}
			GrammarError::ReservedToken(token) => {
				write!(f, "token '{}' is reserved as a sentence boundary marker", token)
			}
			GrammarError::EmptyCorpus => write!(f, "corpus contains no tokens"),
		}
	}
}

impl std::error::Error for GrammarError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			GrammarError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<std::io::Error> for GrammarError {
	fn from(e: std::io::Error) -> Self {
		GrammarError::Io(e)
	}
}
