//! Sentence splitting and word tokenization.
//!
//! Produces lowercase word tokens per sentence. Boundary markers are not
//! inserted here; see [`mark`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved token opening every sentence.
pub const START_MARKER: &str = "*";

/// Reserved token closing every sentence.
pub const END_MARKER: &str = "$";

/// Sentence terminator followed by one whitespace character.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.?]\s").expect("valid regex"));

/// Maximal non-whitespace run that starts and ends on a word boundary.
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\S+\b").expect("valid regex"));

/// Returns true if `token` is one of the two boundary markers.
pub fn is_marker(token: &str) -> bool {
	token == START_MARKER || token == END_MARKER
}

/// Splits raw text into sentences.
///
/// A sentence ends after `.` or `?` followed by whitespace, unless the
/// terminator closes an abbreviation shaped like `e.g.` or `Mr.`.
pub fn split_sentences(text: &str) -> Vec<&str> {
	let mut sentences = Vec::new();
	let mut start = 0;

	for m in SENTENCE_END.find_iter(text) {
		// Byte index just past the terminator ('.' and '?' are one byte)
		let end = m.start() + 1;
		if is_abbreviation(&text[..end]) {
			continue;
		}
		sentences.push(&text[start..end]);
		start = m.end();
	}
	if start < text.len() {
		sentences.push(&text[start..]);
	}
	sentences
}

/// Checks whether `head` (which ends with the terminator) ends in `x.y`
/// followed by the terminator (`e.g.`, `a.b?`), or in a capitalized
/// two-letter abbreviation such as `Mr.`.
fn is_abbreviation(head: &str) -> bool {
	let tail: Vec<char> = head.chars().rev().take(4).collect();

	// x.y? reads backwards as [?, y, '.', x]
	if tail.len() == 4 && is_word_char(tail[1]) && tail[2] == '.' && is_word_char(tail[3]) {
		return true;
	}

	// Mr. reads backwards as ['.', 'r', 'M']
	tail.len() >= 3 && tail[0] == '.' && tail[1].is_lowercase() && tail[2].is_uppercase()
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Splits a sentence into lowercase word tokens.
///
/// Leading and trailing punctuation is dropped; inner punctuation such as
/// apostrophes stays part of the word.
pub fn tokenize_words(sentence: &str) -> Vec<String> {
	WORD.find_iter(sentence)
		.map(|m| m.as_str().trim().to_lowercase())
		.filter(|w| !w.is_empty())
		.collect()
}

/// Wraps a word sequence in the start and end markers.
pub fn mark<S: AsRef<str>>(words: &[S]) -> Vec<String> {
	let mut tokens = Vec::with_capacity(words.len() + 2);
	tokens.push(START_MARKER.to_owned());
	tokens.extend(words.iter().map(|w| w.as_ref().to_owned()));
	tokens.push(END_MARKER.to_owned());
	tokens
}
