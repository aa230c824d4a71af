//! Tokenized training corpus.

use std::collections::HashSet;
use std::path::Path;

use crate::error::GrammarError;
use crate::io::{list_files, normalize_folder, read_file};
use crate::tokenize::{is_marker, mark, split_sentences, tokenize_words};

/// A single token stream made of every sentence, each wrapped in the
/// boundary markers.
///
/// Sentences are concatenated, so n-grams may span a sentence end and the
/// next sentence start (`$ * the`).
///
/// # Invariants
/// - `vocabulary` holds exactly the distinct tokens of `tokens`
/// - no sentence is empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
	tokens: Vec<String>,
	vocabulary: HashSet<String>,
	sentences: usize,
}

impl Corpus {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tokenizes raw text into a corpus.
	pub fn from_text(text: &str) -> Self {
		let mut corpus = Self::new();
		corpus.push_text(text);
		corpus
	}

	/// Builds a corpus from already tokenized sentences.
	///
	/// # Errors
	/// Returns `ReservedToken` if a sentence contains a boundary marker.
	pub fn from_sentences<I, S>(sentences: I) -> Result<Self, GrammarError>
	where
		I: IntoIterator,
		I::Item: AsRef<[S]>,
		S: AsRef<str>,
	{
		let mut corpus = Self::new();
		for sentence in sentences {
			corpus.push_sentence(sentence.as_ref())?;
		}
		Ok(corpus)
	}

	/// Reads and tokenizes every `*.{extension}` file of `dir`, in name order.
	pub fn load_dir<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Self, GrammarError> {
		let folder = normalize_folder(dir.as_ref());
		let files = list_files(&folder, extension)?;
		log::info!("loading {} corpus files from {}", files.len(), folder.display());

		let mut corpus = Self::new();
		for file in files {
			let before = corpus.sentences;
			corpus.push_text(&read_file(&file)?);
			log::debug!("{}: {} sentences", file.display(), corpus.sentences - before);
		}
		log::info!("corpus: {} sentences, {} tokens, vocabulary {}", corpus.sentences, corpus.len(), corpus.vocabulary_size());
		Ok(corpus)
	}

	/// Splits `text` into sentences and appends each tokenized sentence.
	///
	/// The tokenizer never yields a boundary marker, so this cannot fail.
	pub fn push_text(&mut self, text: &str) {
		for sentence in split_sentences(text) {
			let words = tokenize_words(sentence);
			if !words.is_empty() {
				self.extend_marked(&words);
			}
		}
	}

	/// Appends one tokenized sentence; an empty sentence is skipped.
	///
	/// # Errors
	/// Returns `ReservedToken` if the sentence contains a boundary marker.
	pub fn push_sentence<S: AsRef<str>>(&mut self, words: &[S]) -> Result<(), GrammarError> {
		if let Some(marker) = words.iter().map(|w| w.as_ref()).find(|w| is_marker(w)) {
			return Err(GrammarError::ReservedToken(marker.to_owned()));
		}
		if !words.is_empty() {
			self.extend_marked(words);
		}
		Ok(())
	}

	fn extend_marked<S: AsRef<str>>(&mut self, words: &[S]) {
		for token in mark(words) {
			if !self.vocabulary.contains(&token) {
				self.vocabulary.insert(token.clone());
			}
			self.tokens.push(token);
		}
		self.sentences += 1;
	}

	/// The whole token stream, markers included.
	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	/// Number of distinct tokens, markers included.
	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn sentences(&self) -> usize {
		self.sentences
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}
