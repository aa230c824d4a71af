//! End-to-end tests: corpus text in, sentence scores out.

use rs_grammar_core::model::context::Context;
use rs_grammar_core::model::ngram_model::RawCountModel;
use rs_grammar_core::model::smoothing::{FrequencyOfFrequencies, good_turing};
use rs_grammar_core::tokenize::mark;
use rs_grammar_core::{
	Corpus, GapPolicy, GrammarConfig, GrammarError, InterpolatedScorer, ModelBuilder, ModelSet, Smoothing,
	UnseenEstimate,
};

const CORPUS: &str = "\
He is the king of this place. The king of this place is old. \
He was the king of the north. I dreamt that I lived in marble halls. \
The black cat jumped up onto the chair. The cat jumped up onto the table. \
He was being followed by the police. She was being followed by the police. \
The police followed the black cat. Is he the king? He is. \
I lived in this place. The halls of this place are marble.";

fn words(text: &str) -> Vec<String> {
	text.split_whitespace().map(str::to_owned).collect()
}

fn build(config: GrammarConfig) -> ModelSet {
	ModelBuilder::new(config).unwrap().build(&Corpus::from_text(CORPUS)).unwrap()
}

#[test]
fn grammatical_order_outscores_scrambled_order() {
	let models = build(GrammarConfig::default());
	let scorer = InterpolatedScorer::from_config(&models, &GrammarConfig::default()).unwrap();

	let pairs = [
		("he is the king of this place", "he is of these place the king"),
		("i dreamt that i lived in marble halls", "that lived in halls i dreamt i marble"),
		("the black cat jumped up onto the chair", "onto chair cat up black the jumped the"),
		("he was being followed by the police", "he is being followed on the police"),
	];
	for (ordered, scrambled) in pairs {
		let ordered_score = scorer.score(&words(ordered)).unwrap();
		let scrambled_score = scorer.score(&words(scrambled)).unwrap();
		assert!(
			ordered_score.log_probability > scrambled_score.log_probability,
			"{:?} should beat {:?}",
			ordered,
			scrambled
		);
	}
}

#[test]
fn window_totals_match_stream_length_for_every_order() {
	let corpus = Corpus::from_text(CORPUS);
	let builder = ModelBuilder::new(GrammarConfig::new().with_max_order(5)).unwrap();
	assert_eq!(builder.config().interpolation_weights, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
	let models = builder.build(&corpus).unwrap();
	assert_eq!(models.len(), 5);

	for model in models.iter() {
		let expected = (corpus.len() + 1).saturating_sub(model.order()) as u64;
		assert_eq!(model.raw().total_occurrences(), expected);
		assert_eq!(model.raw().iter_counts().sum::<u64>(), expected);
	}
}

#[test]
fn frequency_table_covers_the_ngram_space() {
	let corpus = Corpus::from_text(CORPUS);
	let vocab = corpus.vocabulary_size();
	for n in 2..=3 {
		let raw = RawCountModel::from_tokens(corpus.tokens(), n).unwrap();
		let fof = FrequencyOfFrequencies::from_model(&raw, vocab, UnseenEstimate::Occurrences).unwrap();
		let seen: u128 = fof.classes().filter(|(c, _)| *c > 0).map(|(c, n_c)| c as u128 * n_c).sum();
		assert_eq!(seen + fof.unseen(), (vocab as u128).pow(n as u32));
	}

	// the default estimate counts distinct n-grams instead, at every order
	for n in 1..=3 {
		let raw = RawCountModel::from_tokens(corpus.tokens(), n).unwrap();
		let fof = FrequencyOfFrequencies::from_model(&raw, vocab, UnseenEstimate::Types).unwrap();
		let types: u128 = fof.classes().filter(|(c, _)| *c > 0).map(|(_, n_c)| n_c).sum();
		assert_eq!(types + fof.unseen(), (vocab as u128).pow(n as u32));
	}
}

#[test]
fn smoothed_tables_are_well_formed() {
	let models = build(GrammarConfig::default());
	for model in models.iter() {
		let table = model.table().unwrap();
		assert!(table.iter().all(|(_, p)| p >= 0.0 && p.is_finite()));
		if model.order() > 1 {
			assert!(table.unseen_probability() > 0.0);
		}
	}
}

#[test]
fn pure_trigram_ignores_lower_orders() {
	let adjacent = build(GrammarConfig::default());
	let strict = build(GrammarConfig::default().with_gap_policy(GapPolicy::Strict));

	for models in [&adjacent, &strict] {
		let scorer = InterpolatedScorer::new(models, vec![1.0, 0.0, 0.0]).unwrap();
		let trigram = models.get(3).unwrap();
		let tokens = mark(&words("the cat sat"));
		let expected: f64 = tokens
			.windows(3)
			.map(|w| trigram.probability(&Context::from_tokens(&w[..2]), &w[2]))
			.product();
		assert!((scorer.score(&words("the cat sat")).unwrap().probability - expected).abs() < 1e-15);
	}
}

#[test]
fn blending_lifts_unseen_trigrams() {
	let models = build(GrammarConfig::default());
	let pure = InterpolatedScorer::new(&models, vec![1.0, 0.0, 0.0]).unwrap();
	let blended = InterpolatedScorer::new(&models, vec![0.6, 0.3, 0.1]).unwrap();

	// "the police followed the king" has bigrams that were seen but
	// trigrams that were not
	let sentence = words("the police followed the king");
	assert!(blended.score(&sentence).unwrap().probability > pure.score(&sentence).unwrap().probability);
}

#[test]
fn training_is_deterministic() {
	let first = build(GrammarConfig::default());
	let second = build(GrammarConfig::default());
	assert_eq!(first, second);
}

#[test]
fn laplace_pipeline_scores_too() {
	let config = GrammarConfig::default().with_smoothing(Smoothing::Laplace);
	let models = build(config.clone());
	let scorer = InterpolatedScorer::from_config(&models, &config).unwrap();

	let ordered = scorer.score(&words("he is the king of this place")).unwrap();
	let scrambled = scorer.score(&words("he is of these place the king")).unwrap();
	assert!(ordered.probability > 0.0 && ordered.probability <= 1.0);
	assert!(ordered.log_probability > scrambled.log_probability);
}

#[test]
fn occurrence_estimate_rejects_unigrams_of_real_text() {
	let config = GrammarConfig::default().with_unseen_estimate(UnseenEstimate::Occurrences);
	let err = ModelBuilder::new(config).unwrap().build(&Corpus::from_text(CORPUS)).unwrap_err();
	assert!(matches!(err, GrammarError::NegativeUnseenMass { order: 1, .. }));

	// the same counts smooth fine at order 2 and 3
	let corpus = Corpus::from_text(CORPUS);
	let raw = RawCountModel::from_tokens(corpus.tokens(), 3).unwrap();
	assert!(good_turing(&raw, corpus.vocabulary_size(), GapPolicy::AdjacentPresent, UnseenEstimate::Occurrences).is_ok());
}

#[test]
fn short_sequences_score_exactly_one() {
	let models = build(GrammarConfig::default());
	let scorer = InterpolatedScorer::from_config(&models, &GrammarConfig::default()).unwrap();
	for tokens in [vec![], words("*"), words("* $")] {
		let score = scorer.score_marked(&tokens);
		assert!(score.is_degenerate());
		assert_eq!(score.probability, 1.0);
	}
}
