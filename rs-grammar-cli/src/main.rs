use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use rs_grammar_core::model::multigram_model::Estimator;
use rs_grammar_core::tokenize::tokenize_words;
use rs_grammar_core::{
	Corpus, GapPolicy, GrammarConfig, InterpolatedScorer, ModelBuilder, ModelSet, Score, Smoothing, UnseenEstimate,
};

#[derive(Parser, Debug)]
#[command(name = "rs-grammar")]
#[command(about = "Score the grammatical plausibility of sentences with n-gram models")]
#[command(version)]
struct Cli {
	/// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Train on a corpus and score each sentence
	Score {
		#[command(flatten)]
		train: TrainArgs,

		/// Print one JSON object per sentence
		#[arg(long)]
		json: bool,

		/// Sentences to score (raw text, tokenized like the corpus)
		#[arg(required = true)]
		sentences: Vec<String>,
	},
	/// Score a sentence against random permutations of its words
	Shuffle {
		#[command(flatten)]
		train: TrainArgs,

		/// Number of permutations
		#[arg(short = 'k', long, default_value_t = 10)]
		count: usize,

		/// Seed for reproducible permutations
		#[arg(long)]
		seed: Option<u64>,

		sentence: String,
	},
	/// Print per-order count and smoothing statistics
	Stats {
		#[command(flatten)]
		train: TrainArgs,

		/// Number of count classes shown per order
		#[arg(long, default_value_t = 8)]
		classes: usize,
	},
}

#[derive(Args, Debug)]
struct TrainArgs {
	/// Directory holding the corpus files
	#[arg(short, long)]
	corpus: PathBuf,

	/// Extension of the corpus files
	#[arg(long, default_value = "txt")]
	ext: String,

	/// JSON configuration file; flags below override its fields
	#[arg(long)]
	config: Option<PathBuf>,

	/// Highest n-gram order
	#[arg(short = 'n', long)]
	max_order: Option<usize>,

	/// Interpolation weights, highest order first (e.g. 1,0,0)
	#[arg(short, long, value_delimiter = ',')]
	weights: Option<Vec<f64>>,

	#[arg(long, value_enum)]
	smoothing: Option<SmoothingArg>,

	#[arg(long, value_enum)]
	gap_policy: Option<GapPolicyArg>,

	#[arg(long, value_enum)]
	unseen_estimate: Option<UnseenEstimateArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SmoothingArg {
	GoodTuring,
	Laplace,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GapPolicyArg {
	Adjacent,
	Strict,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UnseenEstimateArg {
	Types,
	Occurrences,
}

impl TrainArgs {
	/// Configuration file (or defaults) with command-line overrides applied.
	fn config(&self) -> Result<GrammarConfig> {
		let mut config = match &self.config {
			Some(path) => {
				let text = fs::read_to_string(path)
					.with_context(|| format!("cannot read config {}", path.display()))?;
				serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?
			}
			None => GrammarConfig::default(),
		};

		if let Some(max_order) = self.max_order {
			config = config.with_max_order(max_order);
		}
		if let Some(weights) = &self.weights {
			config = config.with_weights(weights.clone());
		}
		if let Some(smoothing) = self.smoothing {
			config = config.with_smoothing(match smoothing {
				SmoothingArg::GoodTuring => Smoothing::GoodTuring,
				SmoothingArg::Laplace => Smoothing::Laplace,
			});
		}
		if let Some(gap_policy) = self.gap_policy {
			config = config.with_gap_policy(match gap_policy {
				GapPolicyArg::Adjacent => GapPolicy::AdjacentPresent,
				GapPolicyArg::Strict => GapPolicy::Strict,
			});
		}
		if let Some(estimate) = self.unseen_estimate {
			config = config.with_unseen_estimate(match estimate {
				UnseenEstimateArg::Types => UnseenEstimate::Types,
				UnseenEstimateArg::Occurrences => UnseenEstimate::Occurrences,
			});
		}

		config.validate()?;
		Ok(config)
	}

	/// Loads the corpus and builds every order.
	fn train(&self) -> Result<(GrammarConfig, ModelSet)> {
		let builder = ModelBuilder::new(self.config()?)?;
		log::info!("training with {:?}", builder.config());
		let corpus = Corpus::load_dir(&self.corpus, &self.ext)
			.with_context(|| format!("cannot load corpus from {}", self.corpus.display()))?;
		let models = builder.build(&corpus)?;
		Ok((builder.config().clone(), models))
	}
}

/// One scored sentence, as printed by `score --json`.
#[derive(Serialize)]
struct Report<'a> {
	sentence: &'a str,
	tokens: &'a [String],
	#[serde(flatten)]
	score: Score,
	degenerate: bool,
}

fn print_score(sentence: &str, score: &Score) {
	if score.is_degenerate() {
		println!("{:>12}\t{:>10}\t{}\t(too short to score)", "-", "-", sentence);
	} else {
		println!("{:>12.4e}\t{:>10.3}\t{}", score.probability, score.log_probability, sentence);
	}
}

fn score(train: &TrainArgs, json: bool, sentences: &[String]) -> Result<()> {
	let (config, models) = train.train()?;
	let scorer = InterpolatedScorer::from_config(&models, &config)?;
	log::info!("interpolation weights {:?}", scorer.weights());

	let tokenized: Vec<Vec<String>> = sentences.iter().map(|s| tokenize_words(s)).collect();
	let scores = scorer.score_batch(&tokenized)?;

	for ((sentence, tokens), score) in sentences.iter().zip(&tokenized).zip(&scores) {
		if json {
			let report = Report { sentence, tokens, score: *score, degenerate: score.is_degenerate() };
			println!("{}", serde_json::to_string(&report)?);
		} else {
			print_score(sentence, score);
		}
	}
	Ok(())
}

fn shuffle(train: &TrainArgs, count: usize, seed: Option<u64>, sentence: &str) -> Result<()> {
	let (config, models) = train.train()?;
	let scorer = InterpolatedScorer::from_config(&models, &config)?;

	let mut rng = match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	let words = tokenize_words(sentence);
	let mut candidates = vec![words.clone()];
	for _ in 0..count {
		let mut permutation = words.clone();
		permutation.shuffle(&mut rng);
		candidates.push(permutation);
	}

	let scores = scorer.score_batch(&candidates)?;
	let mut ranked: Vec<(usize, &Vec<String>, &Score)> =
		candidates.iter().zip(&scores).enumerate().map(|(i, (words, score))| (i, words, score)).collect();
	ranked.sort_by(|a, b| b.2.log_probability.total_cmp(&a.2.log_probability));

	for (i, words, score) in ranked {
		let marker = if i == 0 { "*" } else { " " };
		print!("{} ", marker);
		print_score(&words.join(" "), score);
	}
	Ok(())
}

fn stats(train: &TrainArgs, classes: usize) -> Result<()> {
	let (_, models) = train.train()?;
	println!("vocabulary: {}", models.vocabulary_size());

	for model in models.iter() {
		let raw = model.raw();
		println!(
			"order {}: {} contexts, {} occurrences",
			model.order(),
			raw.contexts(),
			raw.total_occurrences()
		);
		let table = match model.estimator() {
			Estimator::GoodTuring(table) => table,
			Estimator::Laplace { vocab_size } => {
				println!("  laplace smoothing over {} tokens", vocab_size);
				continue;
			}
		};

		let frequencies = table.frequencies();
		println!("  unseen probability {:e}, mass {:.6}", table.unseen_probability(), table.mass());
		for (c, n_c) in frequencies.classes().take(classes) {
			println!("  c={:<6} N_c={:<12} P(c)={:e}", c, n_c, table.probability(c).unwrap_or(0.0));
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let level = match cli.verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

	match &cli.command {
		Command::Score { train, json, sentences } => score(train, *json, sentences),
		Command::Shuffle { train, count, seed, sentence } => shuffle(train, *count, *seed, sentence),
		Command::Stats { train, classes } => stats(train, *classes),
	}
}
