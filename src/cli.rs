use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use corpus_prep::assembler;
use corpus_prep::config::{self, PipelineConfig, Profile, TokenLengthBounds};
use corpus_prep::data_models::DocumentSet;
use corpus_prep::reducer::ReducerMode;
use corpus_prep::Pipeline;

/// Prepares extracted document text for topic modeling.
#[derive(Parser, Debug)]
#[command(name = "corpus-prep", version, about)]
pub struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize, filter the vocabulary and assemble the corpus
    Run(RunArgs),
    /// Only normalize raw documents into the output directory
    Normalize(NormalizeArgs),
    /// Collect statistics and filter the vocabulary of a normalized directory in place
    Filter(FilterArgs),
    /// Concatenate a normalized directory into one corpus file
    Assemble(AssembleArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Default thresholds to start from
    #[arg(long, value_enum, default_value_t = Profile::General, env = "CORPUS_PREP_PROFILE")]
    pub profile: Profile,

    /// Documents processed concurrently
    #[arg(long, env = "CORPUS_PREP_WORKERS", default_value_t = config::default_workers())]
    pub workers: usize,
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeOptions {
    /// Minimum characters a normalized document needs to be kept [profile default]
    #[arg(long, env = "CORPUS_PREP_MIN_OUTPUT_CHARS")]
    pub min_output_chars: Option<usize>,

    /// Morphological reduction [profile default]
    #[arg(long, value_enum, env = "CORPUS_PREP_REDUCER")]
    pub reducer: Option<ReducerMode>,

    #[arg(long, default_value_t = config::DEFAULT_MIN_TOKEN_CHARS)]
    pub min_token_chars: usize,

    #[arg(long, default_value_t = config::DEFAULT_MAX_TOKEN_CHARS)]
    pub max_token_chars: usize,

    /// Do not repair ligatures and (cid:N) glyphs from PDF extraction
    #[arg(long)]
    pub keep_pdf_artifacts: bool,

    /// Stopword list replacing the built-in English one, one word per line
    #[arg(long, env = "CORPUS_PREP_STOPWORDS")]
    pub stopwords: Option<PathBuf>,

    /// Extra lemma entries ("inflected<TAB>lemma" or a bare base form per line)
    #[arg(long, env = "CORPUS_PREP_LEMMA_DICT")]
    pub lemma_dict: Option<PathBuf>,

    /// Log every token the reducer changed
    #[arg(long)]
    pub show_reductions: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VocabularyOptions {
    /// Drop terms found in more than this percentage of documents [profile default]
    #[arg(long, env = "CORPUS_PREP_MAX_DOC_PCT")]
    pub max_doc_pct: Option<f64>,

    /// Drop terms seen fewer times than this in the whole corpus
    #[arg(long, env = "CORPUS_PREP_MIN_TERM_FREQ", default_value_t = config::DEFAULT_MIN_TERM_FREQ)]
    pub min_term_freq: usize,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory of extracted raw text
    #[arg(short, long, env = "CORPUS_PREP_INPUT_DIR", default_value = "extracted-text")]
    pub input_dir: PathBuf,

    /// Directory receiving the normalized documents
    #[arg(short, long, env = "CORPUS_PREP_OUTPUT_DIR", default_value = "processed-text")]
    pub output_dir: PathBuf,

    /// Corpus file, one document per line
    #[arg(long, env = "CORPUS_PREP_CORPUS", default_value = config::DEFAULT_CORPUS_FILE)]
    pub corpus: PathBuf,

    /// Write a JSON report of the run
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub profile: ProfileArgs,

    #[command(flatten)]
    pub normalize: NormalizeOptions,

    #[command(flatten)]
    pub vocabulary: VocabularyOptions,
}

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    #[arg(short, long, env = "CORPUS_PREP_INPUT_DIR", default_value = "extracted-text")]
    pub input_dir: PathBuf,

    #[arg(short, long, env = "CORPUS_PREP_OUTPUT_DIR", default_value = "processed-text")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub profile: ProfileArgs,

    #[command(flatten)]
    pub normalize: NormalizeOptions,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Directory of normalized documents, rewritten in place
    #[arg(short, long, env = "CORPUS_PREP_OUTPUT_DIR", default_value = "processed-text")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub profile: ProfileArgs,

    #[command(flatten)]
    pub vocabulary: VocabularyOptions,
}

#[derive(Args, Debug)]
pub struct AssembleArgs {
    #[arg(short, long, env = "CORPUS_PREP_OUTPUT_DIR", default_value = "processed-text")]
    pub dir: PathBuf,

    #[arg(long, env = "CORPUS_PREP_CORPUS", default_value = config::DEFAULT_CORPUS_FILE)]
    pub corpus: PathBuf,
}

fn base_config(profile: &ProfileArgs, input_dir: PathBuf, output_dir: PathBuf) -> PipelineConfig {
    let mut config = PipelineConfig::from_profile(profile.profile, input_dir, output_dir);
    config.workers = profile.workers;
    config
}

fn apply_normalize(config: &mut PipelineConfig, opts: &NormalizeOptions) {
    if let Some(min_output_chars) = opts.min_output_chars {
        config.min_output_chars = min_output_chars;
    }
    if let Some(reducer) = opts.reducer {
        config.reducer_mode = reducer;
    }
    config.token_bounds = TokenLengthBounds::new(opts.min_token_chars, opts.max_token_chars);
    config.repair_pdf_artifacts = !opts.keep_pdf_artifacts;
    config.stopwords_path = opts.stopwords.clone();
    config.lemma_dict_path = opts.lemma_dict.clone();
    config.record_reductions = opts.show_reductions;
}

fn apply_vocabulary(config: &mut PipelineConfig, opts: &VocabularyOptions) {
    if let Some(max_doc_pct) = opts.max_doc_pct {
        config.thresholds.max_doc_pct = max_doc_pct;
    }
    config.thresholds.min_term_freq = opts.min_term_freq;
}

impl RunArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config =
            base_config(&self.profile, self.input_dir.clone(), self.output_dir.clone());
        apply_normalize(&mut config, &self.normalize);
        apply_vocabulary(&mut config, &self.vocabulary);
        config.corpus_path = self.corpus.clone();
        config
    }
}

impl NormalizeArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config =
            base_config(&self.profile, self.input_dir.clone(), self.output_dir.clone());
        apply_normalize(&mut config, &self.normalize);
        config
    }
}

impl FilterArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = base_config(&self.profile, self.dir.clone(), self.dir.clone());
        apply_vocabulary(&mut config, &self.vocabulary);
        config.reducer_mode = ReducerMode::None;
        config
    }
}

fn log_reductions(pipeline: &Pipeline) {
    for (original, reduced) in pipeline.reductions() {
        log::info!("\t{} ---({:?})---> {}", original, pipeline.config().reducer_mode, reduced);
    }
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::WARN,
            (false, 0) => tracing::Level::INFO,
            (false, 1) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        }
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Run(args) => run_all(args).await,
            Commands::Normalize(args) => run_normalize(args).await,
            Commands::Filter(args) => run_filter(args).await,
            Commands::Assemble(args) => run_assemble(args).await,
        }
    }
}

async fn run_all(args: RunArgs) -> Result<()> {
    let config = args.pipeline_config();
    config.validate()?;

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run().await?;
    log_reductions(&pipeline);

    log::info!(
        "Corpus of {} documents written to {}",
        report.assembled.documents,
        report.corpus_path.display()
    );
    if let Some(path) = args.report {
        report.write_json(&path)?;
    }
    Ok(())
}

async fn run_normalize(args: NormalizeArgs) -> Result<()> {
    let config = args.pipeline_config();
    config.validate()?;

    let pipeline = Pipeline::new(config)?;
    let config = pipeline.config();
    pipeline
        .process_all(&config.input_dir, &config.output_dir)
        .await?;
    log_reductions(&pipeline);
    Ok(())
}

async fn run_filter(args: FilterArgs) -> Result<()> {
    let config = args.pipeline_config();
    config.validate_thresholds()?;
    config::ensure_dir("document", &args.dir)?;

    let set = DocumentSet::open(&args.dir).await?;
    let pipeline = Pipeline::new(config)?;
    pipeline.filter_vocabulary(&set).await?;
    Ok(())
}

async fn run_assemble(args: AssembleArgs) -> Result<()> {
    config::ensure_dir("document", &args.dir)?;
    let set = DocumentSet::open(&args.dir).await?;
    let summary = assembler::assemble(&set, &args.corpus)
        .await
        .with_context(|| format!("Failed to assemble {}", args.dir.display()))?;
    log::info!(
        "Corpus of {} documents written to {}",
        summary.documents,
        args.corpus.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("corpus-prep").chain(args.iter().copied()))
            .expect("valid command line")
    }

    fn run_config(args: &[&str]) -> PipelineConfig {
        match parse(args).command {
            Commands::Run(run) => run.pipeline_config(),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_profile_defaults_apply_when_flags_absent() {
        let config = run_config(&["run", "--profile", "strict"]);
        assert_eq!(config.min_output_chars, 3000);
        assert_eq!(config.thresholds.max_doc_pct, 90.0);
        assert_eq!(config.thresholds.min_term_freq, 3);
        assert_eq!(config.reducer_mode, ReducerMode::Stem);
        assert_eq!(config.token_bounds, TokenLengthBounds::default());
        assert!(config.repair_pdf_artifacts);
    }

    #[test]
    fn test_explicit_flags_override_profile() {
        let config = run_config(&["run", "--profile", "strict", "--max-doc-pct", "70"]);
        assert_eq!(config.thresholds.max_doc_pct, 70.0);
        assert_eq!(config.min_output_chars, 3000);
        assert_eq!(config.reducer_mode, ReducerMode::Stem);

        let config = run_config(&[
            "run",
            "--min-output-chars",
            "500",
            "--reducer",
            "both",
            "--min-term-freq",
            "5",
            "--min-token-chars",
            "2",
            "--keep-pdf-artifacts",
            "--corpus",
            "out/corpus.txt",
        ]);
        assert_eq!(config.min_output_chars, 500);
        assert_eq!(config.reducer_mode, ReducerMode::Both);
        assert_eq!(config.thresholds.min_term_freq, 5);
        assert_eq!(config.thresholds.max_doc_pct, 80.0);
        assert_eq!(config.token_bounds, TokenLengthBounds::new(2, 20));
        assert!(!config.repair_pdf_artifacts);
        assert_eq!(config.corpus_path, PathBuf::from("out/corpus.txt"));
    }

    #[test]
    fn test_filter_command_never_reduces() {
        let config = match parse(&["filter", "--dir", "processed", "--profile", "strict"]).command {
            Commands::Filter(filter) => filter.pipeline_config(),
            other => panic!("expected filter, got {other:?}"),
        };
        assert_eq!(config.reducer_mode, ReducerMode::None);
        assert_eq!(config.input_dir, config.output_dir);
        assert_eq!(config.thresholds.max_doc_pct, 90.0);
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["-q", "assemble"]).log_level(), tracing::Level::WARN);
        assert_eq!(parse(&["assemble"]).log_level(), tracing::Level::INFO);
        assert_eq!(parse(&["-vv", "assemble"]).log_level(), tracing::Level::TRACE);
    }
}
