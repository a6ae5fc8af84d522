use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PrepError, PrepResult};
use crate::reducer::ReducerMode;

pub const DEFAULT_MIN_TOKEN_CHARS: usize = 3;
pub const DEFAULT_MAX_TOKEN_CHARS: usize = 20;
pub const DEFAULT_MIN_TERM_FREQ: usize = 3;
pub const DEFAULT_CORPUS_FILE: &str = "corpus.txt";

/// Inclusive character-length range a token must fall in to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenLengthBounds {
    pub min: usize,
    pub max: usize,
}

impl TokenLengthBounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, token: &str) -> bool {
        let len = token.chars().count();
        len >= self.min && len <= self.max
    }

    fn validate(&self) -> PrepResult<()> {
        if self.min == 0 || self.min > self.max {
            return Err(PrepError::config(format!(
                "token length bounds must satisfy 1 <= min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for TokenLengthBounds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKEN_CHARS, DEFAULT_MAX_TOKEN_CHARS)
    }
}

/// Named default sets for the two ways the corpus is usually prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// 2000 char minimum, 80% ceiling, lemmatized tokens
    #[default]
    General,
    /// 3000 char minimum, 90% ceiling, stemmed tokens
    Strict,
}

impl Profile {
    pub fn min_output_chars(self) -> usize {
        match self {
            Profile::General => 2000,
            Profile::Strict => 3000,
        }
    }

    pub fn max_doc_pct(self) -> f64 {
        match self {
            Profile::General => 80.0,
            Profile::Strict => 90.0,
        }
    }

    pub fn reducer_mode(self) -> ReducerMode {
        match self {
            Profile::General => ReducerMode::Lemmatize,
            Profile::Strict => ReducerMode::Stem,
        }
    }
}

/// Thresholds of the corpus-wide vocabulary filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VocabularyThresholds {
    /// Terms found in more than this percentage of documents are dropped.
    pub max_doc_pct: f64,
    /// Terms seen fewer times than this across the corpus are dropped.
    pub min_term_freq: usize,
}

impl VocabularyThresholds {
    pub fn validate(&self) -> PrepResult<()> {
        if !(self.max_doc_pct > 0.0 && self.max_doc_pct <= 100.0) {
            return Err(PrepError::config(format!(
                "vocabulary ceiling must be within (0, 100], got {}",
                self.max_doc_pct
            )));
        }
        Ok(())
    }
}

impl From<Profile> for VocabularyThresholds {
    fn from(profile: Profile) -> Self {
        Self {
            max_doc_pct: profile.max_doc_pct(),
            min_term_freq: DEFAULT_MIN_TERM_FREQ,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub corpus_path: PathBuf,
    pub min_output_chars: usize,
    pub reducer_mode: ReducerMode,
    pub thresholds: VocabularyThresholds,
    pub token_bounds: TokenLengthBounds,
    pub repair_pdf_artifacts: bool,
    pub stopwords_path: Option<PathBuf>,
    pub lemma_dict_path: Option<PathBuf>,
    pub workers: usize,
    pub record_reductions: bool,
}

impl PipelineConfig {
    pub fn from_profile(profile: Profile, input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            corpus_path: PathBuf::from(DEFAULT_CORPUS_FILE),
            min_output_chars: profile.min_output_chars(),
            reducer_mode: profile.reducer_mode(),
            thresholds: profile.into(),
            token_bounds: TokenLengthBounds::default(),
            repair_pdf_artifacts: true,
            stopwords_path: None,
            lemma_dict_path: None,
            workers: default_workers(),
            record_reductions: false,
        }
    }

    /// Checks every option before any document is read. The output directory
    /// is created when it does not exist yet.
    pub fn validate(&self) -> PrepResult<()> {
        ensure_dir("input", &self.input_dir)?;
        prepare_output_dir(&self.output_dir)?;
        if same_dir(&self.input_dir, &self.output_dir) {
            return Err(PrepError::config(format!(
                "input and output directory are both {}",
                self.input_dir.display()
            )));
        }
        self.validate_thresholds()
    }

    /// Validation for runs that only touch an already normalized directory.
    pub fn validate_thresholds(&self) -> PrepResult<()> {
        self.thresholds.validate()?;
        self.token_bounds.validate()?;
        if self.workers == 0 {
            return Err(PrepError::config("workers must be at least 1"));
        }
        Ok(())
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub fn ensure_dir(label: &str, path: &Path) -> PrepResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PrepError::config(format!(
            "{label} path {} is not a directory",
            path.display()
        ))),
        Err(e) => Err(PrepError::config(format!(
            "{label} directory {} is not accessible: {e}",
            path.display()
        ))),
    }
}

pub fn prepare_output_dir(path: &Path) -> PrepResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            PrepError::config(format!(
                "cannot create output directory {}: {e}",
                path.display()
            ))
        })?;
        log::info!("Created output directory {}", path.display());
    }
    ensure_dir("output", path)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
