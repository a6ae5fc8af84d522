use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use porter_stemmer::stem;
use serde::Serialize;

use crate::error::PrepResult;
use crate::lexicon::LemmaDictionary;

/// Which morphological reduction runs after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReducerMode {
    /// Tokens are kept as they are
    #[default]
    None,
    /// Porter suffix stripping
    Stem,
    /// Dictionary base forms
    Lemmatize,
    /// Lemmatize, then stem the lemma
    Both,
}

impl ReducerMode {
    pub fn lemmatizes(self) -> bool {
        matches!(self, ReducerMode::Lemmatize | ReducerMode::Both)
    }

    pub fn stems(self) -> bool {
        matches!(self, ReducerMode::Stem | ReducerMode::Both)
    }
}

/// Diagnostic record of tokens the reducer changed, first reduction wins.
///
/// Shared by concurrently processed documents; it is only ever read back for
/// reporting.
#[derive(Debug, Default)]
pub struct ReductionLog {
    changes: DashMap<String, String>,
}

impl ReductionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, original: &str, reduced: &str) {
        if original != reduced && !self.changes.contains_key(original) {
            self.changes
                .entry(original.to_string())
                .or_insert_with(|| reduced.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// All recorded `(original, reduced)` pairs sorted by original.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .changes
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort();
        entries
    }
}

pub struct MorphologicalReducer {
    mode: ReducerMode,
    lemmas: Option<Arc<LemmaDictionary>>,
}

impl MorphologicalReducer {
    pub fn new(mode: ReducerMode, lemmas: Option<Arc<LemmaDictionary>>) -> Self {
        Self { mode, lemmas }
    }

    /// Loads the lemma dictionary only when `mode` needs one.
    pub fn load(mode: ReducerMode, lemma_dict_path: Option<&Path>) -> PrepResult<Self> {
        let lemmas = if mode.lemmatizes() {
            let dict = LemmaDictionary::load(lemma_dict_path)?;
            log::debug!("Loaded lemma dictionary with {} entries", dict.len());
            Some(Arc::new(dict))
        } else {
            None
        };
        Ok(Self::new(mode, lemmas))
    }

    pub fn mode(&self) -> ReducerMode {
        self.mode
    }

    pub fn reduce_token(&self, token: &str) -> String {
        let lemma = match (&self.lemmas, self.mode.lemmatizes()) {
            (Some(lemmas), true) => lemmas.lemmatize(token).into_owned(),
            _ => token.to_string(),
        };
        if self.mode.stems() { stem(&lemma) } else { lemma }
    }

    /// Reduces every token independently. The output is aligned with the
    /// input position by position.
    pub fn reduce(&self, tokens: Vec<String>, log: Option<&ReductionLog>) -> Vec<String> {
        if self.mode == ReducerMode::None {
            return tokens;
        }
        tokens
            .into_iter()
            .map(|token| {
                let reduced = self.reduce_token(&token);
                if let Some(log) = log {
                    log.record(&token, &reduced);
                }
                reduced
            })
            .collect()
    }
}
