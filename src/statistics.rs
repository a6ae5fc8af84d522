use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::data_models::DocumentSet;
use crate::pool::map_bounded;

/// Corpus-wide term counts.
///
/// `doc_freq` counts the documents a term occurs in, `term_freq` counts every
/// occurrence. Two statistics built over disjoint document shards merge into
/// the statistics of the union, in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermStatistics {
    doc_freq: HashMap<String, usize>,
    term_freq: HashMap<String, usize>,
    corpus_size: usize,
}

impl TermStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of a single document.
    pub fn of_document<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stats = Self::new();
        stats.observe_document(tokens);
        stats
    }

    pub fn observe_document<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut distinct = HashSet::new();
        for token in tokens {
            *self.term_freq.entry(token.to_string()).or_insert(0) += 1;
            if distinct.insert(token) {
                *self.doc_freq.entry(token.to_string()).or_insert(0) += 1;
            }
        }
        self.corpus_size += 1;
    }

    pub fn merge(&mut self, other: TermStatistics) {
        for (term, count) in other.doc_freq {
            *self.doc_freq.entry(term).or_insert(0) += count;
        }
        for (term, count) in other.term_freq {
            *self.term_freq.entry(term).or_insert(0) += count;
        }
        self.corpus_size += other.corpus_size;
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    pub fn term_freq(&self, term: &str) -> usize {
        self.term_freq.get(term).copied().unwrap_or(0)
    }

    pub fn corpus_size(&self) -> usize {
        self.corpus_size
    }

    pub fn vocabulary_size(&self) -> usize {
        self.term_freq.len()
    }

    /// `(term, doc_freq, term_freq)` for every term, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, usize)> + '_ {
        self.term_freq
            .iter()
            .map(|(term, tf)| (term.as_str(), self.doc_freq(term), *tf))
    }
}

impl FromIterator<TermStatistics> for TermStatistics {
    fn from_iter<T: IntoIterator<Item = TermStatistics>>(iter: T) -> Self {
        iter.into_iter().fold(TermStatistics::new(), |mut acc, shard| {
            acc.merge(shard);
            acc
        })
    }
}

/// Scans every document of `set` once and counts its terms.
///
/// Documents that cannot be read are logged and left out, so they do not
/// count toward the corpus size.
pub async fn collect(set: &DocumentSet, workers: usize) -> TermStatistics {
    log::info!("Collecting corpus term statistics over {} documents", set.len());
    let shared = Arc::new(set.clone());
    let shards = map_bounded(set.ids().to_vec(), workers, |id| {
        let set = shared.clone();
        async move {
            match set.read(&id).await {
                Ok(content) => Some(TermStatistics::of_document(content.split_whitespace())),
                Err(e) => {
                    log::warn!("{}", e);
                    None
                }
            }
        }
    })
    .await;

    let stats: TermStatistics = shards
        .into_iter()
        .filter_map(|shard| {
            shard
                .inspect_err(|e| log::error!("Statistics task failed: {}", e))
                .ok()
                .flatten()
        })
        .collect();
    log::info!(
        "Scanned {} documents, {} distinct terms",
        stats.corpus_size(),
        stats.vocabulary_size()
    );
    stats
}
