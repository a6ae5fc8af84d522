use std::sync::Arc;

use serde::Serialize;

use crate::config::VocabularyThresholds;
use crate::data_models::DocumentSet;
use crate::error::{PrepError, PrepResult};
use crate::pool::map_bounded;
use crate::statistics::TermStatistics;

/// Keeps terms that are neither too common nor too rare, judged against
/// statistics collected before any document was rewritten.
#[derive(Debug, Clone)]
pub struct VocabularyFilter {
    stats: Arc<TermStatistics>,
    max_allowable_doc_freq: f64,
    min_term_freq: usize,
}

impl VocabularyFilter {
    pub fn new(stats: Arc<TermStatistics>, thresholds: VocabularyThresholds) -> PrepResult<Self> {
        thresholds.validate()?;
        let max_allowable_doc_freq = stats.corpus_size() as f64 * thresholds.max_doc_pct / 100.0;
        Ok(Self {
            stats,
            max_allowable_doc_freq,
            min_term_freq: thresholds.min_term_freq,
        })
    }

    pub fn max_allowable_doc_freq(&self) -> f64 {
        self.max_allowable_doc_freq
    }

    pub fn is_too_common(&self, term: &str) -> bool {
        self.stats.doc_freq(term) as f64 > self.max_allowable_doc_freq
    }

    pub fn is_too_rare(&self, term: &str) -> bool {
        self.stats.term_freq(term) < self.min_term_freq
    }

    pub fn keeps(&self, term: &str) -> bool {
        !self.is_too_common(term) && !self.is_too_rare(term)
    }

    /// Re-tokenizes `content` and joins the surviving terms with single spaces.
    pub fn filter_content(&self, content: &str) -> String {
        content
            .split_whitespace()
            .filter(|t| self.keeps(t))
            .collect::<Vec<&str>>()
            .join(" ")
    }

    /// Terms the filter is going to drop, for the operator.
    pub fn drop_report(&self) -> DropReport {
        let corpus_size = self.stats.corpus_size();
        let mut rare = Vec::new();
        let mut common = Vec::new();
        for (term, doc_freq, term_freq) in self.stats.iter() {
            if term_freq < self.min_term_freq {
                rare.push(RareTerm {
                    term: term.to_string(),
                    term_freq,
                });
            }
            if doc_freq as f64 > self.max_allowable_doc_freq {
                common.push(CommonTerm {
                    term: term.to_string(),
                    doc_freq,
                    doc_pct: doc_freq as f64 / corpus_size as f64 * 100.0,
                });
            }
        }
        rare.sort_by(|a, b| a.term.cmp(&b.term));
        common.sort_by(|a, b| b.doc_freq.cmp(&a.doc_freq).then_with(|| a.term.cmp(&b.term)));
        DropReport {
            max_allowable_doc_freq: self.max_allowable_doc_freq,
            min_term_freq: self.min_term_freq,
            rare,
            common,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RareTerm {
    pub term: String,
    pub term_freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonTerm {
    pub term: String,
    pub doc_freq: usize,
    pub doc_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DropReport {
    pub max_allowable_doc_freq: f64,
    pub min_term_freq: usize,
    pub rare: Vec<RareTerm>,
    pub common: Vec<CommonTerm>,
}

impl DropReport {
    pub fn log(&self) {
        log::info!(
            "Removing {} words that appear less than {} times in corpus: {:?}",
            self.rare.len(),
            self.min_term_freq,
            self.rare.iter().map(|t| t.term.as_str()).collect::<Vec<_>>()
        );
        log::info!(
            "Removing {} words that appear in more than {} documents:",
            self.common.len(),
            self.max_allowable_doc_freq
        );
        for term in &self.common {
            log::info!(
                "\t'{}': found in {} ({:.1}%) documents",
                term.term,
                term.doc_freq,
                term.doc_pct
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub rewritten: usize,
    pub emptied: Vec<String>,
    pub failed: Vec<String>,
}

/// Rewrites every document of `set` in place with only the kept terms.
///
/// A document that ends up empty is still written. One pass, the statistics
/// are never recomputed.
pub async fn filter_documents(
    set: &DocumentSet,
    filter: &VocabularyFilter,
    workers: usize,
) -> FilterSummary {
    let shared = Arc::new(set.clone());
    let results = map_bounded(set.ids().to_vec(), workers, |id| {
        let set = shared.clone();
        let filter = filter.clone();
        async move {
            let content = set.read(&id).await?;
            let filtered = filter.filter_content(&content);
            set.write(&id, &filtered).await?;
            Ok::<bool, PrepError>(filtered.is_empty())
        }
    })
    .await;

    let mut summary = FilterSummary::default();
    for (id, outcome) in set.ids().iter().zip(results) {
        match outcome {
            Ok(Ok(emptied)) => {
                summary.rewritten += 1;
                if emptied {
                    log::debug!("Document '{}' is empty after vocabulary filtering", id);
                    summary.emptied.push(id.clone());
                }
            }
            Ok(Err(e)) => {
                log::warn!("Vocabulary filter failed on '{}': {}", id, e);
                summary.failed.push(id.clone());
            }
            Err(e) => {
                log::error!("Vocabulary filter task failed on '{}': {}", id, e);
                summary.failed.push(id.clone());
            }
        }
    }
    summary
}
