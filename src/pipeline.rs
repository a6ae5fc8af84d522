//! Orchestrates the passes over the corpus.
//!
//! ```text
//!   RAW --normalize+reduce--> NORMALIZED (per doc, length gated)
//!       --collect-----------> STATISTICS-COMPUTED (barrier, whole corpus)
//!       --filter------------> FILTERED (per doc, rewritten in place)
//!       --assemble----------> ASSEMBLED (one corpus file)
//! ```
//!
//! Documents inside a pass are processed concurrently; a pass only starts once
//! the previous one has finished for every document.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analyzer::TextAnalyzer;
use crate::assembler::{self, AssembleSummary};
use crate::config::PipelineConfig;
use crate::data_models::{
    DocumentSet, NormalizedDocument, RawDocument, document_path, list_raw_documents,
};
use crate::error::{PrepError, PrepResult, SkipReason};
use crate::lexicon::StopwordLexicon;
use crate::pool::map_bounded;
use crate::reducer::{MorphologicalReducer, ReductionLog};
use crate::report::{NormalizeSummary, Rejection, RunReport, VocabularySummary};
use crate::statistics;
use crate::vocabulary::{self, VocabularyFilter};

pub struct Pipeline {
    config: PipelineConfig,
    analyzer: Arc<TextAnalyzer>,
    reducer: Arc<MorphologicalReducer>,
    reductions: Option<Arc<ReductionLog>>,
}

impl Pipeline {
    /// Loads the stopword lexicon and, when needed, the lemma dictionary.
    pub fn new(config: PipelineConfig) -> PrepResult<Self> {
        config.validate_thresholds()?;
        let lexicon = StopwordLexicon::load(config.stopwords_path.as_deref())?;
        log::debug!("Loaded {} stopwords", lexicon.len());
        let analyzer = TextAnalyzer::normalizer(
            Arc::new(lexicon),
            config.token_bounds,
            config.repair_pdf_artifacts,
        );
        let reducer =
            MorphologicalReducer::load(config.reducer_mode, config.lemma_dict_path.as_deref())?;
        Ok(Self::with_parts(config, analyzer, reducer))
    }

    pub fn with_parts(
        config: PipelineConfig,
        analyzer: TextAnalyzer,
        reducer: MorphologicalReducer,
    ) -> Self {
        let reductions = config
            .record_reductions
            .then(|| Arc::new(ReductionLog::new()));
        Self {
            config,
            analyzer: Arc::new(analyzer),
            reducer: Arc::new(reducer),
            reductions,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalizes and reduces one raw text.
    pub fn process_text(&self, id: &str, raw: &str) -> NormalizedDocument {
        process_text(
            &self.analyzer,
            &self.reducer,
            &self.config,
            self.reductions.as_deref(),
            id,
            raw,
        )
    }

    /// Pass 1: normalizes every raw document of `input_dir` and writes the
    /// ones long enough to `output_dir`. The returned set lists the accepted
    /// documents in input order.
    pub async fn process_all(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<(DocumentSet, NormalizeSummary)> {
        let (documents, duplicates) = list_raw_documents(input_dir).await?;
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        log::info!(
            "Normalizing {} documents from {}",
            documents.len(),
            input_dir.display()
        );

        let mut summary = NormalizeSummary::default();
        for duplicate in duplicates {
            log::warn!("{}", duplicate);
            if let PrepError::SkippableDocument { id, reason } = duplicate {
                summary.rejected.push(Rejection { id, reason });
            }
        }

        let ids: Vec<String> = documents.iter().map(|raw| raw.id.clone()).collect();
        let results = map_bounded(documents, self.config.workers, |raw| {
            let analyzer = self.analyzer.clone();
            let reducer = self.reducer.clone();
            let reductions = self.reductions.clone();
            let config = self.config.clone();
            let output_dir = output_dir.to_path_buf();
            async move {
                normalize_document(
                    &analyzer,
                    &reducer,
                    &config,
                    reductions.as_deref(),
                    &raw,
                    &output_dir,
                )
                .await
            }
        })
        .await;

        for (id, outcome) in ids.into_iter().zip(results) {
            match outcome {
                Ok(Ok(chars)) => {
                    log::info!("[Accepted] '{}' ({} chars)", id, chars);
                    summary.accepted.push(id);
                }
                Ok(Err(PrepError::SkippableDocument { id, reason })) => {
                    log::warn!("[Rejected: {}] '{}'", reason, id);
                    summary.rejected.push(Rejection { id, reason });
                }
                Ok(Err(e)) => {
                    log::warn!("[Rejected] '{}': {}", id, e);
                    summary.rejected.push(Rejection {
                        id,
                        reason: SkipReason::Unreadable {
                            detail: e.to_string(),
                        },
                    });
                }
                Err(e) => {
                    log::error!("[Rejected] '{}': processing task failed: {}", id, e);
                    summary.rejected.push(Rejection {
                        id,
                        reason: SkipReason::TaskFailed {
                            detail: e.to_string(),
                        },
                    });
                }
            }
        }

        log::info!(
            "Accepted {} documents, rejected {}",
            summary.accepted.len(),
            summary.rejected.len()
        );
        let set = DocumentSet::new(output_dir.to_path_buf(), summary.accepted.clone());
        Ok((set, summary))
    }

    /// Passes 2 and 3: collects statistics over the whole set, then rewrites
    /// each document with the filtered vocabulary.
    pub async fn filter_vocabulary(&self, set: &DocumentSet) -> Result<VocabularySummary> {
        let stats = Arc::new(statistics::collect(set, self.config.workers).await);
        let filter = VocabularyFilter::new(stats.clone(), self.config.thresholds)?;

        let dropped = filter.drop_report();
        dropped.log();

        let filtered = vocabulary::filter_documents(set, &filter, self.config.workers).await;
        log::info!(
            "Rewrote {} documents ({} emptied, {} failed)",
            filtered.rewritten,
            filtered.emptied.len(),
            filtered.failed.len()
        );

        Ok(VocabularySummary {
            corpus_size: stats.corpus_size(),
            vocabulary_size: stats.vocabulary_size(),
            dropped,
            filtered,
        })
    }

    pub async fn assemble(&self, set: &DocumentSet) -> Result<AssembleSummary> {
        assembler::assemble(set, &self.config.corpus_path).await
    }

    /// All passes, in order.
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        let (set, normalize) = self
            .process_all(&self.config.input_dir, &self.config.output_dir)
            .await?;
        let vocabulary = self.filter_vocabulary(&set).await?;
        let assembled = self.assemble(&set).await?;

        Ok(RunReport {
            config: self.config.clone(),
            normalize,
            vocabulary,
            corpus_path: self.config.corpus_path.clone(),
            assembled,
            reductions: self.reductions(),
        })
    }

    /// Changed `(original, reduced)` pairs, when recording is enabled.
    pub fn reductions(&self) -> Vec<(String, String)> {
        self.reductions
            .as_ref()
            .map(|log| log.entries())
            .unwrap_or_default()
    }
}

fn process_text(
    analyzer: &TextAnalyzer,
    reducer: &MorphologicalReducer,
    config: &PipelineConfig,
    reductions: Option<&ReductionLog>,
    id: &str,
    raw: &str,
) -> NormalizedDocument {
    let tokens = analyzer.normalize(raw);
    let mut tokens = reducer.reduce(tokens, reductions);
    // a stem can be shorter than the token it came from
    tokens.retain(|t| config.token_bounds.contains(t));
    NormalizedDocument::new(id.to_string(), tokens)
}

/// Reads, normalizes and length-gates one document. Returns the persisted
/// character count.
async fn normalize_document(
    analyzer: &TextAnalyzer,
    reducer: &MorphologicalReducer,
    config: &PipelineConfig,
    reductions: Option<&ReductionLog>,
    raw: &RawDocument,
    output_dir: &Path,
) -> PrepResult<usize> {
    log::debug!("Processing: {}", raw.path.display());
    let text = raw.read().await?;
    let doc = process_text(analyzer, reducer, config, reductions, &raw.id, &text);

    let chars = doc.char_len();
    if chars < config.min_output_chars {
        return Err(PrepError::skip(
            &raw.id,
            SkipReason::TooShort {
                chars,
                min_chars: config.min_output_chars,
            },
        ));
    }

    tokio::fs::write(document_path(output_dir, &doc.id), doc.content()).await?;
    Ok(chars)
}
