use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data_models::DocumentSet;

/// Every document followed by a newline, in the given order.
pub fn assemble_contents<I, S>(contents: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut corpus = String::new();
    for content in contents {
        corpus.push_str(content.as_ref());
        corpus.push('\n');
    }
    corpus
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembleSummary {
    pub documents: usize,
    pub skipped: Vec<String>,
}

/// Writes the corpus artifact for `set` to `corpus_path`, one document per line.
pub async fn assemble(set: &DocumentSet, corpus_path: &Path) -> Result<AssembleSummary> {
    log::info!(
        "Combining {} documents in {} into {}",
        set.len(),
        set.dir().display(),
        corpus_path.display()
    );
    let mut summary = AssembleSummary::default();
    let mut contents = Vec::with_capacity(set.len());
    for id in set.ids() {
        match set.read(id).await {
            Ok(content) => contents.push(content),
            Err(e) => {
                log::warn!("{}", e);
                summary.skipped.push(id.clone());
            }
        }
    }
    summary.documents = contents.len();

    tokio::fs::write(corpus_path, assemble_contents(&contents))
        .await
        .with_context(|| format!("Failed to write corpus file {}", corpus_path.display()))?;
    Ok(summary)
}
