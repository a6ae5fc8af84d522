use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::assembler::AssembleSummary;
use crate::config::PipelineConfig;
use crate::error::SkipReason;
use crate::vocabulary::{DropReport, FilterSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeSummary {
    pub accepted: Vec<String>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VocabularySummary {
    pub corpus_size: usize,
    pub vocabulary_size: usize,
    pub dropped: DropReport,
    pub filtered: FilterSummary,
}

/// Everything a full run did, serializable for `--report`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub config: PipelineConfig,
    pub normalize: NormalizeSummary,
    pub vocabulary: VocabularySummary,
    pub corpus_path: PathBuf,
    pub assembled: AssembleSummary,
    pub reductions: Vec<(String, String)>,
}

impl RunReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        log::info!("Run report written to {}", path.display());
        Ok(())
    }
}
