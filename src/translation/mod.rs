pub mod classifier;
pub mod client;
pub mod memory;
pub mod mock;
pub mod orchestrator;
pub mod translator;
pub mod vendors;

pub use classifier::{
    classify, detect_language, is_already_translated, is_special_format, ClassificationOutcome,
    Language,
};
pub use client::TranslationGateway;
pub use memory::TermBase;
pub use mock::{MockMode, MockTranslator};
pub use orchestrator::{CellOutcome, CellTranslator, FailedCell, RunStats};
pub use translator::{TranslationFailure, TranslationRequest, TranslationResult, Translator};
pub use vendors::{adapter_for, BaiduAdapter, VendorAdapter, YoudaoAdapter};

use crate::state::TermBaseStore;
use crate::utils::{AppConfig, Result, SheetTranslatorError};
use crate::workbook::{FileKind, Workbook};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_file: String,
    pub output_file: String,
    pub bytes_written: u64,
    pub elapsed_ms: u128,
    pub stats: RunStats,
}

/// `{stem}_translated.{ext}` next to the input, or inside `output_dir`.
/// CSV stays CSV; every other format is written as xlsx.
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let kind = FileKind::from_path(input)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SheetTranslatorError::ValidationError(format!(
            "cannot derive an output name from {}",
            input.display()
        )))?;

    let file_name = format!("{}_translated.{}", stem, kind.output_kind().extension());
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    Ok(dir.join(file_name))
}

/// Opens `input`, translates every eligible cell and saves to `output`.
///
/// Per-cell failures end up inside the workbook; only file-level problems
/// (unsupported type, unreadable input, failed save) are returned as errors.
pub async fn translate_workbook_file(
    input: &Path,
    output: &Path,
    config: &AppConfig,
    translator: Arc<dyn Translator>,
) -> Result<RunReport> {
    let started = Instant::now();
    FileKind::from_path(input)?;

    let term_base = TermBaseStore::new(config.term_base.path.clone()).load();
    let mut workbook = Workbook::open(input)?;

    tracing::info!(
        input = %input.display(),
        sheets = workbook.sheets().len(),
        terms = term_base.len(),
        "Starting translation run"
    );

    let cells = CellTranslator::from_config(config, translator, term_base);
    let stats = cells.process_workbook(&mut workbook).await;

    let bytes_written = workbook.save(output)?;

    tracing::info!(
        output = %output.display(),
        bytes = bytes_written,
        failed = stats.failed,
        "Translation run saved"
    );

    Ok(RunReport {
        input_file: input.display().to_string(),
        output_file: output.display().to_string(),
        bytes_written,
        elapsed_ms: started.elapsed().as_millis(),
        stats,
    })
}

/// In-memory counterpart of `translate_workbook_file`, used for uploads.
/// Returns the translated workbook encoded in the output format for `kind`.
pub async fn translate_workbook_bytes(
    bytes: Vec<u8>,
    kind: FileKind,
    config: &AppConfig,
    translator: Arc<dyn Translator>,
) -> Result<(Vec<u8>, RunStats)> {
    let term_base = TermBaseStore::new(config.term_base.path.clone()).load();
    let mut workbook = Workbook::from_bytes(bytes, kind)?;

    let cells = CellTranslator::from_config(config, translator, term_base);
    let stats = cells.process_workbook(&mut workbook).await;

    let output = workbook.save_to_bytes(workbook.kind().output_kind())?;
    Ok((output, stats))
}
