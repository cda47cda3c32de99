use crate::translation::classifier::{classify, ClassificationOutcome};
use crate::translation::memory::TermBase;
use crate::translation::translator::{TranslationRequest, TranslationResult, Translator};
use crate::utils::{AppConfig, UnknownLanguagePolicy};
use crate::workbook::{CellValue, Workbook};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    Skipped(ClassificationOutcome),
    FromMemory(String),
    FromGateway(TranslationResult),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailedCell {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RunStats {
    pub sheets: usize,
    pub text_cells: usize,
    pub skipped_special: usize,
    pub skipped_already_translated: usize,
    pub skipped_previously_failed: usize,
    pub skipped_unknown: usize,
    pub memory_hits: usize,
    pub translated: usize,
    pub failed: usize,
    pub gateway_calls: usize,
    pub failed_cells: Vec<FailedCell>,
}

impl RunStats {
    pub fn written(&self) -> usize {
        self.memory_hits + self.translated + self.failed
    }
}

/// Walks a workbook and writes `"{original}\n{translation}"` into every cell
/// that needs it.
///
/// Cells are handled strictly one after another. Consecutive gateway calls are
/// separated by `request_delay`; term-base hits never wait.
pub struct CellTranslator {
    translator: Arc<dyn Translator>,
    term_base: TermBase,
    policy: UnknownLanguagePolicy,
    request_delay: Duration,
}

impl CellTranslator {
    pub fn new(
        translator: Arc<dyn Translator>,
        term_base: TermBase,
        policy: UnknownLanguagePolicy,
        request_delay: Duration,
    ) -> Self {
        Self {
            translator,
            term_base,
            policy,
            request_delay,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        translator: Arc<dyn Translator>,
        term_base: TermBase,
    ) -> Self {
        Self::new(
            translator,
            term_base,
            config.translation.unknown_language,
            config.request_delay(),
        )
    }

    /// Decides and, when needed, translates a single text value.
    ///
    /// `pace` makes the call wait `request_delay` before reaching the gateway;
    /// it has no effect when the term base answers.
    pub async fn translate_cell(&self, text: &str, pace: bool) -> CellOutcome {
        let (from, to) = match classify(text, self.policy) {
            ClassificationOutcome::Translate { from, to } => (from, to),
            skipped => return CellOutcome::Skipped(skipped),
        };

        if let Some(hit) = self.term_base.lookup(text, from, to) {
            return CellOutcome::FromMemory(hit.to_string());
        }

        if pace && !self.request_delay.is_zero() && self.translator.is_available() {
            tokio::time::sleep(self.request_delay).await;
        }

        let request = TranslationRequest::new(text, from, to);
        CellOutcome::FromGateway(self.translator.translate(&request).await)
    }

    pub async fn process_workbook(&self, workbook: &mut Workbook) -> RunStats {
        let mut stats = RunStats::default();

        if !self.translator.is_available() {
            warn!(
                provider = self.translator.provider_name(),
                "Translator unavailable; cells needing the gateway will be marked as failed"
            );
        }

        for sheet in workbook.sheets_mut() {
            let sheet_name = sheet.name().to_string();
            stats.sheets += 1;

            if sheet.cell_count() == 0 {
                info!(sheet = %sheet_name, "Sheet has no data, skipping");
                continue;
            }

            let (rows, cols) = sheet.dimensions();
            info!(sheet = %sheet_name, rows, cols, "Processing sheet");

            for (row, col, value) in sheet.used_cells_mut() {
                let CellValue::Text(text) = value else {
                    continue;
                };
                if text.trim().is_empty() {
                    continue;
                }
                stats.text_cells += 1;

                let outcome = self.translate_cell(text, stats.gateway_calls > 0).await;

                let translation = match outcome {
                    CellOutcome::Skipped(reason) => {
                        match reason {
                            ClassificationOutcome::SkipSpecial => stats.skipped_special += 1,
                            ClassificationOutcome::SkipAlreadyTranslated => {
                                stats.skipped_already_translated += 1
                            }
                            ClassificationOutcome::SkipPreviouslyFailed => {
                                stats.skipped_previously_failed += 1
                            }
                            ClassificationOutcome::SkipUnknown => stats.skipped_unknown += 1,
                            ClassificationOutcome::Translate { .. } => {}
                        }
                        debug!(sheet = %sheet_name, row, col, ?reason, "Skipped cell");
                        continue;
                    }
                    CellOutcome::FromMemory(hit) => {
                        stats.memory_hits += 1;
                        debug!(sheet = %sheet_name, row, col, "Term base hit");
                        hit
                    }
                    CellOutcome::FromGateway(result) => {
                        stats.gateway_calls += 1;
                        if let TranslationResult::Failed(failure) = &result {
                            stats.failed += 1;
                            stats.failed_cells.push(FailedCell {
                                sheet: sheet_name.clone(),
                                row,
                                col,
                                error: failure.error.to_string(),
                            });
                            warn!(sheet = %sheet_name, row, col, error = %failure.error, "Cell translation failed");
                        } else {
                            stats.translated += 1;
                        }
                        result.into_text()
                    }
                };

                *text = format!("{}\n{}", text, translation);
            }
        }

        info!(
            provider = self.translator.provider_name(),
            text_cells = stats.text_cells,
            memory_hits = stats.memory_hits,
            translated = stats.translated,
            failed = stats.failed,
            skipped_special = stats.skipped_special,
            skipped_already_translated = stats.skipped_already_translated,
            skipped_previously_failed = stats.skipped_previously_failed,
            "Workbook processed"
        );

        stats
    }
}
