pub mod http;
pub mod tools;

pub use tools::SheetTranslatorServer;

use crate::state::AppState;
use crate::translation::{
    default_output_path, translate_workbook_bytes, translate_workbook_file, RunReport,
};
use crate::utils::Result;
use crate::workbook::{writer, FileKind};
use std::path::Path;
use std::time::Instant;

/// A bare file name: no directory parts, nothing that could leave the
/// output directory.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && Path::new(name).file_name().is_some_and(|n| n == name)
}

/// Runs one translation for a front-end request. When no output path is given
/// the result goes to the configured output directory.
pub async fn run_translation(
    state: &AppState,
    input_file: &str,
    output_file: Option<&Path>,
) -> Result<RunReport> {
    let input = Path::new(input_file);
    let output = match output_file {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input, Some(&state.config.output.directory))?,
    };

    let _guard = state.run_lock.lock().await;
    translate_workbook_file(input, &output, &state.config, state.translator.clone()).await
}

/// Translates uploaded content and stores the result in the output directory
/// as `{stem}_translated.{ext}`. `file_name` must pass `is_safe_file_name`.
pub async fn run_upload(state: &AppState, file_name: &str, bytes: Vec<u8>) -> Result<RunReport> {
    let started = Instant::now();
    let name = Path::new(file_name);
    let kind = FileKind::from_path(name)?;
    let output = default_output_path(name, Some(&state.config.output.directory))?;

    let _guard = state.run_lock.lock().await;
    tracing::info!(file = %file_name, size = bytes.len(), "Processing upload");

    let (data, stats) =
        translate_workbook_bytes(bytes, kind, &state.config, state.translator.clone()).await?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, data)?;
    let bytes_written = writer::verify_saved(&output)?;

    Ok(RunReport {
        input_file: file_name.to_string(),
        output_file: output.display().to_string(),
        bytes_written,
        elapsed_ms: started.elapsed().as_millis(),
        stats,
    })
}
