use sheet_translator::translation::{default_output_path, MockMode, MockTranslator};
use sheet_translator::workbook::OtherValue;
use sheet_translator::{
    translate_workbook_file, AppConfig, CellValue, FileKind, GatewayError, Sheet,
    SheetTranslatorError, TermBaseStore, Workbook,
};
use std::path::Path;
use std::sync::Arc;

fn config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.term_base.path = dir.join("term_base.json");
    config.output.directory = dir.join("out");
    config.translation.request_delay_ms = 0;
    config
}

fn sample_workbook() -> Workbook {
    let mut summary = Sheet::new("Summary");
    summary.set_cell(0, 0, CellValue::text("项目计划"));
    summary.set_cell(0, 1, CellValue::Other(OtherValue::Number(12.5)));
    summary.set_cell(1, 0, CellValue::text("https://example.com/a"));
    summary.set_cell(1, 1, CellValue::text("Total amount"));
    summary.set_cell(2, 0, CellValue::text("合计"));

    let mut notes = Sheet::new("Notes");
    notes.set_cell(0, 0, CellValue::text("预算\nCost"));

    let mut workbook = Workbook::new(FileKind::Xlsx);
    workbook.add_sheet(summary);
    workbook.add_sheet(notes);
    workbook
}

#[tokio::test]
async fn xlsx_run_translates_and_second_run_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    TermBaseStore::new(config.term_base.path.clone())
        .add("合计", "Total amount")
        .unwrap();

    let input = dir.path().join("budget.xlsx");
    sample_workbook().save(&input).unwrap();
    let output = default_output_path(&input, Some(&config.output.directory)).unwrap();

    let mock = Arc::new(MockTranslator::new(MockMode::Fixed("Plan".to_string())));
    let report = translate_workbook_file(&input, &output, &config, mock.clone())
        .await
        .unwrap();

    assert_eq!(report.stats.sheets, 2);
    assert_eq!(report.stats.text_cells, 5);
    assert_eq!(report.stats.memory_hits, 2);
    assert_eq!(report.stats.gateway_calls, 1);
    assert_eq!(report.stats.skipped_special, 1);
    assert_eq!(report.stats.skipped_already_translated, 1);
    assert_eq!(mock.calls(), 1);
    assert!(report.bytes_written > 0);

    let translated = Workbook::open(&output).unwrap();
    let summary = translated.sheet("Summary").unwrap();
    assert_eq!(summary.cell(0, 0), Some(&CellValue::text("项目计划\nPlan")));
    assert_eq!(
        summary.cell(0, 1),
        Some(&CellValue::Other(OtherValue::Number(12.5)))
    );
    assert_eq!(summary.cell(1, 0), Some(&CellValue::text("https://example.com/a")));
    assert_eq!(summary.cell(1, 1), Some(&CellValue::text("Total amount\n合计")));
    assert_eq!(summary.cell(2, 0), Some(&CellValue::text("合计\nTotal amount")));
    assert_eq!(
        translated.sheet("Notes").unwrap().cell(0, 0),
        Some(&CellValue::text("预算\nCost"))
    );

    let rerun_output = dir.path().join("again.xlsx");
    let rerun = translate_workbook_file(&output, &rerun_output, &config, mock.clone())
        .await
        .unwrap();

    assert_eq!(rerun.stats.gateway_calls, 0);
    assert_eq!(rerun.stats.written(), 0);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn failures_are_marked_in_place_and_the_file_is_still_saved() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let input = dir.path().join("contacts.csv");
    std::fs::write(&input, "你好,Hello world\nsales@example.com,2024-01-31\n").unwrap();
    let output = dir.path().join("contacts_out.csv");

    let mock = Arc::new(MockTranslator::failing(GatewayError::Timeout));
    let report = translate_workbook_file(&input, &output, &config, mock)
        .await
        .unwrap();

    assert_eq!(report.stats.failed, 2);
    assert_eq!(report.stats.translated, 0);
    assert_eq!(report.stats.skipped_special, 2);
    assert_eq!(report.stats.failed_cells.len(), 2);
    assert_eq!(report.stats.failed_cells[0].row, 0);
    assert_eq!(report.stats.failed_cells[1].col, 1);

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("你好\n[Translation timeout] 你好"));
    assert!(written.contains("Hello world\n[Translation timeout] Hello world"));
    assert!(written.contains("sales@example.com,2024-01-31"));
}

#[tokio::test]
async fn missing_credentials_mark_every_gateway_cell() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let input = dir.path().join("one.csv");
    std::fs::write(&input, "库存\n").unwrap();
    let output = dir.path().join("one_out.csv");

    let mock = Arc::new(MockTranslator::failing(GatewayError::MissingCredentials));
    translate_workbook_file(&input, &output, &config, mock)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("库存\n[Translation error: API credentials not configured] 库存"));
}

#[tokio::test]
async fn file_level_problems_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mock = Arc::new(MockTranslator::tagged());

    let result = translate_workbook_file(
        &dir.path().join("notes.txt"),
        &dir.path().join("notes_out.txt"),
        &config,
        mock.clone(),
    )
    .await;
    assert!(matches!(result, Err(SheetTranslatorError::UnsupportedFileType(_))));

    let result = translate_workbook_file(
        &dir.path().join("missing.xlsx"),
        &dir.path().join("missing_out.xlsx"),
        &config,
        mock.clone(),
    )
    .await;
    assert!(matches!(result, Err(SheetTranslatorError::FileNotFound(_))));
    assert_eq!(mock.calls(), 0);
}
