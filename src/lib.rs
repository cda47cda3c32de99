pub mod server;
pub mod state;
pub mod translation;
pub mod utils;
pub mod workbook;

pub use server::SheetTranslatorServer;
pub use state::{AppState, TermBaseStore};
pub use translation::{
    translate_workbook_file, CellTranslator, RunReport, RunStats, TermBase, TranslationGateway,
    Translator,
};
pub use utils::{AppConfig, GatewayError, Result, SheetTranslatorError};
pub use workbook::{CellValue, FileKind, Sheet, Workbook};
