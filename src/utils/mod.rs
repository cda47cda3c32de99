pub mod config;
pub mod errors;

pub use config::{AppConfig, Backend, Credentials, UnknownLanguagePolicy};
pub use errors::{GatewayError, Result, SheetTranslatorError};

