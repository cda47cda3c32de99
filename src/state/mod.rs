pub mod term_base;

pub use term_base::TermBaseStore;

use crate::translation::Translator;
use crate::utils::AppConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared state behind the HTTP and MCP front-ends.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub translator: Arc<dyn Translator>,
    pub term_store: TermBaseStore,
    /// Serialises term-base writes and translation runs.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, translator: Arc<dyn Translator>) -> Self {
        let term_store = TermBaseStore::new(config.term_base.path.clone());
        Self {
            config: Arc::new(config),
            translator,
            term_store,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}
