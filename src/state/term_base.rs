use crate::translation::memory::TermBase;
use crate::utils::{Result, SheetTranslatorError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// JSON file holding the term base. Every mutation is written back at once.
///
/// Writes are not coordinated between processes; callers that share a store
/// serialise access themselves.
#[derive(Debug, Clone)]
pub struct TermBaseStore {
    path: PathBuf,
}

impl TermBaseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty `{}` file when none exists yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        self.save(&TermBase::new())?;
        info!(path = %self.path.display(), "Created empty term base");
        Ok(())
    }

    /// Loads the term base. A missing file is recreated empty; an unreadable or
    /// corrupt one yields an empty term base so a run can still proceed.
    pub fn load(&self) -> TermBase {
        if !self.path.exists() {
            if let Err(e) = self.ensure_exists() {
                warn!(path = %self.path.display(), error = %e, "Failed to create term base");
            }
            return TermBase::new();
        }

        match self.try_load() {
            Ok(term_base) => {
                info!(path = %self.path.display(), terms = term_base.len(), "Loaded term base");
                term_base
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load term base, using an empty one");
                TermBase::new()
            }
        }
    }

    /// Current entries, for display. Same fallbacks as `load`.
    pub fn list(&self) -> TermBase {
        self.load()
    }

    pub fn try_load(&self) -> Result<TermBase> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, term_base: &TermBase) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(term_base)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    /// Inserts or replaces one entry. Both sides are trimmed and must be non-empty.
    pub fn add(&self, term: &str, translation: &str) -> Result<TermBase> {
        let term = term.trim();
        let translation = translation.trim();

        if term.is_empty() || translation.is_empty() {
            return Err(SheetTranslatorError::ValidationError(
                "term and translation must not be empty".to_string(),
            ));
        }

        let mut term_base = self.try_load_or_empty()?;
        term_base.insert(term.to_string(), translation.to_string());
        self.save(&term_base)?;

        info!(term = %term, translation = %translation, "Term added");
        Ok(term_base)
    }

    pub fn remove(&self, term: &str) -> Result<TermBase> {
        let term = term.trim();

        let mut term_base = self.try_load_or_empty()?;
        if term_base.remove(term).is_none() {
            return Err(SheetTranslatorError::TermNotFound(term.to_string()));
        }
        self.save(&term_base)?;

        info!(term = %term, "Term removed");
        Ok(term_base)
    }

    fn try_load_or_empty(&self) -> Result<TermBase> {
        if self.path.exists() {
            self.try_load()
        } else {
            Ok(TermBase::new())
        }
    }
}
