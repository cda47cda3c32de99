//! Deterministic translator used for dry runs and tests.

use crate::translation::translator::{TranslationRequest, TranslationResult, Translator};
use crate::utils::GatewayError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMode {
    /// `"{to}:{text}"`, e.g. `en:你好`.
    Tagged,
    /// Always returns the same string.
    Fixed(String),
    /// Always fails with the given error.
    Fail(GatewayError),
}

#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn tagged() -> Self {
        Self::new(MockMode::Tagged)
    }

    pub fn failing(error: GatewayError) -> Self {
        Self::new(MockMode::Fail(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            MockMode::Tagged => {
                TranslationResult::Translated(format!("{}:{}", request.to, request.text))
            }
            MockMode::Fixed(text) => TranslationResult::Translated(text.clone()),
            MockMode::Fail(error) => TranslationResult::failed(error.clone(), &request.text),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }

    /// Mirrors the gateway: a credential failure never reaches the network.
    fn is_available(&self) -> bool {
        !matches!(self.mode, MockMode::Fail(GatewayError::MissingCredentials))
    }
}
