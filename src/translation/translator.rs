//! The seam between the cell loop and whatever produces translations.
//!
//! `Translator::translate` is infallible by signature: a vendor failure comes
//! back as `TranslationResult::Failed`, carrying the bracketed marker that ends
//! up in the cell, so one bad request never stops a workbook.

use crate::translation::classifier::Language;
use crate::utils::GatewayError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub from: Language,
    pub to: Language,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, from: Language, to: Language) -> Self {
        Self {
            text: text.into(),
            from,
            to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFailure {
    pub error: GatewayError,
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResult {
    Translated(String),
    Failed(TranslationFailure),
}

impl TranslationResult {
    pub fn failed(error: GatewayError, original: &str) -> Self {
        let marker = error.marker(original);
        TranslationResult::Failed(TranslationFailure { error, marker })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TranslationResult::Failed(_))
    }

    /// The text to place under the original: the translation or the marker.
    pub fn text(&self) -> &str {
        match self {
            TranslationResult::Translated(text) => text,
            TranslationResult::Failed(failure) => &failure.marker,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            TranslationResult::Translated(text) => text,
            TranslationResult::Failed(failure) => failure.marker,
        }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> TranslationResult;

    /// Used in logs to tell which backend produced a translation.
    fn provider_name(&self) -> &str;

    /// `false` when every call is known to fail without reaching the network,
    /// e.g. missing credentials. Such calls are not paced.
    fn is_available(&self) -> bool {
        true
    }
}
