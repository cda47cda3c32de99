use crate::translation::classifier::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chinese term -> English term, consulted before any live translation.
///
/// Backed by a `BTreeMap`, so the reverse (en -> zh) scan visits keys in
/// lexicographic order and duplicate values always resolve to the smallest key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermBase {
    terms: BTreeMap<String, String>,
}

impl TermBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, text: &str, from: Language, to: Language) -> Option<&str> {
        match (from, to) {
            (Language::Zh, Language::En) => self.terms.get(text).map(String::as_str),
            (Language::En, Language::Zh) => {
                let needle = text.to_lowercase();
                self.terms
                    .iter()
                    .find(|(_, value)| value.to_lowercase() == needle)
                    .map(|(key, _)| key.as_str())
            }
            _ => None,
        }
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.terms.get(term).map(String::as_str)
    }

    pub fn insert(&mut self, term: String, translation: String) -> Option<String> {
        self.terms.insert(term, translation)
    }

    pub fn remove(&mut self, term: &str) -> Option<String> {
        self.terms.remove(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for TermBase {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}
