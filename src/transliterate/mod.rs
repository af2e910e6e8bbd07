//! Romanization of course prompts, dispatched on the course's display
//! language.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[cfg(feature = "ipadic")]
pub mod ipadic;
pub mod japanese;
pub mod kana;
pub mod korean;
pub mod russian;

use japanese::{CANONICAL_ROMANIZATION, JapaneseConverter, LexiconAnalyzer, ReadingAnalyzer};

pub const ROMANIZATION_KEY: &str = "romanization";

/// Named romanized variants of one string. Serializes as a flat JSON object;
/// empty when the language is not handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transliteration(BTreeMap<String, String>);

impl Transliteration {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn romanization(&self) -> Option<&str> {
        self.get(ROMANIZATION_KEY)
    }

    fn romanized(value: String) -> Self {
        Self(BTreeMap::from([(ROMANIZATION_KEY.to_owned(), value)]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Korean,
    Russian,
    Japanese,
    Unsupported,
}

impl Language {
    /// Matches the display names used on course pages, exactly.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Korean" => Language::Korean,
            "Russian" => Language::Russian,
            "Japanese" => Language::Japanese,
            _ => Language::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transliterator {
    japanese: JapaneseConverter,
}

impl Transliterator {
    pub fn new(analyzer: Arc<dyn ReadingAnalyzer>) -> Self {
        Self {
            japanese: JapaneseConverter::new(analyzer),
        }
    }

    /// Uses the lexicon at `path` ahead of the default analyzer, if given.
    pub fn with_lexicon(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let lexicon = LexiconAnalyzer::load(path)?.with_fallback(japanese::default_analyzer());
        Ok(Self::new(Arc::new(lexicon)))
    }

    pub fn transliterate(&self, text: &str, lang: &str) -> Transliteration {
        match Language::from_name(lang) {
            Language::Korean => Transliteration::romanized(korean::romanize(text)),
            Language::Russian => Transliteration::romanized(russian::romanize(text)),
            Language::Japanese => {
                let mut variants = self.japanese.matrix(text);
                let canonical = variants
                    .get(&CANONICAL_ROMANIZATION.label())
                    .cloned()
                    .unwrap_or_default();
                variants.insert(ROMANIZATION_KEY.to_owned(), canonical);
                Transliteration(variants)
            }
            // Chinese ("zh") and everything else are left untouched.
            Language::Unsupported => Transliteration::default(),
        }
    }
}
