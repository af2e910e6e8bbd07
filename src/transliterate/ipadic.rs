//! Morphological analysis backed by the IPADIC dictionary embedded in
//! lindera.

use anyhow::Context as _;
use lindera::dictionary::load_dictionary;
use lindera::mode::Mode;
use lindera::segmenter::Segmenter;
use lindera::tokenizer::Tokenizer;

use super::japanese::{ReadingAnalyzer, Token, script_runs};
use super::kana;

pub struct DictionaryAnalyzer {
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for DictionaryAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryAnalyzer").finish_non_exhaustive()
    }
}

impl DictionaryAnalyzer {
    pub fn embedded() -> anyhow::Result<Self> {
        let dictionary =
            load_dictionary("embedded://ipadic").context("load embedded ipadic dictionary")?;
        let segmenter = Segmenter::new(Mode::Normal, dictionary, None).keep_whitespace(true);
        Ok(Self {
            tokenizer: Tokenizer::new(segmenter),
        })
    }
}

impl ReadingAnalyzer for DictionaryAnalyzer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let tokens = match self.tokenizer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!(error = ?err, "morphological analysis failed; using script runs");
                return script_runs(text);
            }
        };

        tokens
            .into_iter()
            .map(|mut token| {
                let reading = token
                    .get("reading")
                    .filter(|reading| !reading.is_empty() && *reading != "*")
                    .map(str::to_owned);
                let surface = token.surface.into_owned();
                // Unknown words carry no reading; kana still reads as itself.
                let reading = reading.or_else(|| {
                    (!surface.is_empty() && surface.chars().all(kana::is_kana))
                        .then(|| kana::to_katakana(&surface))
                });
                Token { surface, reading }
            })
            .collect()
    }
}
