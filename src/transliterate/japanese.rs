use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use anyhow::Context as _;

use super::kana::{self, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Hiragana,
    Katakana,
    Romaji,
}

impl Target {
    pub const KANA: [Target; 2] = [Target::Hiragana, Target::Katakana];

    pub fn label(self) -> &'static str {
        match self {
            Target::Hiragana => "hiragana",
            Target::Katakana => "katakana",
            Target::Romaji => "romaji",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Spaced,
    Okurigana,
    Furigana,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Normal, Mode::Spaced, Mode::Okurigana, Mode::Furigana];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Spaced => "spaced",
            Mode::Okurigana => "okurigana",
            Mode::Furigana => "furigana",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomajiSystem {
    Nippon,
    Passport,
    Hepburn,
}

impl RomajiSystem {
    pub const ALL: [RomajiSystem; 3] = [
        RomajiSystem::Nippon,
        RomajiSystem::Passport,
        RomajiSystem::Hepburn,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RomajiSystem::Nippon => "nippon",
            RomajiSystem::Passport => "passport",
            RomajiSystem::Hepburn => "hepburn",
        }
    }
}

/// One cell of the conversion matrix. `system` is set only for romaji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub target: Target,
    pub mode: Mode,
    pub system: Option<RomajiSystem>,
}

impl Conversion {
    /// Hyphen-joined `target-mode[-system]`, e.g. `romaji-spaced-hepburn`.
    pub fn label(&self) -> String {
        let mut parts = vec![self.target.label(), self.mode.label()];
        if let Some(system) = self.system {
            parts.push(system.label());
        }
        parts.join("-")
    }
}

pub const CANONICAL_ROMANIZATION: Conversion = Conversion {
    target: Target::Romaji,
    mode: Mode::Spaced,
    system: Some(RomajiSystem::Hepburn),
};

/// {hiragana, katakana} × modes, then {romaji} × modes × systems.
pub fn conversion_matrix() -> Vec<Conversion> {
    let kana = Target::KANA.into_iter().flat_map(|target| {
        Mode::ALL.into_iter().map(move |mode| Conversion {
            target,
            mode,
            system: None,
        })
    });
    let romaji = Mode::ALL.into_iter().flat_map(|mode| {
        RomajiSystem::ALL.into_iter().map(move |system| Conversion {
            target: Target::Romaji,
            mode,
            system: Some(system),
        })
    });
    kana.chain(romaji).collect()
}

/// A run of text with its reading in katakana, when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub reading: Option<String>,
}

pub trait ReadingAnalyzer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// The analyzer used when no other is configured: the embedded IPADIC
/// dictionary when built with the `ipadic` feature, otherwise plain script
/// runs. Loaded once per process.
pub fn default_analyzer() -> Arc<dyn ReadingAnalyzer> {
    static DEFAULT: LazyLock<Arc<dyn ReadingAnalyzer>> = LazyLock::new(load_default_analyzer);
    Arc::clone(&DEFAULT)
}

#[cfg(feature = "ipadic")]
fn load_default_analyzer() -> Arc<dyn ReadingAnalyzer> {
    match super::ipadic::DictionaryAnalyzer::embedded() {
        Ok(analyzer) => Arc::new(analyzer),
        Err(err) => {
            tracing::warn!(error = ?err, "ipadic unavailable; kanji keep their written form");
            Arc::new(LexiconAnalyzer::default())
        }
    }
}

#[cfg(not(feature = "ipadic"))]
fn load_default_analyzer() -> Arc<dyn ReadingAnalyzer> {
    Arc::new(LexiconAnalyzer::default())
}

/// Splits text where the script changes. Kana runs read as themselves;
/// kanji and everything else get no reading.
pub(crate) fn script_runs(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let script = kana::script_of(chars[i]);
        let mut end = i + 1;
        while end < chars.len() && kana::script_of(chars[end]) == script {
            end += 1;
        }

        let surface: String = chars[i..end].iter().collect();
        let reading = match script {
            Script::Hiragana | Script::Katakana => Some(kana::to_katakana(&surface)),
            Script::Kanji | Script::Space | Script::Other => None,
        };
        tokens.push(Token { surface, reading });
        i = end;
    }

    tokens
}

/// Looks text up in a surface → reading lexicon, longest match first. Text
/// between matches goes to the fallback analyzer, or is split into script
/// runs when there is none.
#[derive(Clone, Default)]
pub struct LexiconAnalyzer {
    entries: HashMap<String, String>,
    longest: usize,
    fallback: Option<Arc<dyn ReadingAnalyzer>>,
}

impl std::fmt::Debug for LexiconAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconAnalyzer")
            .field("entries", &self.entries.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl LexiconAnalyzer {
    pub fn new(entries: HashMap<String, String>) -> Self {
        let entries: HashMap<String, String> = entries
            .into_iter()
            .filter(|(surface, reading)| !surface.is_empty() && !reading.is_empty())
            .map(|(surface, reading)| (surface, kana::to_katakana(&reading)))
            .collect();
        let longest = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        Self {
            entries,
            longest,
            fallback: None,
        }
    }

    /// Loads a JSON object mapping surface forms to readings.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read japanese lexicon: {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("parse japanese lexicon: {}", path.display()))?;
        tracing::info!(entries = entries.len(), "japanese lexicon loaded");
        Ok(Self::new(entries))
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ReadingAnalyzer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn match_at(&self, chars: &[char], start: usize) -> Option<(usize, &String)> {
        let max = self.longest.min(chars.len() - start);
        (1..=max).rev().find_map(|len| {
            let key: String = chars[start..start + len].iter().collect();
            self.entries.get(&key).map(|reading| (len, reading))
        })
    }

    fn tokenize_unmatched(&self, text: &str, tokens: &mut Vec<Token>) {
        if text.is_empty() {
            return;
        }
        match &self.fallback {
            Some(fallback) => tokens.extend(fallback.tokenize(text)),
            None => tokens.extend(script_runs(text)),
        }
    }
}

impl ReadingAnalyzer for LexiconAnalyzer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut pending = String::new();
        let mut i = 0;

        while i < chars.len() {
            match self.match_at(&chars, i) {
                Some((len, reading)) => {
                    self.tokenize_unmatched(&pending, &mut tokens);
                    pending.clear();
                    tokens.push(Token {
                        surface: chars[i..i + len].iter().collect(),
                        reading: Some(reading.clone()),
                    });
                    i += len;
                }
                None => {
                    pending.push(chars[i]);
                    i += 1;
                }
            }
        }
        self.tokenize_unmatched(&pending, &mut tokens);

        tokens
    }
}

#[derive(Clone)]
pub struct JapaneseConverter {
    analyzer: Arc<dyn ReadingAnalyzer>,
}

impl std::fmt::Debug for JapaneseConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JapaneseConverter").finish_non_exhaustive()
    }
}

impl Default for JapaneseConverter {
    fn default() -> Self {
        Self::new(default_analyzer())
    }
}

impl JapaneseConverter {
    pub fn new(analyzer: Arc<dyn ReadingAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn convert(&self, text: &str, conversion: Conversion) -> String {
        render(&self.analyzer.tokenize(text), conversion)
    }

    /// Every cell of [`conversion_matrix`], keyed by [`Conversion::label`].
    pub fn matrix(&self, text: &str) -> BTreeMap<String, String> {
        let tokens = self.analyzer.tokenize(text);
        conversion_matrix()
            .into_iter()
            .map(|conversion| (conversion.label(), render(&tokens, conversion)))
            .collect()
    }
}

fn render(tokens: &[Token], conversion: Conversion) -> String {
    match conversion.mode {
        Mode::Normal => tokens.iter().map(|t| converted(t, conversion)).collect(),
        Mode::Spaced => tokens
            .iter()
            .filter(|t| !t.surface.trim().is_empty())
            .map(|t| converted(t, conversion))
            .collect::<Vec<_>>()
            .join(" "),
        Mode::Okurigana | Mode::Furigana => {
            tokens.iter().map(|t| annotated(t, conversion)).collect()
        }
    }
}

fn kana_in_target(kana_text: &str, conversion: Conversion) -> String {
    match conversion.target {
        Target::Hiragana => kana::to_hiragana(kana_text),
        Target::Katakana => kana::to_katakana(kana_text),
        Target::Romaji => {
            kana::to_romaji(kana_text, conversion.system.unwrap_or(RomajiSystem::Hepburn))
        }
    }
}

fn converted(token: &Token, conversion: Conversion) -> String {
    let source = token.reading.as_deref().unwrap_or(&token.surface);
    kana_in_target(source, conversion)
}

fn annotated(token: &Token, conversion: Conversion) -> String {
    let Some(reading) = token.reading.as_deref() else {
        return token.surface.clone();
    };
    if !kana::has_kanji(&token.surface) {
        return token.surface.clone();
    }

    let split = split_okurigana(&token.surface, reading);
    let ruby = kana_in_target(&split.core_reading, conversion);
    match conversion.mode {
        Mode::Furigana => format!(
            "{}<ruby>{}<rp>(</rp><rt>{ruby}</rt><rp>)</rp></ruby>{}",
            split.prefix, split.core, split.suffix
        ),
        _ => format!("{}{}({ruby}){}", split.prefix, split.core, split.suffix),
    }
}

#[derive(Debug, PartialEq, Eq)]
struct OkuriganaSplit {
    prefix: String,
    core: String,
    core_reading: String,
    suffix: String,
}

/// Separates kana shared by surface and reading so only the kanji core is
/// annotated: 食べる/タベル → core 食, reading た, suffix べる.
fn split_okurigana(surface: &str, reading: &str) -> OkuriganaSplit {
    let surface: Vec<char> = surface.chars().collect();
    let reading: Vec<char> = kana::to_hiragana(reading).chars().collect();
    let same = |s: char, r: char| kana::is_kana(s) && kana::hiragana_char(s) == r;

    let mut prefix = 0;
    while prefix < surface.len()
        && prefix < reading.len()
        && same(surface[prefix], reading[prefix])
    {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < surface.len() - prefix
        && suffix < reading.len() - prefix
        && same(
            surface[surface.len() - 1 - suffix],
            reading[reading.len() - 1 - suffix],
        )
    {
        suffix += 1;
    }

    let core: String = surface[prefix..surface.len() - suffix].iter().collect();
    let core_reading: String = reading[prefix..reading.len() - suffix].iter().collect();
    if core.is_empty() || core_reading.is_empty() {
        return OkuriganaSplit {
            prefix: String::new(),
            core: surface.iter().collect(),
            core_reading: reading.iter().collect(),
            suffix: String::new(),
        };
    }

    OkuriganaSplit {
        prefix: surface[..prefix].iter().collect(),
        core,
        core_reading,
        suffix: surface[surface.len() - suffix..].iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> JapaneseConverter {
        let lexicon = HashMap::from([
            ("日本語".to_owned(), "にほんご".to_owned()),
            ("食べる".to_owned(), "たべる".to_owned()),
            ("東京".to_owned(), "とうきょう".to_owned()),
        ]);
        JapaneseConverter::new(Arc::new(LexiconAnalyzer::new(lexicon)))
    }

    fn cell(target: Target, mode: Mode, system: Option<RomajiSystem>) -> Conversion {
        Conversion {
            target,
            mode,
            system,
        }
    }

    #[test]
    fn matrix_has_twenty_cells_in_cartesian_order() {
        let labels: Vec<String> = conversion_matrix().iter().map(Conversion::label).collect();
        assert_eq!(labels.len(), 20);
        assert_eq!(labels[0], "hiragana-normal");
        assert_eq!(labels[3], "hiragana-furigana");
        assert_eq!(labels[4], "katakana-normal");
        assert_eq!(labels[8], "romaji-normal-nippon");
        assert_eq!(labels[9], "romaji-normal-passport");
        assert_eq!(labels[10], "romaji-normal-hepburn");
        assert_eq!(labels[19], "romaji-furigana-hepburn");
        assert_eq!(CANONICAL_ROMANIZATION.label(), "romaji-spaced-hepburn");
    }

    #[test]
    fn lexicon_splits_tokens() {
        let tokens = converter().analyzer.tokenize("東京へ行く");
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["東京", "へ", "行", "く"]);
        assert_eq!(tokens[0].reading.as_deref(), Some("トウキョウ"));
        assert_eq!(tokens[2].reading, None);
    }

    #[test]
    fn kana_targets() {
        let c = converter();
        assert_eq!(
            c.convert("日本語", cell(Target::Hiragana, Mode::Normal, None)),
            "にほんご"
        );
        assert_eq!(
            c.convert("日本語", cell(Target::Katakana, Mode::Normal, None)),
            "ニホンゴ"
        );
        assert_eq!(
            c.convert("日本語をたべる", cell(Target::Hiragana, Mode::Spaced, None)),
            "にほんご をたべる"
        );
    }

    #[test]
    fn romaji_spaced_hepburn() {
        assert_eq!(
            converter().convert("東京タワー", CANONICAL_ROMANIZATION),
            "tōkyō tawā"
        );
    }

    #[test]
    fn okurigana_and_furigana_annotate_only_the_kanji_core() {
        let c = converter();
        assert_eq!(
            c.convert("食べる", cell(Target::Hiragana, Mode::Okurigana, None)),
            "食(た)べる"
        );
        assert_eq!(
            c.convert(
                "食べる",
                cell(Target::Romaji, Mode::Furigana, Some(RomajiSystem::Hepburn))
            ),
            "<ruby>食<rp>(</rp><rt>ta</rt><rp>)</rp></ruby>べる"
        );
        assert_eq!(
            c.convert("すし", cell(Target::Katakana, Mode::Okurigana, None)),
            "すし"
        );
    }

    #[test]
    fn unknown_kanji_pass_through() {
        assert_eq!(
            converter().convert("猫", CANONICAL_ROMANIZATION),
            "猫"
        );
    }

    /// Reads every kanji as マ, one token per character.
    struct FixedReadings;

    impl ReadingAnalyzer for FixedReadings {
        fn tokenize(&self, text: &str) -> Vec<Token> {
            text.chars()
                .map(|c| Token {
                    surface: c.to_string(),
                    reading: Some(if kana::is_kana(c) {
                        kana::to_katakana(&c.to_string())
                    } else {
                        "マ".to_owned()
                    }),
                })
                .collect()
        }
    }

    #[test]
    fn lexicon_entries_override_the_fallback() {
        let lexicon = HashMap::from([("東京".to_owned(), "とうきょう".to_owned())]);
        let analyzer = LexiconAnalyzer::new(lexicon).with_fallback(Arc::new(FixedReadings));
        let tokens = analyzer.tokenize("猫と東京");

        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["猫", "と", "東京"]);
        assert_eq!(tokens[0].reading.as_deref(), Some("マ"));
        assert_eq!(tokens[1].reading.as_deref(), Some("ト"));
        assert_eq!(tokens[2].reading.as_deref(), Some("トウキョウ"));
    }

    #[test]
    fn script_runs_split_on_script_changes() {
        let tokens = script_runs("猫がネコ");
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["猫", "が", "ネコ"]);
        assert_eq!(tokens[0].reading, None);
        assert_eq!(tokens[1].reading.as_deref(), Some("ガ"));
    }

    #[test]
    fn split_keeps_prefix_kana() {
        assert_eq!(
            split_okurigana("お茶", "おちゃ"),
            OkuriganaSplit {
                prefix: "お".to_owned(),
                core: "茶".to_owned(),
                core_reading: "ちゃ".to_owned(),
                suffix: String::new(),
            }
        );
    }
}
