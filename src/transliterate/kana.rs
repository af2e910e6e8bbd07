//! Kana classification, hiragana/katakana folding and kana → romaji.

use super::japanese::RomajiSystem;

const KATAKANA_OFFSET: u32 = 0x60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Hiragana,
    Katakana,
    Kanji,
    Space,
    Other,
}

pub fn script_of(c: char) -> Script {
    match c {
        '\u{3041}'..='\u{309F}' => Script::Hiragana,
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => Script::Katakana,
        '\u{3005}' | '\u{3006}' | '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => {
            Script::Kanji
        }
        c if c.is_whitespace() => Script::Space,
        _ => Script::Other,
    }
}

pub fn is_kana(c: char) -> bool {
    matches!(script_of(c), Script::Hiragana | Script::Katakana)
}

pub fn has_kanji(text: &str) -> bool {
    text.chars().any(|c| script_of(c) == Script::Kanji)
}

pub fn hiragana_char(c: char) -> char {
    if ('\u{30A1}'..='\u{30F6}').contains(&c) {
        char::from_u32(c as u32 - KATAKANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

pub fn katakana_char(c: char) -> char {
    if ('\u{3041}'..='\u{3096}').contains(&c) {
        char::from_u32(c as u32 + KATAKANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

pub fn to_hiragana(text: &str) -> String {
    text.chars().map(hiragana_char).collect()
}

pub fn to_katakana(text: &str) -> String {
    text.chars().map(katakana_char).collect()
}

fn base_romaji(c: char, system: RomajiSystem) -> Option<&'static str> {
    if system == RomajiSystem::Nippon {
        let nippon = match c {
            'し' => Some("si"),
            'ち' => Some("ti"),
            'つ' => Some("tu"),
            'ふ' => Some("hu"),
            'じ' => Some("zi"),
            'ぢ' => Some("di"),
            'づ' => Some("du"),
            'を' => Some("wo"),
            'ゐ' => Some("wi"),
            'ゑ' => Some("we"),
            _ => None,
        };
        if nippon.is_some() {
            return nippon;
        }
    }

    let romaji = match c {
        'あ' | 'ぁ' => "a",
        'い' | 'ぃ' | 'ゐ' => "i",
        'う' | 'ぅ' => "u",
        'え' | 'ぇ' | 'ゑ' => "e",
        'お' | 'ぉ' | 'を' => "o",
        'か' | 'ゕ' => "ka",
        'き' => "ki",
        'く' => "ku",
        'け' | 'ゖ' => "ke",
        'こ' => "ko",
        'が' => "ga",
        'ぎ' => "gi",
        'ぐ' => "gu",
        'げ' => "ge",
        'ご' => "go",
        'さ' => "sa",
        'し' => "shi",
        'す' => "su",
        'せ' => "se",
        'そ' => "so",
        'ざ' => "za",
        'じ' | 'ぢ' => "ji",
        'ず' | 'づ' => "zu",
        'ぜ' => "ze",
        'ぞ' => "zo",
        'た' => "ta",
        'ち' => "chi",
        'つ' => "tsu",
        'て' => "te",
        'と' => "to",
        'だ' => "da",
        'で' => "de",
        'ど' => "do",
        'な' => "na",
        'に' => "ni",
        'ぬ' => "nu",
        'ね' => "ne",
        'の' => "no",
        'は' => "ha",
        'ひ' => "hi",
        'ふ' => "fu",
        'へ' => "he",
        'ほ' => "ho",
        'ば' => "ba",
        'び' => "bi",
        'ぶ' => "bu",
        'べ' => "be",
        'ぼ' => "bo",
        'ぱ' => "pa",
        'ぴ' => "pi",
        'ぷ' => "pu",
        'ぺ' => "pe",
        'ぽ' => "po",
        'ま' => "ma",
        'み' => "mi",
        'む' => "mu",
        'め' => "me",
        'も' => "mo",
        'や' | 'ゃ' => "ya",
        'ゆ' | 'ゅ' => "yu",
        'よ' | 'ょ' => "yo",
        'ら' => "ra",
        'り' => "ri",
        'る' => "ru",
        'れ' => "re",
        'ろ' => "ro",
        'わ' | 'ゎ' => "wa",
        'ゔ' => "vu",
        _ => return None,
    };
    Some(romaji)
}

fn is_small_y(c: char) -> bool {
    matches!(c, 'ゃ' | 'ゅ' | 'ょ')
}

fn is_small_vowel(c: char) -> bool {
    matches!(c, 'ぁ' | 'ぃ' | 'ぅ' | 'ぇ' | 'ぉ')
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

#[derive(Debug, Clone, PartialEq)]
enum Syllable {
    Kana(String),
    Sokuon,
    Prolonged,
    N,
    Other(char),
}

fn syllables(hiragana: &[char], system: RomajiSystem) -> Vec<Syllable> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < hiragana.len() {
        let c = hiragana[i];
        match c {
            'っ' => out.push(Syllable::Sokuon),
            'ー' => out.push(Syllable::Prolonged),
            'ん' => out.push(Syllable::N),
            _ => match base_romaji(c, system) {
                Some(base) => {
                    let next = hiragana.get(i + 1).copied();
                    if let Some(small) = next.filter(|&n| is_small_y(n))
                        && base.len() > 1
                        && base.ends_with('i')
                    {
                        out.push(Syllable::Kana(youon(base, small, system)));
                        i += 2;
                        continue;
                    }
                    if let Some(small) = next.filter(|&n| is_small_vowel(n))
                        && !is_small_vowel(c)
                    {
                        let stem = &base[..base.len() - 1];
                        let stem = if stem.is_empty() && c == 'う' { "w" } else { stem };
                        let vowel = base_romaji(small, system).unwrap_or_default();
                        out.push(Syllable::Kana(format!("{stem}{vowel}")));
                        i += 2;
                        continue;
                    }
                    out.push(Syllable::Kana(base.to_owned()));
                }
                None => out.push(Syllable::Other(c)),
            },
        }
        i += 1;
    }
    out
}

fn youon(base: &str, small: char, system: RomajiSystem) -> String {
    let stem = &base[..base.len() - 1];
    let vowel = match small {
        'ゃ' => 'a',
        'ゅ' => 'u',
        _ => 'o',
    };
    let palatal = system != RomajiSystem::Nippon
        && (stem.ends_with("sh") || stem.ends_with("ch") || stem == "j");
    if palatal {
        format!("{stem}{vowel}")
    } else {
        format!("{stem}y{vowel}")
    }
}

fn lengthened(vowel: char, system: RomajiSystem) -> Option<char> {
    match system {
        RomajiSystem::Hepburn => match vowel {
            'a' => Some('ā'),
            'i' => Some('ī'),
            'u' => Some('ū'),
            'e' => Some('ē'),
            'o' => Some('ō'),
            _ => None,
        },
        RomajiSystem::Nippon => match vowel {
            'a' => Some('â'),
            'i' => Some('î'),
            'u' => Some('û'),
            'e' => Some('ê'),
            'o' => Some('ô'),
            _ => None,
        },
        RomajiSystem::Passport => None,
    }
}

/// Whether vowel `next` written after `prev` is a long vowel in `system`.
fn is_long_pair(prev: char, next: char, system: RomajiSystem) -> bool {
    match system {
        RomajiSystem::Hepburn => matches!(
            (prev, next),
            ('a', 'a') | ('u', 'u') | ('e', 'e') | ('o', 'o') | ('o', 'u')
        ),
        RomajiSystem::Nippon => matches!(
            (prev, next),
            ('a', 'a') | ('i', 'i') | ('u', 'u') | ('e', 'e') | ('o', 'o') | ('o', 'u')
        ),
        RomajiSystem::Passport => matches!((prev, next), ('o', 'o') | ('o', 'u') | ('u', 'u')),
    }
}

/// Replaces the trailing vowel of `out` with its long form, or leaves it
/// as-is when the system writes long vowels short.
fn lengthen_last(out: &mut String, vowel: char, system: RomajiSystem) {
    if let Some(long) = lengthened(vowel, system) {
        out.pop();
        out.push(long);
    }
}

/// Romanizes kana. Anything that is not kana is copied through.
pub fn to_romaji(text: &str, system: RomajiSystem) -> String {
    let hiragana: Vec<char> = text.chars().map(hiragana_char).collect();
    let syllables = syllables(&hiragana, system);

    let mut out = String::with_capacity(text.len() * 2);
    let mut last_vowel: Option<char> = None;
    let mut geminate = false;

    for (k, syllable) in syllables.iter().enumerate() {
        match syllable {
            Syllable::Kana(romaji) => {
                let mut chars = romaji.chars();
                let first = chars.next().unwrap_or_default();
                let single_vowel = chars.next().is_none() && is_vowel(first);

                if single_vowel
                    && let Some(prev) = last_vowel
                    && is_long_pair(prev, first, system)
                {
                    lengthen_last(&mut out, prev, system);
                    last_vowel = None;
                    geminate = false;
                    continue;
                }

                if geminate && !is_vowel(first) {
                    if romaji.starts_with("ch") && system != RomajiSystem::Nippon {
                        out.push('t');
                    } else {
                        out.push(first);
                    }
                }
                geminate = false;

                out.push_str(romaji);
                last_vowel = romaji.chars().last().filter(|&c| is_vowel(c));
            }
            Syllable::Sokuon => geminate = true,
            Syllable::Prolonged => {
                if let Some(vowel) = last_vowel.take() {
                    lengthen_last(&mut out, vowel, system);
                }
                geminate = false;
            }
            Syllable::N => {
                let next = match syllables.get(k + 1) {
                    Some(Syllable::Kana(romaji)) => romaji.chars().next(),
                    _ => None,
                };
                match (system, next) {
                    (RomajiSystem::Passport, Some('b' | 'm' | 'p')) => out.push('m'),
                    (RomajiSystem::Passport, _) => out.push('n'),
                    (_, Some(c)) if is_vowel(c) || c == 'y' => out.push_str("n'"),
                    _ => out.push('n'),
                }
                last_vowel = None;
                geminate = false;
            }
            Syllable::Other(c) => {
                out.push(*c);
                last_vowel = None;
                geminate = false;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_between_kana_scripts() {
        assert_eq!(to_hiragana("カタカナ"), "かたかな");
        assert_eq!(to_katakana("ひらがな"), "ヒラガナ");
        assert_eq!(to_katakana("コーヒー"), "コーヒー");
        assert_eq!(to_hiragana("漢字abc"), "漢字abc");
    }

    #[test]
    fn classifies_scripts() {
        assert_eq!(script_of('あ'), Script::Hiragana);
        assert_eq!(script_of('ア'), Script::Katakana);
        assert_eq!(script_of('ー'), Script::Katakana);
        assert_eq!(script_of('語'), Script::Kanji);
        assert_eq!(script_of(' '), Script::Space);
        assert_eq!(script_of('a'), Script::Other);
    }

    #[test]
    fn hepburn() {
        let h = RomajiSystem::Hepburn;
        assert_eq!(to_romaji("すし", h), "sushi");
        assert_eq!(to_romaji("ちゃ", h), "cha");
        assert_eq!(to_romaji("とうきょう", h), "tōkyō");
        assert_eq!(to_romaji("まっちゃ", h), "matcha");
        assert_eq!(to_romaji("きって", h), "kitte");
        assert_eq!(to_romaji("こんや", h), "kon'ya");
        assert_eq!(to_romaji("コーヒー", h), "kōhī");
        assert_eq!(to_romaji("ファン", h), "fan");
        assert_eq!(to_romaji("かわいい", h), "kawaii");
    }

    #[test]
    fn nippon() {
        let n = RomajiSystem::Nippon;
        assert_eq!(to_romaji("すし", n), "susi");
        assert_eq!(to_romaji("ちゃ", n), "tya");
        assert_eq!(to_romaji("つづく", n), "tuduku");
        assert_eq!(to_romaji("とうきょう", n), "tôkyô");
        assert_eq!(to_romaji("まっちゃ", n), "mattya");
    }

    #[test]
    fn passport() {
        let p = RomajiSystem::Passport;
        assert_eq!(to_romaji("とうきょう", p), "tokyo");
        assert_eq!(to_romaji("しんぶん", p), "shimbun");
        assert_eq!(to_romaji("こんや", p), "konya");
    }

    #[test]
    fn keeps_non_kana() {
        assert_eq!(to_romaji("日本", RomajiSystem::Hepburn), "日本");
        assert_eq!(to_romaji("A・B", RomajiSystem::Hepburn), "A・B");
    }
}
