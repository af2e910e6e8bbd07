//! Revised Romanization of Hangul syllable blocks.

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const MEDIALS_PER_INITIAL: u32 = 21 * 28;
const FINALS: u32 = 28;
const SILENT_INITIAL: usize = 11;
const RIEUL_INITIAL: usize = 5;
const RIEUL_FINAL: usize = 8;

const INITIALS: [&str; 19] = [
    "g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s", "ss", "", "j", "jj", "ch", "k", "t", "p",
    "h",
];

const MEDIALS: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we",
    "wi", "yu", "eu", "ui", "i",
];

/// Final consonant at the end of a word or before another consonant.
const FINALS_CLOSED: [&str; 28] = [
    "", "k", "k", "k", "n", "n", "n", "t", "l", "k", "m", "l", "l", "l", "p", "l", "m", "p", "p",
    "t", "t", "ng", "t", "t", "k", "t", "p", "t",
];

/// Final consonant before a silent initial: (kept, carried to next syllable).
const FINALS_LINKED: [(&str, &str); 28] = [
    ("", ""),
    ("", "g"),
    ("", "kk"),
    ("k", "s"),
    ("", "n"),
    ("n", "j"),
    ("", "n"),
    ("", "d"),
    ("", "r"),
    ("l", "g"),
    ("l", "m"),
    ("l", "b"),
    ("l", "s"),
    ("l", "t"),
    ("l", "p"),
    ("", "r"),
    ("", "m"),
    ("", "b"),
    ("p", "s"),
    ("", "s"),
    ("", "ss"),
    ("ng", ""),
    ("", "j"),
    ("", "ch"),
    ("", "k"),
    ("", "t"),
    ("", "p"),
    ("", ""),
];

#[derive(Debug, Clone, Copy)]
struct Jamo {
    initial: usize,
    medial: usize,
    last: usize,
}

fn decompose(c: char) -> Option<Jamo> {
    let code = c as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return None;
    }
    let offset = code - SYLLABLE_BASE;
    Some(Jamo {
        initial: (offset / MEDIALS_PER_INITIAL) as usize,
        medial: ((offset % MEDIALS_PER_INITIAL) / FINALS) as usize,
        last: (offset % FINALS) as usize,
    })
}

pub fn romanize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut carried: Option<&str> = None;

    for (i, &c) in chars.iter().enumerate() {
        let Some(jamo) = decompose(c) else {
            carried = None;
            out.push(c);
            continue;
        };

        let initial = match carried.take() {
            Some(carry) if jamo.initial == SILENT_INITIAL => carry,
            Some("l") if jamo.initial == RIEUL_INITIAL => "l",
            _ => INITIALS[jamo.initial],
        };
        out.push_str(initial);
        out.push_str(MEDIALS[jamo.medial]);

        match chars.get(i + 1).copied().and_then(decompose) {
            Some(next) if next.initial == SILENT_INITIAL => {
                let (kept, carry) = FINALS_LINKED[jamo.last];
                out.push_str(kept);
                carried = Some(carry);
            }
            Some(next) if next.initial == RIEUL_INITIAL && jamo.last == RIEUL_FINAL => {
                out.push('l');
                carried = Some("l");
            }
            _ => out.push_str(FINALS_CLOSED[jamo.last]),
        }
    }

    out
}
