//! Cyrillic → Latin for Russian.

fn latin(lower: char) -> Option<&'static str> {
    let out = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(out)
}

pub fn romanize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match latin(lower) {
            Some(mapped) if lower != c => {
                let mut chars = mapped.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            Some(mapped) => out.push_str(mapped),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_words() {
        assert_eq!(romanize("привет"), "privet");
        assert_eq!(romanize("щука"), "shchuka");
        assert_eq!(romanize("объект"), "obekt");
    }

    #[test]
    fn keeps_capitals() {
        assert_eq!(romanize("Жуков"), "Zhukov");
        assert_eq!(romanize("Москва, 2024"), "Moskva, 2024");
    }
}
