use std::ops::RangeInclusive;

use serde::Deserialize;

use crate::config::Endpoints;
use crate::error::ScrapeError;
use crate::formats::Word;

/// A course reference as the caller wrote it: a bare id, a course URL, or an
/// object with any of `url`, `id` and `levels`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CourseRef {
    Number(u64),
    Text(String),
    Spec(CourseSpec),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CourseSpec {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub id: Option<CourseId>,
    #[serde(default)]
    pub levels: Option<LevelSelector>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CourseId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseId::Number(n) => write!(f, "{n}"),
            CourseId::Text(s) => f.write_str(s),
        }
    }
}

/// Which levels of a course to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawSelector")]
pub enum LevelSelector {
    #[default]
    All,
    Explicit(Vec<i64>),
    Range(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    List(Vec<i64>),
    Single(i64),
    Text(String),
}

impl From<RawSelector> for LevelSelector {
    fn from(raw: RawSelector) -> Self {
        match raw {
            RawSelector::List(levels) => LevelSelector::Explicit(levels),
            RawSelector::Single(level) => LevelSelector::Explicit(vec![level]),
            RawSelector::Text(text) => LevelSelector::parse(&text),
        }
    }
}

impl LevelSelector {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            LevelSelector::All
        } else {
            LevelSelector::Range(text.to_owned())
        }
    }

    /// Concrete level numbers within `1..=max_levels`, first occurrence wins.
    pub fn expand(&self, max_levels: u32) -> Vec<u32> {
        let candidates = match self {
            LevelSelector::All => return (1..=max_levels).collect(),
            LevelSelector::Explicit(levels) => levels.clone(),
            LevelSelector::Range(expr) => parse_numeric_range(expr, 1..=i64::from(max_levels)),
        };

        let mut seen = std::collections::HashSet::new();
        candidates
            .into_iter()
            .filter(|&level| level > 0 && level <= i64::from(max_levels))
            .filter_map(|level| u32::try_from(level).ok())
            .filter(|&level| seen.insert(level))
            .collect()
    }
}

/// Parses expressions such as `1-4,7`, `2..5` or `1...4` (end exclusive).
/// Numbers outside `bounds` are dropped before ranges are expanded, so the
/// result never holds more than one pass over `bounds` per part. Parts that
/// do not parse are skipped.
pub fn parse_numeric_range(expr: &str, bounds: RangeInclusive<i64>) -> Vec<i64> {
    let (lo, hi) = (*bounds.start(), *bounds.end());
    let mut out = Vec::new();
    for part in expr.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Ok(single) = part.parse::<i64>() {
            if bounds.contains(&single) {
                out.push(single);
            }
            continue;
        }
        let Some((start, end)) = split_range(part) else {
            tracing::debug!(part, "ignoring unparsable level range part");
            continue;
        };
        if start <= end {
            let (first, last) = (start.max(lo), end.min(hi));
            if first <= last {
                out.extend(first..=last);
            }
        } else {
            let (first, last) = (start.min(hi), end.max(lo));
            if first >= last {
                out.extend((last..=first).rev());
            }
        }
    }
    out
}

fn split_range(part: &str) -> Option<(i64, i64)> {
    if let Some((start, end)) = part.split_once("...") {
        let start = start.trim().parse::<i64>().ok()?;
        let end = end.trim().parse::<i64>().ok()?;
        return match start.cmp(&end) {
            std::cmp::Ordering::Less => Some((start, end.checked_sub(1)?)),
            std::cmp::Ordering::Greater => Some((start, end.checked_add(1)?)),
            std::cmp::Ordering::Equal => None,
        };
    }
    if let Some((start, end)) = part.split_once("..") {
        return Some((start.trim().parse().ok()?, end.trim().parse().ok()?));
    }
    // A leading '-' belongs to the first number, so split on a later one.
    let split_at = part.char_indices().skip(1).find(|&(_, c)| c == '-')?.0;
    let (start, end) = part.split_at(split_at);
    Some((start.trim().parse().ok()?, end[1..].trim().parse().ok()?))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub url: String,
    pub selector: LevelSelector,
    /// Display language from the course page; empty until resolved.
    pub lang: String,
    pub levels: Vec<u32>,
}

impl CourseRef {
    /// Bare strings are URLs unless they are purely numeric.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            CourseRef::Spec(CourseSpec {
                id: Some(CourseId::Text(text.to_owned())),
                ..CourseSpec::default()
            })
        } else {
            CourseRef::Text(text.to_owned())
        }
    }

    fn into_spec(self) -> CourseSpec {
        match self {
            CourseRef::Number(id) => CourseSpec {
                id: Some(CourseId::Number(id)),
                ..CourseSpec::default()
            },
            CourseRef::Text(text) => match CourseRef::from_text(&text) {
                CourseRef::Spec(spec) => spec,
                _ => CourseSpec {
                    url: Some(text),
                    ..CourseSpec::default()
                },
            },
            CourseRef::Spec(spec) => spec,
        }
    }

    pub fn normalize(self, endpoints: &Endpoints) -> Result<Course, ScrapeError> {
        let spec = self.into_spec();
        let url = spec.url.filter(|url| !url.trim().is_empty());
        let id = spec
            .id
            .map(|id| id.to_string().trim().to_owned())
            .filter(|id| !id.is_empty());

        let (id, url) = match (id, url) {
            (None, None) => return Err(ScrapeError::MissingReference),
            (Some(id), Some(url)) => (id, url),
            (None, Some(url)) => (course_id_from_url(&url)?, url),
            (Some(id), None) => {
                let url = format!("{}{id}", endpoints.course_base());
                (id, url)
            }
        };

        Ok(Course {
            id,
            url,
            selector: spec.levels.unwrap_or_default(),
            lang: String::new(),
            levels: Vec::new(),
        })
    }
}

/// The id is the fifth `/`-separated segment: `https://host/course/{id}/...`.
pub fn course_id_from_url(url: &str) -> Result<String, ScrapeError> {
    url.split('/')
        .nth(4)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ScrapeError::InvalidCourseUrl(url.to_owned()))
}

pub fn normalize_all(
    refs: Vec<CourseRef>,
    endpoints: &Endpoints,
) -> Result<Vec<Course>, ScrapeError> {
    refs.into_iter().map(|r| r.normalize(endpoints)).collect()
}

/// One level of a course, filled in as it is scraped.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub index: u32,
    pub padded_index: String,
    pub platform_id: Option<String>,
    pub name: Option<String>,
    pub words: Vec<Word>,
    pub status: Option<u16>,
}

impl Level {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            padded_index: format!("{index:03}"),
            platform_id: None,
            name: None,
            words: Vec::new(),
            status: None,
        }
    }
}
