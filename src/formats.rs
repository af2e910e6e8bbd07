use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transliterate::Transliteration;

/// `{label, kind, value}` as written to the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Item {
    /// The value as text, when it is text.
    pub fn text(&self) -> Option<&str> {
        self.value.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub item: Item,
    pub definition: Item,
    pub info: Vec<Item>,
    pub difficulty: serde_json::Value,
    pub audio: Vec<String>,
    pub transliteration: Transliteration,
}

/// One file per scraped level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelArtifact {
    pub course_id: String,
    pub course_url: String,
    pub id: String,
    pub index: u32,
    pub lang: String,
    pub name: String,
    pub words: Vec<Word>,
}

/// Body of `learning_sessions/preview/`. Only the fields we read are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelPayload {
    pub course: PayloadCourse,
    #[serde(default)]
    pub learnables: Vec<Learnable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadCourse {
    pub level_id: serde_json::Value,
    #[serde(default)]
    pub level_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learnable {
    #[serde(default)]
    pub difficulty: serde_json::Value,
    #[serde(default)]
    pub screens: HashMap<String, Screen>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Screen {
    pub item: Item,
    pub definition: Item,
    #[serde(default)]
    pub visible_info: Vec<Item>,
    #[serde(default)]
    pub hidden_info: Vec<Item>,
    #[serde(default)]
    pub audio: Option<AudioField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioField {
    #[serde(default)]
    pub value: Vec<AudioValue>,
}

/// Audio entries come either as bare URLs or as `{normal, slow}` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AudioValue {
    Url(String),
    Variants { normal: String },
}

impl AudioValue {
    pub fn url(&self) -> &str {
        match self {
            AudioValue::Url(url) => url,
            AudioValue::Variants { normal, .. } => normal,
        }
    }
}
