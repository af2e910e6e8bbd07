use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize as _;

use crate::auth::AuthContext;
use crate::config::{Endpoints, ScraperConfig};
use crate::course::{Course, Level};
use crate::download;
use crate::formats::{Item, LevelArtifact, LevelPayload, Word};
use crate::http::RateLimitedClient;
use crate::transliterate::Transliterator;

const PRIMARY_SCREEN: &str = "1";

/// How a level fetch ended. Only transport, parse and write problems are
/// errors; status codes other than 200 land here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelOutcome {
    Written(PathBuf),
    NotStandard,
    NotFound,
    Unexpected(u16),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseTally {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct LevelScraper {
    client: RateLimitedClient,
    auth: AuthContext,
    endpoints: Endpoints,
    transliterator: Transliterator,
    output_root: PathBuf,
    download_audio: bool,
}

impl LevelScraper {
    pub fn new(
        client: RateLimitedClient,
        auth: AuthContext,
        transliterator: Transliterator,
        config: &ScraperConfig,
    ) -> Self {
        Self {
            client,
            auth,
            endpoints: config.endpoints(),
            transliterator,
            output_root: config.output_root.clone(),
            download_audio: config.download_audio,
        }
    }

    /// Scrapes every resolved level of `course`, one after another. A failing
    /// level is logged and does not stop the rest.
    pub async fn scrape_course(&self, course: &Course) -> CourseTally {
        tracing::info!(course_id = %course.id, levels = course.levels.len(), "scrape course");

        let mut tally = CourseTally::default();
        for &index in &course.levels {
            let mut level = Level::new(index);
            match self.scrape_level(course, &mut level).await {
                Ok(LevelOutcome::Written(_)) => tally.written += 1,
                Ok(_) => tally.skipped += 1,
                Err(err) => {
                    tally.failed += 1;
                    tracing::error!(course_id = %course.id, level = index, "level failed");
                    tracing::debug!(error = ?err, "level failure detail");
                }
            }
        }
        tally
    }

    pub async fn scrape_level(
        &self,
        course: &Course,
        level: &mut Level,
    ) -> anyhow::Result<LevelOutcome> {
        tracing::info!(course_id = %course.id, level = level.index, "level start");

        let url = self.endpoints.level_preview(&course.id, level.index)?;
        let response = self
            .client
            .send(self.auth.authorize(self.client.get(url.clone())))
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status().as_u16();
        level.status = Some(status);
        tracing::info!(level = level.index, status, "level fetched");

        match status {
            200 => {}
            400 => {
                tracing::error!(
                    level = level.index,
                    status,
                    "probably not a standard level"
                );
                return Ok(LevelOutcome::NotStandard);
            }
            404 => {
                tracing::error!(level = level.index, status, "level not found");
                return Ok(LevelOutcome::NotFound);
            }
            other => {
                tracing::error!(
                    level = level.index,
                    status = other,
                    "unexpected level status"
                );
                return Ok(LevelOutcome::Unexpected(other));
            }
        }

        let raw = response.text().await.context("read level body")?;
        let payload: LevelPayload =
            serde_json::from_str(&raw).context("parse level payload")?;
        parse_level(level, payload, &course.lang, &self.transliterator)?;

        let path = artifact_path(&self.output_root, course, level);
        tracing::info!(level = level.index, path = %path.display(), "write level");
        write_artifact(&path, &artifact(course, level))?;

        if self.download_audio {
            self.save_audio(course, level).await;
        }

        Ok(LevelOutcome::Written(path))
    }

    async fn save_audio(&self, course: &Course, level: &Level) {
        let dir = self.output_root.join(&course.id).join("audio");
        for url in level.words.iter().flat_map(|word| &word.audio) {
            let Some(path) = download::download_path(&dir, url) else {
                tracing::warn!(url = %url, "audio url has no file name");
                continue;
            };
            if path.exists() {
                continue;
            }
            match download::download_file(&self.client, url, &path).await {
                Ok(bytes) => tracing::debug!(path = %path.display(), bytes, "audio saved"),
                Err(err) => tracing::warn!(url = %url, error = ?err, "audio download failed"),
            }
        }
    }
}

/// Fills `level` from a preview payload. Words keep payload order.
pub fn parse_level(
    level: &mut Level,
    payload: LevelPayload,
    lang: &str,
    transliterator: &Transliterator,
) -> anyhow::Result<()> {
    level.platform_id = Some(match &payload.course.level_id {
        serde_json::Value::String(id) => id.clone(),
        other => other.to_string(),
    });
    level.name = Some(payload.course.level_name);
    level.words = Vec::with_capacity(payload.learnables.len());

    for (n, learnable) in payload.learnables.into_iter().enumerate() {
        let mut screens = learnable.screens;
        let screen = screens
            .remove(PRIMARY_SCREEN)
            .with_context(|| format!("learnable {n} has no primary screen"))?;

        let info: Vec<Item> = screen
            .visible_info
            .into_iter()
            .chain(screen.hidden_info)
            .collect();
        let audio = screen
            .audio
            .map(|field| field.value.iter().map(|v| v.url().to_owned()).collect())
            .unwrap_or_default();
        let transliteration =
            transliterator.transliterate(screen.item.text().unwrap_or_default(), lang);

        level.words.push(Word {
            item: screen.item,
            definition: screen.definition,
            info,
            difficulty: learnable.difficulty,
            audio,
            transliteration,
        });
    }

    Ok(())
}

pub fn artifact(course: &Course, level: &Level) -> LevelArtifact {
    LevelArtifact {
        course_id: course.id.clone(),
        course_url: course.url.clone(),
        id: level.platform_id.clone().unwrap_or_default(),
        index: level.index,
        lang: course.lang.clone(),
        name: level.name.clone().unwrap_or_default(),
        words: level.words.clone(),
    }
}

/// `{root}/{course id}/{lang}-{course id}-{padded index}.json`
pub fn artifact_path(root: &Path, course: &Course, level: &Level) -> PathBuf {
    root.join(&course.id).join(format!(
        "{}-{}-{}.json",
        course.lang, course.id, level.padded_index
    ))
}

pub fn write_artifact(path: &Path, artifact: &LevelArtifact) -> anyhow::Result<()> {
    let parent_dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("artifact path must have parent: {}", path.display()))?;
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("create course dir: {}", parent_dir.display()))?;

    let file = File::create(path)
        .with_context(|| format!("create level artifact: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    artifact
        .serialize(&mut serializer)
        .context("serialize level artifact")?;
    writer.flush().context("flush level artifact")?;

    Ok(())
}
