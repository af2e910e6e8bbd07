use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

use crate::course::CourseRef;
use crate::error::ScrapeError;

pub const DEFAULT_BASE_URL: &str = "https://app.memrise.com";
pub const DEFAULT_OUTPUT_ROOT: &str = "data";
const API_VERSION: &str = "v1.17";

/// Admission budget shared by every outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: usize,
    pub window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: 2,
            window: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: Url,
    pub output_root: PathBuf,
    pub rate_limit: RateLimit,
    pub download_audio: bool,
    pub japanese_lexicon: Option<PathBuf>,
}

impl ScraperConfig {
    pub fn new(base_url: &str, output_root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("parse base url: {base_url}"))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("base url must be http/https: {base_url}");
        }

        Ok(Self {
            base_url,
            output_root: output_root.into(),
            rate_limit: RateLimit::default(),
            download_audio: false,
            japanese_lexicon: None,
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.base_url)
    }
}

/// Platform URLs, all derived from one origin.
#[derive(Debug, Clone)]
pub struct Endpoints {
    origin: String,
}

impl Endpoints {
    pub fn new(base_url: &Url) -> Self {
        Self {
            origin: base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    pub fn sign_in(&self) -> String {
        format!("{}/signin", self.origin)
    }

    pub fn course_base(&self) -> String {
        format!("{}/course/", self.origin)
    }

    pub fn api_base(&self) -> String {
        format!("{}/{API_VERSION}", self.origin)
    }

    pub fn access_token(&self) -> String {
        format!("{}/auth/access_token/", self.api_base())
    }

    pub fn level_preview(&self, course_id: &str, level_index: u32) -> anyhow::Result<Url> {
        let mut url = Url::parse(&format!("{}/learning_sessions/preview/", self.api_base()))
            .context("parse level preview endpoint")?;
        url.query_pairs_mut()
            .append_pair("course_id", course_id)
            .append_pair("level_index", &level_index.to_string());
        Ok(url)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub pw: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.username.trim().is_empty() {
            return Err(ScrapeError::MissingCredentials("username"));
        }
        if self.pw.is_empty() {
            return Err(ScrapeError::MissingCredentials("password"));
        }
        Ok(())
    }
}

/// A scrape job as written in a job file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub creds: Credentials,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Job {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read job file: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse job file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_the_platform_layout() -> anyhow::Result<()> {
        let config = ScraperConfig::new("https://app.memrise.com/", "out")?;
        let endpoints = config.endpoints();

        assert_eq!(endpoints.sign_in(), "https://app.memrise.com/signin");
        assert_eq!(endpoints.course_base(), "https://app.memrise.com/course/");
        assert_eq!(
            endpoints.access_token(),
            "https://app.memrise.com/v1.17/auth/access_token/"
        );
        assert_eq!(
            endpoints.level_preview("2022732", 3)?.as_str(),
            "https://app.memrise.com/v1.17/learning_sessions/preview/?course_id=2022732&level_index=3"
        );
        Ok(())
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(ScraperConfig::new("ftp://example.com", "out").is_err());
    }

    #[test]
    fn job_file_accepts_mixed_course_shapes() -> anyhow::Result<()> {
        let job: Job = serde_json::from_str(
            r#"{
                "creds": { "username": "u", "pw": "p" },
                "courses": [
                    "80119",
                    2022732,
                    "https://app.memrise.com/course/2021170/japanese-2/",
                    { "id": "2022732", "levels": "1-4" },
                    { "url": "https://app.memrise.com/course/2141906/korean-1/", "levels": [1] }
                ]
            }"#,
        )?;

        assert_eq!(job.courses.len(), 5);
        job.creds.validate()?;
        assert!(job.root.is_none());
        Ok(())
    }

    #[test]
    fn missing_password_is_reported() {
        let creds = Credentials {
            username: "u".to_owned(),
            pw: String::new(),
        };
        assert!(matches!(
            creds.validate(),
            Err(ScrapeError::MissingCredentials("password"))
        ));
    }
}
