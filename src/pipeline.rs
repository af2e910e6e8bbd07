use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;

use crate::auth;
use crate::cli::ScrapeArgs;
use crate::config::{Job, RateLimit, ScraperConfig};
use crate::course::{self, CourseRef, CourseSpec, LevelSelector};
use crate::http::RateLimitedClient;
use crate::levels;
use crate::scrape::LevelScraper;
use crate::transliterate::Transliterator;

const PASSWORD_ENV: &str = "MEMRISE_PASSWORD";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub courses: usize,
    pub courses_failed: usize,
    pub levels_written: usize,
    pub levels_skipped: usize,
    pub levels_failed: usize,
}

pub async fn run(args: ScrapeArgs) -> anyhow::Result<RunSummary> {
    let (job, config) = job_from_args(args)?;
    execute(job, config).await
}

fn job_from_args(args: ScrapeArgs) -> anyhow::Result<(Job, ScraperConfig)> {
    let mut job = match args.job.as_deref() {
        Some(path) => Job::load(path)?,
        None => Job::default(),
    };

    let selector = args.levels.as_deref().map(LevelSelector::parse);
    for reference in &args.course {
        let course_ref = match (CourseRef::from_text(reference), &selector) {
            (course_ref, None) => course_ref,
            (CourseRef::Spec(spec), Some(selector)) => CourseRef::Spec(CourseSpec {
                levels: Some(selector.clone()),
                ..spec
            }),
            (_, Some(selector)) => CourseRef::Spec(CourseSpec {
                url: Some(reference.trim().to_owned()),
                id: None,
                levels: Some(selector.clone()),
            }),
        };
        job.courses.push(course_ref);
    }

    if let Some(username) = args.username {
        job.creds.username = username;
    }
    if job.creds.pw.is_empty()
        && let Ok(pw) = std::env::var(PASSWORD_ENV)
    {
        job.creds.pw = pw;
    }

    let output_root = args
        .out
        .map(PathBuf::from)
        .or_else(|| job.root.clone())
        .unwrap_or_else(|| PathBuf::from(crate::config::DEFAULT_OUTPUT_ROOT));

    let mut config = ScraperConfig::new(&args.base_url, output_root)?;
    config.rate_limit = RateLimit {
        max_requests: args.max_requests,
        window: Duration::from_millis(args.window_ms),
    };
    config.download_audio = args.download_audio;
    config.japanese_lexicon = args.japanese_lexicon.map(PathBuf::from);

    Ok((job, config))
}

/// Runs a whole job. Only bad references, missing credentials and failed
/// login end the run early; course and level failures are counted instead.
pub async fn execute(job: Job, config: ScraperConfig) -> anyhow::Result<RunSummary> {
    tracing::info!(courses = job.courses.len(), out = %config.output_root.display(), "start");

    let endpoints = config.endpoints();
    let courses = course::normalize_all(job.courses, &endpoints)?;
    job.creds.validate()?;

    let transliterator = Transliterator::with_lexicon(config.japanese_lexicon.as_deref())?;

    std::fs::create_dir_all(&config.output_root).with_context(|| {
        format!("create output root: {}", config.output_root.display())
    })?;

    let client = RateLimitedClient::new(config.rate_limit)?;
    let auth = auth::login(&client, &endpoints, &job.creds).await?;
    let scraper = LevelScraper::new(client.clone(), auth.clone(), transliterator, &config);

    let mut summary = RunSummary::default();
    for mut course in courses {
        summary.courses += 1;
        if let Err(err) = levels::resolve(&client, &auth, &mut course).await {
            summary.courses_failed += 1;
            tracing::warn!(course_id = %course.id, "course failed");
            tracing::debug!(error = ?err, "course failure detail");
            continue;
        }

        let tally = scraper.scrape_course(&course).await;
        summary.levels_written += tally.written;
        summary.levels_skipped += tally.skipped;
        summary.levels_failed += tally.failed;
    }

    tracing::info!(
        courses = summary.courses,
        courses_failed = summary.courses_failed,
        levels_written = summary.levels_written,
        levels_skipped = summary.levels_skipped,
        levels_failed = summary.levels_failed,
        "finished"
    );
    Ok(summary)
}
