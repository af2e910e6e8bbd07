use std::sync::LazyLock;

use anyhow::Context as _;
use scraper::{ElementRef, Html, Selector};

use crate::auth::AuthContext;
use crate::course::Course;
use crate::http::RateLimitedClient;

static BREADCRUMB: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".course-breadcrumb").expect("breadcrumb selector is valid"));
static LEVEL_MARKER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".level.clearfix").expect("level selector is valid"));

/// What the public course page tells us about a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePage {
    pub lang: String,
    pub max_levels: u32,
}

pub fn parse_course_page(html: &str) -> CoursePage {
    let document = Html::parse_document(html);

    let lang = document
        .select(&BREADCRUMB)
        .next()
        .and_then(|crumbs| crumbs.children().filter_map(ElementRef::wrap).last())
        .map(|last| last.text().collect::<String>().trim().to_owned())
        .unwrap_or_default();

    let max_levels = document.select(&LEVEL_MARKER).count();

    CoursePage {
        lang,
        max_levels: u32::try_from(max_levels).unwrap_or(u32::MAX),
    }
}

/// Attaches the course language and the concrete level list to `course`.
pub async fn resolve(
    client: &RateLimitedClient,
    auth: &AuthContext,
    course: &mut Course,
) -> anyhow::Result<()> {
    tracing::info!(course_id = %course.id, url = %course.url, "resolve levels");

    let response = client
        .send(auth.authorize(client.get(&course.url)))
        .await
        .with_context(|| format!("GET {}", course.url))?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("course page returned {status}: {}", course.url);
    }
    let html = response.text().await.context("read course page")?;

    let page = parse_course_page(&html);
    if page.lang.is_empty() {
        tracing::warn!(course_id = %course.id, "course page has no breadcrumb language");
    }

    course.lang = page.lang;
    course.levels = course.selector.expand(page.max_levels);

    if course.levels.is_empty() {
        tracing::warn!(
            course_id = %course.id,
            max_levels = page.max_levels,
            selector = ?course.selector,
            "level selector matched no levels"
        );
    } else {
        tracing::debug!(
            course_id = %course.id,
            lang = %course.lang,
            max_levels = page.max_levels,
            levels = ?course.levels,
            "levels resolved"
        );
    }

    Ok(())
}
