use thiserror::Error;

/// Failures that abort the whole run.
///
/// Everything else (a course page that will not parse, a level that fails to
/// write) is reported through `anyhow` and handled at the course or level loop.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("course reference has neither `url` nor `id`")]
    MissingReference,

    #[error("course url has no id segment: {0}")]
    InvalidCourseUrl(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),
}

impl ScrapeError {
    /// Returns the fatal error carried by `err`, if any.
    pub fn find(err: &anyhow::Error) -> Option<&ScrapeError> {
        err.chain().find_map(|cause| cause.downcast_ref::<ScrapeError>())
    }
}
