use anyhow::Context as _;

const DEFAULT_DIRECTIVES: &str = "warn,memrise_scrape=info";

/// Installs the stderr subscriber.
///
/// `RUST_LOG` wins; otherwise this crate logs at `info` and dependencies
/// (reqwest, hyper, html5ever) only surface warnings.
pub fn init() -> anyhow::Result<()> {
    let filter = match std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            tracing_subscriber::EnvFilter::try_new(directives).context("parse RUST_LOG")?
        }
        _ => tracing_subscriber::EnvFilter::try_new(DEFAULT_DIRECTIVES)
            .context("build default log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
