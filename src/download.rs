use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tokio::io::AsyncWriteExt as _;
use url::Url;

use crate::http::RateLimitedClient;

/// Streams the body of `url` into `path`, creating parent directories.
/// Returns the number of bytes written.
pub async fn download_file(
    client: &RateLimitedClient,
    url: &str,
    path: &Path,
) -> anyhow::Result<u64> {
    let mut response = client
        .send(client.get(url))
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("download returned {status}: {url}");
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create download dir: {}", parent.display()))?;
    }
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("create download file: {}", path.display()))?;

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("read body of {url}"))?
    {
        file.write_all(&chunk)
            .await
            .with_context(|| format!("write download file: {}", path.display()))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .with_context(|| format!("flush download file: {}", path.display()))?;

    Ok(written)
}

/// `{dir}/{last path segment of url}`, or `None` when the URL has no file name.
pub fn download_path(dir: &Path, url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    let name = parsed.path_segments()?.next_back()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(dir.join(name))
}
