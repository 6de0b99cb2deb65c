//! Download remote PDFs to the local download directory

use bytes::Bytes;
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

use crate::error::{Error, Result};

/// Filename used when a URL has no final path segment
const FALLBACK_FILENAME: &str = "document.pdf";

/// Whether `location` is an absolute http(s) URL
pub fn is_remote(location: &str) -> bool {
    parse_remote(location).is_some()
}

fn parse_remote(location: &str) -> Option<Url> {
    Url::parse(location)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Base filename of a URL path, ignoring query string and fragment
pub fn url_basename(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|name| *name != "." && *name != "..")
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}

/// GET `url` and return the response body, failing on non-success status
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Bytes> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::fetch(url, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::fetch(url, format!("HTTP {}", status)));
    }

    response
        .bytes()
        .await
        .map_err(|e| Error::fetch(url, e.to_string()))
}

/// Materializes remote sources as local files
pub struct Fetcher {
    client: Client,
    download_dir: PathBuf,
}

impl Fetcher {
    /// Create a fetcher writing into `download_dir`
    pub fn new(client: Client, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
        }
    }

    /// Resolve every source to a local path, in input order.
    ///
    /// URLs are downloaded one at a time; local entries pass through
    /// unchanged. The first failed download aborts the batch.
    pub async fn fetch_all(&self, sources: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(sources.len());
        let mut downloaded = 0usize;

        for source in sources {
            match parse_remote(source) {
                Some(url) => {
                    paths.push(self.download(&url).await?);
                    downloaded += 1;
                }
                None => paths.push(PathBuf::from(source)),
            }
        }

        if downloaded > 0 {
            tracing::info!(
                "All {} PDFs downloaded to {}",
                downloaded,
                self.download_dir.display()
            );
        }
        Ok(paths)
    }

    /// Download one URL into the download directory
    pub async fn download(&self, url: &Url) -> Result<PathBuf> {
        let body = fetch_bytes(&self.client, url.as_str()).await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(url_basename(url));
        tokio::fs::write(&path, &body).await?;

        tracing::info!("Downloaded {} to {}", url, path.display());
        Ok(path)
    }
}
