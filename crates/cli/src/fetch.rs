//! Loading the presentation page.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use deck_extract::{Page, PageFeed};
use reqwest::Client;
use url::Url;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; deck2slides/", env!("CARGO_PKG_VERSION"), ")");

/// HTTP client used for page fetches.
pub fn client() -> Result<Client> {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch a page's HTML.
pub async fn fetch_html(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("{} returned an error status", url))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))
}

/// Load the page from a saved file or over HTTP.
///
/// With a non-zero `poll`, fetched pages stay live: the page is re-fetched
/// at that interval and changed markup is published until the page is
/// dropped.
pub async fn load_page(url: Url, html_file: Option<&Path>, poll: Option<Duration>) -> Result<Page> {
    if let Some(path) = html_file {
        let html = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        log::debug!("Loaded {} bytes from {}", html.len(), path.display());
        return Ok(Page::from_html(url, html));
    }

    let client = client()?;
    let html = fetch_html(&client, &url).await?;
    log::debug!("Fetched {} bytes from {}", html.len(), url);

    match poll.filter(|interval| !interval.is_zero()) {
        Some(interval) => {
            let (feed, page) = Page::live(url.clone(), html);
            tokio::spawn(poll_page(client, url, feed, interval));
            Ok(page)
        }
        None => Ok(Page::from_html(url, html)),
    }
}

/// Re-fetch the page until every reader is gone.
async fn poll_page(client: Client, url: Url, feed: PageFeed, interval: Duration) {
    loop {
        tokio::select! {
            _ = feed.closed() => break,
            _ = tokio::time::sleep(interval) => {
                match fetch_html(&client, &url).await {
                    Ok(html) => {
                        if feed.publish_if_changed(html) {
                            log::debug!("Page {} changed", url);
                        }
                    }
                    Err(e) => log::warn!("Re-fetch of {} failed: {:#}", url, e),
                }
            }
        }
    }
    log::debug!("Stopped polling {}", url);
}
