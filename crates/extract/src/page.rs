//! Page snapshots and bounded waits.
//!
//! A [`Page`] holds the latest HTML of the presentation page. Static pages
//! are built once from fetched or saved markup; live pages receive new
//! snapshots through a [`PageFeed`], which stands in for DOM mutations.
//! Waits check the current snapshot immediately, then re-check on every
//! published change until a deadline.

use std::time::Duration;

use deck_core::{Error, Result};
use scraper::Html;
use tokio::sync::watch;
use tokio::time::Instant;
use url::Url;

use crate::dom::parse_selector;

/// Default bound for generic element waits.
pub const DEFAULT_ELEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound for the transcript container wait.
pub const DEFAULT_TRANSCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// The presentation page as seen by the extractor.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    snapshots: watch::Receiver<String>,
}

/// Publishing side of a live page.
#[derive(Debug)]
pub struct PageFeed {
    tx: watch::Sender<String>,
}

impl Page {
    /// Build a page whose markup never changes.
    pub fn from_html(url: Url, html: impl Into<String>) -> Self {
        let (_tx, snapshots) = watch::channel(html.into());
        Self { url, snapshots }
    }

    /// Build a page that receives new snapshots through the returned feed.
    pub fn live(url: Url, initial_html: impl Into<String>) -> (PageFeed, Self) {
        let (tx, snapshots) = watch::channel(initial_html.into());
        (PageFeed { tx }, Self { url, snapshots })
    }

    /// URL of the page.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// A copy of the current markup.
    pub fn html(&self) -> String {
        self.snapshots.borrow().clone()
    }

    /// Parse the current snapshot.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.snapshots.borrow())
    }

    /// Resolve a possibly relative reference against the page URL.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        self.url.join(reference.trim()).ok().map(String::from)
    }

    /// Wait until `probe` returns `Some` for a snapshot, or `timeout` elapses.
    ///
    /// Resolves `None` on timeout or when the feed is closed with no match.
    /// The subscription is local to this call and dropped on every exit.
    pub async fn wait_until<T, F>(&self, timeout: Duration, mut probe: F) -> Option<T>
    where
        F: FnMut(&Html) -> Option<T> + Send,
        T: Send,
    {
        let mut subscription = self.snapshots.clone();
        let deadline = Instant::now() + timeout;

        loop {
            let found = {
                let html = subscription.borrow_and_update();
                let document = Html::parse_document(&html);
                probe(&document)
            };
            if found.is_some() {
                return found;
            }

            match tokio::time::timeout_at(deadline, subscription.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => {
                    log::debug!("Page feed closed while waiting on {}", self.url);
                    return None;
                }
                Err(_) => {
                    log::debug!("Wait on {} timed out after {:?}", self.url, timeout);
                    return None;
                }
            }
        }
    }

    /// Wait until an element matching `selector` exists.
    pub async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        let parsed = parse_selector(selector)?;
        self.wait_until(timeout, |doc| doc.select(&parsed).next().map(|_| ()))
            .await
            .ok_or_else(|| Error::Timeout(selector.to_string()))
    }
}

impl PageFeed {
    /// Publish a new snapshot. Returns `false` once every page is dropped.
    pub fn publish(&self, html: impl Into<String>) -> bool {
        self.tx.send(html.into()).is_ok()
    }

    /// Publish only when the markup differs from the current snapshot.
    ///
    /// Returns whether a change was published.
    pub fn publish_if_changed(&self, html: String) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == html {
                false
            } else {
                *current = html;
                true
            }
        })
    }

    /// Whether every page reading this feed has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Completes once every page reading this feed has been dropped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://speakerdeck.com/someone/talk").unwrap()
    }

    #[tokio::test]
    async fn test_wait_matches_immediately() {
        let page = Page::from_html(url(), r#"<div id="ready"></div>"#);
        let result = page
            .wait_for_element("#ready", Duration::from_millis(10))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_static_page_resolves_without_waiting_full_timeout() {
        // The feed of a static page is already closed, so a miss returns at once.
        let page = Page::from_html(url(), "<p>nothing</p>");
        let started = std::time::Instant::now();
        let result = page
            .wait_until(Duration::from_secs(30), |doc| {
                doc.select(&parse_selector("#ready").unwrap()).next().map(|_| ())
            })
            .await;
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sees_later_snapshot() {
        let (feed, page) = Page::live(url(), "<p>loading</p>");

        let publisher = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            feed.publish(r#"<div id="ready">ok</div>"#);
            feed
        });

        let result = page
            .wait_for_element("#ready", Duration::from_secs(5))
            .await;
        assert!(result.is_ok());
        drop(publisher.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let (feed, page) = Page::live(url(), "<p>loading</p>");

        let result = page
            .wait_for_element("#ready", Duration::from_secs(5))
            .await;
        assert!(matches!(result, Err(Error::Timeout(ref s)) if s == "#ready"));
        assert!(!feed.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_releases_subscription() {
        let (feed, page) = Page::live(url(), "<p>loading</p>");
        let _ = page
            .wait_for_element("#ready", Duration::from_millis(100))
            .await;
        drop(page);
        assert!(feed.is_closed());
    }

    #[tokio::test]
    async fn test_invalid_selector_is_an_error() {
        let page = Page::from_html(url(), "<p></p>");
        let result = page
            .wait_for_element("a[[", Duration::from_millis(10))
            .await;
        assert!(matches!(result, Err(Error::SelectorError { .. })));
    }

    #[test]
    fn test_publish_if_changed() {
        let (feed, page) = Page::live(url(), "<p>a</p>");
        assert!(!feed.publish_if_changed("<p>a</p>".to_string()));
        assert!(feed.publish_if_changed("<p>b</p>".to_string()));
        assert_eq!(page.html(), "<p>b</p>");
    }

    #[test]
    fn test_resolve_relative_references() {
        let page = Page::from_html(url(), "");
        assert_eq!(
            page.resolve("/presentations/abc/slide_0.jpg").as_deref(),
            Some("https://speakerdeck.com/presentations/abc/slide_0.jpg")
        );
        assert_eq!(
            page.resolve("//files.speakerdeck.com/slide_1.jpg").as_deref(),
            Some("https://files.speakerdeck.com/slide_1.jpg")
        );
    }
}
