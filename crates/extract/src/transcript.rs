//! Transcript-based slide discovery.
//!
//! Presentation pages list every slide in a `#transcript` section: one
//! list item per slide, holding an anchor to the full-size slide image and
//! the slide's text. The section is filled in after load, so discovery
//! waits for it.

use std::time::Duration;

use async_trait::async_trait;
use deck_core::{clean_text, truncate_chars, ExtractionMethod, Result, SlideRecord, MAX_SLIDE_TEXT_CHARS};
use scraper::{Html, Selector};

use crate::dom::{closest_ancestor, element_text, parent_element, parse_selector};
use crate::page::{Page, DEFAULT_TRANSCRIPT_TIMEOUT};
use crate::strategy::{dedupe_slides, slide_number_or_position, SlideStrategy};

/// Transcript container.
pub const TRANSCRIPT_SELECTOR: &str = "#transcript";

/// Slide anchors inside the transcript.
pub const SLIDE_LINK_SELECTOR: &str = r#"a[href*="slide_"]"#;

/// Placeholder image that precedes the real slides.
const PREVIEW_MARKER: &str = "preview_slide_0";

/// Reads slides from the page transcript.
#[derive(Debug, Clone)]
pub struct TranscriptStrategy {
    timeout: Duration,
}

/// An anchor as read from the transcript, before URL resolution.
#[derive(Debug, Clone)]
struct TranscriptEntry {
    href: String,
    anchor_text: String,
    container_text: String,
}

impl TranscriptStrategy {
    /// Create a strategy with the default 10 second wait.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TRANSCRIPT_TIMEOUT,
        }
    }

    /// Set how long to wait for the transcript to appear.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turn transcript entries into slides, in DOM order.
    fn build_slides(page: &Page, entries: Vec<TranscriptEntry>) -> Vec<SlideRecord> {
        let mut slides = Vec::with_capacity(entries.len());

        for (position, entry) in entries.into_iter().enumerate() {
            let Some(image_url) = page.resolve(&entry.href) else {
                log::debug!("Skipping unresolvable transcript link: {}", entry.href);
                continue;
            };

            if image_url.contains(PREVIEW_MARKER) {
                continue;
            }

            let slide_number = slide_number_or_position(&image_url, position);
            let text = truncate_chars(&clean_text(&entry.container_text), MAX_SLIDE_TEXT_CHARS);
            let title = clean_text(&entry.anchor_text);

            let mut slide = SlideRecord::new(slide_number, image_url).with_text(text);
            if !title.is_empty() {
                slide = slide.with_title(title);
            }
            slides.push(slide);
        }

        dedupe_slides(slides)
    }
}

impl Default for TranscriptStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlideStrategy for TranscriptStrategy {
    fn name(&self) -> &'static str {
        "transcript"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Transcript
    }

    async fn discover(&self, page: &Page) -> Result<Option<Vec<SlideRecord>>> {
        let container = parse_selector(TRANSCRIPT_SELECTOR)?;
        let links = parse_selector(SLIDE_LINK_SELECTOR)?;

        log::debug!("Waiting for transcript section...");
        let entries = page
            .wait_until(self.timeout, |doc| read_entries(doc, &container, &links))
            .await;

        let Some(entries) = entries else {
            log::debug!("Transcript section not found after waiting");
            return Ok(None);
        };

        let slides = Self::build_slides(page, entries);
        log::debug!("Found {} slides from transcript", slides.len());

        Ok(Some(slides))
    }
}

/// Read the transcript anchors, or `None` while the transcript is absent or empty.
fn read_entries(doc: &Html, container: &Selector, links: &Selector) -> Option<Vec<TranscriptEntry>> {
    let transcript = doc.select(container).next()?;

    let entries: Vec<TranscriptEntry> = transcript
        .select(links)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.to_string();
            let holder = closest_ancestor(anchor, "li").or_else(|| parent_element(anchor));
            Some(TranscriptEntry {
                href,
                anchor_text: element_text(anchor),
                container_text: holder.map(element_text).unwrap_or_default(),
            })
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}
