//! Slide discovery from the page's representative image.
//!
//! The `og:image` of a presentation page points at one of its slides.
//! Slide images share a base URL and differ only in their index, so the
//! rest can be synthesized once the slide count is known (or guessed).

use std::sync::LazyLock;

use async_trait::async_trait;
use deck_core::{ExtractionMethod, Result, SlideRecord};
use regex::Regex;
use scraper::Html;

use crate::dom::{element_text, meta_property, parse_selector};
use crate::page::Page;
use crate::strategy::SlideStrategy;

/// Slide count assumed when the page gives no hint.
pub const DEFAULT_SLIDE_ESTIMATE: usize = 20;

/// Upper bound on synthesized slides.
pub const MAX_SYNTHESIZED_SLIDES: usize = 50;

/// Elements that may carry the slide count.
const SLIDE_COUNT_SELECTOR: &str = ".slide-count, [data-slide-count]";

/// Slide image file name, capturing the extension.
static SLIDE_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)slide_\d+\.(jpg|jpeg|png|webp)").unwrap());

static FIRST_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Synthesizes slide URLs from `og:image`.
#[derive(Debug, Clone, Default)]
pub struct MetaFallbackStrategy;

impl MetaFallbackStrategy {
    /// Create a new fallback strategy.
    pub fn new() -> Self {
        Self
    }

    fn synthesize(page: &Page, doc: &Html) -> Result<Option<Vec<SlideRecord>>> {
        let Some(og_image) = meta_property(doc, "og:image").and_then(|src| page.resolve(&src)) else {
            log::debug!("No og:image found for fallback");
            return Ok(None);
        };

        let Some((base_url, extension)) = split_slide_url(&og_image) else {
            log::debug!("og:image is not a slide image: {}", og_image);
            return Ok(None);
        };

        let count = estimate_slide_count(doc)?
            .unwrap_or(DEFAULT_SLIDE_ESTIMATE)
            .min(MAX_SYNTHESIZED_SLIDES);

        let slides: Vec<SlideRecord> = (0..count as u32)
            .map(|index| {
                SlideRecord::new(index + 1, format!("{}slide_{}.{}", base_url, index, extension))
            })
            .collect();

        log::debug!("Estimated {} slides from meta tags", slides.len());
        Ok(Some(slides))
    }
}

#[async_trait]
impl SlideStrategy for MetaFallbackStrategy {
    fn name(&self) -> &'static str {
        "meta-fallback"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::MetaFallback
    }

    async fn discover(&self, page: &Page) -> Result<Option<Vec<SlideRecord>>> {
        log::debug!("Using fallback: meta tags extraction");
        Self::synthesize(page, &page.document())
    }
}

/// Split a slide image URL into the part before `slide_<n>` and the extension.
fn split_slide_url(url: &str) -> Option<(&str, &str)> {
    let caps = SLIDE_FILE_REGEX.captures(url)?;
    let whole = caps.get(0)?;
    let extension = caps.get(1)?;
    Some((&url[..whole.start()], extension.as_str()))
}

/// Slide count hinted by the page, if any.
fn estimate_slide_count(doc: &Html) -> Result<Option<usize>> {
    let selector = parse_selector(SLIDE_COUNT_SELECTOR)?;
    let Some(element) = doc.select(&selector).next() else {
        return Ok(None);
    };

    let text = element_text(element);
    let hint = element
        .value()
        .attr("data-slide-count")
        .and_then(first_number)
        .or_else(|| first_number(&text));

    if let Some(count) = hint {
        log::debug!("Estimated slide count from page: {}", count);
    }
    Ok(hint)
}

/// The first digit run in `text`; runs too long for `usize` saturate.
fn first_number(text: &str) -> Option<usize> {
    FIRST_NUMBER_REGEX
        .find(text)
        .map(|m| m.as_str().parse().unwrap_or(usize::MAX))
}
