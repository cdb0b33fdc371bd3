//! The slide discovery strategy seam.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use deck_core::{ExtractionMethod, Result, SlideRecord};
use regex::Regex;

use crate::page::Page;

/// Matches the `slide_<n>.` token in slide image URLs.
static SLIDE_INDEX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)slide_(\d+)\.").unwrap());

/// One way of discovering a presentation's slides on a page.
///
/// `Ok(None)` and `Ok(Some(vec![]))` both mean "this strategy found
/// nothing"; the extractor moves on to the next one. Errors are logged by
/// the extractor and treated the same way.
#[async_trait]
pub trait SlideStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Method recorded on presentations this strategy produces.
    fn method(&self) -> ExtractionMethod;

    /// Attempt to discover slides on the page.
    async fn discover(&self, page: &Page) -> Result<Option<Vec<SlideRecord>>>;
}

/// Slide number derived from a URL: the zero-based `slide_<n>` index plus one.
pub(crate) fn slide_number_from_url(url: &str) -> Option<u32> {
    SLIDE_INDEX_REGEX
        .captures(url)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .and_then(|index| index.checked_add(1))
}

/// Slide number from the URL, or the 1-based position when the URL has none.
pub(crate) fn slide_number_or_position(url: &str, position: usize) -> u32 {
    slide_number_from_url(url).unwrap_or_else(|| u32::try_from(position + 1).unwrap_or(u32::MAX))
}

/// Drop slides whose number was already seen, keeping the first.
///
/// Slide object ids on the remote side are derived from slide numbers,
/// so a record must never carry the same number twice.
pub(crate) fn dedupe_slides(slides: Vec<SlideRecord>) -> Vec<SlideRecord> {
    let mut seen = HashSet::with_capacity(slides.len());
    slides
        .into_iter()
        .filter(|slide| {
            let fresh = seen.insert(slide.slide_number);
            if !fresh {
                log::debug!(
                    "Dropping duplicate slide {} ({})",
                    slide.slide_number,
                    slide.image_url
                );
            }
            fresh
        })
        .collect()
}
