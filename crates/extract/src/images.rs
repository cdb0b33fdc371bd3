//! Slide discovery by scanning image elements directly.
//!
//! A secondary path for when the transcript is bypassed: look for slide
//! images in the page markup and keep the ones that pass
//! [`is_valid_slide_image`].

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use deck_core::{ExtractionMethod, Result, SlideRecord};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::dom::parse_selector;
use crate::frame::has_player_frame;
use crate::page::{Page, DEFAULT_ELEMENT_TIMEOUT};
use crate::strategy::{dedupe_slides, slide_number_or_position, SlideStrategy};

/// Minimum rendered width of a slide image.
pub const MIN_SLIDE_WIDTH: u32 = 200;

/// Minimum rendered height of a slide image.
pub const MIN_SLIDE_HEIGHT: u32 = 150;

/// Waited on before scanning.
const ANY_SLIDE_IMAGE: &str = r#"img[src*="slide"]"#;

/// Containers that may hold the slide sequence, most specific first.
const CONTAINER_SELECTORS: &[&str] = &[
    ".speakerdeck-embed",
    "#talk-embed",
    r#"[data-testid="presentation-container"]"#,
    ".presentation-container",
    r#"main [role="presentation"]"#,
    ".slides-container",
    "#slides",
];

/// Selectors matching slide `img` elements directly.
const IMAGE_SELECTORS: &[&str] = &[
    r#"img[src*="/slide_"]:not([src*="preview"])"#,
    r#"img[src*="/presentations/"][src*="/slide_"]:not([src*="preview"])"#,
    r#".slide img[src*="slide_"]"#,
    r#"[data-slide] img[src*="slide_"]"#,
];

/// Selectors matching per-slide wrapper elements.
const WRAPPER_SELECTORS: &[&str] = &["[data-slide]", ".speakerdeck-slide", ".sd-player-slide"];

static SLIDE_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)slide_\d+\.(jpg|jpeg|png|webp)").unwrap());

static BACKGROUND_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?(.*?)['"]?\s*\)"#).unwrap());

/// An image element considered as a possible slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// Absolute image URL.
    pub src: String,
    /// Rendered width, when known.
    pub width: Option<u32>,
    /// Rendered height, when known.
    pub height: Option<u32>,
}

impl ImageCandidate {
    /// A candidate whose dimensions are not known yet.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: None,
            height: None,
        }
    }

    /// Set known dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Read a candidate from an `img` element, resolving its source.
    fn from_img(page: &Page, img: ElementRef<'_>) -> Option<Self> {
        let src = page.resolve(img.value().attr("src")?)?;
        Some(Self {
            src,
            width: dimension(img, "width"),
            height: dimension(img, "height"),
        })
    }
}

fn dimension(img: ElementRef<'_>, attr: &str) -> Option<u32> {
    img.value()
        .attr(attr)
        .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
        .filter(|&v| v > 0)
}

/// Decide whether an image is a slide.
///
/// Images whose dimensions are known and below 200×150 are rejected, as are
/// preview and thumbnail variants. Remaining images are slides when the file
/// is named `slide_<n>.<ext>` or sits under a `/presentations/` path with a
/// `/slide_` file.
pub fn is_valid_slide_image(candidate: &ImageCandidate) -> bool {
    if let (Some(width), Some(height)) = (candidate.width, candidate.height) {
        if width < MIN_SLIDE_WIDTH || height < MIN_SLIDE_HEIGHT {
            return false;
        }
    }

    let src = candidate.src.to_lowercase();
    if src.contains("preview") || src.contains("thumb") {
        return false;
    }

    if SLIDE_FILE_REGEX.is_match(&src) {
        return true;
    }

    src.contains("/presentations/") && src.contains("/slide_")
}

/// Scans `img` elements for slides.
#[derive(Debug, Clone)]
pub struct ImageScanStrategy {
    timeout: Duration,
}

impl ImageScanStrategy {
    /// Create a scanner with the default 5 second wait.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_ELEMENT_TIMEOUT,
        }
    }

    /// Set how long to wait for a slide image to appear.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn scan(page: &Page, doc: &Html) -> Result<Vec<SlideRecord>> {
        let root = main_container(doc)?;

        for css in IMAGE_SELECTORS {
            let selector = parse_selector(css)?;
            let candidates: Vec<ImageCandidate> = select_in(doc, root, &selector)
                .into_iter()
                .filter_map(|img| ImageCandidate::from_img(page, img))
                .filter(is_valid_slide_image)
                .collect();

            if !candidates.is_empty() {
                log::debug!(
                    "Found {} valid slides using selector: {}",
                    candidates.len(),
                    css
                );
                return Ok(to_slides(candidates));
            }
        }

        let img = parse_selector("img")?;
        for css in WRAPPER_SELECTORS {
            let selector = parse_selector(css)?;
            let candidates: Vec<ImageCandidate> = select_in(doc, root, &selector)
                .into_iter()
                .filter_map(|wrapper| wrapper_image(page, wrapper, &img))
                .filter(is_valid_slide_image)
                .collect();

            if !candidates.is_empty() {
                log::debug!(
                    "Found {} valid slide containers using selector: {}",
                    candidates.len(),
                    css
                );
                return Ok(to_slides(candidates));
            }
        }

        log::debug!("No valid slide elements found");
        Ok(Vec::new())
    }
}

impl Default for ImageScanStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlideStrategy for ImageScanStrategy {
    fn name(&self) -> &'static str {
        "image-scan"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::MetaFallback
    }

    async fn discover(&self, page: &Page) -> Result<Option<Vec<SlideRecord>>> {
        if let Err(e) = page.wait_for_element(ANY_SLIDE_IMAGE, self.timeout).await {
            log::debug!("Image scan gave up: {}", e);
            return Ok(None);
        }

        Self::scan(page, &page.document()).map(Some)
    }
}

/// The element holding the slides, or `None` to scan the whole document.
///
/// A container only qualifies if it holds a slide image. When the player
/// lives in a cross-origin frame there is nothing to find inside it, so the
/// whole embedding document is scanned instead.
fn main_container(doc: &Html) -> Result<Option<ElementRef<'_>>> {
    let slide_image = parse_selector(ANY_SLIDE_IMAGE)?;

    for css in CONTAINER_SELECTORS {
        let selector = parse_selector(css)?;
        if let Some(container) = doc
            .select(&selector)
            .find(|c| c.select(&slide_image).next().is_some())
        {
            log::debug!("Main container found: {}", css);
            return Ok(Some(container));
        }
    }

    if has_player_frame(doc) {
        log::debug!("Player iframe detected, scanning the embedding page");
    } else {
        log::debug!("Main container not found, using document");
    }
    Ok(None)
}

fn select_in<'a>(doc: &'a Html, root: Option<ElementRef<'a>>, selector: &Selector) -> Vec<ElementRef<'a>> {
    match root {
        Some(container) => container.select(selector).collect(),
        None => doc.select(selector).collect(),
    }
}

/// The slide image of a wrapper: its first `img`, else an inline background image.
fn wrapper_image(page: &Page, wrapper: ElementRef<'_>, img: &Selector) -> Option<ImageCandidate> {
    if let Some(image) = wrapper.select(img).next() {
        return ImageCandidate::from_img(page, image);
    }

    let style = wrapper.value().attr("style")?;
    let caps = BACKGROUND_URL_REGEX.captures(style)?;
    page.resolve(&caps[1]).map(ImageCandidate::new)
}

fn to_slides(candidates: Vec<ImageCandidate>) -> Vec<SlideRecord> {
    let slides = candidates
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| {
            let number = slide_number_or_position(&candidate.src, position);
            SlideRecord::new(number, candidate.src)
        })
        .collect();
    dedupe_slides(slides)
}
