//! The extraction pipeline: metadata, frame detection, then the
//! strategy list.

use std::time::Duration;

use deck_core::{Error, ExtractionMethod, PresentationRecord, Result, SlideRecord};

use crate::frame::player_url;
use crate::images::ImageScanStrategy;
use crate::meta_fallback::MetaFallbackStrategy;
use crate::metadata::PageMetadata;
use crate::page::{Page, DEFAULT_ELEMENT_TIMEOUT, DEFAULT_TRANSCRIPT_TIMEOUT};
use crate::strategy::SlideStrategy;
use crate::transcript::TranscriptStrategy;

/// Tunables for the default strategy list.
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// Bound on the transcript container wait.
    pub transcript_timeout: Duration,
    /// Bound on generic element waits.
    pub element_timeout: Duration,
    /// Scan image elements instead of reading the transcript.
    pub skip_transcript: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            transcript_timeout: DEFAULT_TRANSCRIPT_TIMEOUT,
            element_timeout: DEFAULT_ELEMENT_TIMEOUT,
            skip_transcript: false,
        }
    }
}

/// Builds a [`PresentationRecord`] from a page.
pub struct Extractor {
    strategies: Vec<Box<dyn SlideStrategy>>,
}

impl Extractor {
    /// Create an extractor with the default strategies: transcript, then meta fallback.
    pub fn new() -> Self {
        Self::with_options(ExtractorOptions::default())
    }

    /// Create an extractor with the default strategies, tuned by `options`.
    pub fn with_options(options: ExtractorOptions) -> Self {
        let first: Box<dyn SlideStrategy> = if options.skip_transcript {
            Box::new(ImageScanStrategy::new().with_timeout(options.element_timeout))
        } else {
            Box::new(TranscriptStrategy::new().with_timeout(options.transcript_timeout))
        };

        Self::with_strategies(vec![first, Box::new(MetaFallbackStrategy::new())])
    }

    /// Create an extractor that tries `strategies` in order.
    pub fn with_strategies(strategies: Vec<Box<dyn SlideStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the configured strategies, in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract a presentation, or `None` when no slides can be found.
    ///
    /// Never fails: internal errors are logged and reported as `None`.
    pub async fn extract(&self, page: &Page) -> Option<PresentationRecord> {
        log::debug!("=== Starting presentation data extraction ===");

        match self.try_extract(page).await {
            Ok(record) => {
                log::info!(
                    "Extracted {} slides from {} using {}",
                    record.slide_count,
                    record.source_url,
                    record.extraction_method
                );
                Some(record)
            }
            Err(e) => {
                log::error!("Failed to extract presentation data: {}", e);
                None
            }
        }
    }

    async fn try_extract(&self, page: &Page) -> Result<PresentationRecord> {
        let (metadata, player) = {
            let doc = page.document();
            (PageMetadata::from_document(&doc), player_url(&doc))
        };

        if let Some(url) = &player {
            log::warn!(
                "Presentation is rendered in a cross-origin frame ({}), using alternative methods",
                url
            );
        }

        let (method, slides) = self.discover(page).await.ok_or(Error::NoSlides)?;

        let record = PresentationRecord::new(
            page.url().as_str(),
            metadata.title,
            metadata.author,
            metadata.description,
            slides,
            method,
        )?
        .with_player_url(player);

        Ok(record)
    }

    /// Run the strategies in order; the first non-empty result wins.
    async fn discover(&self, page: &Page) -> Option<(ExtractionMethod, Vec<SlideRecord>)> {
        for strategy in &self.strategies {
            match strategy.discover(page).await {
                Ok(Some(slides)) if !slides.is_empty() => {
                    log::debug!("{} produced {} slides", strategy.name(), slides.len());
                    return Some((strategy.method(), slides));
                }
                Ok(_) => log::debug!("{} found no slides, trying next method", strategy.name()),
                Err(e) => log::warn!("{} failed: {}", strategy.name(), e),
            }
        }
        None
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
