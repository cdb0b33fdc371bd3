//! Slide discovery and metadata extraction from presentation pages.
//!
//! The page is treated as an external tree that may still be changing:
//! every read goes through a [`Page`] snapshot, and slide discovery is an
//! ordered list of [`SlideStrategy`] implementations tried until one
//! produces slides.

pub mod analysis;
pub mod dom;
pub mod extractor;
pub mod frame;
pub mod images;
pub mod meta_fallback;
pub mod metadata;
pub mod page;
pub mod strategy;
pub mod target;
pub mod transcript;

pub use analysis::{analyze_page, PageAnalysis};
pub use extractor::{Extractor, ExtractorOptions};
pub use images::{is_valid_slide_image, ImageCandidate, ImageScanStrategy};
pub use meta_fallback::MetaFallbackStrategy;
pub use metadata::PageMetadata;
pub use page::{Page, PageFeed, DEFAULT_ELEMENT_TIMEOUT, DEFAULT_TRANSCRIPT_TIMEOUT};
pub use strategy::SlideStrategy;
pub use target::{is_presentation_page, TARGET_HOST};
pub use transcript::TranscriptStrategy;
