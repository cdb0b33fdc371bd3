//! Domain types for representing a scraped presentation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Title used when no page title can be found.
pub const DEFAULT_TITLE: &str = "Untitled Presentation";

/// Maximum number of characters kept as speaker notes per slide.
pub const MAX_SLIDE_TEXT_CHARS: usize = 500;

/// A presentation scraped from a single page load.
///
/// Built fresh for every conversion and handed once to the uploader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    /// URL of the page the record was extracted from.
    pub source_url: String,

    pub title: String,

    pub author: String,

    pub description: String,

    /// Always equal to `slides.len()`.
    pub slide_count: usize,

    /// When the record was built.
    pub timestamp: DateTime<Utc>,

    /// Slides in presentation order. Never empty.
    pub slides: Vec<SlideRecord>,

    /// Which discovery strategy produced the slides.
    pub extraction_method: ExtractionMethod,

    pub limitations: Limitations,

    /// Cross-origin player frame, when the page embeds one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_url: Option<String>,
}

impl PresentationRecord {
    /// Build a record, refusing an empty or inconsistent slide list.
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        slides: Vec<SlideRecord>,
        extraction_method: ExtractionMethod,
    ) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::NoSlides);
        }

        let record = Self {
            source_url: source_url.into(),
            title: title.into(),
            author: author.into(),
            description: description.into(),
            slide_count: slides.len(),
            timestamp: Utc::now(),
            slides,
            extraction_method,
            limitations: Limitations::default(),
            player_url: None,
        };
        record.validate()?;

        Ok(record)
    }

    /// Attach the URL of an embedded cross-origin player.
    pub fn with_player_url(mut self, player_url: Option<String>) -> Self {
        self.player_url = player_url;
        self
    }

    /// Check the record invariants.
    ///
    /// Records arriving over the message boundary are deserialized, so the
    /// uploader re-checks them before issuing any remote call.
    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(Error::NoSlides);
        }

        if self.slide_count != self.slides.len() {
            return Err(Error::InvalidRecord(format!(
                "slideCount is {} but {} slides are present",
                self.slide_count,
                self.slides.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.slides.len());
        for slide in &self.slides {
            if slide.slide_number == 0 {
                return Err(Error::InvalidRecord(
                    "slide numbers must be positive".to_string(),
                ));
            }
            if !seen.insert(slide.slide_number) {
                return Err(Error::InvalidRecord(format!(
                    "slide number {} appears more than once",
                    slide.slide_number
                )));
            }
        }

        Ok(())
    }

    /// Image URLs of all slides, in order.
    pub fn image_urls(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.image_url.as_str()).collect()
    }
}

/// A single slide image plus its transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRecord {
    /// 1-based slide number. Unique within a record, not necessarily contiguous.
    pub slide_number: u32,

    /// Absolute URL of the slide image.
    pub image_url: String,

    pub title: String,

    /// Transcript text, used as speaker notes.
    pub text: String,

    /// Hyperlinks on the slide. Always empty: the player frame is cross-origin.
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl SlideRecord {
    /// Create a slide with the default `"Slide N"` title and no text.
    pub fn new(slide_number: u32, image_url: impl Into<String>) -> Self {
        Self {
            slide_number,
            image_url: image_url.into(),
            title: format!("Slide {}", slide_number),
            text: String::new(),
            links: Vec::new(),
        }
    }

    /// Set the slide title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the transcript text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Whether the slide carries text worth writing into speaker notes.
    pub fn has_notes(&self) -> bool {
        let text = self.text.trim();
        !text.is_empty() && text != "None"
    }
}

/// A hyperlink positioned on a slide, in pixels relative to the slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How a record's slides were obtained.
///
/// Slides carrying transcript text are `Transcript`; image-only slides are
/// `MetaFallback`, whichever strategy found them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Slide anchors listed in the page transcript.
    Transcript,
    /// URLs synthesized from the page's representative image.
    MetaFallback,
}

impl ExtractionMethod {
    /// The wire name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcript => "transcript",
            Self::MetaFallback => "meta-fallback",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed advisory notes about what a record cannot contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limitations {
    pub hyperlinks: String,
    pub coordinates: String,
}

impl Default for Limitations {
    fn default() -> Self {
        Self {
            hyperlinks: "Not available due to iframe cross-origin restrictions".to_string(),
            coordinates: "Not available".to_string(),
        }
    }
}
