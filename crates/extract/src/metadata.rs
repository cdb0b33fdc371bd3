//! Title, author, and description resolution.
//!
//! Each field has an ordered list of sources; the first one yielding a
//! non-empty cleaned value wins.

use deck_core::{clean_text, Result, DEFAULT_TITLE};
use scraper::Html;

use crate::dom::{element_value, meta_property, parse_selector};

/// Where a metadata value may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaSource {
    /// First element matching a CSS selector.
    Selector(&'static str),
    /// Content of a `<meta property="...">` tag.
    Property(&'static str),
}

pub const TITLE_SOURCES: &[MetaSource] = &[
    MetaSource::Selector("h1.mb-4"),
    MetaSource::Selector("h1"),
    MetaSource::Property("og:title"),
    MetaSource::Selector(r#"[data-testid="presentation-title"]"#),
    MetaSource::Selector(".presentation-title"),
];

pub const AUTHOR_SOURCES: &[MetaSource] = &[
    MetaSource::Selector(r#"[itemprop="author"]"#),
    MetaSource::Selector(".author"),
    MetaSource::Property("og:author"),
];

pub const DESCRIPTION_SOURCES: &[MetaSource] = &[MetaSource::Property("og:description")];

impl MetaSource {
    /// Read this source's cleaned value, if present and non-empty.
    pub fn read(&self, doc: &Html) -> Result<Option<String>> {
        let value = match self {
            Self::Selector(css) => {
                let selector = parse_selector(css)?;
                doc.select(&selector).next().map(element_value)
            }
            Self::Property(property) => meta_property(doc, property).map(|v| clean_text(&v)),
        };
        Ok(value.filter(|v| !v.is_empty()))
    }
}

/// Presentation-level metadata read from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
}

impl PageMetadata {
    /// Resolve every field, falling back to defaults.
    ///
    /// Errors while reading a source are logged and the source skipped.
    pub fn from_document(doc: &Html) -> Self {
        Self {
            title: resolve(doc, TITLE_SOURCES).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            author: resolve(doc, AUTHOR_SOURCES).unwrap_or_default(),
            description: resolve(doc, DESCRIPTION_SOURCES).unwrap_or_default(),
        }
    }
}

/// First non-empty value among `sources`.
pub fn resolve(doc: &Html, sources: &[MetaSource]) -> Option<String> {
    sources.iter().find_map(|source| match source.read(doc) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Skipping metadata source {:?}: {}", source, e);
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_on_empty_page() {
        let doc = Html::parse_document("<html><body></body></html>");
        let meta = PageMetadata::from_document(&doc);
        assert_eq!(meta.title, "Untitled Presentation");
        assert_eq!(meta.author, "");
        assert_eq!(meta.description, "");
    }

    #[test]
    fn test_heading_wins_over_og_title() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content="OG Title"></head>
               <body><h1 class="mb-4">  Heading
                 Title </h1></body></html>"#,
        );
        assert_eq!(PageMetadata::from_document(&doc).title, "Heading Title");
    }

    #[test]
    fn test_empty_heading_falls_through() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content="OG&#9;&#9;Title"></head>
               <body><h1>   </h1></body></html>"#,
        );
        assert_eq!(PageMetadata::from_document(&doc).title, "OG Title");
    }

    #[test]
    fn test_author_sources() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:author" content="Meta Author"></head>
               <body><a class="author">Page Author</a></body></html>"#,
        );
        assert_eq!(PageMetadata::from_document(&doc).author, "Page Author");

        let doc = Html::parse_document(
            r#"<html><head><meta property="og:author" content="Meta Author"></head></html>"#,
        );
        assert_eq!(PageMetadata::from_document(&doc).author, "Meta Author");
    }

    #[test]
    fn test_itemprop_author_meta_tag() {
        let doc = Html::parse_document(
            r#"<html><body><div itemscope><meta itemprop="author" content="Schema Author"></div></body></html>"#,
        );
        assert_eq!(PageMetadata::from_document(&doc).author, "Schema Author");
    }

    #[test]
    fn test_description() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:description" content="About
               the talk"></head></html>"#,
        );
        assert_eq!(PageMetadata::from_document(&doc).description, "About the talk");
    }
}
