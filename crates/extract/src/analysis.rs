//! A diagnostic summary of what a page offers to the extractor.

use std::fmt;

use deck_core::ExtractionMethod;
use scraper::Html;

use crate::dom::{meta_property, parse_selector};
use crate::frame::player_url;
use crate::page::Page;
use crate::transcript::{SLIDE_LINK_SELECTOR, TRANSCRIPT_SELECTOR};

/// Number of transcript URLs kept as samples.
const SAMPLE_LIMIT: usize = 3;

/// What the page offers for each discovery path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageAnalysis {
    pub player_url: Option<String>,
    pub has_transcript: bool,
    pub transcript_links: usize,
    pub sample_urls: Vec<String>,
    pub og_image: Option<String>,
    pub og_title: Option<String>,
    pub og_author: Option<String>,
}

impl PageAnalysis {
    /// Read the analysis from a parsed document.
    pub fn from_document(doc: &Html) -> Self {
        let mut analysis = Self {
            player_url: player_url(doc),
            og_image: meta_property(doc, "og:image"),
            og_title: meta_property(doc, "og:title"),
            og_author: meta_property(doc, "og:author"),
            ..Self::default()
        };

        let (Ok(container), Ok(links)) = (
            parse_selector(TRANSCRIPT_SELECTOR),
            parse_selector(SLIDE_LINK_SELECTOR),
        ) else {
            return analysis;
        };

        if let Some(transcript) = doc.select(&container).next() {
            analysis.has_transcript = true;
            let hrefs: Vec<&str> = transcript
                .select(&links)
                .filter_map(|a| a.value().attr("href"))
                .collect();
            analysis.transcript_links = hrefs.len();
            analysis.sample_urls = hrefs
                .into_iter()
                .take(SAMPLE_LIMIT)
                .map(str::to_string)
                .collect();
        }

        analysis
    }

    /// The discovery path most likely to succeed, if any.
    pub fn recommended_method(&self) -> Option<ExtractionMethod> {
        if self.transcript_links > 0 {
            Some(ExtractionMethod::Transcript)
        } else if self.og_image.is_some() {
            Some(ExtractionMethod::MetaFallback)
        } else {
            None
        }
    }
}

/// Analyze the current snapshot of a page.
pub fn analyze_page(page: &Page) -> PageAnalysis {
    PageAnalysis::from_document(&page.document())
}

impl fmt::Display for PageAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Page Analysis ===")?;
        match &self.player_url {
            Some(url) => {
                writeln!(f, "iframe detected: {}", url)?;
                writeln!(f, "  -> cross-origin restriction applies, using alternative extraction")?;
            }
            None => writeln!(f, "No player iframe")?,
        }

        if self.has_transcript {
            writeln!(f, "Transcript section found")?;
            writeln!(f, "  - slide links in transcript: {}", self.transcript_links)?;
            for (i, url) in self.sample_urls.iter().enumerate() {
                writeln!(f, "    {}. {}", i + 1, url)?;
            }
        } else {
            writeln!(f, "Transcript section NOT found")?;
        }

        if let Some(image) = &self.og_image {
            writeln!(f, "Open Graph image: {}", image)?;
        }

        writeln!(f)?;
        writeln!(f, "=== Metadata ===")?;
        writeln!(f, "Title: {}", self.og_title.as_deref().unwrap_or("Not found"))?;
        writeln!(f, "Author: {}", self.og_author.as_deref().unwrap_or("Not found"))?;

        writeln!(f)?;
        writeln!(f, "=== Extraction Strategy ===")?;
        match self.recommended_method() {
            Some(ExtractionMethod::Transcript) => writeln!(f, "RECOMMENDED: transcript extraction"),
            Some(_) => writeln!(f, "FALLBACK: meta tag estimation"),
            None => writeln!(f, "No viable extraction method available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_page() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content="Talk"></head><body>
               <div id="transcript">
                 <a href="/p/slide_0.jpg"></a><a href="/p/slide_1.jpg"></a>
                 <a href="/p/slide_2.jpg"></a><a href="/p/slide_3.jpg"></a>
               </div></body></html>"#,
        );
        let analysis = PageAnalysis::from_document(&doc);

        assert!(analysis.has_transcript);
        assert_eq!(analysis.transcript_links, 4);
        assert_eq!(analysis.sample_urls.len(), 3);
        assert_eq!(analysis.og_title.as_deref(), Some("Talk"));
        assert_eq!(analysis.recommended_method(), Some(ExtractionMethod::Transcript));
        assert!(analysis.to_string().contains("RECOMMENDED"));
    }

    #[test]
    fn test_meta_only_page() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:image" content="https://x/slide_0.jpg"></head>
               <body><iframe class="speakerdeck-iframe" src="//speakerdeck.com/player/a"></iframe>
               </body></html>"#,
        );
        let analysis = PageAnalysis::from_document(&doc);

        assert!(!analysis.has_transcript);
        assert_eq!(analysis.player_url.as_deref(), Some("https://speakerdeck.com/player/a"));
        assert_eq!(analysis.recommended_method(), Some(ExtractionMethod::MetaFallback));
    }

    #[test]
    fn test_empty_page() {
        let analysis = PageAnalysis::from_document(&Html::parse_document("<html></html>"));
        assert_eq!(analysis.recommended_method(), None);
        assert!(analysis.to_string().contains("No viable extraction method"));
    }
}
