//! Detection of the cross-origin player frame.
//!
//! Presentation pages often render the slide player in an embedded frame
//! served from another origin. Its contents cannot be read, so only the
//! embedding page's transcript and metadata are available, and per-slide
//! hyperlinks and coordinates are out of reach.

use scraper::Html;

use crate::dom::parse_selector;

/// Selectors identifying the embedded player, most specific first.
pub const PLAYER_FRAME_SELECTORS: &[&str] = &[
    "iframe.speakerdeck-iframe",
    r#"iframe[src*="speakerdeck"]"#,
];

/// Whether the page embeds the player frame.
pub fn has_player_frame(doc: &Html) -> bool {
    PLAYER_FRAME_SELECTORS.iter().any(|css| {
        parse_selector(css)
            .map(|selector| doc.select(&selector).next().is_some())
            .unwrap_or(false)
    })
}

/// Absolute URL of the embedded player, if the page has one with a source.
///
/// Protocol-relative sources (`//host/...`) are given an `https:` scheme.
pub fn player_url(doc: &Html) -> Option<String> {
    PLAYER_FRAME_SELECTORS.iter().find_map(|css| {
        let selector = parse_selector(css).ok()?;
        let src = doc
            .select(&selector)
            .find_map(|frame| frame.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())?;

        if src.starts_with("//") {
            Some(format!("https:{}", src))
        } else {
            Some(src.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_relative_source() {
        let doc = Html::parse_document(
            r#"<iframe class="speakerdeck-iframe" src="//speakerdeck.com/player/abc"></iframe>"#,
        );
        assert!(has_player_frame(&doc));
        assert_eq!(
            player_url(&doc).as_deref(),
            Some("https://speakerdeck.com/player/abc")
        );
    }

    #[test]
    fn test_matches_by_source() {
        let doc = Html::parse_document(
            r#"<iframe src="https://speakerdeck.com/player/xyz?slide=2"></iframe>"#,
        );
        assert!(has_player_frame(&doc));
        assert_eq!(
            player_url(&doc).as_deref(),
            Some("https://speakerdeck.com/player/xyz?slide=2")
        );
    }

    #[test]
    fn test_frame_without_source() {
        let doc = Html::parse_document(r#"<iframe class="speakerdeck-iframe"></iframe>"#);
        assert!(has_player_frame(&doc));
        assert_eq!(player_url(&doc), None);
    }

    #[test]
    fn test_unrelated_frames_are_ignored() {
        let doc = Html::parse_document(r#"<iframe src="https://youtube.com/embed/1"></iframe>"#);
        assert!(!has_player_frame(&doc));
        assert_eq!(player_url(&doc), None);
    }
}
