//! Small helpers over `scraper` for reading a parsed page.

use deck_core::{clean_text, Error, Result};
use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector, mapping failures into our error type.
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::SelectorError {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Content of the first `<meta property="...">` tag, trimmed.
pub fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// All descendant text of an element, concatenated.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Cleaned text of an element. `<meta>` elements contribute their `content`.
pub fn element_value(element: ElementRef<'_>) -> String {
    if element.value().name() == "meta" {
        return clean_text(element.value().attr("content").unwrap_or_default());
    }
    clean_text(&element_text(element))
}

/// The closest ancestor with the given tag name, excluding the element itself.
pub fn closest_ancestor<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

/// The parent element, if any.
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_error() {
        let err = parse_selector("a[[").unwrap_err();
        assert!(matches!(err, Error::SelectorError { .. }));
    }

    #[test]
    fn test_meta_property() {
        let doc = Html::parse_document(
            r#"<html><head>
                <meta property="og:title" content="  Deck  "/>
                <meta property="og:author" content="   "/>
            </head></html>"#,
        );
        assert_eq!(meta_property(&doc, "og:title").as_deref(), Some("Deck"));
        assert_eq!(meta_property(&doc, "og:author"), None);
        assert_eq!(meta_property(&doc, "og:image"), None);
    }

    #[test]
    fn test_element_value_reads_meta_content() {
        let doc = Html::parse_document(
            r#"<html><head><meta itemprop="author" content="Jane  Doe"></head>
               <body><span class="author">
                 John
               </span></body></html>"#,
        );
        let meta = doc.select(&parse_selector("meta").unwrap()).next().unwrap();
        let span = doc.select(&parse_selector(".author").unwrap()).next().unwrap();
        assert_eq!(element_value(meta), "Jane Doe");
        assert_eq!(element_value(span), "John");
    }

    #[test]
    fn test_closest_ancestor() {
        let doc = Html::parse_document(
            r#"<ul><li id="item"><div><a id="link" href="x">x</a></div></li></ul>"#,
        );
        let link = doc.select(&parse_selector("#link").unwrap()).next().unwrap();

        let li = closest_ancestor(link, "li").unwrap();
        assert_eq!(li.value().id(), Some("item"));
        assert_eq!(parent_element(link).unwrap().value().name(), "div");
        assert!(closest_ancestor(link, "table").is_none());
    }
}
