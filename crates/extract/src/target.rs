//! Which pages the extractor runs on.

use url::Url;

/// The one presentation host this tool supports.
pub const TARGET_HOST: &str = "speakerdeck.com";

/// Whether `url` looks like a presentation page on the target host.
///
/// Presentation pages live at `/<user>/<presentation>`.
pub fn is_presentation_page(url: &Url) -> bool {
    let on_host = url
        .host_str()
        .map(|host| host == TARGET_HOST || host.ends_with(&format!(".{}", TARGET_HOST)))
        .unwrap_or(false);
    if !on_host {
        return false;
    }

    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count() >= 2)
        .unwrap_or(false)
}
