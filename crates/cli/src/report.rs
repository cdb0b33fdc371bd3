//! User-facing messages for the convert flow.

use deck_core::{ConvertResponse, PresentationRecord};

use crate::config::OAuthClient;

/// Summary shown before anything is sent to Google.
pub fn confirmation(record: &PresentationRecord) -> String {
    format!(
        "Found: {}\nSlides: {}\nMethod: {}\n\n\
         ⚠️ Note: Hyperlinks cannot be extracted due to technical limitations.\n\
         Continue with image-only conversion? [y/N] ",
        record.title, record.slide_count, record.extraction_method
    )
}

/// Accepts `y` or `yes` in any case; everything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn extraction_failed() -> String {
    "Could not extract slides from this page.\n\n\
     Possible reasons:\n\
     - The presentation may be private\n\
     - The page structure may have changed\n\
     - Try refreshing the page"
        .to_string()
}

pub fn conversion_outcome(response: &ConvertResponse, oauth: &OAuthClient) -> String {
    if response.success {
        let mut message = String::from(
            "✅ Conversion Complete!\n\nYour presentation has been created in Google Slides.\n",
        );
        if let Some(url) = &response.presentation_url {
            message.push_str(&format!("Open: {}\n", url));
        }
        if let Some(id) = &response.presentation_id {
            message.push_str(&format!("Presentation ID: {}", id));
        }
        return message;
    }

    let error = response.error.as_deref().unwrap_or("Unknown error occurred");
    let client = match &oauth.client_id {
        Some(id) => format!(" (CLIENT_ID={})", id),
        None => " (CLIENT_ID is not set)".to_string(),
    };
    format!(
        "❌ Conversion Failed\n\n{}\n\nPlease check:\n\
         1. Google Cloud Client ID is configured{}\n\
         2. You are signed in to Google\n\
         3. Required permissions are granted",
        error, client
    )
}
