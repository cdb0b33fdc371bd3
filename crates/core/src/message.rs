//! The single request/response pair exchanged between the page side
//! and the uploader.

use serde::{Deserialize, Serialize};

use crate::types::PresentationRecord;

/// Action name carried by conversion requests.
pub const CONVERT_ACTION: &str = "CONVERT_TO_GOOGLE_SLIDES";

/// Request sent from the extractor side to the uploader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub action: String,
    pub data: PresentationRecord,
}

impl ConvertRequest {
    /// Wrap a record in a conversion request.
    pub fn convert(record: PresentationRecord) -> Self {
        Self {
            action: CONVERT_ACTION.to_string(),
            data: record,
        }
    }

    /// Whether this request asks for a conversion.
    pub fn is_convert(&self) -> bool {
        self.action == CONVERT_ACTION
    }
}

/// Reply from the uploader.
///
/// On success `presentation_id` and `presentation_url` are set; on failure
/// only `error` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConvertResponse {
    /// A successful conversion.
    pub fn success(presentation_id: impl Into<String>, presentation_url: impl Into<String>) -> Self {
        Self {
            success: true,
            presentation_id: Some(presentation_id.into()),
            presentation_url: Some(presentation_url.into()),
            error: None,
        }
    }

    /// A failed conversion with a user-facing reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            presentation_id: None,
            presentation_url: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractionMethod, SlideRecord};

    fn record() -> PresentationRecord {
        PresentationRecord::new(
            "https://speakerdeck.com/u/talk",
            "Talk",
            "",
            "",
            vec![SlideRecord::new(1, "https://example.com/slide_0.jpg")],
            ExtractionMethod::MetaFallback,
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = ConvertRequest::convert(record());
        assert!(request.is_convert());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], "CONVERT_TO_GOOGLE_SLIDES");
        assert_eq!(json["data"]["title"], "Talk");
    }

    #[test]
    fn test_request_round_trips_through_json() {
        let request = ConvertRequest::convert(record());
        let text = serde_json::to_string(&request).unwrap();
        let parsed: ConvertRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_value(ConvertResponse::success(
            "abc",
            "https://docs.google.com/presentation/d/abc/edit",
        ))
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "presentationId": "abc",
                "presentationUrl": "https://docs.google.com/presentation/d/abc/edit"
            })
        );
    }

    #[test]
    fn test_failure_response_shape() {
        let json = serde_json::to_value(ConvertResponse::failure("denied")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "denied" }));
    }
}
