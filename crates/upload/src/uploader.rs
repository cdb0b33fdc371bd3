//! The three-step upload workflow: authenticate, create, populate.

use deck_core::{PresentationRecord, Result};
use serde::Serialize;

use crate::api::{BatchUpdate, CreatePresentation, SlidesApi};
use crate::auth::TokenProvider;
use crate::batch::build_requests;

/// Viewer URL of a presentation.
pub fn presentation_url(presentation_id: &str) -> String {
    format!("https://docs.google.com/presentation/d/{}/edit", presentation_id)
}

/// A finished conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub presentation_id: String,
    pub presentation_url: String,
}

impl Conversion {
    fn new(presentation_id: String) -> Self {
        Self {
            presentation_url: presentation_url(&presentation_id),
            presentation_id,
        }
    }
}

/// Uploads records as new presentations.
///
/// Each step depends on the previous one's output, so they run strictly in
/// sequence and the first failure ends the attempt. Nothing is retried.
pub struct Uploader {
    tokens: Box<dyn TokenProvider>,
    api: Box<dyn SlidesApi>,
}

impl Uploader {
    pub fn new(tokens: Box<dyn TokenProvider>, api: Box<dyn SlidesApi>) -> Self {
        Self { tokens, api }
    }

    /// Convert one record into a remote presentation.
    ///
    /// If populating fails after the presentation was created, the
    /// incomplete presentation is left in place.
    pub async fn convert(&self, record: &PresentationRecord) -> Result<Conversion> {
        record.validate()?;

        log::info!("Starting conversion for: {}", record.title);
        log::debug!("Slides to convert: {}", record.slide_count);

        let token = self.tokens.access_token().await?;
        log::debug!("Authentication successful");

        let created = self
            .api
            .create_presentation(&token, &CreatePresentation::for_record(record))
            .await?;
        let presentation_id = created.presentation_id;
        log::info!("Created presentation: {}", presentation_id);

        let requests = build_requests(&record.slides);
        if !requests.is_empty() {
            let batch = BatchUpdate { requests };
            if let Err(e) = self.api.batch_update(&token, &presentation_id, &batch).await {
                log::warn!(
                    "Presentation {} was created but not populated; it is left incomplete",
                    presentation_id
                );
                return Err(e);
            }
        }
        log::info!("All slides added successfully");

        let conversion = Conversion::new(presentation_id);
        log::info!("Presentation URL: {}", conversion.presentation_url);

        Ok(conversion)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::batch::Request;
    use crate::api::CreatedPresentation;
    use async_trait::async_trait;
    use deck_core::{Error, ExtractionMethod, SlideRecord};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Create(CreatePresentation),
        Batch(String, Vec<Request>),
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeApi {
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub fail_create: bool,
        pub fail_batch: bool,
    }

    #[async_trait]
    impl SlidesApi for FakeApi {
        async fn create_presentation(
            &self,
            _token: &str,
            body: &CreatePresentation,
        ) -> Result<CreatedPresentation> {
            self.calls.lock().unwrap().push(Call::Create(body.clone()));
            if self.fail_create {
                return Err(Error::CreateFailed {
                    status: 403,
                    body: "{\"error\":\"forbidden\"}".to_string(),
                });
            }
            Ok(CreatedPresentation {
                presentation_id: "pres-1".to_string(),
            })
        }

        async fn batch_update(
            &self,
            _token: &str,
            presentation_id: &str,
            body: &BatchUpdate,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Batch(presentation_id.to_string(), body.requests.clone()));
            if self.fail_batch {
                return Err(Error::PopulateFailed {
                    presentation_id: presentation_id.to_string(),
                    status: 400,
                    body: "bad image".to_string(),
                });
            }
            Ok(())
        }
    }

    pub(crate) struct DeniedToken;

    #[async_trait]
    impl TokenProvider for DeniedToken {
        async fn access_token(&self) -> Result<String> {
            Err(Error::AuthError("The user did not approve access.".to_string()))
        }
    }

    pub(crate) struct GoodToken;

    #[async_trait]
    impl TokenProvider for GoodToken {
        async fn access_token(&self) -> Result<String> {
            Ok("token".to_string())
        }
    }

    pub(crate) fn record() -> PresentationRecord {
        PresentationRecord::new(
            "https://speakerdeck.com/u/talk",
            "Talk",
            "Jane",
            "About it",
            vec![
                SlideRecord::new(2, "https://example.com/slide_1.jpg"),
                SlideRecord::new(3, "https://example.com/slide_2.jpg").with_text("Second"),
                SlideRecord::new(4, "https://example.com/slide_3.jpg"),
            ],
            ExtractionMethod::Transcript,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_conversion() {
        let api = FakeApi::default();
        let uploader = Uploader::new(Box::new(GoodToken), Box::new(api.clone()));

        let conversion = uploader.convert(&record()).await.unwrap();
        assert_eq!(conversion.presentation_id, "pres-1");
        assert_eq!(
            conversion.presentation_url,
            "https://docs.google.com/presentation/d/pres-1/edit"
        );

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::Create(CreatePresentation {
                title: "Talk".to_string(),
                notes: Some("About it".to_string()),
            })
        );
        match &calls[1] {
            Call::Batch(id, requests) => {
                assert_eq!(id, "pres-1");
                // 3 images, 2 created pages, 1 note
                assert_eq!(requests.len(), 6);
                let notes = requests
                    .iter()
                    .filter(|r| matches!(r, Request::InsertText(_)))
                    .count();
                assert_eq!(notes, 1);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auth_failure_short_circuits() {
        let api = FakeApi::default();
        let uploader = Uploader::new(Box::new(DeniedToken), Box::new(api.clone()));

        let err = uploader.convert(&record()).await.unwrap_err();
        assert_eq!(err.to_string(), "The user did not approve access.");
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_skips_batch() {
        let api = FakeApi {
            fail_create: true,
            ..FakeApi::default()
        };
        let uploader = Uploader::new(Box::new(GoodToken), Box::new(api.clone()));

        let err = uploader.convert(&record()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create presentation: {\"error\":\"forbidden\"}"
        );
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], Call::Create(_)));
    }

    #[tokio::test]
    async fn test_batch_failure_reports_body() {
        let api = FakeApi {
            fail_batch: true,
            ..FakeApi::default()
        };
        let uploader = Uploader::new(Box::new(GoodToken), Box::new(api.clone()));

        let err = uploader.convert(&record()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to add slides: bad image");
        assert!(matches!(
            err,
            Error::PopulateFailed { ref presentation_id, .. } if presentation_id == "pres-1"
        ));
    }

    #[tokio::test]
    async fn test_invalid_record_is_rejected_before_auth() {
        let api = FakeApi::default();
        let uploader = Uploader::new(Box::new(GoodToken), Box::new(api.clone()));

        let mut bad = record();
        bad.slides[1].slide_number = 2;

        assert!(matches!(
            uploader.convert(&bad).await,
            Err(Error::InvalidRecord(_))
        ));
        assert!(api.calls.lock().unwrap().is_empty());
    }
}
