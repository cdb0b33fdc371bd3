//! Google Slides REST client.

use async_trait::async_trait;
use deck_core::{Error, PresentationRecord, Result, DEFAULT_TITLE};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::batch::Request;

/// Base URL of the Slides API.
pub const DEFAULT_API_BASE: &str = "https://slides.googleapis.com/v1";

const USER_AGENT: &str = concat!("deck2slides/", env!("CARGO_PKG_VERSION"));

/// Body of `POST /presentations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePresentation {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreatePresentation {
    /// Title and description of a scraped record.
    pub fn for_record(record: &PresentationRecord) -> Self {
        let title = if record.title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            record.title.clone()
        };
        let notes = Some(record.description.clone()).filter(|d| !d.trim().is_empty());

        Self { title, notes }
    }
}

/// The part of the create response we use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPresentation {
    pub presentation_id: String,
}

/// Body of `POST /presentations/{id}:batchUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

/// The two Slides API calls the upload workflow needs.
#[async_trait]
pub trait SlidesApi: Send + Sync {
    /// Create an empty presentation.
    async fn create_presentation(
        &self,
        token: &str,
        body: &CreatePresentation,
    ) -> Result<CreatedPresentation>;

    /// Apply a batch of edits to a presentation, in order.
    async fn batch_update(&self, token: &str, presentation_id: &str, body: &BatchUpdate)
        -> Result<()>;
}

/// [`SlidesApi`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpSlidesApi {
    client: Client,
    base_url: String,
}

impl HttpSlidesApi {
    /// Client for the public Slides API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client for an alternative API base, such as a local proxy.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SlidesApi for HttpSlidesApi {
    async fn create_presentation(
        &self,
        token: &str,
        body: &CreatePresentation,
    ) -> Result<CreatedPresentation> {
        let response = self
            .client
            .post(self.url("/presentations"))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::CreateFailed {
                status: status.as_u16(),
                body: body_text(response).await,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;
        parse_created(&text)
    }

    async fn batch_update(
        &self,
        token: &str,
        presentation_id: &str,
        body: &BatchUpdate,
    ) -> Result<()> {
        log::debug!(
            "Submitting {} requests to presentation {}",
            body.requests.len(),
            presentation_id
        );

        let response = self
            .client
            .post(self.url(&format!("/presentations/{}:batchUpdate", presentation_id)))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PopulateFailed {
                presentation_id: presentation_id.to_string(),
                status: status.as_u16(),
                body: body_text(response).await,
            });
        }

        Ok(())
    }
}

fn parse_created(body: &str) -> Result<CreatedPresentation> {
    Ok(serde_json::from_str(body)?)
}

/// Response body for error details; transport failures here leave it empty.
async fn body_text(response: Response) -> String {
    response.text().await.unwrap_or_default()
}
