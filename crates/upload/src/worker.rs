//! The uploader as a background task.
//!
//! The page side never calls the uploader directly. It sends one
//! [`ConvertRequest`] per conversion and waits for the matching
//! [`ConvertResponse`].

use deck_core::{ConvertRequest, ConvertResponse, Error, Result};
use tokio::sync::{mpsc, oneshot};

use crate::uploader::Uploader;

const QUEUE_DEPTH: usize = 8;

type Job = (ConvertRequest, oneshot::Sender<ConvertResponse>);

/// Sending side of the uploader task.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<Job>,
}

impl WorkerHandle {
    /// Send one request and wait for its response.
    pub async fn send(&self, request: ConvertRequest) -> Result<ConvertResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| Error::WorkerClosed)?;
        reply_rx.await.map_err(|_| Error::WorkerClosed)
    }
}

/// Start the uploader task. It runs until every handle is dropped.
pub fn spawn_worker(uploader: Uploader) -> WorkerHandle {
    let (tx, mut rx) = mpsc::channel::<Job>(QUEUE_DEPTH);

    tokio::spawn(async move {
        log::debug!("Uploader worker started");
        while let Some((request, reply)) = rx.recv().await {
            log::debug!("Received message: {}", request.action);
            let response = handle_request(&uploader, request).await;
            if reply.send(response).is_err() {
                log::warn!("Requester went away before the response was delivered");
            }
        }
        log::debug!("Uploader worker stopped");
    });

    WorkerHandle { tx }
}

/// Answer a single request.
pub async fn handle_request(uploader: &Uploader, request: ConvertRequest) -> ConvertResponse {
    if !request.is_convert() {
        log::warn!("Ignoring unknown action: {}", request.action);
        return ConvertResponse::failure(format!("Unknown action: {}", request.action));
    }

    match uploader.convert(&request.data).await {
        Ok(conversion) => {
            ConvertResponse::success(conversion.presentation_id, conversion.presentation_url)
        }
        Err(e) => {
            log::error!("Conversion failed: {}", e);
            ConvertResponse::failure(e.to_string())
        }
    }
}
