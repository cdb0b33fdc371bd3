//! Google Slides upload workflow for extracted presentations.
//!
//! Turns one [`deck_core::PresentationRecord`] into a remote presentation:
//! authenticate, create, then populate with a single batch of edits.

pub mod api;
pub mod auth;
pub mod batch;
pub mod oauth;
pub mod uploader;
pub mod worker;

pub use api::{BatchUpdate, CreatePresentation, CreatedPresentation, HttpSlidesApi, SlidesApi};
pub use auth::{CommandToken, StaticToken, TokenProvider};
pub use batch::{build_requests, Request};
pub use oauth::{InstalledAppFlow, PRESENTATIONS_SCOPE};
pub use uploader::{presentation_url, Conversion, Uploader};
pub use worker::{handle_request, spawn_worker, WorkerHandle};
