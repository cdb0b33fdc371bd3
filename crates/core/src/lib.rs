//! Core domain types, text cleaning, and the cross-boundary message
//! contract for converting hosted presentations into Google Slides.

pub mod error;
pub mod message;
pub mod normalize;
pub mod types;

pub use error::{Error, Result};
pub use message::{ConvertRequest, ConvertResponse, CONVERT_ACTION};
pub use normalize::{clean_text, truncate_chars};
pub use types::{
    ExtractionMethod, Limitations, LinkRecord, PresentationRecord, SlideRecord,
    DEFAULT_TITLE, MAX_SLIDE_TEXT_CHARS,
};
