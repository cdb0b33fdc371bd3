//! Batch edit requests for populating a presentation.
//!
//! The Slides API applies a batch in array order, and an object id can
//! only be referenced after the request that creates it. Requests are
//! therefore emitted per slide, in slide order: create the page (except
//! for the first, which already exists), place the image, then write the
//! speaker notes.

use deck_core::SlideRecord;
use serde::Serialize;

/// Width of a full 16:9 page in EMU.
pub const SLIDE_WIDTH_EMU: f64 = 9_144_000.0;

/// Height of a full 16:9 page in EMU.
pub const SLIDE_HEIGHT_EMU: f64 = 5_143_500.0;

/// Object id of the page every new presentation starts with.
pub const FIRST_PAGE_ID: &str = "p";

const EMU: &str = "EMU";

/// One edit operation in a `batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateSlide(CreateSlideRequest),
    CreateImage(CreateImageRequest),
    InsertText(InsertTextRequest),
}

impl Request {
    /// Object id this request creates, if any.
    pub fn created_object_id(&self) -> Option<&str> {
        match self {
            Self::CreateSlide(r) => Some(&r.object_id),
            _ => None,
        }
    }

    /// Object id this request targets, if any.
    pub fn referenced_object_id(&self) -> Option<&str> {
        match self {
            Self::CreateSlide(_) => None,
            Self::CreateImage(r) => Some(&r.element_properties.page_object_id),
            Self::InsertText(r) => Some(&r.object_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    pub object_id: String,
    pub insertion_index: usize,
    pub slide_layout_reference: LayoutReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub url: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub page_object_id: String,
    pub size: Size,
    pub transform: AffineTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: String,
}

impl Dimension {
    fn emu(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: EMU.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub unit: String,
}

impl AffineTransform {
    /// No scaling, rotation, or offset.
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            unit: EMU.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub object_id: String,
    pub text: String,
    pub insertion_index: usize,
}

/// Page object id for the slide at `index`.
///
/// Ids come from the slide number, not the position, so slide numbers must
/// be unique within a record.
pub fn page_object_id(index: usize, slide: &SlideRecord) -> String {
    if index == 0 {
        FIRST_PAGE_ID.to_string()
    } else {
        format!("slide_{}", slide.slide_number)
    }
}

/// Build the full request list for `slides`, in slide order.
pub fn build_requests(slides: &[SlideRecord]) -> Vec<Request> {
    let mut requests = Vec::with_capacity(slides.len() * 3);

    for (index, slide) in slides.iter().enumerate() {
        let page_id = page_object_id(index, slide);

        if index > 0 {
            requests.push(Request::CreateSlide(CreateSlideRequest {
                object_id: page_id.clone(),
                insertion_index: index,
                slide_layout_reference: LayoutReference {
                    predefined_layout: "BLANK".to_string(),
                },
            }));
        }

        requests.push(Request::CreateImage(CreateImageRequest {
            url: slide.image_url.clone(),
            element_properties: ElementProperties {
                page_object_id: page_id.clone(),
                size: Size {
                    width: Dimension::emu(SLIDE_WIDTH_EMU),
                    height: Dimension::emu(SLIDE_HEIGHT_EMU),
                },
                transform: AffineTransform::identity(),
            },
        }));

        if slide.has_notes() {
            requests.push(Request::InsertText(InsertTextRequest {
                object_id: format!("{}.notes", page_id),
                text: slide.text.clone(),
                insertion_index: 0,
            }));
        }
    }

    requests
}
