//! # Wire Data Model
//!
//! Serde types for the captioning backend's REST API. Resolutions are
//! `[height, width]` pairs throughout, matching the backend's storage order.

use serde::{Deserialize, Serialize};

/// `[height, width]` in pixels.
pub type Resolution = [u32; 2];

/// One image inside a dataset, as reported by
/// `GET /api/datasets/{name}/images`.
///
/// Records are created when a dataset loads and mutated in place when
/// caption/crop/resize/extend responses carry updated resolutions; the client
/// never deletes them. `train_resolution` is the grid-aligned target the
/// backend stores and may lag `image_resolution` until the next mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub annotated: bool,
    pub train_resolution: Resolution,
    pub image_resolution: Resolution,
}

impl ImageRecord {
    /// Recompute the derived annotated flag from the current caption.
    pub fn refresh_annotated(&mut self) {
        self.annotated = !self.caption.trim().is_empty();
    }
}

/// `GET /api/datasets` response.
#[derive(Debug, Deserialize)]
pub struct DatasetListResponse {
    #[serde(default)]
    pub datasets: Vec<String>,
}

/// `GET /api/datasets/{name}/images` response.
#[derive(Debug, Deserialize)]
pub struct DatasetImagesResponse {
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

/// `GET /api/vocabulary` and `GET /api/datasets/{name}/vocabulary` response.
#[derive(Debug, Default, Deserialize)]
pub struct VocabularyResponse {
    #[serde(default)]
    pub words: Vec<String>,
}

/// Crop rectangle as sent in an update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPayload {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<crop_geom::Rect> for CropPayload {
    fn from(rect: crop_geom::Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Body of `POST /api/datasets/{name}/images/{path}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest {
    pub caption: String,
    pub apply_crop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_data: Option<CropPayload>,
}

impl UpdateRequest {
    /// Caption-only update; the image file is left untouched.
    pub fn caption_only(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            apply_crop: false,
            crop_data: None,
        }
    }

    /// Caption update plus a crop of the stored image.
    pub fn with_crop(caption: impl Into<String>, crop: CropPayload) -> Self {
        Self {
            caption: caption.into(),
            apply_crop: true,
            crop_data: Some(crop),
        }
    }
}

/// Body of `POST /api/datasets/{name}/images/{path}/resize`.
#[derive(Debug, Clone, Serialize)]
pub struct ResizeRequest {
    pub max_side: u32,
}

/// Body of `POST /api/datasets/{name}/images/{path}/extend`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtendRequest {
    pub anchor: String,
}

/// Status literal the extend endpoint returns when the image file changed.
/// Anything else (the backend sends `"unchanged"`) means the image already
/// conformed and only displayed dimensions need refreshing.
pub const EXTENDED_STATUS: &str = "extended";

/// Common shape of every mutation response. All fields are optional: a 204
/// or an empty body decodes to the default outcome.
#[derive(Debug, Default, Deserialize)]
pub struct MutationOutcome {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub train_resolution: Option<Resolution>,
    #[serde(default)]
    pub image_resolution: Option<Resolution>,
}

impl MutationOutcome {
    /// Whether an extend response reports that the image file was rewritten.
    pub fn is_extended(&self) -> bool {
        self.status.as_deref() == Some(EXTENDED_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_record_decodes_wire_shape() {
        let record: ImageRecord = serde_json::from_value(serde_json::json!({
            "name": "cats/01.png",
            "path": "cats/01.png",
            "caption": "cat, window",
            "annotated": true,
            "train_resolution": [512, 640],
            "image_resolution": [480, 640]
        }))
        .unwrap();
        assert_eq!(record.train_resolution, [512, 640]);
        assert!(record.annotated);
    }

    #[test]
    fn annotated_follows_trimmed_caption() {
        let mut record: ImageRecord = serde_json::from_value(serde_json::json!({
            "name": "a.png",
            "path": "a.png",
            "train_resolution": [64, 64],
            "image_resolution": [64, 64]
        }))
        .unwrap();
        record.caption = "   ".into();
        record.refresh_annotated();
        assert!(!record.annotated);
        record.caption = "dog".into();
        record.refresh_annotated();
        assert!(record.annotated);
    }

    #[test]
    fn update_request_omits_absent_crop() {
        let body = serde_json::to_value(UpdateRequest::caption_only("cat")).unwrap();
        assert_eq!(body.get("apply_crop"), Some(&serde_json::json!(false)));
        assert!(body.get("crop_data").is_none());
    }

    #[test]
    fn extended_status_check_is_exact() {
        let extended: MutationOutcome =
            serde_json::from_value(serde_json::json!({ "status": "extended" })).unwrap();
        assert!(extended.is_extended());
        let unchanged: MutationOutcome =
            serde_json::from_value(serde_json::json!({ "status": "unchanged" })).unwrap();
        assert!(!unchanged.is_extended());
        assert!(!MutationOutcome::default().is_extended());
    }
}
