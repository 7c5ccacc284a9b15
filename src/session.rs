//! # Dataset Session Controller
//!
//! High-level orchestration of dataset browsing and per-image edits over the
//! backend API. The controller owns all previously-global state: the dataset
//! list, the current selection, the vocabulary caches and the crop tool.
//!
//! ## State machine
//!
//! `NoDataset → DatasetLoading → DatasetReady → ImageLoading → ImageReady`,
//! with every state reachable again from `DatasetReady` (picking another
//! image or dataset re-enters the relevant loading state).
//!
//! ## Failure model
//!
//! Every operation failure is converted into the session's status message and
//! returned; nothing is fatal and the caller may simply retry. There is no
//! internal retry, queue or cancellation: mutations are sequential per image
//! and keeping them that way is the caller's responsibility.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;

use crate::api::CaptionApi;
use crate::error::{ClientError, ClientResult};
use crate::model::{ImageRecord, MutationOutcome, Resolution, UpdateRequest};
use crate::suggest::{token_at, SuggestionList, Vocabulary};
use crop_geom::{aligned_resolution, CropTool, ExtendAnchor, Rect};

/// Fallback resize target when the requested value cannot be parsed.
pub const DEFAULT_MAX_SIDE: u32 = 1024;

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoDataset,
    DatasetLoading,
    DatasetReady,
    ImageLoading,
    ImageReady,
}

impl SessionState {
    fn describe(self) -> &'static str {
        match self {
            Self::NoDataset => "no dataset loaded",
            Self::DatasetLoading => "the dataset is loading",
            Self::DatasetReady => "no image selected",
            Self::ImageLoading => "the image is loading",
            Self::ImageReady => "an image is open",
        }
    }
}

/// What an extend operation did to the local image view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendEffect {
    /// The backend rewrote the image; bytes were reloaded.
    ImageReloaded,
    /// The image already conformed; only dimensions were refreshed.
    AlreadyConforming,
}

/// Normalize a requested max-side value to a positive integer.
///
/// Unparseable or non-finite input falls back to [`DEFAULT_MAX_SIDE`];
/// numeric input is rounded to the nearest integer and clamped to
/// `1..=u32::MAX`.
pub fn normalize_max_side(requested: &str) -> u32 {
    match requested.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let rounded = value.round() as i64;
            rounded.clamp(1, u32::MAX as i64) as u32
        }
        _ => DEFAULT_MAX_SIDE,
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Session controller over one backend connection.
pub struct DatasetSession {
    api: CaptionApi,
    state: SessionState,
    datasets: Vec<String>,
    dataset: Option<String>,
    images: Vec<ImageRecord>,
    selected: Option<usize>,
    image_bytes: Option<Vec<u8>>,
    vocabulary: Vocabulary,
    suggestions: SuggestionList,
    crop: Option<CropTool>,
    displayed_bounds: Arc<Mutex<Option<Rect>>>,
    status: String,
}

impl DatasetSession {
    pub fn new(api: CaptionApi) -> Self {
        Self {
            api,
            state: SessionState::NoDataset,
            datasets: Vec::new(),
            dataset: None,
            images: Vec::new(),
            selected: None,
            image_bytes: None,
            vocabulary: Vocabulary::new(),
            suggestions: SuggestionList::new(),
            crop: None,
            displayed_bounds: Arc::new(Mutex::new(None)),
            status: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Last user-visible status message.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn datasets(&self) -> &[String] {
        &self.datasets
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.selected.and_then(|index| self.images.get(index))
    }

    /// Raw bytes of the currently open image, if any.
    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.image_bytes.as_deref()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    pub fn suggestions_mut(&mut self) -> &mut SuggestionList {
        &mut self.suggestions
    }

    /// Crop tool for the open image (None until an image is selected).
    pub fn crop_tool_mut(&mut self) -> Option<&mut CropTool> {
        self.crop.as_mut()
    }

    /// Bounds most recently reported by the crop tool, for dimension display.
    pub fn displayed_bounds(&self) -> Option<Rect> {
        *self.displayed_bounds.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Grid-aligned train resolution the backend would store for the current
    /// image file.
    pub fn predicted_train_resolution(&self) -> Option<Resolution> {
        self.current_image()
            .map(|record| aligned_resolution(record.image_resolution[0], record.image_resolution[1]))
    }

    /// URL of the current dataset's metadata export.
    pub fn export_url(&self) -> ClientResult<String> {
        match &self.dataset {
            Some(dataset) => Ok(self.api.export_url(dataset)),
            None => Err(ClientError::state(
                self.state.describe(),
                "export the dataset",
            )),
        }
    }

    /// Match vocabulary entries against the token under the cursor and load
    /// them into the suggestion panel.
    pub fn suggest_at(&mut self, caption: &str, cursor: usize) -> &[String] {
        let span = token_at(caption, cursor);
        let items = self.vocabulary.suggest(&span.prefix);
        self.suggestions.update(items);
        self.suggestions.items()
    }

    fn note_err(&mut self, err: ClientError) -> ClientError {
        self.status = err.to_string();
        err
    }

    fn selection(&self, attempted: &str) -> ClientResult<(String, usize)> {
        match (&self.dataset, self.selected) {
            (Some(dataset), Some(index)) => Ok((dataset.clone(), index)),
            _ => Err(ClientError::state(self.state.describe(), attempted)),
        }
    }

    /// Fetch the dataset name list. A failure leaves all prior state (and
    /// any previously fetched list) untouched.
    pub async fn list_datasets(&mut self) -> ClientResult<&[String]> {
        match self.api.list_datasets().await {
            Ok(names) => {
                self.status = format!("{} dataset(s) available", names.len());
                self.datasets = names;
                Ok(&self.datasets)
            }
            Err(err) => Err(self.note_err(err)),
        }
    }

    /// Load a dataset's image list and vocabulary, clearing the detail view.
    pub async fn load_dataset(&mut self, name: &str) -> ClientResult<()> {
        let previous = self.state;
        self.state = SessionState::DatasetLoading;
        let images = match self.api.dataset_images(name).await {
            Ok(images) => images,
            Err(err) => {
                self.state = previous;
                return Err(self.note_err(err));
            }
        };

        self.dataset = Some(name.to_string());
        self.images = images;
        self.selected = None;
        self.image_bytes = None;
        self.crop = None;
        self.suggestions.update(Vec::new());
        *self
            .displayed_bounds
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
        self.state = SessionState::DatasetReady;
        self.status = if self.images.is_empty() {
            format!("No images in dataset '{name}'")
        } else {
            format!("Loaded {} image(s) from '{name}'", self.images.len())
        };

        self.refresh_vocabulary().await;
        Ok(())
    }

    /// Refresh the global and per-dataset vocabularies. Failures are logged
    /// and leave the previous word lists in place; stale suggestions beat a
    /// broken editing flow.
    pub async fn refresh_vocabulary(&mut self) {
        match self.api.global_vocabulary().await {
            Ok(words) => self.vocabulary.set_global(words),
            Err(err) => warn!("global vocabulary refresh failed: {err}"),
        }
        let Some(dataset) = self.dataset.clone() else {
            self.vocabulary.clear_dataset();
            return;
        };
        match self.api.dataset_vocabulary(&dataset).await {
            Ok(words) => self.vocabulary.set_dataset(words),
            Err(err) => warn!("dataset vocabulary refresh failed: {err}"),
        }
    }

    /// Open an image in the detail view. Selecting the already-open image is
    /// a no-op returning `Ok(false)`; otherwise the bytes are fetched with a
    /// cache-busting timestamp and the crop tool is reset to the new image.
    pub async fn select_image(&mut self, path: &str) -> ClientResult<bool> {
        let Some(dataset) = self.dataset.clone() else {
            let err = ClientError::state(self.state.describe(), "select an image");
            return Err(self.note_err(err));
        };
        let Some(index) = self.images.iter().position(|record| record.path == path) else {
            let err = ClientError::state("the dataset is open", "select an unknown image");
            return Err(self.note_err(err));
        };
        if self.selected == Some(index) {
            return Ok(false);
        }

        let previous = self.state;
        self.state = SessionState::ImageLoading;
        let bytes = match self.api.image_bytes(&dataset, path, now_millis()).await {
            Ok(bytes) => bytes,
            Err(err) => {
                // A previously open image stays open on a failed fetch.
                self.state = previous;
                return Err(self.note_err(err));
            }
        };

        self.image_bytes = Some(bytes);
        self.selected = Some(index);
        let [height, width] = self.images[index].image_resolution;
        self.arm_crop_tool(width, height);
        self.suggestions.update(Vec::new());
        self.state = SessionState::ImageReady;
        self.status = format!("Viewing {path}");
        Ok(true)
    }

    fn arm_crop_tool(&mut self, width: u32, height: u32) {
        let mut tool = CropTool::new(width as f64, height as f64);
        let sink = Arc::clone(&self.displayed_bounds);
        tool.on_bounds_changed(move |rect| {
            *sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(*rect);
        });
        *self
            .displayed_bounds
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(tool.rect());
        self.crop = Some(tool);
    }

    fn absorb_resolutions(&mut self, index: usize, outcome: &MutationOutcome) -> bool {
        let record = &mut self.images[index];
        let mut image_changed = false;
        if let Some(resolution) = outcome.image_resolution {
            image_changed = record.image_resolution != resolution;
            record.image_resolution = resolution;
        }
        if let Some(resolution) = outcome.train_resolution {
            record.train_resolution = resolution;
        }
        image_changed
    }

    async fn reload_image(&mut self, dataset: &str, index: usize) -> ClientResult<()> {
        let path = self.images[index].path.clone();
        let bytes = match self.api.image_bytes(dataset, &path, now_millis()).await {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.note_err(err)),
        };
        self.image_bytes = Some(bytes);
        let [height, width] = self.images[index].image_resolution;
        self.arm_crop_tool(width, height);
        Ok(())
    }

    /// Save the (trimmed) caption for the open image, then refresh the
    /// vocabularies and re-run suggestion matching against the new caption.
    pub async fn save_caption(&mut self, text: &str) -> ClientResult<()> {
        let (dataset, index) = self
            .selection("save the caption")
            .map_err(|err| self.note_err(err))?;
        let path = self.images[index].path.clone();
        let caption = text.trim().to_string();
        let request = UpdateRequest::caption_only(caption.clone());

        let outcome = match self.api.update_image(&dataset, &path, &request).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.note_err(err)),
        };

        {
            let record = &mut self.images[index];
            record.caption = caption;
            record.refresh_annotated();
        }
        self.absorb_resolutions(index, &outcome);
        self.refresh_vocabulary().await;

        let caption = self.images[index].caption.clone();
        self.suggest_at(&caption, caption.len());
        self.status = format!("Caption saved for {path}");
        Ok(())
    }

    /// Send the crop tool's rectangle to the backend and reload the image
    /// bytes (a successful crop always changes the stored file).
    pub async fn apply_crop(&mut self) -> ClientResult<()> {
        let (dataset, index) = self
            .selection("apply the crop")
            .map_err(|err| self.note_err(err))?;
        let Some(tool) = self.crop.as_ref() else {
            let err = ClientError::state(self.state.describe(), "apply the crop");
            return Err(self.note_err(err));
        };
        let (image_w, image_h) = tool.image_size();
        // Snap once more right before sending; the tool normalizes on every
        // change, but the backend contract is ours to uphold.
        let rect = crop_geom::snap(tool.rect(), image_w, image_h);

        let path = self.images[index].path.clone();
        let caption = self.images[index].caption.clone();
        let request = UpdateRequest::with_crop(caption, rect.into());

        let outcome = match self.api.update_image(&dataset, &path, &request).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.note_err(err)),
        };
        self.absorb_resolutions(index, &outcome);
        self.reload_image(&dataset, index).await?;
        self.status = format!("Cropped {path}");
        Ok(())
    }

    /// Resize the open image so its longest side is at most the requested
    /// value (normalized via [`normalize_max_side`]). The image is reloaded
    /// only when the stored resolution actually changed.
    pub async fn resize(&mut self, requested: &str) -> ClientResult<u32> {
        let (dataset, index) = self
            .selection("resize the image")
            .map_err(|err| self.note_err(err))?;
        let max_side = normalize_max_side(requested);
        let path = self.images[index].path.clone();

        let outcome = match self.api.resize_image(&dataset, &path, max_side).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.note_err(err)),
        };
        let changed = self.absorb_resolutions(index, &outcome);
        if changed {
            self.reload_image(&dataset, index).await?;
        }
        self.status = format!("Resized {path} to max side {max_side}");
        Ok(max_side)
    }

    /// Extend the open image's canvas to the training grid. A reported
    /// `"extended"` status reloads the bytes; any other status means the
    /// image already conformed and only dimensions are refreshed.
    pub async fn extend(&mut self, anchor: ExtendAnchor) -> ClientResult<ExtendEffect> {
        let (dataset, index) = self
            .selection("extend the image")
            .map_err(|err| self.note_err(err))?;
        let path = self.images[index].path.clone();

        let outcome = match self.api.extend_image(&dataset, &path, anchor).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.note_err(err)),
        };
        self.absorb_resolutions(index, &outcome);
        if outcome.is_extended() {
            self.reload_image(&dataset, index).await?;
            self.status = format!("Extended {path} to the training grid");
            Ok(ExtendEffect::ImageReloaded)
        } else {
            self.status = format!("{path} already fits the training grid");
            Ok(ExtendEffect::AlreadyConforming)
        }
    }
}
