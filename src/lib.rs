//! # Dataset Caption Client
//!
//! Client library for an image-dataset captioning backend. It drives the
//! browse/edit workflow used when preparing training datasets: list datasets
//! and their images, edit comma-separated captions with vocabulary
//! autocomplete, and normalize crop / resize / extend mutations before
//! sending them to the server.
//!
//! ## Architecture
//!
//! The library is organized into a few focused modules:
//! - `api`: the REST client and the [`api::Backend`] transport seam
//! - `session`: the [`session::DatasetSession`] controller and its state
//!   machine over datasets and images
//! - `suggest`: caption tokenization and vocabulary suggestion matching
//! - `model`: serde types for the wire contract
//! - `config`: client configuration and validation
//! - `error`: domain errors, all convertible to user-visible status strings
//!
//! Crop-rectangle geometry (snapping, centering, extend anchors, grid
//! alignment) lives in the workspace's `crop-geom` crate and is re-exported
//! here for convenience.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dataset_caption::{api::CaptionApi, config::ClientConfig, session::DatasetSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let api = CaptionApi::over_http(&config.server, config.timeout())?;
//! let mut session = DatasetSession::new(api);
//!
//! session.load_dataset("cats").await?;
//! session.select_image("cats/01.png").await?;
//! session.save_caption("cat, window, sunlight").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod suggest;

/// Re-export error types for convenience
pub use error::{ClientError, ClientResult};

/// Re-export the geometry crate's core types
pub use crop_geom::{CropTool, ExtendAnchor, Rect};
